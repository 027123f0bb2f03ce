use reverie_types::models::{Event, Quest, SponsorshipGoal, SponsorshipKind};

/// Project the fundable goals out of the content collections: exactly the
/// quests and events with a nonzero funding target, tagged with their
/// source kind. Recomputed after every refresh; never persisted.
pub fn derive_sponsorships(quests: &[Quest], events: &[Event]) -> Vec<SponsorshipGoal> {
    let from_quests = quests
        .iter()
        .filter(|q| q.funding.amount_needed > 0.0)
        .map(|q| SponsorshipGoal {
            id: q.id.clone(),
            kind: SponsorshipKind::Quest,
            name: q.title.clone(),
            description: q.purpose.clone(),
            amount_needed: q.funding.amount_needed,
            amount_raised: q.funding.amount_raised,
            funding_status: q.funding.funding_status,
            gallery_images: q.funding.gallery_images.clone(),
        });

    let from_events = events
        .iter()
        .filter(|e| e.funding.amount_needed > 0.0)
        .map(|e| SponsorshipGoal {
            id: e.id.clone(),
            kind: SponsorshipKind::Event,
            name: e.title.clone(),
            description: e.description.clone(),
            amount_needed: e.funding.amount_needed,
            amount_raised: e.funding.amount_raised,
            funding_status: e.funding.funding_status,
            gallery_images: e.funding.gallery_images.clone(),
        });

    from_quests.chain(from_events).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reverie_types::models::{Funding, FundingStatus};

    fn quest(id: &str, needed: f64, raised: f64) -> Quest {
        Quest {
            id: id.into(),
            title: format!("quest {}", id),
            purpose: "why".into(),
            funding: Funding {
                amount_needed: needed,
                amount_raised: raised,
                funding_status: if needed > 0.0 {
                    FundingStatus::Active
                } else {
                    FundingStatus::NotFunded
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn event(id: &str, needed: f64) -> Event {
        Event {
            id: id.into(),
            title: format!("event {}", id),
            description: "an evening".into(),
            funding: Funding { amount_needed: needed, ..Default::default() },
            ..Default::default()
        }
    }

    #[test]
    fn test_only_funded_records_become_goals() {
        let quests = vec![quest("q1", 1000.0, 200.0), quest("q2", 0.0, 0.0)];
        let events = vec![event("e1", 500.0), event("e2", 0.0)];

        let goals = derive_sponsorships(&quests, &events);

        assert_eq!(goals.len(), 2);
        assert_eq!(goals[0].id, "q1");
        assert_eq!(goals[0].kind, SponsorshipKind::Quest);
        assert_eq!(goals[0].amount_raised, 200.0);
        assert_eq!(goals[1].id, "e1");
        assert_eq!(goals[1].kind, SponsorshipKind::Event);
    }

    #[test]
    fn test_goal_aliases_name_and_description() {
        let quests = vec![quest("q1", 100.0, 0.0)];
        let events = vec![event("e1", 100.0)];

        let goals = derive_sponsorships(&quests, &events);

        assert_eq!(goals[0].name, "quest q1");
        assert_eq!(goals[0].description, "why");
        assert_eq!(goals[1].name, "event e1");
        assert_eq!(goals[1].description, "an evening");
    }

    #[test]
    fn test_empty_collections_yield_no_goals() {
        assert!(derive_sponsorships(&[], &[]).is_empty());
    }
}
