use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use reverie_types::forms::{
    AnnouncementForm, DonationForm, DreamerForm, EventForm, QuestForm, RoleForm, SponsorForm,
    StudentForm,
};
use reverie_types::models::{
    AcademyStudent, Announcement, Difficulty, Donation, DonationKind, DonationStatus, Dreamer,
    Event, EventKind, Funding, FundingStatus, Quest, Role, Socials, Sponsor, SponsorshipKind,
};

use crate::rows::{
    AnnouncementRow, DonationRow, DreamerRow, EventRow, QuestRow, RoleRow, SponsorRow, StudentRow,
};

/// Bidirectional translation between storage rows and application models.
/// Pure and stateless; the one place that knows both shapes.
///
/// Reads never fail: malformed fields degrade to defaults via the lenient
/// row deserializers, so a hand-edited table cannot take the site down.

// -- Shared helpers --

fn parse_row<T: DeserializeOwned + Default>(value: &Value) -> T {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

/// Newline-joined storage field -> ordered list. Whitespace-only input is
/// an empty list, not `[""]`.
pub fn split_lines(s: &str) -> Vec<String> {
    s.split('\n')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Comma-joined storage field -> ordered list.
pub fn split_commas(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Form amounts are strings from the dashboard; invalid or absent is 0.
pub fn parse_amount(s: Option<&str>) -> f64 {
    s.map(str::trim).and_then(|s| s.parse().ok()).unwrap_or(0.0)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    s.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // Some tables store "YYYY-MM-DD HH:MM:SS" without a timezone.
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_default()
}

// -- Quests --

pub fn quest_to_application(value: &Value) -> Quest {
    let row: QuestRow = parse_row(value);
    Quest {
        id: row.id,
        title: row.title,
        purpose: row.purpose,
        difficulty: Difficulty::parse(&row.difficulty),
        time_needed: row.time_needed,
        steps: split_lines(&row.steps),
        impact: row.impact,
        share_prompt: row.share_prompt,
        funding: Funding {
            amount_needed: row.amount_needed,
            amount_raised: row.amount_raised,
            funding_status: FundingStatus::parse(&row.funding_status),
            gallery_images: row.gallery_images,
            completion_images: row.completion_images,
            completion_note: row.completion_note,
            date_completed: row.date_completed.as_deref().and_then(parse_date),
        },
    }
}

pub fn quest_to_storage(quest: &Quest) -> Value {
    let row = QuestRow {
        id: quest.id.clone(),
        title: quest.title.clone(),
        purpose: quest.purpose.clone(),
        difficulty: quest.difficulty.as_str().to_string(),
        time_needed: quest.time_needed.clone(),
        steps: quest.steps.join("\n"),
        impact: quest.impact.clone(),
        share_prompt: quest.share_prompt.clone(),
        amount_needed: quest.funding.amount_needed,
        amount_raised: quest.funding.amount_raised,
        funding_status: quest.funding.funding_status.as_str().to_string(),
        gallery_images: quest.funding.gallery_images.clone(),
        completion_images: quest.funding.completion_images.clone(),
        completion_note: quest.funding.completion_note.clone(),
        date_completed: quest.funding.date_completed.map(|d| d.to_string()),
    };
    serde_json::to_value(row).unwrap_or(Value::Null)
}

pub fn quest_from_form(id: String, form: &QuestForm) -> Quest {
    Quest {
        id,
        title: form.title.clone(),
        purpose: form.purpose.clone(),
        difficulty: Difficulty::parse(&form.difficulty),
        time_needed: form.time_needed.clone(),
        steps: split_lines(&form.steps),
        impact: form.impact.clone(),
        share_prompt: form.share_prompt.clone(),
        funding: funding_from_form(
            form.amount_needed.as_deref(),
            form.amount_raised.as_deref(),
            &form.funding_status,
            &form.gallery_images,
            &form.completion_images,
            &form.completion_note,
            form.date_completed.as_deref(),
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn funding_from_form(
    amount_needed: Option<&str>,
    amount_raised: Option<&str>,
    funding_status: &str,
    gallery_images: &[String],
    completion_images: &[String],
    completion_note: &str,
    date_completed: Option<&str>,
) -> Funding {
    Funding {
        amount_needed: parse_amount(amount_needed),
        amount_raised: parse_amount(amount_raised),
        funding_status: FundingStatus::parse(funding_status),
        gallery_images: gallery_images.to_vec(),
        completion_images: completion_images.to_vec(),
        completion_note: completion_note.to_string(),
        date_completed: date_completed.and_then(parse_date),
    }
}

// -- Events --

pub fn event_to_application(value: &Value) -> Event {
    let row: EventRow = parse_row(value);
    Event {
        id: row.id,
        title: row.title,
        host: row.host,
        kind: EventKind::parse(&row.kind),
        date: row.date,
        location: row.location,
        description: row.description,
        registration_link: row.registration_link,
        funding: Funding {
            amount_needed: row.amount_needed,
            amount_raised: row.amount_raised,
            funding_status: FundingStatus::parse(&row.funding_status),
            gallery_images: row.gallery_images,
            completion_images: row.completion_images,
            completion_note: row.completion_note,
            date_completed: row.date_completed.as_deref().and_then(parse_date),
        },
    }
}

pub fn event_to_storage(event: &Event) -> Value {
    let row = EventRow {
        id: event.id.clone(),
        title: event.title.clone(),
        host: event.host.clone(),
        kind: event.kind.as_str().to_string(),
        date: event.date.clone(),
        location: event.location.clone(),
        description: event.description.clone(),
        registration_link: event.registration_link.clone(),
        amount_needed: event.funding.amount_needed,
        amount_raised: event.funding.amount_raised,
        funding_status: event.funding.funding_status.as_str().to_string(),
        gallery_images: event.funding.gallery_images.clone(),
        completion_images: event.funding.completion_images.clone(),
        completion_note: event.funding.completion_note.clone(),
        date_completed: event.funding.date_completed.map(|d| d.to_string()),
    };
    serde_json::to_value(row).unwrap_or(Value::Null)
}

pub fn event_from_form(id: String, form: &EventForm) -> Event {
    Event {
        id,
        title: form.title.clone(),
        host: form.host.clone(),
        kind: EventKind::parse(&form.kind),
        date: form.date.clone(),
        location: form.location.clone(),
        description: form.description.clone(),
        registration_link: form.registration_link.clone(),
        funding: funding_from_form(
            form.amount_needed.as_deref(),
            form.amount_raised.as_deref(),
            &form.funding_status,
            &form.gallery_images,
            &form.completion_images,
            &form.completion_note,
            form.date_completed.as_deref(),
        ),
    }
}

// -- Roles --

pub fn role_to_application(value: &Value) -> Role {
    let row: RoleRow = parse_row(value);
    Role {
        id: row.id,
        name: row.name,
        singular: row.singular,
        description: row.description,
        color: row.color,
        traits: split_lines(&row.traits),
        philosophy: row.philosophy,
        is_exclusive: row.is_exclusive,
        image: row.image,
    }
}

pub fn role_to_storage(role: &Role) -> Value {
    let row = RoleRow {
        id: role.id.clone(),
        name: role.name.clone(),
        singular: role.singular.clone(),
        description: role.description.clone(),
        color: role.color.clone(),
        traits: role.traits.join("\n"),
        philosophy: role.philosophy.clone(),
        is_exclusive: role.is_exclusive,
        image: role.image.clone(),
    };
    serde_json::to_value(row).unwrap_or(Value::Null)
}

pub fn role_from_form(id: String, form: &RoleForm) -> Role {
    Role {
        id,
        name: form.name.clone(),
        singular: form.singular.clone(),
        description: form.description.clone(),
        color: form.color.clone(),
        traits: split_lines(&form.traits),
        philosophy: form.philosophy.clone(),
        is_exclusive: form.is_exclusive,
        image: form.image.clone(),
    }
}

// -- Dreamers --

pub fn dreamer_to_application(value: &Value) -> Dreamer {
    let row: DreamerRow = parse_row(value);
    Dreamer {
        id: row.id,
        name: row.name,
        role: row.role,
        title: row.title,
        avatar: row.avatar,
        cover_image: row.cover_image,
        bio: row.bio,
        themes: split_commas(&row.themes),
        socials: Socials {
            youtube: row.youtube,
            instagram: row.instagram,
            facebook: row.facebook,
            twitter: row.twitter,
        },
        points: row.points,
        level: row.points / 100,
    }
}

pub fn dreamer_to_storage(dreamer: &Dreamer) -> Value {
    // `level` is derived on every map and intentionally not written back.
    let row = DreamerRow {
        id: dreamer.id.clone(),
        name: dreamer.name.clone(),
        role: dreamer.role.clone(),
        title: dreamer.title.clone(),
        avatar: dreamer.avatar.clone(),
        cover_image: dreamer.cover_image.clone(),
        bio: dreamer.bio.clone(),
        themes: dreamer.themes.join(", "),
        youtube: dreamer.socials.youtube.clone(),
        instagram: dreamer.socials.instagram.clone(),
        facebook: dreamer.socials.facebook.clone(),
        twitter: dreamer.socials.twitter.clone(),
        points: dreamer.points,
    };
    serde_json::to_value(row).unwrap_or(Value::Null)
}

pub fn dreamer_from_form(id: String, form: &DreamerForm) -> Dreamer {
    let points = form
        .points
        .as_deref()
        .map(str::trim)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    Dreamer {
        id,
        name: form.name.clone(),
        role: form.role.clone(),
        title: form.title.clone(),
        avatar: form.avatar.clone(),
        cover_image: form.cover_image.clone(),
        bio: form.bio.clone(),
        themes: split_commas(&form.themes),
        socials: Socials {
            youtube: form.youtube.clone().filter(|s| !s.trim().is_empty()),
            instagram: form.instagram.clone().filter(|s| !s.trim().is_empty()),
            facebook: form.facebook.clone().filter(|s| !s.trim().is_empty()),
            twitter: form.twitter.clone().filter(|s| !s.trim().is_empty()),
        },
        points,
        level: points / 100,
    }
}

// -- Sponsors --

pub fn sponsor_to_application(value: &Value) -> Sponsor {
    let row: SponsorRow = parse_row(value);
    Sponsor {
        id: row.id,
        name: row.name,
        title: row.title,
        avatar: row.avatar,
        bio: row.bio,
        themes: split_commas(&row.themes),
    }
}

pub fn sponsor_to_storage(sponsor: &Sponsor) -> Value {
    let row = SponsorRow {
        id: sponsor.id.clone(),
        name: sponsor.name.clone(),
        title: sponsor.title.clone(),
        avatar: sponsor.avatar.clone(),
        bio: sponsor.bio.clone(),
        themes: sponsor.themes.join(", "),
    };
    serde_json::to_value(row).unwrap_or(Value::Null)
}

pub fn sponsor_from_form(id: String, form: &SponsorForm) -> Sponsor {
    Sponsor {
        id,
        name: form.name.clone(),
        title: form.title.clone(),
        avatar: form.avatar.clone(),
        bio: form.bio.clone(),
        themes: split_commas(&form.themes),
    }
}

// -- Academy students --

pub fn student_to_application(value: &Value) -> AcademyStudent {
    let row: StudentRow = parse_row(value);
    AcademyStudent {
        id: row.id,
        name: row.name,
        email: row.email,
        focus: row.focus,
        joined: row.joined,
    }
}

pub fn student_to_storage(student: &AcademyStudent) -> Value {
    let row = StudentRow {
        id: student.id.clone(),
        name: student.name.clone(),
        email: student.email.clone(),
        focus: student.focus.clone(),
        joined: student.joined.clone(),
    };
    serde_json::to_value(row).unwrap_or(Value::Null)
}

pub fn student_from_form(id: String, form: &StudentForm) -> AcademyStudent {
    AcademyStudent {
        id,
        name: form.name.clone(),
        email: form.email.clone(),
        focus: form.focus.clone(),
        joined: form.joined.clone(),
    }
}

// -- Announcement --

pub fn announcement_to_application(value: &Value) -> Announcement {
    let row: AnnouncementRow = parse_row(value);
    Announcement {
        title: row.title,
        date: row.date,
        content: row.content,
        link_text: row.link_text,
        link_to: row.link_to,
    }
}

pub fn announcement_to_storage(id: &str, form: &AnnouncementForm) -> Value {
    let row = AnnouncementRow {
        id: id.to_string(),
        title: form.title.clone(),
        date: form.date.clone(),
        content: form.content.clone(),
        link_text: form.link_text.clone(),
        link_to: form.link_to.clone(),
    };
    serde_json::to_value(row).unwrap_or(Value::Null)
}

// -- Donations --

pub fn donation_to_application(value: &Value) -> Donation {
    let row: DonationRow = parse_row(value);
    Donation {
        id: row.id.unwrap_or_default(),
        name: row.name,
        email: row.email,
        amount: row.amount,
        kind: DonationKind::parse(&row.kind),
        message: row.message,
        date: parse_timestamp(&row.date),
        status: DonationStatus::parse(&row.status),
        payment_method: row.payment_method,
        transaction_id: row.transaction_id,
        sponsorship_kind: SponsorshipKind::parse(&row.sponsorship_type),
        sponsorship_id: row.sponsorship_id,
        reconciled: row.reconciled,
    }
}

/// Build the outgoing donation row. The form never carries an id — the
/// store assigns one and the inserted row comes back through
/// `donation_to_application`.
pub fn donation_to_storage(
    form: &DonationForm,
    date: DateTime<Utc>,
    reconciled: bool,
) -> Value {
    let row = DonationRow {
        id: None,
        name: form.name.clone(),
        email: form.email.clone(),
        amount: form.amount,
        kind: form.kind.as_str().to_string(),
        message: form.message.clone(),
        date: date.to_rfc3339(),
        status: form.status.as_str().to_string(),
        payment_method: form.payment_method.clone(),
        transaction_id: form.transaction_id.clone(),
        sponsorship_type: form.sponsorship_kind.as_str().to_string(),
        sponsorship_id: form.sponsorship_id.clone(),
        reconciled,
    };
    serde_json::to_value(row).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quest_round_trip_is_idempotent() {
        let stored = json!({
            "id": "q1",
            "title": "Restore the river path",
            "purpose": "Make the bank walkable again",
            "difficulty": "hard",
            "time_needed": "2 weekends",
            "steps": "Survey the bank\nClear debris\nLay gravel",
            "impact": "Safe access for everyone",
            "share_prompt": "I helped restore the river path!",
            "amount_needed": "1500",
            "amount_raised": 200,
            "funding_status": "active",
            "gallery_images": ["a.jpg", "b.jpg"],
            "completion_images": [],
            "completion_note": "",
            "date_completed": null,
        });

        let once = quest_to_application(&stored);
        let twice = quest_to_application(&quest_to_storage(&once));

        assert_eq!(twice.id, once.id);
        assert_eq!(twice.title, once.title);
        assert_eq!(twice.difficulty, once.difficulty);
        assert_eq!(twice.steps, once.steps);
        assert_eq!(twice.funding.amount_needed, once.funding.amount_needed);
        assert_eq!(twice.funding.amount_raised, once.funding.amount_raised);
        assert_eq!(twice.funding.funding_status, once.funding.funding_status);
        assert_eq!(twice.funding.gallery_images, once.funding.gallery_images);
    }

    #[test]
    fn test_missing_amounts_default_to_zero() {
        let stored = json!({ "id": "q2", "title": "Bare quest" });
        let quest = quest_to_application(&stored);
        assert_eq!(quest.funding.amount_needed, 0.0);
        assert_eq!(quest.funding.amount_raised, 0.0);
        assert_eq!(quest.funding.funding_status, FundingStatus::NotFunded);
    }

    #[test]
    fn test_invalid_amount_string_defaults_to_zero() {
        let stored = json!({ "id": "q3", "title": "x", "amount_needed": "lots" });
        let quest = quest_to_application(&stored);
        assert_eq!(quest.funding.amount_needed, 0.0);
    }

    #[test]
    fn test_steps_split_on_newlines() {
        assert_eq!(split_lines("a\nb\nc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("  a  \n\n b "), vec!["a", "b"]);
        assert!(split_lines("").is_empty());
        assert!(split_lines("   \n  ").is_empty());
    }

    #[test]
    fn test_themes_split_on_commas() {
        assert_eq!(split_commas("art, music,  craft"), vec!["art", "music", "craft"]);
        assert!(split_commas(" , ,").is_empty());
    }

    #[test]
    fn test_non_array_gallery_coerces_to_empty() {
        let stored = json!({ "id": "q4", "title": "x", "gallery_images": "oops" });
        let quest = quest_to_application(&stored);
        assert!(quest.funding.gallery_images.is_empty());
    }

    #[test]
    fn test_unknown_funding_status_falls_back() {
        let stored = json!({ "id": "q5", "title": "x", "funding_status": "archived" });
        let quest = quest_to_application(&stored);
        assert_eq!(quest.funding.funding_status, FundingStatus::NotFunded);
    }

    #[test]
    fn test_dreamer_level_derived_from_points() {
        let stored = json!({
            "id": "d1",
            "name": "Wren",
            "themes": "forests, rivers",
            "points": 250,
            "youtube": "https://youtube.com/@wren",
        });
        let dreamer = dreamer_to_application(&stored);
        assert_eq!(dreamer.level, 2);
        assert_eq!(dreamer.themes, vec!["forests", "rivers"]);
        assert_eq!(dreamer.socials.youtube.as_deref(), Some("https://youtube.com/@wren"));
        assert!(dreamer.socials.twitter.is_none());

        // level never round-trips into storage
        let back = dreamer_to_storage(&dreamer);
        assert!(back.get("level").is_none());
    }

    #[test]
    fn test_unknown_donation_status_is_failed() {
        let stored = json!({ "id": "don1", "amount": 25, "status": "maybe" });
        let donation = donation_to_application(&stored);
        assert_eq!(donation.status, DonationStatus::Failed);
        assert!(donation.goal_target().is_none());
    }

    #[test]
    fn test_donation_timestamp_fallback_formats() {
        let rfc = json!({ "id": "d", "date": "2025-03-01T12:00:00Z", "status": "success" });
        let sqlish = json!({ "id": "d", "date": "2025-03-01 12:00:00", "status": "success" });
        assert_eq!(
            donation_to_application(&rfc).date,
            donation_to_application(&sqlish).date
        );
    }

    #[test]
    fn test_form_amounts_parse_leniently() {
        let form = QuestForm {
            title: "t".into(),
            amount_needed: Some("1000".into()),
            amount_raised: Some("not a number".into()),
            ..Default::default()
        };
        let quest = quest_from_form("q9".into(), &form);
        assert_eq!(quest.funding.amount_needed, 1000.0);
        assert_eq!(quest.funding.amount_raised, 0.0);
    }

    #[test]
    fn test_non_object_row_degrades_to_defaults() {
        let quest = quest_to_application(&json!("not an object"));
        assert!(quest.id.is_empty());
        assert_eq!(quest.funding.amount_needed, 0.0);
    }
}
