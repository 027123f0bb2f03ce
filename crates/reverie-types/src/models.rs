use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Application-shape records. These serialize camelCase for the site UI;
/// the snake_case storage shape lives in reverie-store and never leaves
/// the mapper seam.

// -- Funding --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FundingStatus {
    #[default]
    NotFunded,
    Active,
    Completed,
}

impl FundingStatus {
    /// Lenient parse for storage values. Unknown strings fall back to
    /// `NotFunded` rather than failing the whole record.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "active" => Self::Active,
            "completed" => Self::Completed,
            _ => Self::NotFunded,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFunded => "not-funded",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

/// Funding block shared by quests and events — anything with this block
/// can appear as a sponsorship goal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Funding {
    pub amount_needed: f64,
    pub amount_raised: f64,
    pub funding_status: FundingStatus,
    pub gallery_images: Vec<String>,
    pub completion_images: Vec<String>,
    pub completion_note: String,
    pub date_completed: Option<NaiveDate>,
}

// -- Quests --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "medium" => Self::Medium,
            "hard" => Self::Hard,
            _ => Self::Easy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub purpose: String,
    pub difficulty: Difficulty,
    pub time_needed: String,
    pub steps: Vec<String>,
    pub impact: String,
    pub share_prompt: String,
    #[serde(flatten)]
    pub funding: Funding,
}

// -- Events --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    #[default]
    Online,
    Offline,
    Hybrid,
}

impl EventKind {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "offline" => Self::Offline,
            "hybrid" => Self::Hybrid,
            _ => Self::Online,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Hybrid => "hybrid",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub host: String,
    pub kind: EventKind,
    /// Display date, kept freeform ("March 14" etc.) — the site renders it
    /// verbatim.
    pub date: String,
    pub location: String,
    pub description: String,
    pub registration_link: String,
    #[serde(flatten)]
    pub funding: Funding,
}

// -- Roles & people --

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub name: String,
    pub singular: String,
    pub description: String,
    pub color: String,
    pub traits: Vec<String>,
    pub philosophy: String,
    pub is_exclusive: bool,
    pub image: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Socials {
    pub youtube: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dreamer {
    pub id: String,
    pub name: String,
    /// References Role.id — roles own their definition, dreamers point at it.
    pub role: String,
    pub title: String,
    pub avatar: String,
    pub cover_image: String,
    pub bio: String,
    pub themes: Vec<String>,
    pub socials: Socials,
    pub points: u32,
    /// Derived as points / 100 on every map, never persisted.
    pub level: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sponsor {
    pub id: String,
    pub name: String,
    pub title: String,
    pub avatar: String,
    pub bio: String,
    pub themes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademyStudent {
    pub id: String,
    pub name: String,
    pub email: String,
    pub focus: String,
    pub joined: String,
}

// -- Announcement (singleton) --

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub title: String,
    pub date: String,
    pub content: String,
    pub link_text: String,
    pub link_to: String,
}

// -- Donations --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DonationKind {
    #[default]
    OneTime,
    Monthly,
}

impl DonationKind {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "monthly" => Self::Monthly,
            _ => Self::OneTime,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneTime => "one-time",
            Self::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Success,
    /// Unknown storage values also land here — an unrecognized status must
    /// never count toward a goal balance.
    #[default]
    Failed,
}

impl DonationStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "success" => Self::Success,
            _ => Self::Failed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SponsorshipKind {
    #[default]
    General,
    Quest,
    Event,
}

impl SponsorshipKind {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "quest" => Self::Quest,
            "event" => Self::Event,
            _ => Self::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Quest => "quest",
            Self::Event => "event",
        }
    }
}

/// A recorded donation. Immutable once written — deletion is the only
/// mutation path, and it must reverse the goal balance it was applied to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: String,
    pub name: String,
    pub email: String,
    pub amount: f64,
    pub kind: DonationKind,
    pub message: String,
    pub date: DateTime<Utc>,
    pub status: DonationStatus,
    pub payment_method: String,
    pub transaction_id: String,
    pub sponsorship_kind: SponsorshipKind,
    pub sponsorship_id: Option<String>,
    /// False while a successful goal-targeted donation has not yet been
    /// applied to its goal's running total. The reconciler retries these.
    pub reconciled: bool,
}

impl Donation {
    /// The goal this donation should be applied to, if any. Failed rows are
    /// audit-only and never move money.
    pub fn goal_target(&self) -> Option<(SponsorshipKind, &str)> {
        if self.status != DonationStatus::Success {
            return None;
        }
        match (self.sponsorship_kind, self.sponsorship_id.as_deref()) {
            (SponsorshipKind::Quest, Some(id)) => Some((SponsorshipKind::Quest, id)),
            (SponsorshipKind::Event, Some(id)) => Some((SponsorshipKind::Event, id)),
            _ => None,
        }
    }
}

// -- Sponsorship goals (derived) --

/// Projection of a quest or event with a nonzero funding target. Derived
/// from the snapshot after every refresh, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorshipGoal {
    pub id: String,
    pub kind: SponsorshipKind,
    pub name: String,
    pub description: String,
    pub amount_needed: f64,
    pub amount_raised: f64,
    pub funding_status: FundingStatus,
    pub gallery_images: Vec<String>,
}
