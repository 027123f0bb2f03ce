use serde::{Deserialize, Serialize};

use crate::models::{DonationKind, DonationStatus, SponsorshipKind};

/// Write-side payloads accepted from the admin dashboard and the checkout
/// flow. Numeric inputs arrive as strings (HTML form fields) and are parsed
/// leniently at the mapper seam — invalid or absent parses to 0, never an
/// error mid-save.

// -- Content forms --

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub time_needed: String,
    /// Newline-joined in the editor textarea; split into steps on map.
    #[serde(default)]
    pub steps: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub share_prompt: String,
    #[serde(default)]
    pub amount_needed: Option<String>,
    #[serde(default)]
    pub amount_raised: Option<String>,
    #[serde(default)]
    pub funding_status: String,
    #[serde(default)]
    pub gallery_images: Vec<String>,
    #[serde(default)]
    pub completion_images: Vec<String>,
    #[serde(default)]
    pub completion_note: String,
    #[serde(default)]
    pub date_completed: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub registration_link: String,
    #[serde(default)]
    pub amount_needed: Option<String>,
    #[serde(default)]
    pub amount_raised: Option<String>,
    #[serde(default)]
    pub funding_status: String,
    #[serde(default)]
    pub gallery_images: Vec<String>,
    #[serde(default)]
    pub completion_images: Vec<String>,
    #[serde(default)]
    pub completion_note: String,
    #[serde(default)]
    pub date_completed: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub singular: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    /// Newline-joined in the editor.
    #[serde(default)]
    pub traits: String,
    #[serde(default)]
    pub philosophy: String,
    #[serde(default)]
    pub is_exclusive: bool,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub bio: String,
    /// Comma-joined in the editor.
    #[serde(default)]
    pub themes: String,
    #[serde(default)]
    pub youtube: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub points: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub themes: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub joined: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub link_text: String,
    #[serde(default)]
    pub link_to: String,
}

// -- Donations --

/// Ledger input. Unlike the content forms, `amount` is already numeric:
/// the checkout adapter and the admin dashboard both validate it before
/// handing it over.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DonationForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub amount: f64,
    #[serde(default)]
    pub kind: DonationKind,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: DonationStatus,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub sponsorship_kind: SponsorshipKind,
    #[serde(default)]
    pub sponsorship_id: Option<String>,
}

// -- Checkout confirmation --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStatus {
    Success,
    Cancelled,
    Failed,
}

/// Terminal result of the provider checkout widget. Every variant — success,
/// user cancel, init failure — must yield exactly one donation row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CheckoutOutcome {
    pub status: CheckoutStatus,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment_method: String,
    pub amount: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub kind: DonationKind,
    #[serde(default)]
    pub sponsorship_kind: SponsorshipKind,
    #[serde(default)]
    pub sponsorship_id: Option<String>,
}
