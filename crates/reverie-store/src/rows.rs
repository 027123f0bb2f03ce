use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Storage-row types — these mirror the remote tables (snake_case, flattened
/// scalars, delimiter-joined lists). Distinct from the reverie-types models
/// so the store layer stays independent of the UI shape.
///
/// Reads are lenient: every field deserializes with a defensive fallback so
/// malformed upstream data degrades to a documented default instead of
/// failing the whole collection. Writes serialize the exact table shape.

// -- Lenient field deserializers --

pub(crate) fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

pub(crate) fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Number(n) => n.as_u64().unwrap_or(0).min(u32::MAX as u64) as u32,
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::String(s) => s,
        // Numeric ids show up when a table was seeded by hand.
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

pub(crate) fn lenient_opt_string<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<String>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub(crate) fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Bool(b) => b,
        Value::String(s) => s.trim() == "true",
        _ => false,
    })
}

/// JSON array columns arrive as anything when edited by hand — a non-array
/// coerces to empty rather than poisoning the record.
pub(crate) fn lenient_strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

// -- Content rows --

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub purpose: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub difficulty: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time_needed: String,
    /// Newline-joined step list.
    #[serde(default, deserialize_with = "lenient_string")]
    pub steps: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub impact: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub share_prompt: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount_needed: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount_raised: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub funding_status: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub gallery_images: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub completion_images: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub completion_note: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub date_completed: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub host: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub registration_link: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount_needed: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount_raised: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub funding_status: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub gallery_images: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub completion_images: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub completion_note: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub date_completed: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub singular: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub color: String,
    /// Newline-joined trait list.
    #[serde(default, deserialize_with = "lenient_string")]
    pub traits: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub philosophy: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_exclusive: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DreamerRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub avatar: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cover_image: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub bio: String,
    /// Comma-joined theme list.
    #[serde(default, deserialize_with = "lenient_string")]
    pub themes: String,
    // Social links are flattened scalar columns in the table.
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub youtube: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub instagram: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub facebook: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub twitter: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub points: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SponsorRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub avatar: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub bio: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub themes: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub focus: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub joined: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnouncementRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub link_text: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub link_to: String,
}

// -- Donations --

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DonationRow {
    /// Assigned by the store on insert — omitted from the outgoing row.
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: f64,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub payment_method: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub transaction_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sponsorship_type: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub sponsorship_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub reconciled: bool,
}
