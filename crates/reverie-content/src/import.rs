use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use reverie_store::{Collection, RemoteStore, StoreError, mapper};
use reverie_types::models::{Announcement, Dreamer, Event, Quest, Role};

use crate::content::ANNOUNCEMENT_ID;

/// Fixed key of the published blob; one row, replaced on every import.
pub const SITE_SNAPSHOT_ID: &str = "published";

/// Bulk admin sync: a tabular payload per collection, exported from the
/// editors' spreadsheet. All-or-nothing — one malformed sheet rejects the
/// whole import before anything is written.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSheets {
    #[serde(default)]
    pub quests: Value,
    #[serde(default)]
    pub roles: Value,
    #[serde(default)]
    pub dreamers: Value,
    #[serde(default)]
    pub events: Value,
    /// Optional fifth sheet; when present it must be array-shaped too and
    /// only its first surviving row is kept (singleton).
    #[serde(default)]
    pub announcement: Option<Value>,
}

#[derive(Debug, Error)]
pub enum ImportError {
    /// One aggregated rejection naming every sheet that was not a row list
    /// (a rate-limited export returns an error object in place of rows).
    #[error("import rejected, sheets not array-shaped: {}", .0.join(", "))]
    BadSheets(Vec<String>),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    /// Rows silently skipped for missing their title/name key.
    pub dropped: usize,
    pub last_synced: DateTime<Utc>,
}

/// The snapshot published for anonymous read access. Absence of the blob
/// is the defined "not yet synced" state, distinct from a store error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedSnapshot {
    #[serde(default)]
    pub quests: Vec<Quest>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub dreamers: Vec<Dreamer>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub announcement: Option<Announcement>,
    #[serde(default)]
    pub last_synced: DateTime<Utc>,
}

/// Spreadsheet exports have inconsistent header casing; keys are lowercased
/// and trimmed before anything looks at them.
fn normalize_keys(row: &Value) -> Option<Map<String, Value>> {
    let obj = row.as_object()?;
    let mut out = Map::with_capacity(obj.len());
    for (k, v) in obj {
        out.insert(k.trim().to_lowercase(), v.clone());
    }
    Some(out)
}

fn has_required(row: &Map<String, Value>, key: &str) -> bool {
    matches!(row.get(key), Some(Value::String(s)) if !s.trim().is_empty())
}

fn prepare_sheet(sheet: &Value, required: &str) -> Option<(Vec<Value>, usize)> {
    let rows = sheet.as_array()?;
    let mut kept = Vec::with_capacity(rows.len());
    let mut dropped = 0;
    for row in rows {
        let Some(mut normalized) = normalize_keys(row) else {
            dropped += 1;
            continue;
        };
        if !has_required(&normalized, required) {
            dropped += 1;
            continue;
        }
        if !matches!(normalized.get("id"), Some(Value::String(s)) if !s.is_empty()) {
            normalized.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        }
        kept.push(Value::Object(normalized));
    }
    Some((kept, dropped))
}

/// Validate and run a bulk import, then publish the read-only snapshot.
pub async fn run_import(
    store: &dyn RemoteStore,
    sheets: &ImportSheets,
) -> Result<ImportReport, ImportError> {
    let named: [(&str, Collection, &str, &Value); 4] = [
        ("quests", Collection::Quests, "title", &sheets.quests),
        ("roles", Collection::Roles, "name", &sheets.roles),
        ("dreamers", Collection::Dreamers, "name", &sheets.dreamers),
        ("events", Collection::Events, "title", &sheets.events),
    ];

    // Validate every sheet before touching the store — a partial import is
    // worse than no import.
    let mut bad = Vec::new();
    let mut prepared = Vec::new();
    for (name, collection, required, sheet) in named {
        match prepare_sheet(sheet, required) {
            Some((rows, dropped)) => prepared.push((collection, rows, dropped)),
            None => bad.push(name.to_string()),
        }
    }
    let announcement_rows = match &sheets.announcement {
        Some(sheet) => match prepare_sheet(sheet, "title") {
            Some((rows, _)) => rows,
            None => {
                bad.push("announcement".to_string());
                Vec::new()
            }
        },
        None => Vec::new(),
    };
    if !bad.is_empty() {
        return Err(ImportError::BadSheets(bad));
    }

    let mut imported = 0;
    let mut dropped = 0;
    for (collection, rows, sheet_dropped) in &prepared {
        dropped += sheet_dropped;
        for row in rows {
            store.upsert(*collection, row.clone()).await?;
            imported += 1;
        }
    }
    if let Some(first) = announcement_rows.first() {
        let mut row = first.clone();
        if let Some(obj) = row.as_object_mut() {
            obj.insert("id".into(), Value::String(ANNOUNCEMENT_ID.into()));
        }
        store.upsert(Collection::Announcements, row).await?;
        imported += 1;
    }

    let last_synced = Utc::now();
    let snapshot = PublishedSnapshot {
        quests: prepared[0].1.iter().map(mapper::quest_to_application).collect(),
        roles: prepared[1].1.iter().map(mapper::role_to_application).collect(),
        dreamers: prepared[2].1.iter().map(mapper::dreamer_to_application).collect(),
        events: prepared[3].1.iter().map(mapper::event_to_application).collect(),
        announcement: announcement_rows.first().map(mapper::announcement_to_application),
        last_synced,
    };
    publish_snapshot(store, &snapshot).await?;

    info!("import complete: {} rows in, {} dropped", imported, dropped);
    Ok(ImportReport { imported, dropped, last_synced })
}

pub async fn publish_snapshot(
    store: &dyn RemoteStore,
    snapshot: &PublishedSnapshot,
) -> Result<(), StoreError> {
    let mut row = serde_json::to_value(snapshot).unwrap_or(Value::Null);
    if let Some(obj) = row.as_object_mut() {
        obj.insert("id".into(), Value::String(SITE_SNAPSHOT_ID.into()));
    }
    store.upsert(Collection::SiteSnapshots, row).await
}

pub async fn load_published(
    store: &dyn RemoteStore,
) -> Result<Option<PublishedSnapshot>, StoreError> {
    let Some(row) = store.fetch(Collection::SiteSnapshots, SITE_SNAPSHOT_ID).await? else {
        return Ok(None);
    };
    match serde_json::from_value(row) {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(e) => {
            warn!("published snapshot blob is malformed, treating as unsynced: {}", e);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reverie_store::MemoryStore;
    use serde_json::json;

    fn sheets() -> ImportSheets {
        ImportSheets {
            quests: json!([
                { "Title ": "Plant the grove", "amount_needed": "300" },
                { "purpose": "row without a title is dropped" },
            ]),
            roles: json!([{ "NAME": "Guardian", "singular": "guardian" }]),
            dreamers: json!([{ "name": "Wren", "points": 120 }]),
            events: json!([{ "title": "Spring fair", "type": "offline" }]),
            announcement: Some(json!([{ "title": "We are live", "date": "March" }])),
        }
    }

    #[tokio::test]
    async fn test_import_writes_rows_and_publishes() {
        let store = MemoryStore::new();
        let report = run_import(&store, &sheets()).await.unwrap();

        assert_eq!(report.imported, 5);
        assert_eq!(report.dropped, 1);

        let quests = store.list(Collection::Quests).await.unwrap();
        assert_eq!(quests.len(), 1);
        // Keys were lowercased and trimmed before merging.
        assert_eq!(quests[0]["title"], "Plant the grove");
        assert!(quests[0]["id"].as_str().is_some_and(|id| !id.is_empty()));

        let published = load_published(&store).await.unwrap().unwrap();
        assert_eq!(published.quests.len(), 1);
        assert_eq!(published.quests[0].funding.amount_needed, 300.0);
        assert_eq!(published.announcement.unwrap().title, "We are live");
    }

    #[tokio::test]
    async fn test_error_sheet_rejects_entire_import() {
        let store = MemoryStore::new();
        let mut bad = sheets();
        bad.roles = json!({ "error": "rate limited" });

        let err = run_import(&store, &bad).await.unwrap_err();
        match err {
            ImportError::BadSheets(names) => assert_eq!(names, vec!["roles"]),
            other => panic!("expected BadSheets, got {:?}", other),
        }

        // Nothing was written — not even the sheets that validated.
        assert!(store.list(Collection::Quests).await.unwrap().is_empty());
        assert!(store.list(Collection::Events).await.unwrap().is_empty());
        assert!(load_published(&store).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_multiple_bad_sheets_reported_together() {
        let store = MemoryStore::new();
        let mut bad = sheets();
        bad.roles = json!({ "error": "rate limited" });
        bad.events = json!("also broken");

        match run_import(&store, &bad).await.unwrap_err() {
            ImportError::BadSheets(names) => assert_eq!(names, vec!["roles", "events"]),
            other => panic!("expected BadSheets, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unsynced_store_loads_none() {
        let store = MemoryStore::new();
        assert!(load_published(&store).await.unwrap().is_none());
    }
}
