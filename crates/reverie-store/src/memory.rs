use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{Collection, RemoteStore, StoreError};

/// In-memory store. Backs the site's static-data fallback mode when no
/// remote store is configured, and doubles as the test double for the
/// content and ledger layers.
///
/// Rows keep insertion order, which stands in for `created_at` ascending.
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<Collection, Vec<Value>>>,
}

fn row_id(row: &Value) -> Option<String> {
    match row.get("id") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection wholesale — used to load the bundled static data.
    pub async fn seed(&self, collection: Collection, rows: Vec<Value>) {
        self.rows.write().await.insert(collection, rows);
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let rows = self.rows.read().await;
        let all = rows.get(&collection).cloned().unwrap_or_default();
        if collection.singleton() {
            // Newest-first limit 1.
            Ok(all.into_iter().next_back().into_iter().collect())
        } else {
            Ok(all)
        }
    }

    async fn fetch(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .get(&collection)
            .and_then(|all| all.iter().find(|r| row_id(r).as_deref() == Some(id)))
            .cloned())
    }

    async fn insert(&self, collection: Collection, mut row: Value) -> Result<Value, StoreError> {
        if row_id(&row).is_none() {
            if let Some(obj) = row.as_object_mut() {
                obj.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
            }
        }
        self.rows
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn upsert(&self, collection: Collection, row: Value) -> Result<(), StoreError> {
        let id = row_id(&row);
        let mut rows = self.rows.write().await;
        let all = rows.entry(collection).or_default();
        match id.and_then(|id| {
            all.iter().position(|r| row_id(r).as_deref() == Some(id.as_str()))
        }) {
            Some(pos) => all[pos] = row,
            None => all.push(row),
        }
        Ok(())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        if let Some(all) = rows.get_mut(&collection) {
            if let Some(row) = all.iter_mut().find(|r| row_id(r).as_deref() == Some(id)) {
                if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
                    for (k, v) in fields {
                        target.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        // Updating an absent id affects zero rows, same as the remote PATCH.
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        if let Some(all) = rows.get_mut(&collection) {
            all.retain(|r| row_id(r).as_deref() != Some(id));
        }
        Ok(())
    }
}
