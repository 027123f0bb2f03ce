pub mod error;
pub mod mapper;
pub mod memory;
pub mod rest;
pub mod rows;

use async_trait::async_trait;
use serde_json::Value;

pub use error::{StoreError, StoreOp};
pub use memory::MemoryStore;
pub use rest::RestStore;

/// The remote collections. One table per content kind plus the published
/// site blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Quests,
    Roles,
    Dreamers,
    Sponsors,
    Events,
    Announcements,
    Donations,
    AcademyStudents,
    SiteSnapshots,
}

impl Collection {
    pub fn table(&self) -> &'static str {
        match self {
            Self::Quests => "quests",
            Self::Roles => "roles",
            Self::Dreamers => "dreamers",
            Self::Sponsors => "sponsors",
            Self::Events => "events",
            Self::Announcements => "announcements",
            Self::Donations => "donations",
            Self::AcademyStudents => "academy_students",
            Self::SiteSnapshots => "site_snapshots",
        }
    }

    /// Announcements are a singleton: listing returns at most the newest row.
    pub fn singleton(&self) -> bool {
        matches!(self, Self::Announcements)
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Narrow interface to the remote relational store. Rows cross this seam as
/// raw JSON; the mapper is the only place that interprets their shape.
///
/// No caching and no retries here — the Content Store owns the cache, and
/// every retry is a fresh caller action.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All rows, `created_at` ascending. Singleton collections return at
    /// most one row, newest first.
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, StoreError>;

    async fn fetch(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError>;

    /// Insert and return the stored row (the store assigns the id).
    async fn insert(&self, collection: Collection, row: Value) -> Result<Value, StoreError>;

    /// Insert-or-replace on id.
    async fn upsert(&self, collection: Collection, row: Value) -> Result<(), StoreError>;

    /// Partial column update. Updating an absent id is a no-op, matching
    /// the remote store's PATCH semantics.
    async fn update(&self, collection: Collection, id: &str, patch: Value)
    -> Result<(), StoreError>;

    /// Deleting an absent id is a no-op; existence checks belong to callers.
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;
}
