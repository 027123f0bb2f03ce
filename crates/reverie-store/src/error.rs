use thiserror::Error;

use crate::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    List,
    Fetch,
    Insert,
    Upsert,
    Update,
    Delete,
}

impl std::fmt::Display for StoreOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::List => "list",
            Self::Fetch => "fetch",
            Self::Insert => "insert",
            Self::Upsert => "upsert",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// A failed remote operation. Carries which collection and verb failed so
/// the caller can report it without string-parsing.
#[derive(Debug, Error)]
#[error("store {op} on '{collection}' failed: {source}")]
pub struct StoreError {
    pub collection: Collection,
    pub op: StoreOp,
    #[source]
    pub source: anyhow::Error,
}

impl StoreError {
    pub fn new(
        collection: Collection,
        op: StoreOp,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self { collection, op, source: source.into() }
    }
}
