pub mod content;
pub mod donations;
pub mod middleware;
pub mod sync;

use std::sync::Arc;

use reverie_content::{ContentStore, Ledger};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub content: Arc<ContentStore>,
    pub ledger: Ledger,
}
