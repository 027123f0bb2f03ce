use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::error;

use reverie_content::content::RefreshReport;
use reverie_content::import::{ImportError, ImportSheets, load_published, run_import};

use crate::AppState;

/// Manual "Sync" button: refetch every collection now.
pub async fn sync(State(state): State<AppState>) -> Json<RefreshReport> {
    Json(state.content.refresh().await)
}

/// Bulk spreadsheet import. All-or-nothing: a malformed sheet rejects the
/// whole payload with one aggregated message.
pub async fn import(
    State(state): State<AppState>,
    Json(sheets): Json<ImportSheets>,
) -> impl IntoResponse {
    let store = state.content.remote();
    match run_import(store.as_ref(), &sheets).await {
        Ok(report) => {
            state.content.refresh().await;
            (StatusCode::OK, Json(json!({ "report": report })))
        }
        Err(e @ ImportError::BadSheets(_)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
        }
        Err(e) => {
            error!("import failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() })))
        }
    }
}

/// The snapshot published for anonymous reads. A missing blob is the
/// defined "not yet synced" state, not an error.
pub async fn published(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let store = state.content.remote();
    match load_published(store.as_ref()).await {
        Ok(Some(snapshot)) => Ok(Json(json!({ "synced": true, "snapshot": snapshot }))),
        Ok(None) => Ok(Json(json!({ "synced": false }))),
        Err(e) => {
            error!("published snapshot read failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
