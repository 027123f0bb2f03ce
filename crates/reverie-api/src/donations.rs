use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::{error, warn};

use reverie_content::ledger::{BalanceOutcome, DonationReceipt, LedgerError};
use reverie_content::payments::donation_from_checkout;
use reverie_types::forms::{CheckoutOutcome, DonationForm};
use reverie_types::models::Donation;

use crate::AppState;

fn receipt_response(receipt: DonationReceipt) -> (StatusCode, Json<serde_json::Value>) {
    match receipt.balance {
        BalanceOutcome::Gap { goal_id, detail } => {
            // Donation committed; the balance gap is reported, not hidden.
            warn!("donation {} left goal '{}' unreconciled: {}", receipt.donation.id, goal_id, detail);
            (
                StatusCode::CREATED,
                Json(json!({
                    "donation": receipt.donation,
                    "reconciliationGap": { "goalId": goal_id, "detail": detail },
                })),
            )
        }
        _ => (StatusCode::CREATED, Json(json!({ "donation": receipt.donation }))),
    }
}

fn ledger_failure(e: LedgerError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &e {
        LedgerError::InvalidAmount => StatusCode::BAD_REQUEST,
        LedgerError::NotFound(_) | LedgerError::GoalNotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::Reconciliation { .. } => StatusCode::BAD_GATEWAY,
        LedgerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("ledger operation failed: {}", e);
    }
    (status, Json(json!({ "error": e.to_string() })))
}

/// Terminal signal from the payment provider's checkout widget. Success,
/// cancel and failure all land here and each writes exactly one donation.
pub async fn confirm_checkout(
    State(state): State<AppState>,
    Json(outcome): Json<CheckoutOutcome>,
) -> impl IntoResponse {
    let form = donation_from_checkout(&outcome);
    match state.ledger.record_donation(&form).await {
        Ok(receipt) => receipt_response(receipt),
        Err(e) => ledger_failure(e),
    }
}

/// Manual entry from the dashboard (offline gifts, bank transfers).
pub async fn record_donation(
    State(state): State<AppState>,
    Json(form): Json<DonationForm>,
) -> impl IntoResponse {
    match state.ledger.record_donation(&form).await {
        Ok(receipt) => receipt_response(receipt),
        Err(e) => ledger_failure(e),
    }
}

pub async fn list_donations(State(state): State<AppState>) -> Json<Vec<Donation>> {
    Json(state.content.snapshot().await.donations.clone())
}

pub async fn delete_donation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.ledger.delete_donation(&id).await {
        Ok(BalanceOutcome::Applied { goal_id, amount_raised }) => (
            StatusCode::OK,
            Json(json!({ "deleted": id, "goalId": goal_id, "amountRaised": amount_raised })),
        ),
        Ok(_) => (StatusCode::OK, Json(json!({ "deleted": id }))),
        Err(e) => ledger_failure(e),
    }
}

/// Re-apply any donations whose balance write never landed.
pub async fn reconcile(State(state): State<AppState>) -> impl IntoResponse {
    match state.ledger.reconcile_pending().await {
        Ok(repaired) => (StatusCode::OK, Json(json!({ "repaired": repaired }))),
        Err(e) => ledger_failure(e),
    }
}
