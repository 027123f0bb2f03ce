use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{error, info, warn};

use reverie_store::{Collection, StoreError, mapper};
use reverie_types::forms::DonationForm;
use reverie_types::models::{Donation, DonationStatus, SponsorshipKind};

use crate::content::ContentStore;

/// The money-handling protocol. Recording and reversing a donation are
/// multi-step operations against the remote store (write donation, read
/// goal, write goal) with no surrounding transaction — the ledger makes the
/// window explicit instead of hiding it:
///
/// A goal-targeted donation is inserted with `reconciled = false` and the
/// marker is flipped only after the balance write lands. A failed balance
/// step therefore leaves a durable pending row that `reconcile_pending`
/// can retry, and the caller is told about the gap rather than shown a
/// clean success.
pub struct Ledger {
    content: Arc<ContentStore>,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("donation amount must be a positive number")]
    InvalidAmount,
    #[error("donation '{0}' not found")]
    NotFound(String),
    #[error("sponsorship goal '{0}' not found")]
    GoalNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The donation row was already deleted when the balance reversal
    /// failed — the committed delete is not undone.
    #[error("donation '{donation_id}' removed but goal '{goal_id}' balance was not reverted: {source}")]
    Reconciliation {
        donation_id: String,
        goal_id: String,
        #[source]
        source: anyhow::Error,
    },
}

/// What happened to the goal balance alongside a recorded donation.
#[derive(Debug)]
pub enum BalanceOutcome {
    /// General-fund gifts and failed-checkout audit rows move no goal money.
    NotApplicable,
    Applied { goal_id: String, amount_raised: f64 },
    /// The donation committed but the balance write failed. The pending
    /// marker on the row stays durable for the reconciler.
    Gap { goal_id: String, detail: String },
}

#[derive(Debug)]
pub struct DonationReceipt {
    pub donation: Donation,
    pub balance: BalanceOutcome,
}

fn goal_collection(kind: SponsorshipKind) -> Option<Collection> {
    match kind {
        SponsorshipKind::Quest => Some(Collection::Quests),
        SponsorshipKind::Event => Some(Collection::Events),
        SponsorshipKind::General => None,
    }
}

/// The (collection, goal id) a donation's balance work targets, if any.
fn balance_target(donation: &Donation) -> Option<(Collection, String)> {
    donation
        .goal_target()
        .and_then(|(kind, goal_id)| goal_collection(kind).map(|c| (c, goal_id.to_string())))
}

/// Lenient read of a goal row's running total — hand-edited tables store
/// numbers as strings often enough.
fn amount_raised(row: &Value) -> f64 {
    match row.get("amount_raised") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

impl Ledger {
    pub fn new(content: Arc<ContentStore>) -> Self {
        Self { content }
    }

    /// Record a donation and apply it to its goal's running total.
    ///
    /// The insert is the commit point: if it fails nothing happened. A
    /// failure after it is reported as a `Gap` on the receipt, never rolled
    /// back — the donation stands, the reconciler owns the repair.
    pub async fn record_donation(
        &self,
        form: &DonationForm,
    ) -> Result<DonationReceipt, LedgerError> {
        if !form.amount.is_finite() || form.amount < 0.0 {
            return Err(LedgerError::InvalidAmount);
        }
        // Failed checkouts are audit rows and may carry any amount; real
        // money must be positive.
        if form.status == DonationStatus::Success && form.amount <= 0.0 {
            return Err(LedgerError::InvalidAmount);
        }

        let target = if form.status == DonationStatus::Success {
            goal_collection(form.sponsorship_kind)
                .zip(form.sponsorship_id.clone())
        } else {
            None
        };

        let store = self.content.remote();
        let row = mapper::donation_to_storage(form, Utc::now(), target.is_none());
        let inserted = store.insert(Collection::Donations, row).await?;
        let donation = mapper::donation_to_application(&inserted);

        let balance = match target {
            None => BalanceOutcome::NotApplicable,
            Some((collection, goal_id)) => {
                match self.apply_delta(collection, &goal_id, donation.amount).await {
                    Ok(new_total) => {
                        self.mark_reconciled(&donation.id, &goal_id).await;
                        info!(
                            "donation {} applied to '{}': raised {}",
                            donation.id, goal_id, new_total
                        );
                        BalanceOutcome::Applied { goal_id, amount_raised: new_total }
                    }
                    Err(e) => {
                        warn!(
                            "donation {} recorded but goal '{}' balance update failed: {}",
                            donation.id, goal_id, e
                        );
                        BalanceOutcome::Gap { goal_id, detail: e.to_string() }
                    }
                }
            }
        };

        self.refresh_after("record_donation").await;
        Ok(DonationReceipt { donation, balance })
    }

    /// Delete a donation and revert its goal balance.
    ///
    /// Deleting an id that is already gone is an error, not a no-op — a
    /// silent success here would invite applying the compensation twice.
    pub async fn delete_donation(&self, id: &str) -> Result<BalanceOutcome, LedgerError> {
        let store = self.content.remote();

        let row = store
            .fetch(Collection::Donations, id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        let donation = mapper::donation_to_application(&row);

        store.delete(Collection::Donations, id).await?;

        let outcome = match balance_target(&donation) {
            // Only applied donations are reversed; a pending row never made
            // it into the total in the first place.
            Some((collection, goal_id)) if donation.reconciled => {
                match self.apply_delta(collection, &goal_id, -donation.amount).await {
                    Ok(new_total) => {
                        info!(
                            "donation {} removed, goal '{}' reverted to {}",
                            id, goal_id, new_total
                        );
                        BalanceOutcome::Applied { goal_id, amount_raised: new_total }
                    }
                    Err(e) => {
                        error!(
                            "donation {} removed but goal '{}' was not reverted: {}",
                            id, goal_id, e
                        );
                        return Err(LedgerError::Reconciliation {
                            donation_id: id.to_string(),
                            goal_id,
                            source: anyhow::Error::new(e),
                        });
                    }
                }
            }
            _ => BalanceOutcome::NotApplicable,
        };

        self.refresh_after("delete_donation").await;
        Ok(outcome)
    }

    /// Retry every donation whose balance write never landed. Returns how
    /// many were repaired. Run on an interval by the server and on demand
    /// from the dashboard.
    pub async fn reconcile_pending(&self) -> Result<usize, LedgerError> {
        let store = self.content.remote();
        let rows = store.list(Collection::Donations).await?;

        let mut repaired = 0;
        for row in &rows {
            let donation = mapper::donation_to_application(row);
            if donation.reconciled {
                continue;
            }
            let Some((collection, goal_id)) = balance_target(&donation) else {
                continue;
            };

            match self.apply_delta(collection, &goal_id, donation.amount).await {
                Ok(new_total) => {
                    self.mark_reconciled(&donation.id, &goal_id).await;
                    info!(
                        "reconciled donation {} into '{}': raised {}",
                        donation.id, goal_id, new_total
                    );
                    repaired += 1;
                }
                Err(e) => {
                    warn!("donation {} still unreconciled: {}", donation.id, e);
                }
            }
        }

        if repaired > 0 {
            self.refresh_after("reconcile_pending").await;
        }
        Ok(repaired)
    }

    /// Read-modify-write of a goal's running total, floored at zero —
    /// balances never go negative even under duplicate or oversized
    /// reversals.
    async fn apply_delta(
        &self,
        collection: Collection,
        goal_id: &str,
        delta: f64,
    ) -> Result<f64, LedgerError> {
        let store = self.content.remote();
        let row = store
            .fetch(collection, goal_id)
            .await?
            .ok_or_else(|| LedgerError::GoalNotFound(goal_id.to_string()))?;

        let next = (amount_raised(&row) + delta).max(0.0);
        store
            .update(collection, goal_id, json!({ "amount_raised": next }))
            .await?;
        Ok(next)
    }

    async fn mark_reconciled(&self, donation_id: &str, goal_id: &str) {
        let store = self.content.remote();
        if let Err(e) = store
            .update(Collection::Donations, donation_id, json!({ "reconciled": true }))
            .await
        {
            // The balance already landed; if this marker write fails the
            // reconciler would apply the amount a second time. Loud log so
            // an operator clears it by hand.
            error!(
                "donation {} applied to '{}' but marker update failed: {}",
                donation_id, goal_id, e
            );
        }
    }

    async fn refresh_after(&self, op: &str) {
        let report = self.content.refresh().await;
        if !report.failed.is_empty() {
            warn!("refresh after {} had partial failures: {:?}", op, report.failed);
        }
    }
}
