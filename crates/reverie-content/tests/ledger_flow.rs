//! Ledger protocol tests over the in-memory store: recording and reversing
//! donations, the floor-at-zero rule, and repair of reconciliation gaps.

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use reverie_content::content::ContentStore;
use reverie_content::ledger::{BalanceOutcome, Ledger, LedgerError};
use reverie_content::payments::donation_from_checkout;
use reverie_store::{Collection, MemoryStore, RemoteStore, StoreError, StoreOp};
use reverie_types::forms::{CheckoutOutcome, CheckoutStatus, DonationForm};
use reverie_types::models::{DonationStatus, SponsorshipKind};

fn quest_row(id: &str, needed: f64, raised: f64) -> Value {
    json!({
        "id": id,
        "title": format!("quest {}", id),
        "amount_needed": needed,
        "amount_raised": raised,
        "funding_status": "active",
    })
}

fn event_row(id: &str, needed: f64, raised: f64) -> Value {
    json!({
        "id": id,
        "title": format!("event {}", id),
        "amount_needed": needed,
        "amount_raised": raised,
        "funding_status": "active",
    })
}

fn donation_form(amount: f64, kind: SponsorshipKind, target: Option<&str>) -> DonationForm {
    DonationForm {
        name: "Ada".into(),
        email: "ada@example.org".into(),
        amount,
        status: DonationStatus::Success,
        payment_method: "card".into(),
        transaction_id: "tx-1".into(),
        sponsorship_kind: kind,
        sponsorship_id: target.map(str::to_string),
        ..Default::default()
    }
}

async fn raised(store: &dyn RemoteStore, collection: Collection, id: &str) -> f64 {
    let row = store.fetch(collection, id).await.unwrap().unwrap();
    row["amount_raised"].as_f64().unwrap()
}

async fn setup() -> (Arc<MemoryStore>, Ledger) {
    let store = Arc::new(MemoryStore::new());
    store
        .seed(Collection::Quests, vec![quest_row("q1", 1000.0, 200.0)])
        .await;
    store
        .seed(Collection::Events, vec![event_row("e1", 500.0, 50.0)])
        .await;

    let content = Arc::new(ContentStore::new(store.clone()));
    content.refresh().await;
    (store, Ledger::new(content))
}

#[tokio::test]
async fn test_record_donation_applies_goal_balance() {
    let (store, ledger) = setup().await;

    let receipt = ledger
        .record_donation(&donation_form(300.0, SponsorshipKind::Quest, Some("q1")))
        .await
        .unwrap();

    match &receipt.balance {
        BalanceOutcome::Applied { goal_id, amount_raised } => {
            assert_eq!(goal_id, "q1");
            assert_eq!(*amount_raised, 500.0);
        }
        other => panic!("expected Applied, got {:?}", other),
    }
    // The stored row carries the flipped marker (the receipt reflects the
    // row as inserted, before the balance landed).
    let row = store.fetch(Collection::Donations, &receipt.donation.id).await.unwrap().unwrap();
    assert_eq!(row["reconciled"], true);
    assert_eq!(raised(store.as_ref(), Collection::Quests, "q1").await, 500.0);
}

#[tokio::test]
async fn test_delete_donation_reverts_goal_balance() {
    let (store, ledger) = setup().await;

    let receipt = ledger
        .record_donation(&donation_form(300.0, SponsorshipKind::Quest, Some("q1")))
        .await
        .unwrap();
    assert_eq!(raised(store.as_ref(), Collection::Quests, "q1").await, 500.0);

    let outcome = ledger.delete_donation(&receipt.donation.id).await.unwrap();
    match outcome {
        BalanceOutcome::Applied { amount_raised, .. } => assert_eq!(amount_raised, 200.0),
        other => panic!("expected Applied, got {:?}", other),
    }
    assert_eq!(raised(store.as_ref(), Collection::Quests, "q1").await, 200.0);
    assert!(store.fetch(Collection::Donations, &receipt.donation.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_oversized_reversal_floors_at_zero() {
    let (store, ledger) = setup().await;

    // A 100 donation against e1 whose running total is only 50 — reversal
    // must land on 0, not -50.
    store
        .insert(
            Collection::Donations,
            json!({
                "id": "don-big",
                "amount": 100.0,
                "status": "success",
                "sponsorship_type": "event",
                "sponsorship_id": "e1",
                "reconciled": true,
            }),
        )
        .await
        .unwrap();

    ledger.delete_donation("don-big").await.unwrap();
    assert_eq!(raised(store.as_ref(), Collection::Events, "e1").await, 0.0);
}

#[tokio::test]
async fn test_balances_stay_non_negative_across_sequences() {
    let (store, ledger) = setup().await;
    store
        .seed(
            Collection::Donations,
            vec![
                json!({ "id": "d1", "amount": 300.0, "status": "success",
                        "sponsorship_type": "quest", "sponsorship_id": "q1", "reconciled": true }),
                json!({ "id": "d2", "amount": 300.0, "status": "success",
                        "sponsorship_type": "quest", "sponsorship_id": "q1", "reconciled": true }),
            ],
        )
        .await;

    // q1 starts at 200 but carries two applied 300 donations (the kind of
    // drift the floor exists for). Every observation must be >= 0.
    ledger.delete_donation("d1").await.unwrap();
    assert!(raised(store.as_ref(), Collection::Quests, "q1").await >= 0.0);
    ledger.delete_donation("d2").await.unwrap();
    assert_eq!(raised(store.as_ref(), Collection::Quests, "q1").await, 0.0);

    let receipt = ledger
        .record_donation(&donation_form(40.0, SponsorshipKind::Quest, Some("q1")))
        .await
        .unwrap();
    assert_eq!(raised(store.as_ref(), Collection::Quests, "q1").await, 40.0);
    ledger.delete_donation(&receipt.donation.id).await.unwrap();
    assert_eq!(raised(store.as_ref(), Collection::Quests, "q1").await, 0.0);
}

#[tokio::test]
async fn test_general_donation_touches_no_goal() {
    let (store, ledger) = setup().await;

    let receipt = ledger
        .record_donation(&donation_form(75.0, SponsorshipKind::General, None))
        .await
        .unwrap();

    assert!(matches!(receipt.balance, BalanceOutcome::NotApplicable));
    assert!(receipt.donation.reconciled);
    assert_eq!(raised(store.as_ref(), Collection::Quests, "q1").await, 200.0);
    assert_eq!(raised(store.as_ref(), Collection::Events, "e1").await, 50.0);
}

#[tokio::test]
async fn test_cancelled_checkout_is_audit_only() {
    let (store, ledger) = setup().await;

    let outcome = CheckoutOutcome {
        status: CheckoutStatus::Cancelled,
        transaction_id: Some("tx-9".into()),
        payment_method: "card".into(),
        amount: 300.0,
        name: "Ada".into(),
        email: String::new(),
        message: String::new(),
        kind: Default::default(),
        sponsorship_kind: SponsorshipKind::Quest,
        sponsorship_id: Some("q1".into()),
    };
    let receipt = ledger
        .record_donation(&donation_from_checkout(&outcome))
        .await
        .unwrap();

    // Exactly one row written, no money moved.
    assert!(matches!(receipt.balance, BalanceOutcome::NotApplicable));
    assert_eq!(receipt.donation.status, DonationStatus::Failed);
    assert!(receipt.donation.transaction_id.is_empty());
    assert_eq!(store.list(Collection::Donations).await.unwrap().len(), 1);
    assert_eq!(raised(store.as_ref(), Collection::Quests, "q1").await, 200.0);
}

#[tokio::test]
async fn test_duplicate_delete_is_not_found() {
    let (_store, ledger) = setup().await;

    let receipt = ledger
        .record_donation(&donation_form(25.0, SponsorshipKind::Quest, Some("q1")))
        .await
        .unwrap();

    ledger.delete_donation(&receipt.donation.id).await.unwrap();
    match ledger.delete_donation(&receipt.donation.id).await {
        Err(LedgerError::NotFound(id)) => assert_eq!(id, receipt.donation.id),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_positive_amount_is_rejected() {
    let (store, ledger) = setup().await;

    let err = ledger
        .record_donation(&donation_form(0.0, SponsorshipKind::Quest, Some("q1")))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount));
    assert!(store.list(Collection::Donations).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_goal_leaves_pending_marker() {
    let (store, ledger) = setup().await;

    let receipt = ledger
        .record_donation(&donation_form(60.0, SponsorshipKind::Quest, Some("q-gone")))
        .await
        .unwrap();

    match &receipt.balance {
        BalanceOutcome::Gap { goal_id, .. } => assert_eq!(goal_id, "q-gone"),
        other => panic!("expected Gap, got {:?}", other),
    }
    // The donation committed and stays pending for the reconciler.
    let row = store.fetch(Collection::Donations, &receipt.donation.id).await.unwrap().unwrap();
    assert_eq!(row["reconciled"], false);
}

// -- Gap repair with an injected store fault --

/// MemoryStore wrapper that fails selected operations, for driving the
/// multi-step protocol into its partial-failure branches.
struct FlakyStore {
    inner: MemoryStore,
    fail_update_on: Mutex<Option<Collection>>,
    fail_list_on: Mutex<Option<Collection>>,
}

impl FlakyStore {
    fn new(inner: MemoryStore) -> Self {
        Self { inner, fail_update_on: Mutex::new(None), fail_list_on: Mutex::new(None) }
    }

    fn set_fail_update(&self, collection: Option<Collection>) {
        *self.fail_update_on.lock().unwrap() = collection;
    }

    fn set_fail_list(&self, collection: Option<Collection>) {
        *self.fail_list_on.lock().unwrap() = collection;
    }
}

#[async_trait]
impl RemoteStore for FlakyStore {
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        if *self.fail_list_on.lock().unwrap() == Some(collection) {
            return Err(StoreError::new(collection, StoreOp::List, anyhow::anyhow!("injected")));
        }
        self.inner.list(collection).await
    }

    async fn fetch(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        self.inner.fetch(collection, id).await
    }

    async fn insert(&self, collection: Collection, row: Value) -> Result<Value, StoreError> {
        self.inner.insert(collection, row).await
    }

    async fn upsert(&self, collection: Collection, row: Value) -> Result<(), StoreError> {
        self.inner.upsert(collection, row).await
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<(), StoreError> {
        if *self.fail_update_on.lock().unwrap() == Some(collection) {
            return Err(StoreError::new(collection, StoreOp::Update, anyhow::anyhow!("injected")));
        }
        self.inner.update(collection, id, patch).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        self.inner.delete(collection, id).await
    }
}

#[tokio::test]
async fn test_reconciler_repairs_balance_gap() {
    let store = Arc::new(FlakyStore::new(MemoryStore::new()));
    store
        .inner
        .seed(Collection::Quests, vec![quest_row("q1", 1000.0, 200.0)])
        .await;
    let content = Arc::new(ContentStore::new(store.clone()));
    content.refresh().await;
    let ledger = Ledger::new(content);

    // Balance write fails: donation commits, marker stays pending, total
    // unchanged.
    store.set_fail_update(Some(Collection::Quests));
    let receipt = ledger
        .record_donation(&donation_form(300.0, SponsorshipKind::Quest, Some("q1")))
        .await
        .unwrap();
    assert!(matches!(receipt.balance, BalanceOutcome::Gap { .. }));
    assert_eq!(raised(&store.inner, Collection::Quests, "q1").await, 200.0);

    // Store recovers; the reconciler applies the pending donation once.
    store.set_fail_update(None);
    assert_eq!(ledger.reconcile_pending().await.unwrap(), 1);
    assert_eq!(raised(&store.inner, Collection::Quests, "q1").await, 500.0);

    // A second pass finds nothing to do — no double apply.
    assert_eq!(ledger.reconcile_pending().await.unwrap(), 0);
    assert_eq!(raised(&store.inner, Collection::Quests, "q1").await, 500.0);
}

#[tokio::test]
async fn test_partial_refresh_keeps_last_known_good() {
    let store = Arc::new(FlakyStore::new(MemoryStore::new()));
    store
        .inner
        .seed(Collection::Quests, vec![quest_row("q1", 1000.0, 200.0)])
        .await;
    store
        .inner
        .seed(Collection::Roles, vec![json!({ "id": "r1", "name": "Guardian" })])
        .await;
    let content = Arc::new(ContentStore::new(store.clone()));

    let report = content.refresh().await;
    assert!(report.installed);
    assert!(report.failed.is_empty());
    assert_eq!(content.snapshot().await.quests.len(), 1);

    // Quests fetch starts failing while roles grow a row: the stale quests
    // stay installed, the fresh roles land.
    store.set_fail_list(Some(Collection::Quests));
    store
        .inner
        .insert(Collection::Roles, json!({ "id": "r2", "name": "Warden" }))
        .await
        .unwrap();

    let report = content.refresh().await;
    assert!(report.installed);
    assert_eq!(report.failed, vec![Collection::Quests]);

    let snapshot = content.snapshot().await;
    assert_eq!(snapshot.quests.len(), 1);
    assert_eq!(snapshot.quests[0].title, "quest q1");
    assert_eq!(snapshot.roles.len(), 2);
    assert!(!content.loading().await);
}

/// MemoryStore wrapper that holds completed reads hostage until released,
/// for overlapping two refreshes deterministically.
struct GatedStore {
    inner: MemoryStore,
    gate: tokio::sync::Semaphore,
    gated: std::sync::atomic::AtomicBool,
}

impl GatedStore {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            gate: tokio::sync::Semaphore::new(0),
            gated: std::sync::atomic::AtomicBool::new(true),
        }
    }

    /// Let future calls pass the gate; already-stalled calls stay held.
    fn open(&self) {
        self.gated.store(false, std::sync::atomic::Ordering::SeqCst);
    }

    /// Free the calls stalled at the gate.
    fn release_stalled(&self) {
        self.gate.add_permits(64);
    }
}

#[async_trait]
impl RemoteStore for GatedStore {
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let result = self.inner.list(collection).await;
        if self.gated.load(std::sync::atomic::Ordering::SeqCst) {
            // Data is already read; sit on it until released.
            let _permit = self.gate.acquire().await;
        }
        result
    }

    async fn fetch(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        self.inner.fetch(collection, id).await
    }

    async fn insert(&self, collection: Collection, row: Value) -> Result<Value, StoreError> {
        self.inner.insert(collection, row).await
    }

    async fn upsert(&self, collection: Collection, row: Value) -> Result<(), StoreError> {
        self.inner.upsert(collection, row).await
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<(), StoreError> {
        self.inner.update(collection, id, patch).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        self.inner.delete(collection, id).await
    }
}

#[tokio::test]
async fn test_stale_refresh_result_is_discarded() {
    let store = Arc::new(GatedStore::new(MemoryStore::new()));
    store
        .inner
        .upsert(Collection::Quests, json!({ "id": "q1", "title": "old title" }))
        .await
        .unwrap();
    let content = Arc::new(ContentStore::new(store.clone()));

    // Refresh A reads "old title" and then stalls mid-flight.
    let slow = {
        let content = content.clone();
        tokio::spawn(async move { content.refresh().await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    // The row changes and refresh B completes while A is still stuck.
    store
        .inner
        .update(Collection::Quests, "q1", json!({ "title": "new title" }))
        .await
        .unwrap();
    store.open();
    let fast = content.refresh().await;
    assert!(fast.installed);
    assert_eq!(content.snapshot().await.quests[0].title, "new title");

    // A finally finishes carrying the older read — it must not roll the
    // snapshot backwards.
    store.release_stalled();
    let slow_report = slow.await.unwrap();
    assert!(!slow_report.installed);
    assert_eq!(content.snapshot().await.quests[0].title, "new title");
}

#[tokio::test]
async fn test_sponsorships_follow_refresh() {
    let (store, ledger) = setup().await;

    ledger
        .record_donation(&donation_form(300.0, SponsorshipKind::Quest, Some("q1")))
        .await
        .unwrap();

    let content = ContentStore::new(store.clone());
    content.refresh().await;
    let snapshot = content.snapshot().await;

    let q1 = snapshot.sponsorships.iter().find(|g| g.id == "q1").unwrap();
    assert_eq!(q1.amount_raised, 500.0);
    assert_eq!(q1.kind, SponsorshipKind::Quest);
}
