use reverie_types::forms::{CheckoutOutcome, CheckoutStatus, DonationForm};
use reverie_types::models::DonationStatus;

/// Boundary to the external payment provider. The checkout widget reports
/// exactly one terminal signal per attempt — success, user cancel, or init
/// failure — and each one becomes exactly one donation row. Cancels and
/// failures are kept as `failed` audit rows with an empty transaction id.
pub fn donation_from_checkout(outcome: &CheckoutOutcome) -> DonationForm {
    let (status, transaction_id) = match outcome.status {
        CheckoutStatus::Success => (
            DonationStatus::Success,
            outcome.transaction_id.clone().unwrap_or_default(),
        ),
        CheckoutStatus::Cancelled | CheckoutStatus::Failed => {
            (DonationStatus::Failed, String::new())
        }
    };

    DonationForm {
        name: outcome.name.clone(),
        email: outcome.email.clone(),
        amount: outcome.amount,
        kind: outcome.kind,
        message: outcome.message.clone(),
        status,
        payment_method: outcome.payment_method.clone(),
        transaction_id,
        sponsorship_kind: outcome.sponsorship_kind,
        sponsorship_id: outcome.sponsorship_id.clone(),
    }
}
