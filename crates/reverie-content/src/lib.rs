pub mod content;
pub mod import;
pub mod ledger;
pub mod payments;
pub mod sponsorships;

pub use content::{ContentStore, RefreshReport, Snapshot};
pub use ledger::{BalanceOutcome, DonationReceipt, Ledger, LedgerError};
