//! Ptits Flexs Ledger
//!
//! Peer-to-peer reimbursement ledger for a small group: declare who owes
//! whom, split a bill evenly, mark debts as repaid and compute balances.
//!
//! # Architecture
//!
//! - **Store**: The single source of truth, behind the [`LedgerStore`] trait
//! - **Balance**: Pure net-position computation over a member's records
//! - **Split**: Pure even-split planning, submitted as one atomic insert
//! - **Ledger**: Request/response operations tying the three together
//!
//! # Invariants
//!
//! - Amounts are positive exact decimals
//! - Nobody owes themselves
//! - Status only moves unpaid → settled, and only by the creditor
//! - Records are never deleted; only their status changes

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod balance;
pub mod split;
pub mod directory;
pub mod events;
pub mod store;
pub mod row;
pub mod ledger;
pub mod error;
pub mod config;
pub mod metrics;

// Re-exports
pub use error::{Error, Result};
pub use types::{DebtDraft, DebtRecord, DebtStatus, MemberId, RecordId, MAX_AMOUNT};
pub use balance::Balance;
pub use split::{SplitEngine, SplitPlan};
pub use directory::{Directory, Member};
pub use events::{Event, EventDraft, YearMonth};
pub use store::{EventStore, InMemoryStore, LedgerStore};
#[cfg(feature = "rocksdb")]
pub use store::RocksStore;
pub use ledger::{Direction, Ledger, SplitOutcome, StatementLine};
pub use config::Config;
