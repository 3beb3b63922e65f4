//! Store abstraction
//!
//! The ledger never owns data: every read and write goes through a store.
//! Stores are the single source of truth; the ledger holds no cache and no
//! locks. Concurrent settles on the same record are last-write-wins.
//!
//! # Backends
//!
//! - [`InMemoryStore`] - process-local, used by tests and embedders
//! - `RocksStore` - durable, behind the `rocksdb` feature

pub mod memory;
#[cfg(feature = "rocksdb")]
pub mod rocks;

use crate::{
    config::{StoreBackend, StoreConfig},
    events::{Event, EventDraft},
    types::{DebtDraft, DebtRecord, MemberId, RecordId},
    Error, Result,
};
use async_trait::async_trait;
use std::sync::Arc;

pub use memory::InMemoryStore;
#[cfg(feature = "rocksdb")]
pub use rocks::RocksStore;

/// Persistent table of debt records
#[async_trait]
pub trait LedgerStore: Send + Sync + std::fmt::Debug {
    /// Append drafts atomically: either every draft is stored or none is.
    ///
    /// The store assigns `id` and `created_at` and returns the stored
    /// records in draft order.
    async fn insert_many(&self, drafts: Vec<DebtDraft>) -> Result<Vec<DebtRecord>>;

    /// Records where `member` is debtor or creditor, newest first
    async fn list_for(&self, member: &MemberId) -> Result<Vec<DebtRecord>>;

    /// Fetch one record
    async fn get(&self, id: RecordId) -> Result<DebtRecord>;

    /// Mark a record as settled on behalf of `caller`.
    ///
    /// Fails with `NotFound` for an unknown ID and `Unauthorized` when
    /// `caller` is not the creditor. Settling a settled record is a no-op.
    async fn settle(&self, id: RecordId, caller: &MemberId) -> Result<DebtRecord>;
}

/// Table of group events
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Store a new event
    async fn create_event(&self, draft: EventDraft) -> Result<Event>;

    /// All events, earliest start date first
    async fn list_events(&self) -> Result<Vec<Event>>;
}

#[async_trait]
impl<T: LedgerStore + ?Sized> LedgerStore for Arc<T> {
    async fn insert_many(&self, drafts: Vec<DebtDraft>) -> Result<Vec<DebtRecord>> {
        (**self).insert_many(drafts).await
    }

    async fn list_for(&self, member: &MemberId) -> Result<Vec<DebtRecord>> {
        (**self).list_for(member).await
    }

    async fn get(&self, id: RecordId) -> Result<DebtRecord> {
        (**self).get(id).await
    }

    async fn settle(&self, id: RecordId, caller: &MemberId) -> Result<DebtRecord> {
        (**self).settle(id, caller).await
    }
}

/// Open the ledger store selected by `config.backend`
pub fn open(config: &StoreConfig) -> Result<Arc<dyn LedgerStore>> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryStore::new())),
        #[cfg(feature = "rocksdb")]
        StoreBackend::Rocksdb => Ok(Arc::new(RocksStore::open(config)?)),
        #[cfg(not(feature = "rocksdb"))]
        StoreBackend::Rocksdb => Err(Error::Config(
            "RocksDB backend requires the `rocksdb` feature".to_string(),
        )),
    }
}
