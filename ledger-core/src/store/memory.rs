//! In-memory store

use super::{EventStore, LedgerStore};
use crate::{
    events::{sort_events, Event, EventDraft},
    types::{sort_newest_first, DebtDraft, DebtRecord, MemberId, RecordId},
    Error, Result,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// Process-local store. Cloning shares the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: Arc<RwLock<Vec<DebtRecord>>>,
    events: Arc<RwLock<Vec<Event>>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn insert_many(&self, drafts: Vec<DebtDraft>) -> Result<Vec<DebtRecord>> {
        for draft in &drafts {
            draft.validate()?;
        }

        let now = Utc::now();
        let inserted: Vec<DebtRecord> = drafts
            .into_iter()
            .map(|draft| DebtRecord::from_draft(draft, RecordId::generate(), now))
            .collect();

        self.records.write().extend(inserted.iter().cloned());

        tracing::debug!(count = inserted.len(), "Records inserted");
        Ok(inserted)
    }

    async fn list_for(&self, member: &MemberId) -> Result<Vec<DebtRecord>> {
        let mut records: Vec<DebtRecord> = self
            .records
            .read()
            .iter()
            .filter(|r| r.involves(member))
            .cloned()
            .collect();

        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn get(&self, id: RecordId) -> Result<DebtRecord> {
        self.records
            .read()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn settle(&self, id: RecordId, caller: &MemberId) -> Result<DebtRecord> {
        let mut records = self.records.write();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        record.settle_by(caller)?;
        Ok(record.clone())
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn create_event(&self, draft: EventDraft) -> Result<Event> {
        let event = Event::from_draft(draft, Uuid::now_v7());
        self.events.write().push(event.clone());
        Ok(event)
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let mut events = self.events.read().clone();
        sort_events(&mut events);
        Ok(events)
    }
}
