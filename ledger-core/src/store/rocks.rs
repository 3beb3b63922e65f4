//! Storage layer using RocksDB
//!
//! # Column Families
//!
//! - `records` - Debt records (key: record_id)
//! - `indices` - Member index (key: len(member_id) as u32 BE || member_id || record_id)
//! - `events` - Group events (key: event_id)

use super::{EventStore, LedgerStore};
use crate::{
    config::StoreConfig,
    error::{Error, Result},
    events::{sort_events, Event, EventDraft},
    types::{sort_newest_first, DebtDraft, DebtRecord, MemberId, RecordId},
};
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use std::sync::Arc;
use uuid::Uuid;

/// Column family names
const CF_RECORDS: &str = "records";
const CF_INDICES: &str = "indices";
const CF_EVENTS: &str = "events";

/// Storage wrapper for RocksDB
pub struct RocksStore {
    db: Arc<DB>,
}

impl std::fmt::Debug for RocksStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksStore")
            .field("path", &self.db.path())
            .finish()
    }
}

impl RocksStore {
    /// Open or create database
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let path = &config.data_dir;

        // Create directory if not exists
        std::fs::create_dir_all(path)?;

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        if config.enable_statistics {
            db_opts.enable_statistics();
        }

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_RECORDS, Self::cf_options_records()),
            ColumnFamilyDescriptor::new(CF_INDICES, Self::cf_options_indices()),
            ColumnFamilyDescriptor::new(CF_EVENTS, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!(path = ?path, "Opened RocksDB ledger store");

        Ok(Self { db: Arc::new(db) })
    }

    // Column family options

    fn cf_options_records() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf_options_indices() -> Options {
        let mut opts = Options::default();
        // Indices benefit from bloom filters
        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        opts.set_block_based_table_factory(&block_opts);
        opts
    }

    // Helper: get column family handle

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::Store(format!("Column family {} not found", name)))
    }

    // Index keys

    // Length-prefixed so no member's prefix is a prefix of another's
    fn index_prefix(member: &MemberId) -> Vec<u8> {
        let bytes = member.as_str().as_bytes();
        let mut key = Vec::with_capacity(4 + bytes.len() + 16);
        key.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        key.extend_from_slice(bytes);
        key
    }

    fn index_key(member: &MemberId, id: RecordId) -> Vec<u8> {
        let mut key = Self::index_prefix(member);
        key.extend_from_slice(id.as_uuid().as_bytes());
        key
    }

    fn read_record(&self, id: RecordId) -> Result<DebtRecord> {
        let cf = self.cf_handle(CF_RECORDS)?;
        let value = self
            .db
            .get_cf(cf, id.as_uuid().as_bytes())?
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        Ok(bincode::deserialize(&value)?)
    }

    fn write_record(&self, record: &DebtRecord) -> Result<()> {
        let cf = self.cf_handle(CF_RECORDS)?;
        let value = bincode::serialize(record)?;
        self.db.put_cf(cf, record.id.as_uuid().as_bytes(), &value)?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for RocksStore {
    async fn insert_many(&self, drafts: Vec<DebtDraft>) -> Result<Vec<DebtRecord>> {
        for draft in &drafts {
            draft.validate()?;
        }

        let cf_records = self.cf_handle(CF_RECORDS)?;
        let cf_indices = self.cf_handle(CF_INDICES)?;

        let now = Utc::now();
        let mut batch = WriteBatch::default();
        let mut inserted = Vec::with_capacity(drafts.len());

        for draft in drafts {
            let record = DebtRecord::from_draft(draft, RecordId::generate(), now);
            let value = bincode::serialize(&record)?;

            batch.put_cf(cf_records, record.id.as_uuid().as_bytes(), &value);
            batch.put_cf(cf_indices, Self::index_key(&record.debtor, record.id), b"");
            batch.put_cf(cf_indices, Self::index_key(&record.creditor, record.id), b"");

            inserted.push(record);
        }

        // All-or-nothing
        self.db.write(batch)?;

        tracing::debug!(count = inserted.len(), "Records written");
        Ok(inserted)
    }

    async fn list_for(&self, member: &MemberId) -> Result<Vec<DebtRecord>> {
        let cf_indices = self.cf_handle(CF_INDICES)?;
        let prefix = Self::index_prefix(member);

        let mut records = Vec::new();
        for item in self.db.prefix_iterator_cf(cf_indices, &prefix) {
            let (key, _) = item?;
            if !key.starts_with(&prefix) {
                break;
            }

            let id_bytes: [u8; 16] = key[prefix.len()..]
                .try_into()
                .map_err(|_| Error::Store(format!("Malformed index key for {}", member)))?;

            records.push(self.read_record(RecordId::from_uuid(Uuid::from_bytes(id_bytes)))?);
        }

        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn get(&self, id: RecordId) -> Result<DebtRecord> {
        self.read_record(id)
    }

    async fn settle(&self, id: RecordId, caller: &MemberId) -> Result<DebtRecord> {
        let mut record = self.read_record(id)?;
        if record.settle_by(caller)? {
            self.write_record(&record)?;
        }
        Ok(record)
    }
}

#[async_trait]
impl EventStore for RocksStore {
    async fn create_event(&self, draft: EventDraft) -> Result<Event> {
        let cf = self.cf_handle(CF_EVENTS)?;
        let event = Event::from_draft(draft, Uuid::now_v7());
        self.db
            .put_cf(cf, event.id.as_bytes(), bincode::serialize(&event)?)?;
        Ok(event)
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let cf = self.cf_handle(CF_EVENTS)?;

        let mut events = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item?;
            events.push(bincode::deserialize::<Event>(&value)?);
        }

        sort_events(&mut events);
        Ok(events)
    }
}
