//! Main ledger orchestration layer
//!
//! This module ties together the store, the split engine and the balance
//! calculator into the request/response operations the app calls.
//!
//! Every mutating operation returns the stored state, so callers never have
//! to re-fetch blindly after a write.
//!
//! # Example
//!
//! ```no_run
//! use flexs_ledger::{Config, Directory, InMemoryStore, Ledger, Member, MemberId};
//! use rust_decimal::Decimal;
//!
//! # async fn run() -> flexs_ledger::Result<()> {
//! let ledger = Ledger::new(InMemoryStore::new(), &Config::default());
//! let directory = Directory::new(vec![Member::new("A", "alice"), Member::new("B", "bruno")]);
//! let alice = MemberId::new("A");
//!
//! ledger
//!     .split_bill(&directory, &alice, Decimal::from(30), &[alice.clone(), MemberId::new("B")])
//!     .await?;
//! let balance = ledger.balance_for(&alice).await?;
//! assert_eq!(balance.owed_to_me, Decimal::from(15));
//! # Ok(())
//! # }
//! ```

use crate::{
    balance::Balance,
    directory::Directory,
    metrics::Metrics,
    split::SplitEngine,
    store::LedgerStore,
    types::{DebtDraft, DebtRecord, MemberId, RecordId},
    Config, Error, Result,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main ledger interface
#[derive(Debug)]
pub struct Ledger<S> {
    /// Backing store (single source of truth)
    store: S,

    /// Split engine
    splitter: SplitEngine,

    /// Metrics
    metrics: Metrics,
}

/// Result of a submitted split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutcome {
    /// Per-participant share
    pub share: Decimal,

    /// Rounding gap nobody owes
    pub residual: Decimal,

    /// Stored records, one per debtor
    pub records: Vec<DebtRecord>,
}

/// Which side of a record the viewer is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// The viewer is the creditor
    OwedToMe,
    /// The viewer is the debtor
    IOwe,
}

/// A record as seen by one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    /// The record
    pub record: DebtRecord,

    /// Viewer's side
    pub direction: Direction,

    /// The other party
    pub counterparty: MemberId,

    /// The other party's username, if in the directory
    pub counterparty_name: Option<String>,

    /// Viewer is the creditor and the record is unpaid
    pub can_settle: bool,
}

impl<S: LedgerStore> Ledger<S> {
    /// Create a ledger over `store`
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            store,
            splitter: SplitEngine::new(config.split.clone()),
            metrics: Metrics::default(),
        }
    }

    /// Backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Declare that `debtor` owes `me` the given amount
    pub async fn declare_debt(
        &self,
        me: &MemberId,
        debtor: &MemberId,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<DebtRecord> {
        let draft = DebtDraft::new(debtor.clone(), me.clone(), amount, description)
            .map_err(|e| self.rejected(e))?;

        let record = self
            .store
            .insert_many(vec![draft])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Store("Insert returned no record".to_string()))?;

        self.metrics.record_debt_declared();
        tracing::info!(
            record_id = %record.id,
            debtor = %record.debtor,
            creditor = %record.creditor,
            amount = %record.amount,
            "Debt declared"
        );

        Ok(record)
    }

    /// Split `total`, paid by `payer`, evenly among `participants`.
    ///
    /// All resulting records are submitted in a single store call; if it
    /// fails nothing is stored.
    pub async fn split_bill(
        &self,
        directory: &Directory,
        payer: &MemberId,
        total: Decimal,
        participants: &[MemberId],
    ) -> Result<SplitOutcome> {
        let plan = self
            .splitter
            .plan(directory, payer, total, participants)
            .map_err(|e| self.rejected(e))?;

        let share = plan.share;
        let residual = plan.residual();
        let records = self.store.insert_many(plan.drafts).await?;

        self.metrics.record_split(records.len());
        tracing::info!(
            payer = %payer,
            %total,
            %share,
            %residual,
            records = records.len(),
            "Bill split"
        );

        Ok(SplitOutcome {
            share,
            residual,
            records,
        })
    }

    /// Mark record `id` as repaid. Only its creditor may do so.
    pub async fn settle(&self, me: &MemberId, id: RecordId) -> Result<DebtRecord> {
        match self.store.settle(id, me).await {
            Ok(record) => {
                self.metrics.record_settlement();
                tracing::info!(record_id = %id, creditor = %me, "Record settled");
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(record_id = %id, caller = %me, error = %e, "Settle rejected");
                Err(e)
            }
        }
    }

    /// Records where `me` is debtor or creditor, newest first
    pub async fn records_for(&self, me: &MemberId) -> Result<Vec<DebtRecord>> {
        let records = self.store.list_for(me).await?;
        tracing::debug!(member = %me, count = records.len(), "Records fetched");
        Ok(records)
    }

    /// Current balance of `me`
    pub async fn balance_for(&self, me: &MemberId) -> Result<Balance> {
        let records = self.records_for(me).await?;
        Ok(Balance::compute(me, &records))
    }

    /// Records of `me` seen from their side, counterparties resolved
    pub async fn statement_for(
        &self,
        me: &MemberId,
        directory: &Directory,
    ) -> Result<Vec<StatementLine>> {
        let records = self.records_for(me).await?;
        Ok(records
            .into_iter()
            .map(|record| statement_line(me, directory, record))
            .collect())
    }

    fn rejected(&self, error: Error) -> Error {
        self.metrics.record_rejected();
        tracing::debug!(error = %error, "Operation rejected");
        error
    }
}

impl Ledger<std::sync::Arc<dyn LedgerStore>> {
    /// Create a ledger over the store backend selected in `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = crate::store::open(&config.store)?;
        tracing::info!(backend = ?config.store.backend, "Ledger store opened");
        Ok(Self::new(store, config))
    }
}

fn statement_line(me: &MemberId, directory: &Directory, record: DebtRecord) -> StatementLine {
    let (direction, counterparty) = if &record.creditor == me {
        (Direction::OwedToMe, record.debtor.clone())
    } else {
        (Direction::IOwe, record.creditor.clone())
    };

    StatementLine {
        can_settle: direction == Direction::OwedToMe && record.is_unpaid(),
        counterparty_name: directory.username_of(&counterparty).map(str::to_string),
        counterparty,
        direction,
        record,
    }
}
