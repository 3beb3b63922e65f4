//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for the ledger operations.
//!
//! # Metrics
//!
//! - `ledger_debts_declared_total` - Debts declared by hand
//! - `ledger_splits_total` - Splits submitted
//! - `ledger_split_records_total` - Records created by splits
//! - `ledger_settlements_total` - Records settled
//! - `ledger_rejected_total` - Operations rejected before reaching the store

use prometheus::{IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Debts declared by hand
    pub debts_declared: IntCounter,

    /// Splits submitted
    pub splits: IntCounter,

    /// Records created by splits
    pub split_records: IntCounter,

    /// Records settled
    pub settlements: IntCounter,

    /// Rejected operations
    pub rejected: IntCounter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let debts_declared =
            IntCounter::new("ledger_debts_declared_total", "Debts declared by hand")?;
        registry.register(Box::new(debts_declared.clone()))?;

        let splits = IntCounter::new("ledger_splits_total", "Splits submitted")?;
        registry.register(Box::new(splits.clone()))?;

        let split_records =
            IntCounter::new("ledger_split_records_total", "Records created by splits")?;
        registry.register(Box::new(split_records.clone()))?;

        let settlements = IntCounter::new("ledger_settlements_total", "Records settled")?;
        registry.register(Box::new(settlements.clone()))?;

        let rejected = IntCounter::new(
            "ledger_rejected_total",
            "Operations rejected before reaching the store",
        )?;
        registry.register(Box::new(rejected.clone()))?;

        Ok(Self {
            debts_declared,
            splits,
            split_records,
            settlements,
            rejected,
            registry,
        })
    }

    /// Record a declared debt
    pub fn record_debt_declared(&self) {
        self.debts_declared.inc();
    }

    /// Record a split and the number of records it created
    pub fn record_split(&self, record_count: usize) {
        self.splits.inc();
        self.split_records.inc_by(record_count as u64);
    }

    /// Record a settlement
    pub fn record_settlement(&self) {
        self.settlements.inc();
    }

    /// Record a rejected operation
    pub fn record_rejected(&self) {
        self.rejected.inc();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("debts_declared", &self.debts_declared.get())
            .field("splits", &self.splits.get())
            .field("split_records", &self.split_records.get())
            .field("settlements", &self.settlements.get())
            .field("rejected", &self.rejected.get())
            .finish()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("metric names are static and unique")
    }
}
