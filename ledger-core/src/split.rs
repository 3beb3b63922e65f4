//! Even bill splitting
//!
//! One member paid for the group; every other participant now owes them an
//! equal share.
//!
//! # Rounding
//!
//! The share is rounded once to cents (half away from zero) and every debtor
//! owes exactly that share. The remainder is NOT redistributed, so the shares
//! may not add back up to the total:
//!
//! ```text
//! total 10.00 over {A, B, C}, payer A
//!   share    = round(10 / 3, 2) = 3.33
//!   drafts   = B→A 3.33, C→A 3.33   (sum 6.66)
//!   residual = 10.00 - 3 × 3.33     = 0.01
//! ```
//!
//! [`SplitPlan::residual`] exposes the gap.

use crate::{
    config::SplitConfig,
    directory::Directory,
    types::{DebtDraft, MemberId, MAX_AMOUNT},
    Error, Result,
};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashSet;

/// Decimal places of a share
pub const SHARE_SCALE: u32 = 2;

/// Drafts produced by one split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    /// Amount paid by the payer
    pub total: Decimal,

    /// Per-participant share (payer included in the headcount)
    pub share: Decimal,

    /// Distinct participants, payer included if selected
    pub participant_count: usize,

    /// One draft per participant other than the payer
    pub drafts: Vec<DebtDraft>,
}

impl SplitPlan {
    /// Sum of the emitted drafts
    pub fn emitted_total(&self) -> Decimal {
        self.drafts.iter().map(|d| d.amount()).sum()
    }

    /// `total - share × participant_count`: the rounding gap nobody owes
    pub fn residual(&self) -> Decimal {
        self.total - self.share * Decimal::from(self.participant_count)
    }
}

/// Split engine
#[derive(Debug, Clone, Default)]
pub struct SplitEngine {
    config: SplitConfig,
}

impl SplitEngine {
    /// Create new split engine
    pub fn new(config: SplitConfig) -> Self {
        Self { config }
    }

    /// Plan an even split of `total` paid by `payer` among `participants`.
    ///
    /// Duplicate participants count once. The payer may or may not be part
    /// of `participants`; either way they never owe themselves.
    pub fn plan(
        &self,
        directory: &Directory,
        payer: &MemberId,
        total: Decimal,
        participants: &[MemberId],
    ) -> Result<SplitPlan> {
        if total <= Decimal::ZERO {
            return Err(Error::InvalidInput("Total must be positive".to_string()));
        }

        if total > MAX_AMOUNT {
            return Err(Error::InvalidInput(format!(
                "Total {} exceeds the maximum of {}",
                total, MAX_AMOUNT
            )));
        }

        if participants.is_empty() {
            return Err(Error::InvalidInput(
                "At least one participant is required".to_string(),
            ));
        }

        if !directory.contains(payer) {
            return Err(Error::InvalidInput(format!("Unknown payer: {}", payer)));
        }

        let mut seen = HashSet::new();
        let mut distinct = Vec::with_capacity(participants.len());
        for participant in participants {
            if !directory.contains(participant) {
                return Err(Error::InvalidInput(format!(
                    "Unknown participant: {}",
                    participant
                )));
            }
            if seen.insert(participant) {
                distinct.push(participant);
            }
        }

        let debtors: Vec<&MemberId> = distinct.iter().copied().filter(|p| *p != payer).collect();
        if debtors.is_empty() {
            return Err(Error::NoRecipients);
        }

        let share = (total / Decimal::from(distinct.len()))
            .round_dp_with_strategy(SHARE_SCALE, RoundingStrategy::MidpointAwayFromZero);

        if share.is_zero() {
            return Err(Error::InvalidInput(format!(
                "Total {} is too small to split between {} people",
                total,
                distinct.len()
            )));
        }

        let drafts = debtors
            .into_iter()
            .map(|debtor| {
                DebtDraft::new(
                    debtor.clone(),
                    payer.clone(),
                    share,
                    Some(self.config.description.clone()),
                )
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            payer = %payer,
            %total,
            %share,
            drafts = drafts.len(),
            "Split planned"
        );

        Ok(SplitPlan {
            total,
            share,
            participant_count: distinct.len(),
            drafts,
        })
    }
}
