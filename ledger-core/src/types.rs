//! Core types for the reimbursement ledger
//!
//! All types are designed for:
//! - Exact arithmetic (Decimal for money)
//! - Invariants checked at construction (positive amount, no self-debt)
//! - Explicit status enum instead of stored string literals

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Largest amount a single debt may carry (one billion).
///
/// Keeps any realistic sum of records far below `Decimal::MAX`, so balance
/// arithmetic cannot overflow.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Member identifier (the auth provider's user id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Create new member ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MemberId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Debt record identifier, assigned by the store (UUIDv7 for time-ordering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generate a fresh, time-ordered ID
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Repayment status of a debt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DebtStatus {
    /// Still owed
    #[default]
    Unpaid = 1,
    /// Marked as repaid by the creditor (terminal)
    Settled = 2,
}

impl DebtStatus {
    /// Literal used in the hosted store's `status` column
    pub fn literal(&self) -> &'static str {
        match self {
            DebtStatus::Unpaid => "à payer",
            DebtStatus::Settled => "remboursé",
        }
    }

    /// Parse a stored literal
    pub fn from_literal(s: &str) -> Option<Self> {
        match s {
            "à payer" => Some(DebtStatus::Unpaid),
            "remboursé" => Some(DebtStatus::Settled),
            _ => None,
        }
    }

    /// Whether `next` is a legal transition from this status.
    ///
    /// Staying put is allowed so that settling twice is a no-op.
    pub fn can_transition_to(&self, next: DebtStatus) -> bool {
        matches!(
            (self, next),
            (DebtStatus::Unpaid, _) | (DebtStatus::Settled, DebtStatus::Settled)
        )
    }
}

impl fmt::Display for DebtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.literal())
    }
}

/// A debt that has not been stored yet.
///
/// Only constructible through [`DebtDraft::new`], so every draft satisfies
/// `amount > 0` and `debtor != creditor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtDraft {
    debtor: MemberId,
    creditor: MemberId,
    amount: Decimal,
    description: Option<String>,
}

impl DebtDraft {
    /// Build a draft, checking the record invariants
    pub fn new(
        debtor: MemberId,
        creditor: MemberId,
        amount: Decimal,
        description: Option<String>,
    ) -> crate::Result<Self> {
        if amount <= Decimal::ZERO {
            return Err(crate::Error::InvalidInput(
                "Amount must be positive".to_string(),
            ));
        }

        if amount > MAX_AMOUNT {
            return Err(crate::Error::InvalidInput(format!(
                "Amount {} exceeds the maximum of {}",
                amount, MAX_AMOUNT
            )));
        }

        if debtor == creditor {
            return Err(crate::Error::InvalidInput(format!(
                "{} cannot owe themselves",
                debtor
            )));
        }

        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Self {
            debtor,
            creditor,
            amount,
            description,
        })
    }

    /// Who owes
    pub fn debtor(&self) -> &MemberId {
        &self.debtor
    }

    /// Who is owed
    pub fn creditor(&self) -> &MemberId {
        &self.creditor
    }

    /// Amount owed
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Free-text label
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Re-check invariants (stores call this before accepting a draft that
    /// may have come through deserialization)
    pub fn validate(&self) -> crate::Result<()> {
        Self::new(
            self.debtor.clone(),
            self.creditor.clone(),
            self.amount,
            self.description.clone(),
        )
        .map(|_| ())
    }
}

/// A stored debt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtRecord {
    /// Store-assigned ID
    pub id: RecordId,

    /// Who owes
    pub debtor: MemberId,

    /// Who is owed
    pub creditor: MemberId,

    /// Amount owed (exact decimal)
    pub amount: Decimal,

    /// Free-text label
    pub description: Option<String>,

    /// Repayment status
    pub status: DebtStatus,

    /// Creation timestamp, never mutated
    pub created_at: DateTime<Utc>,
}

impl DebtRecord {
    /// Materialize a draft with store-assigned identity and timestamp
    pub fn from_draft(draft: DebtDraft, id: RecordId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            debtor: draft.debtor,
            creditor: draft.creditor,
            amount: draft.amount,
            description: draft.description,
            status: DebtStatus::Unpaid,
            created_at,
        }
    }

    /// Whether `member` is debtor or creditor
    pub fn involves(&self, member: &MemberId) -> bool {
        &self.debtor == member || &self.creditor == member
    }

    /// Whether the debt still counts towards balances
    pub fn is_unpaid(&self) -> bool {
        self.status == DebtStatus::Unpaid
    }

    /// Apply the settle transition on behalf of `caller`.
    ///
    /// Returns `true` when the status actually changed.
    pub fn settle_by(&mut self, caller: &MemberId) -> crate::Result<bool> {
        if &self.creditor != caller {
            return Err(crate::Error::Unauthorized(format!(
                "only the creditor can settle record {}",
                self.id
            )));
        }

        let changed = self.status != DebtStatus::Settled;
        self.status = DebtStatus::Settled;
        Ok(changed)
    }
}

/// Newest first, ties broken by ID (also newest first for UUIDv7)
pub(crate) fn sort_newest_first(records: &mut [DebtRecord]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
