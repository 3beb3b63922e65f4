//! Balance calculator
//!
//! Net position of one member over the records visible to them.
//!
//! ```text
//! owed_to_me = Σ amount  where creditor == me and status == Unpaid
//! i_owe      = Σ amount  where debtor   == me and status == Unpaid
//! net        = owed_to_me - i_owe
//! ```
//!
//! Sums are exact `Decimal` arithmetic; rounding only happens in
//! [`Balance::rounded`] for display.

use crate::types::{DebtRecord, MemberId};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal places used when presenting amounts
pub const DISPLAY_SCALE: u32 = 2;

/// Aggregated position of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Balance {
    /// Unpaid amounts others owe to the member
    pub owed_to_me: Decimal,

    /// Unpaid amounts the member owes to others
    pub i_owe: Decimal,

    /// `owed_to_me - i_owe`
    pub net: Decimal,
}

impl Balance {
    /// Compute the balance of `me` over `records`.
    ///
    /// Records where `me` is neither debtor nor creditor are ignored, so the
    /// caller may pass a wider set than `list_for(me)` returns.
    pub fn compute<'a, I>(me: &MemberId, records: I) -> Self
    where
        I: IntoIterator<Item = &'a DebtRecord>,
    {
        let mut owed_to_me = Decimal::ZERO;
        let mut i_owe = Decimal::ZERO;

        for record in records.into_iter().filter(|r| r.is_unpaid()) {
            if &record.creditor == me {
                owed_to_me += record.amount;
            } else if &record.debtor == me {
                i_owe += record.amount;
            }
        }

        Self {
            owed_to_me,
            i_owe,
            net: owed_to_me - i_owe,
        }
    }

    /// Same balance rounded to cents for display
    pub fn rounded(&self) -> Self {
        Self {
            owed_to_me: round_for_display(self.owed_to_me),
            i_owe: round_for_display(self.i_owe),
            net: round_for_display(self.net),
        }
    }

    /// Nothing owed either way
    pub fn is_settled_up(&self) -> bool {
        self.owed_to_me.is_zero() && self.i_owe.is_zero()
    }
}

/// Round an amount to cents, half away from zero
pub fn round_for_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
