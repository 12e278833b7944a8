//! Decimal <-> integer cents
//!
//! Amounts are persisted as INTEGER cents so that SQL aggregates stay exact.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::repository::{RepoError, RepoResult};

/// `1050` -> `10.50`
pub fn to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// `10.50` -> `1050`, rounding half away from zero past the second place
pub fn from_decimal(amount: Decimal) -> RepoResult<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| RepoError::Database(format!("amount out of range: {amount}")))
}
