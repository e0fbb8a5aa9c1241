// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Monetary arithmetic helpers.
//!
//! Calculations keep full decimal precision. Rounding happens once, at the
//! point an amount is written to an account or a movement.

use crate::error::DomainError;
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places carried by persisted amounts.
pub const MONEY_SCALE: u32 = 2;

/// Rounds an amount half-up to two decimal places.
///
/// Midpoints round away from zero, so `9.625` becomes `9.63` and
/// `-9.625` becomes `-9.63`.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Turns the result of a checked `Decimal` operation into an amount.
///
/// # Errors
///
/// Returns `AmountOutOfRange` naming the operation if it overflowed.
pub fn checked_amount(operation: &str, result: Option<Decimal>) -> Result<Decimal, DomainError> {
    result.ok_or_else(|| DomainError::AmountOutOfRange {
        operation: operation.to_string(),
    })
}

/// Applies a percentage rate (expressed in percent, e.g. `2.5`) to an amount.
///
/// The result is not rounded.
///
/// # Errors
///
/// Returns `AmountOutOfRange` if the product does not fit in a `Decimal`.
pub fn percent_of(amount: Decimal, rate: Decimal) -> Result<Decimal, DomainError> {
    let scaled: Decimal = checked_amount(
        &format!("applying {rate}% to {amount}"),
        amount.checked_mul(rate),
    )?;
    Ok(scaled / Decimal::ONE_HUNDRED)
}
