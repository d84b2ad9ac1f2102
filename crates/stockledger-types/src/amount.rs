//! Amount validation.
//!
//! Stablecoin and token amounts are fixed-point decimals with at most
//! [`AMOUNT_SCALE`](crate::constants::AMOUNT_SCALE) fractional digits.
//!
//! `Decimal` keeps a 96-bit mantissa, so plain `+`/`-` either panics on
//! overflow or silently drops fractional digits once a value grows past
//! about 28 significant digits. Every balance, supply, and allowance update
//! goes through [`checked_add`] / [`checked_sub`] instead, which return
//! `AmountOverflow` rather than round.

use rust_decimal::Decimal;

use crate::{LedgerError, Result, constants::AMOUNT_SCALE};

/// Reject amounts that carry more fractional digits than the ledger keeps.
///
/// Trailing zeros do not count: `1.50` and `1.5` are the same amount.
pub fn ensure_scale(amount: Decimal) -> Result<()> {
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(LedgerError::invalid_amount(
            amount,
            format!("more than {AMOUNT_SCALE} fractional digits"),
        ));
    }
    Ok(())
}

/// Order amounts and mints must be strictly positive.
pub fn ensure_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid_amount(amount, "must be positive"));
    }
    ensure_scale(amount)
}

/// Settlement amounts and transfers may be zero but never negative.
pub fn ensure_non_negative(amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(LedgerError::invalid_amount(amount, "must not be negative"));
    }
    ensure_scale(amount)
}

/// Exact `a + b`.
///
/// # Errors
/// `AmountOverflow` if the sum overflows or cannot keep every fractional
/// digit of its operands.
pub fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal> {
    exact(a, b, a.normalize().checked_add(b.normalize()), "+")
}

/// Exact `a - b`.
///
/// # Errors
/// `AmountOverflow` if the difference overflows or cannot keep every
/// fractional digit of its operands.
pub fn checked_sub(a: Decimal, b: Decimal) -> Result<Decimal> {
    exact(a, b, a.normalize().checked_sub(b.normalize()), "-")
}

fn exact(a: Decimal, b: Decimal, result: Option<Decimal>, op: &str) -> Result<Decimal> {
    // rust_decimal only ever rounds by lowering the scale.
    let needed = a.normalize().scale().max(b.normalize().scale());
    match result {
        Some(r) if r.scale() >= needed => Ok(r.normalize()),
        _ => Err(LedgerError::AmountOverflow {
            reason: format!("{a} {op} {b} is not representable at full precision"),
        }),
    }
}
