//! Currency helpers. Amounts are US dollars held as `BigDecimal` so
//! margins never pick up floating-point error.

use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::Signed;

/// Format an amount as dollars with 2 decimal places
pub fn format_usd(amount: &BigDecimal) -> String {
    let rounded = amount.with_scale_round(2, RoundingMode::HalfUp);
    if rounded.is_negative() {
        format!("-${}", rounded.abs())
    } else {
        format!("${}", rounded)
    }
}

/// Reject negative prices and fees
pub fn ensure_non_negative(field: &str, amount: &BigDecimal) -> Result<(), String> {
    if amount.is_negative() {
        Err(format!("{} cannot be negative", field))
    } else {
        Ok(())
    }
}
