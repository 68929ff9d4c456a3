//! Fixed-point decimal conversion for raw on-chain amounts
//!
//! Raw amounts are integers scaled by `10^decimals`. Conversion to a display
//! float inserts the decimal point by string manipulation instead of dividing
//! the integer, so the scaling step never overflows or rounds before the
//! final parse. The resulting f64 loses precision below float granularity;
//! that is acceptable for display and derived insights, and this module is
//! explicitly not suitable for bit-exact financial settlement.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::types::RawAmount;

/// Convert a raw scaled integer into a display value.
///
/// A value with fewer digits than `decimals` is left-zero-padded before the
/// decimal point is inserted. Sign is preserved.
pub fn to_decimal(raw: RawAmount, decimals: u32) -> f64 {
    let negative = raw < 0;
    let digits = raw.unsigned_abs().to_string();
    let decimals = decimals as usize;

    let rendered = if digits.len() <= decimals {
        format!("0.{:0>width$}", digits, width = decimals)
    } else {
        let split = digits.len() - decimals;
        format!("{}.{}", &digits[..split], &digits[split..])
    };

    // The rendered string is always a valid decimal literal.
    let value: f64 = rendered.parse().unwrap_or(0.0);
    if negative {
        -value
    } else {
        value
    }
}

/// Convert a user-supplied decimal amount into a raw scaled integer.
///
/// Exact up to `decimals` places; anything below the last representable
/// place is truncated. Returns `None` when the scaled value does not fit a
/// raw amount (only reachable with absurd inputs).
pub fn to_raw(amount: Decimal, decimals: u32) -> Option<RawAmount> {
    let mut scaled = amount;
    // Multiply in <= 10^18 steps so the scale factor itself never overflows
    let mut remaining = decimals;
    while remaining > 0 {
        let step = remaining.min(18);
        scaled = scaled.checked_mul(Decimal::from(10u64.pow(step)))?;
        remaining -= step;
    }
    scaled.trunc().to_i128()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_inserts_decimal_point() {
        assert_eq!(to_decimal(123456, 2), 1234.56);
        assert_eq!(to_decimal(1, 0), 1.0);
        assert_eq!(to_decimal(0, 6), 0.0);
    }

    #[test]
    fn test_pads_short_values() {
        // Fewer digits than decimals: left-zero-padded fraction
        assert_eq!(to_decimal(5, 3), 0.005);
        assert_eq!(to_decimal(42, 6), 0.000042);
    }

    #[test]
    fn test_boundary_lengths() {
        // Exactly as many digits as decimals
        assert_eq!(to_decimal(123, 3), 0.123);
        // One more digit than decimals
        assert_eq!(to_decimal(1234, 3), 1.234);
    }

    #[test]
    fn test_preserves_sign() {
        assert_eq!(to_decimal(-123456, 2), -1234.56);
        assert_eq!(to_decimal(-5, 3), -0.005);
    }

    #[test]
    fn test_large_values_survive_scaling() {
        // 12.345... WETH at 18 decimals; the raw value exceeds f64's exact
        // integer range, the scaled value does not.
        let raw: i128 = 12_345_678_901_234_567_890;
        let value = to_decimal(raw, 18);
        assert!((value - 12.345678901234568).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_within_precision() {
        for (raw, decimals) in [(0i128, 0u32), (7, 2), (123456, 4), (999999, 6), (100000, 5)] {
            let value = to_decimal(raw, decimals);
            let rescaled = (value * 10f64.powi(decimals as i32)).round() as i128;
            assert_eq!(rescaled, raw, "raw={raw} decimals={decimals}");
        }
    }

    #[test]
    fn test_to_raw_scales_exactly() {
        assert_eq!(to_raw(dec!(5.00), 2), Some(500));
        assert_eq!(to_raw(dec!(0.000042), 6), Some(42));
        // Truncates below the last representable place
        assert_eq!(to_raw(dec!(1.239), 2), Some(123));
    }
}
