//! Raw on-chain integers → decimal token amounts.

use alloy::primitives::U256;
use rust_decimal::Decimal;

/// Widest mantissa a `Decimal` can hold, in digits (`Decimal::MAX` has 29).
const MAX_DIGITS: usize = 29;

/// Largest scale `Decimal` supports.
const MAX_SCALE: u32 = 28;

/// Convert a base-unit integer to a token amount with `decimals` places.
///
/// Amounts wider than `Decimal` can represent lose their least significant
/// digits; anything still too large clamps to `Decimal::MAX`.
pub fn format_units(raw: U256, decimals: u8) -> Decimal {
    if raw.is_zero() {
        return Decimal::ZERO;
    }

    let digits = raw.to_string();
    let scale = u32::from(decimals);

    // Each dropped trailing digit lowers the scale by one.
    let mut drop = (digits.len().saturating_sub(MAX_DIGITS) as u32)
        .max(scale.saturating_sub(MAX_SCALE))
        .min(scale);
    loop {
        if drop as usize >= digits.len() {
            return Decimal::ZERO;
        }
        let keep = digits.len() - drop as usize;
        let parsed = digits[..keep]
            .parse::<i128>()
            .ok()
            .and_then(|mantissa| Decimal::try_from_i128_with_scale(mantissa, scale - drop).ok());
        match parsed {
            Some(amount) => return amount.normalize(),
            None if drop < scale => drop += 1,
            None => return Decimal::MAX,
        }
    }
}
