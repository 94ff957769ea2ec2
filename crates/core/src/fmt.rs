//! Formatting utilities shared across the CLI and the table renderer.

use rust_decimal::{Decimal, RoundingStrategy};

const THOUSAND: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);
const MILLION: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
const HUNDRED_THOUSAND: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

fn fixed(n: Decimal, dp: u32) -> String {
    format!(
        "{:.*}",
        dp as usize,
        n.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Token amount with decimal places adapted to magnitude.
pub fn format_amount(n: Decimal) -> String {
    let abs = n.abs();
    if abs >= HUNDRED_THOUSAND {
        fixed(n, 0)
    } else if abs >= THOUSAND {
        fixed(n, 2)
    } else if abs >= Decimal::ONE {
        fixed(n, 4)
    } else {
        fixed(n, 6)
    }
}

/// Abbreviated USD (e.g. "$1.23M", "$12.35K", "$123.45").
pub fn format_usd(n: Decimal) -> String {
    let abs = n.abs();
    let body = if abs >= MILLION {
        format!("{}M", fixed(abs / MILLION, 2))
    } else if abs >= THOUSAND {
        format!("{}K", fixed(abs / THOUSAND, 2))
    } else {
        fixed(abs, 2)
    };
    format!("{}${body}", minus(n))
}

/// USD with two decimals and thousands separators (e.g. "$12,345.68").
pub fn format_usd_full(n: Decimal) -> String {
    let s = fixed(n.abs(), 2);
    let (int, frac) = s.split_once('.').unwrap_or((&s, "00"));
    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${grouped}.{frac}", minus(n))
}

fn minus(n: Decimal) -> &'static str {
    if sign_of(n) == Sign::Negative { "-" } else { "" }
}

/// A value already in percent (e.g. 1.84 → "+1.84%").
pub fn format_change_pct(pct: Decimal) -> String {
    match sign_of(pct) {
        Sign::Positive => format!("+{}%", fixed(pct, 2)),
        _ => format!("{}%", fixed(pct, 2)),
    }
}

/// Truncate an EVM address or hash for display: 0x1234...abcd
pub fn truncate_address(s: &str) -> String {
    if s.len() > 12 && s.is_ascii() {
        format!("{}...{}", &s[..6], &s[s.len() - 4..])
    } else {
        s.to_string()
    }
}

/// Truncate to at most `max` characters.
pub fn truncate_str(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sign {
    Positive,
    Negative,
    Zero,
}

pub fn sign_of(n: Decimal) -> Sign {
    if n.is_zero() {
        Sign::Zero
    } else if n.is_sign_negative() {
        Sign::Negative
    } else {
        Sign::Positive
    }
}
