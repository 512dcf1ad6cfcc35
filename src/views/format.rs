//! Number and currency formatting (en-US conventions)

use crate::constants::PRICE_PRECISION_THRESHOLD;
use crate::types::Currency;
use num_format::{Locale, ToFormattedString};

/// Placeholder for missing values
pub const MISSING: &str = "N/A";

const COMPACT_UNITS: [(f64, &str); 5] = [
    (1.0, ""),
    (1e3, "K"),
    (1e6, "M"),
    (1e9, "B"),
    (1e12, "T"),
];

/// Amount with two fraction digits, e.g. `$1,234.50`
pub fn format_currency(value: f64, currency: Currency) -> String {
    with_currency(value, currency, |abs| decimal(abs, 2, 2))
}

/// Price with value-dependent precision
///
/// Above the precision threshold two fraction digits are shown; at or below
/// it up to six, so small-value assets stay distinguishable.
pub fn format_price(value: f64, currency: Currency) -> String {
    let max_frac = if value.abs() > PRICE_PRECISION_THRESHOLD { 2 } else { 6 };
    with_currency(value, currency, |abs| decimal(abs, 2, max_frac))
}

/// Abbreviated amount for large aggregates, e.g. `$1.23B`
pub fn format_compact(value: f64, currency: Currency) -> String {
    with_currency(value, currency, |abs| compact(abs, 2))
}

/// Abbreviated number without currency for chart axes, e.g. `1.5B`
pub fn format_axis(value: f64) -> String {
    if !value.is_finite() {
        return MISSING.to_string();
    }
    signed(value, compact(value.abs(), 1))
}

/// Percentage with two fraction digits
pub fn format_percent(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{}%", signed(v, decimal(v.abs(), 2, 2))),
        None => MISSING.to_string(),
    }
}

/// Normalized exchange volume, e.g. `150,000.25 BTC`
pub fn format_btc_volume(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{} BTC", signed(v, decimal(v.abs(), 2, 2))),
        None => MISSING.to_string(),
    }
}

/// Whole-unit supply figure followed by the asset symbol
pub fn format_supply(value: Option<f64>, symbol: &str) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{} {}", decimal(v.abs(), 0, 0), symbol.to_uppercase()),
        None => MISSING.to_string(),
    }
}

/// Maximum supply; a missing cap means unlimited
pub fn format_max_supply(value: Option<f64>, symbol: &str) -> String {
    match value {
        Some(_) => format_supply(value, symbol),
        None => "∞".to_string(),
    }
}

/// Grouped integer count, e.g. `13,500`
pub fn format_count(value: Option<u64>) -> String {
    match value {
        Some(v) => v.to_formatted_string(&Locale::en),
        None => MISSING.to_string(),
    }
}

fn with_currency(value: f64, currency: Currency, body: impl Fn(f64) -> String) -> String {
    if !value.is_finite() {
        return MISSING.to_string();
    }
    signed(value, format!("{}{}", currency.symbol(), body(value.abs())))
}

/// Prefixes a minus sign unless the rendered magnitude is zero
fn signed(value: f64, magnitude: String) -> String {
    let is_zero = magnitude
        .chars()
        .filter(|c| c.is_ascii_digit())
        .all(|c| c == '0');
    if value < 0.0 && !is_zero {
        format!("-{}", magnitude)
    } else {
        magnitude
    }
}

/// Grouped decimal with between `min_frac` and `max_frac` fraction digits
fn decimal(abs: f64, min_frac: usize, max_frac: usize) -> String {
    let fixed = format!("{:.*}", max_frac, abs);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let grouped = group_digits(int_part);

    let mut frac = frac_part.to_string();
    while frac.len() > min_frac && frac.ends_with('0') {
        frac.pop();
    }

    if frac.is_empty() {
        grouped
    } else {
        format!("{}.{}", grouped, frac)
    }
}

/// Inserts the en-US thousands separator into a plain digit string
fn group_digits(digits: &str) -> String {
    let separator = Locale::en.separator();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

fn round_to(value: f64, digits: usize) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

/// Compact notation with K/M/B/T suffixes, rolling over to the next unit
/// when rounding reaches 1000
fn compact(abs: f64, max_frac: usize) -> String {
    let mut idx = COMPACT_UNITS
        .iter()
        .rposition(|(scale, _)| abs >= *scale)
        .unwrap_or(0);

    loop {
        let (scale, suffix) = COMPACT_UNITS[idx];
        let scaled = abs / scale;
        if round_to(scaled, max_frac) >= 1000.0 && idx + 1 < COMPACT_UNITS.len() {
            idx += 1;
            continue;
        }
        return format!("{}{}", decimal(scaled, 0, max_frac), suffix);
    }
}
