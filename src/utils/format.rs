//! Display formatting for the tracker table.
//!
//! Pure functions, en-US style: comma thousands separator, `.` decimal point,
//! leading `$` for USD.

use chrono::{DateTime, Utc};

/// Price in USD. Two fraction digits at or above $1, six below so sub-cent
/// prices stay readable.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    let decimals = if value.abs() >= 1.0 { 2 } else { 6 };
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}${}", sign, group_thousands(&format!("{:.*}", decimals, value.abs())))
}

/// Whole number with thousands separators, rounded to the nearest integer.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}{}", sign, group_thousands(&format!("{:.0}", rounded.abs())))
}

/// Signed percentage with two decimals, `N/A` when the upstream omitted it.
pub fn format_percentage(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let sign = if v >= 0.0 { "+" } else { "" };
            format!("{}{:.2}%", sign, v)
        }
        _ => "N/A".to_string(),
    }
}

/// Whether a change column renders as "up". Missing values render as down,
/// matching how a negative move is shown.
pub fn is_gain(value: Option<f64>) -> bool {
    value.is_some_and(|v| v >= 0.0)
}

/// Share of the maximum supply already in circulation, as a percentage
/// clamped to 0..=100. `None` for uncapped assets, so the bar is omitted.
pub fn supply_used_percent(circulating_supply: f64, max_supply: Option<f64>) -> Option<f64> {
    let max = max_supply.filter(|m| m.is_finite() && *m > 0.0)?;
    if !circulating_supply.is_finite() {
        return None;
    }
    Some((circulating_supply / max * 100.0).clamp(0.0, 100.0))
}

pub fn format_time(at: DateTime<Utc>) -> String {
    at.format("%H:%M:%S").to_string()
}

// Expects an unsigned decimal string like "1234567.89".
fn group_thousands(digits: &str) -> String {
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 8);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}
