// Parsing and number helpers shared by the pipeline stages and the CLI.
use num_format::{Locale, ToFormattedString};

/// Outcome of reading a currency-like cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Amount {
    Blank,
    Value(f64),
    Invalid,
}

/// Parse a currency-like string such as `"$1,200.50"` or `"USD 300"`.
///
/// Every character except digits, `.` and `-` is stripped before parsing.
/// Negative and non-finite results are `Invalid`: savings are never below zero.
pub fn parse_amount(s: &str) -> Amount {
    let s = s.trim();
    if s.is_empty() {
        return Amount::Blank;
    }
    let kept: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if kept.is_empty() {
        return Amount::Invalid;
    }
    match kept.parse::<f64>() {
        Ok(v) => check_amount(v),
        Err(_) => Amount::Invalid,
    }
}

pub fn check_amount(v: f64) -> Amount {
    if v.is_finite() && v >= 0.0 {
        // -0.0 parses from "-0"
        Amount::Value(v.abs())
    } else {
        Amount::Invalid
    }
}

/// Arithmetic mean; 0 for an empty slice to avoid NaNs.
pub fn average(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// `numerator / denominator`, or 0 when the denominator is 0.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with locale thousands separators, e.g. `1,234,567.89`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
