//! Numeric Formatter - Swiss Conventions
//!
//! Prefix currency symbol, thin-space thousands groups, two fractional
//! digits, accounting parentheses for negatives. Normalization is
//! best-effort: text that does not classify as numeric comes back unchanged.

use serde::{Deserialize, Serialize};

use crate::rounding::round_half_up;

pub const THIN_SPACE: char = '\u{2009}';

/// ISO code to display symbol. Unknown codes render as `$`.
pub static CURRENCY_SYMBOLS: [(&str, &str); 7] = [
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("JPY", "¥"),
    ("CHF", "Fr"),
    ("CAD", "C$"),
    ("AUD", "A$"),
];

pub fn currency_symbol(code: &str) -> &'static str {
    CURRENCY_SYMBOLS
        .iter()
        .find(|(c, _)| *c == code)
        .map_or("$", |(_, sym)| *sym)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThousandsStyle {
    #[default]
    ThinSpace,
    Space,
}

impl ThousandsStyle {
    /// ASCII output always groups with an ordinary space.
    pub fn separator(self, ascii_only: bool) -> char {
        if ascii_only || self == Self::Space {
            ' '
        } else {
            THIN_SPACE
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeStyle {
    #[default]
    Parentheses,
}

/// Formatting conventions for one render call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub ascii_only: bool,
    #[serde(default)]
    pub thousands: ThousandsStyle,
    #[serde(default)]
    pub negatives: NegativeStyle,
}

pub(crate) fn default_currency() -> String {
    "USD".to_string()
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            ascii_only: false,
            thousands: ThousandsStyle::default(),
            negatives: NegativeStyle::default(),
        }
    }
}

impl NumberFormat {
    pub fn separator(&self) -> char {
        self.thousands.separator(self.ascii_only)
    }

    pub fn currency(&self, value: f64) -> String {
        let body = format!(
            "{}{}",
            currency_symbol(&self.currency),
            grouped_fixed(value.abs(), 2, self.separator())
        );
        match self.negatives {
            NegativeStyle::Parentheses if value < 0.0 => format!("({body})"),
            NegativeStyle::Parentheses => body,
        }
    }

    /// Re-render numeric-looking `text`; anything else is returned as-is.
    pub fn normalize(&self, text: &str) -> String {
        let Some(parsed) = parse_decorated(text) else {
            return text.to_string();
        };
        let clean = text.trim();
        let negative = clean.contains('(') || clean.starts_with('-');
        let value = if negative { -parsed.abs() } else { parsed };

        if CURRENCY_SYMBOLS.iter().any(|(_, sym)| clean.contains(sym)) {
            return self.currency(value);
        }
        if clean.ends_with('%') {
            return format_percent(value, 1);
        }

        let sign = if value < 0.0 { "-" } else { "" };
        let magnitude = value.abs();
        if magnitude >= 1000.0 {
            let decimals = if magnitude.fract() == 0.0 { 0 } else { 1 };
            format!("{sign}{}", grouped_fixed(magnitude, decimals, self.separator()))
        } else if value.fract() == 0.0 {
            format!("{sign}{}", fixed_half_up(magnitude, 0))
        } else {
            format!("{sign}{}", fixed_half_up(magnitude, 1))
        }
    }
}

/// `value` with exactly two fractional digits, grouped, symbol-prefixed.
/// Negatives are wrapped in parentheses.
pub fn format_currency(value: f64, currency: &str, ascii_only: bool) -> String {
    NumberFormat {
        currency: currency.to_string(),
        ascii_only,
        ..NumberFormat::default()
    }
    .currency(value)
}

/// Signed percentage with `decimals` fractional digits; zero is `"0%"`.
pub fn format_percent(value: f64, decimals: usize) -> String {
    if value == 0.0 {
        return "0%".to_string();
    }
    let sign = if value > 0.0 { '+' } else { '-' };
    format!("{sign}{}%", fixed_half_up(value.abs(), decimals))
}

/// Best-effort normalization of free-form numeric text.
pub fn normalize_number(text: &str, currency: &str, ascii_only: bool) -> String {
    NumberFormat {
        currency: currency.to_string(),
        ascii_only,
        ..NumberFormat::default()
    }
    .normalize(text)
}

/// True when `text`, stripped of sign, parentheses, currency symbol, percent
/// sign and grouping, parses as a finite number.
pub fn is_numeric_like(text: &str) -> bool {
    parse_decorated(text).is_some()
}

/// Split a formatted number into `(prefix, integer, fraction + suffix)` for
/// decimal-point alignment.
///
/// `"($1 234.50)"` splits into `("($", "1 234", "50)")`.
pub fn split_decimal_for_align(text: &str) -> (String, String, String) {
    let t = text.trim();
    let is_body = |c: char| c.is_ascii_digit() || c == '.';
    let body_start = t.find(is_body).unwrap_or(t.len());
    let (prefix, rest) = t.split_at(body_start);
    // digits and '.' are single-byte
    let body_end = rest.rfind(is_body).map_or(0, |i| i + 1);
    let (body, suffix) = rest.split_at(body_end);

    match body.split_once('.') {
        Some((integer, fraction)) => (
            prefix.to_string(),
            integer.to_string(),
            format!("{fraction}{suffix}"),
        ),
        None => (prefix.to_string(), body.to_string(), suffix.to_string()),
    }
}

pub(crate) fn parse_decorated(text: &str) -> Option<f64> {
    let stripped: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | ',') && !c.is_whitespace())
        .collect();
    let (sign, unsigned) = match stripped.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", stripped.strip_prefix('+').unwrap_or(&stripped)),
    };
    let unsigned = strip_currency_prefix(unsigned);
    let unsigned = unsigned.strip_suffix('%').unwrap_or(unsigned);
    if !unsigned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: f64 = format!("{sign}{unsigned}").parse().ok()?;
    value.is_finite().then_some(value)
}

fn strip_currency_prefix(text: &str) -> &str {
    CURRENCY_SYMBOLS
        .iter()
        .find_map(|(_, sym)| text.strip_prefix(sym))
        .unwrap_or(text)
}

/// `magnitude` in fixed notation with its integer part grouped by three.
fn grouped_fixed(magnitude: f64, decimals: usize, sep: char) -> String {
    let fixed = fixed_half_up(magnitude, decimals);
    match fixed.split_once('.') {
        Some((integer, fraction)) => format!("{}.{fraction}", group_thousands(integer, sep)),
        None => group_thousands(&fixed, sep),
    }
}

/// `magnitude` with `decimals` fractional digits, ties rounded up.
fn fixed_half_up(magnitude: f64, decimals: usize) -> String {
    let scaled = magnitude * 10f64.powi(decimals.min(i32::MAX as usize) as i32);
    // past 2^53 there is no fraction left to round
    if !(scaled < 9.0e15) {
        return format!("{magnitude:.decimals$}");
    }
    let units = round_half_up(scaled).unsigned_abs();
    let digits = format!("{units:0>width$}", width = decimals + 1);
    let (integer, fraction) = digits.split_at(digits.len() - decimals);
    if fraction.is_empty() {
        integer.to_string()
    } else {
        format!("{integer}.{fraction}")
    }
}

fn group_thousands(digits: &str, sep: char) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(digits.len() + len / 3 * sep.len_utf8());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    out
}
