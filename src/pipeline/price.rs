//! Market-price normalisation and display.
//!
//! Feed prices arrive as free text: `"12.5"`, `"$1,234.00"`, `""`, `"N/A"`.
//! [`parse_price`] keeps only ASCII digits and dots and parses what is left;
//! [`format_price`] turns the result into the label printed on a slot.
//! Neither ever fails: an unparseable price falls back to its raw text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Label printed when a row has no usable price at all.
pub const ZERO_PRICE: &str = "~ $0.00";

static RE_NON_PRICE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.]").unwrap());

/// Whether `raw` is an empty cell or a spreadsheet missing-value marker.
pub fn is_missing(raw: &str) -> bool {
    let t = raw.trim();
    t.is_empty()
        || t.eq_ignore_ascii_case("nan")
        || t.eq_ignore_ascii_case("null")
        || t.eq_ignore_ascii_case("none")
}

/// Parse a raw price string, or `None` if nothing numeric remains.
///
/// ```
/// use tcg_binder::pipeline::price::parse_price;
///
/// assert_eq!(parse_price("$12,345.67"), Some(12345.67));
/// assert_eq!(parse_price("N/A"), None);
/// ```
pub fn parse_price(raw: &str) -> Option<f64> {
    if is_missing(raw) {
        return None;
    }
    let cleaned = RE_NON_PRICE_CHARS.replace_all(raw, "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Slot label for a raw price.
///
/// * parseable → `"~ $1,234.50"`
/// * unparseable but present → the raw text verbatim
/// * missing → [`ZERO_PRICE`]
pub fn format_price(raw: &str) -> String {
    match parse_price(raw) {
        Some(value) => format!("~ ${}", group_thousands(value)),
        None if !is_missing(raw) => raw.to_string(),
        None => ZERO_PRICE.to_string(),
    }
}

/// Two decimal places with `,` between thousands groups.
pub fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}
