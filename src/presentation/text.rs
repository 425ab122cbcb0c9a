//! Header and number formatting.

use crate::types::Value;

/// `snake_case` to `Title Case`: underscores become spaces and the first letter of every word
/// is uppercased. Existing capitals are kept, so `RECORD_COUNT` becomes `RECORD COUNT`.
pub fn humanize(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut at_word_start = true;
    for ch in key.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if at_word_start && ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !ch.is_alphanumeric();
    }
    out
}

/// en-US style number: thousands separators and at most two fractional digits.
///
/// ```rust
/// use tabular_insights::presentation::format_number;
///
/// assert_eq!(format_number(1234567.891), "1,234,567.89");
/// assert_eq!(format_number(-1500.0), "-1,500");
/// assert_eq!(format_number(0.5), "0.5");
/// ```
pub fn format_number(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    let rendered = format!("{:.2}", v.abs());
    let (int_part, frac_part) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let negative = v < 0.0 && (grouped != "0" || !frac_part.is_empty());
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Numbers become [`format_number`] strings; everything else is kept.
pub(crate) fn format_cell(value: &Value) -> Value {
    match value {
        Value::Int64(v) => Value::Utf8(format_number(*v as f64)),
        Value::Float64(v) => Value::Utf8(format_number(*v)),
        other => other.clone(),
    }
}
