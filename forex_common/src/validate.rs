//! Numeric validation and sanitization of vendor fields.

use serde_json::Value;

/// `true` iff `x` is a finite, non-NaN number.
pub fn is_valid_number(x: f64) -> bool {
    x.is_finite()
}

/// Reads a vendor field as `f64`, returning `fallback` when it is absent, null,
/// non-numeric, NaN or infinite. Numeric strings are accepted.
pub fn safe_parse_float(value: Option<&Value>, fallback: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_leading_float(s),
        _ => None,
    };
    match parsed {
        Some(x) if is_valid_number(x) => x,
        _ => fallback,
    }
}

/// Like `parseFloat`: takes the longest numeric prefix, so `"1.08 USD"` reads as `1.08`.
fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_exp = false;
    let bytes = s.as_bytes();
    while end < bytes.len() {
        let c = bytes[end];
        let ok = match c {
            b'0'..=b'9' => true,
            b'+' | b'-' => end == 0 || matches!(bytes[end - 1], b'e' | b'E'),
            b'.' if !seen_dot && !seen_exp => {
                seen_dot = true;
                true
            }
            b'e' | b'E' if !seen_exp && end > 0 => {
                seen_exp = true;
                true
            }
            _ => false,
        };
        if !ok {
            break;
        }
        end += 1;
    }
    // Back off a dangling exponent or sign, e.g. "1e" or "2e-".
    let mut candidate = &s[..end];
    while !candidate.is_empty() {
        if let Ok(x) = candidate.parse::<f64>() {
            return Some(x);
        }
        candidate = &candidate[..candidate.len() - 1];
    }
    None
}

/// Reads an integer timestamp field; numeric strings and floats are truncated.
pub fn safe_parse_timestamp(value: Option<&Value>) -> Option<i64> {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|x| is_valid_number(*x)).map(|x| x as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
