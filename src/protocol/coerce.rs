//! Explicit Value Coercions
//!
//! Commands arrive as plain text, while documents hold JSON values. Several
//! commands need to compare the two worlds:
//!
//! - `SET` sniffs whether its last token is a TTL number.
//! - `RANGE` parses its bounds and reads numeric fields out of documents.
//! - `INDEX` compares a typed-in value against stored field values.
//!
//! Every conversion here is total: it either produces a value or reports
//! "not applicable" through `Option`, and the caller decides what that means.

use serde_json::Value;

/// Parses a command token as a number.
///
/// Surrounding whitespace is ignored. Literals too large for an `f64`
/// become infinite, and `Infinity`, `+Infinity` and `-Infinity` are accepted
/// as written. Empty input, `NaN` and other spellings of infinity (`inf`,
/// `infinity`) are rejected.
///
/// # Example
///
/// ```
/// use indexkv::protocol::parse_number;
///
/// assert_eq!(parse_number("42"), Some(42.0));
/// assert_eq!(parse_number("-1.5"), Some(-1.5));
/// assert_eq!(parse_number("1e400"), Some(f64::INFINITY));
/// assert_eq!(parse_number("{\"a\":1}"), None);
/// ```
pub fn parse_number(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);

    if unsigned == "Infinity" {
        return Some(if trimmed.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    // f64's parser also takes `inf`, `infinity` and `nan` in any case
    if unsigned.is_empty() || unsigned.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }

    trimmed.parse::<f64>().ok()
}

/// Reads a document field as a number.
///
/// JSON numbers are used directly; strings are accepted when they hold a
/// number in the [`parse_number`] sense. Everything else is not numeric.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Renders a number the way it is shown to users and used in bucket names.
///
/// Uses the shortest digits that round-trip. Integral values print without
/// a fractional part (`5`, not `5.0`). Plain notation is used for decimal
/// exponents from -7 to 20; outside that the output is `1.5e-7` or `1e+21`.
///
/// | value       | text                     |
/// |-------------|--------------------------|
/// | `5.0`       | `5`                      |
/// | `0.000001`  | `0.000001`               |
/// | `1e-7`      | `1e-7`                   |
/// | `1e20`      | `100000000000000000000`  |
/// | `1e21`      | `1e+21`                  |
/// | `-inf`      | `-Infinity`              |
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    // `{:e}` yields the shortest round-trip digits, e.g. `1.25e-7`
    let scientific = format!("{:e}", n.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);

    let k = digits.len() as i32;
    // Position of the decimal point relative to the first digit
    let point = exponent + 1;

    let body = if k <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (whole, fraction) = digits.split_at(point as usize);
        format!("{}.{}", whole, fraction)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let (first, rest) = digits.split_at(1);
        let sign = if exponent < 0 { '-' } else { '+' };
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, exponent.abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, exponent.abs())
        }
    };

    if n < 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

/// Produces the canonical string form of a JSON value.
///
/// This is the form stored in a record's value snapshot and compared against
/// the value token of an `INDEX` command.
///
/// | JSON            | canonical          |
/// |-----------------|--------------------|
/// | `"active"`      | `active`           |
/// | `5`, `5.0`      | `5`                |
/// | `1e21`          | `1e+21`            |
/// | `true`          | `true`             |
/// | `null`          | `null`             |
/// | `[1, null, 2]`  | `1,,2`             |
/// | `{...}`         | `[object Object]`  |
pub fn canonical_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => canonical_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
