//! JSON text that matches what legacy JavaScript clients produce.
//!
//! Serialization goes through `serde_json`; only float rendering differs,
//! following `Number#toString` so `120.0` prints as `120` and `1e-7` stays in
//! exponent form.

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{Formatter, Serializer};
use std::io;

/// `serde_json` formatter with JavaScript float rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsNumberFormatter;

impl Formatter for JsNumberFormatter {
    fn write_f32<W>(&mut self, writer: &mut W, value: f32) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(js_number(f64::from(value)).as_bytes())
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(js_number(value).as_bytes())
    }
}

/// Serialize `value` compactly with [`JsNumberFormatter`].
pub fn to_js_string<T>(value: &T) -> Result<String, serde_json::Error>
where
    T: ?Sized + Serialize,
{
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, JsNumberFormatter);
    value.serialize(&mut serializer)?;
    // serde_json only writes valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Replace every `null`, at any depth, with the empty string.
pub fn replace_nulls(value: &Value) -> Value {
    match value {
        Value::Null => Value::String(String::new()),
        Value::Array(items) => Value::Array(items.iter().map(replace_nulls).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), replace_nulls(item)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Render a finite float the way `Number.prototype.toString` does.
///
/// Rust's `{:e}` already yields the shortest round-trip digits; only their
/// placement differs from JavaScript.
pub fn js_number(value: f64) -> String {
    if !value.is_finite() {
        return "null".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let scientific = format!("{:e}", value.abs());
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };
    let digits: String = mantissa.chars().filter(|ch| *ch != '.').collect();
    let sign = if value < 0.0 { "-" } else { "" };
    let k = digits.len() as i32;
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let exp_sign = if n - 1 < 0 { '-' } else { '+' };
        let (lead, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{lead}e{exp_sign}{}", (n - 1).abs())
        } else {
            format!("{lead}.{rest}e{exp_sign}{}", (n - 1).abs())
        }
    };
    format!("{sign}{body}")
}
