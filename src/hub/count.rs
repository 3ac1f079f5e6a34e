//! Lenient parsing of popularity counts
//!
//! Hubs report counts as integers, floats, or human-formatted strings
//! (`"295,137"`, `"1.7k"`, `"3.1m"`). Everything is normalized to `u64`.

use crate::hub::{HubError, HubResult};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Parses a human-formatted count
///
/// Empty strings and `"-"` mean zero. A trailing `k`, `m` or `b` scales by
/// a thousand, a million or a billion.
pub fn parse_count(raw: &str) -> HubResult<u64> {
    let s = raw.trim().replace(',', "");
    if s.is_empty() || s == "-" {
        return Ok(0);
    }

    let (number, scale) = match s.chars().last() {
        Some('k' | 'K') => (&s[..s.len() - 1], 1_000.0),
        Some('m' | 'M') => (&s[..s.len() - 1], 1_000_000.0),
        Some('b' | 'B') => (&s[..s.len() - 1], 1_000_000_000.0),
        _ => (s.as_str(), 1.0),
    };

    if scale == 1.0 {
        if let Ok(value) = number.parse::<u64>() {
            return Ok(value);
        }
    }

    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| HubError::Parse(format!("invalid count '{}'", raw)))?;
    if !value.is_finite() || value < 0.0 {
        return Err(HubError::Parse(format!("invalid count '{}'", raw)));
    }
    Ok((value * scale).round() as u64)
}

/// Serde adapter accepting numbers, count strings, or null
pub(crate) fn lenient<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(0),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .ok_or_else(|| D::Error::custom(format!("invalid count {}", n))),
        Some(serde_json::Value::String(s)) => parse_count(&s).map_err(D::Error::custom),
        Some(other) => Err(D::Error::custom(format!("invalid count {}", other))),
    }
}
