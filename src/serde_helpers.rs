//! Serde helpers for host-supplied configuration
//!
//! Editor hosts often hand numbers over as floats (`1e6` for a byte limit),
//! so limits accept any non-negative JSON number.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonNumber {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

/// Deserialize an optional byte count from an integer or float.
///
/// Fractional values are truncated; negative and non-finite values are rejected.
pub fn deserialize_byte_limit<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<JsonNumber> = Option::deserialize(deserializer)?;

    match value {
        None => Ok(None),
        Some(JsonNumber::Unsigned(n)) => Ok(Some(n)),
        Some(JsonNumber::Signed(n)) => u64::try_from(n)
            .map(Some)
            .map_err(|_| D::Error::custom(format!("byte limit must not be negative, got {}", n))),
        Some(JsonNumber::Float(f)) if f.is_finite() && f >= 0.0 => Ok(Some(f.trunc() as u64)),
        Some(JsonNumber::Float(f)) => Err(D::Error::custom(format!(
            "byte limit must be a finite non-negative number, got {}",
            f
        ))),
    }
}
