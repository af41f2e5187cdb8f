use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::LoadError;

static MEMORY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(\d+(?:\.\d+)?)\s*([kmgtp]?)i?b?\s*$").unwrap());

/// Parse a human readable memory size such as `512m` or `1.5GiB` into bytes.
///
/// Units are binary, `1k` is 1024 bytes.
pub fn parse_memory_bytes(input: &str) -> Result<i64, LoadError> {
    let invalid = || LoadError::schema(format!("invalid memory size {input:?}"));

    let caps = MEMORY_RE.captures(input).ok_or_else(invalid)?;
    let number: f64 = caps[1].parse().map_err(|_| invalid())?;
    let multiplier: f64 = match caps[2].to_lowercase().as_str() {
        "" => 1.0,
        "k" => 1024.0,
        "m" => 1024f64.powi(2),
        "g" => 1024f64.powi(3),
        "t" => 1024f64.powi(4),
        "p" => 1024f64.powi(5),
        _ => return Err(invalid()),
    };

    let bytes = number * multiplier;
    if bytes > i64::MAX as f64 {
        return Err(invalid());
    }
    Ok(bytes as i64)
}
