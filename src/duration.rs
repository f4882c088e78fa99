//! Human-readable request timeouts: "30s", "1500ms", "2m", "1h".

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{de, Deserialize, Deserializer};

/// Parse `<number><unit>` where unit is `ms`, `s`, `m` or `h`.
///
/// Case-insensitive, surrounding whitespace ignored.
///
/// ```
/// use walletfolio::duration::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
/// assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
/// assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
/// ```
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .context("Duration must end with ms, s, m, or h")?;
    let (num, unit) = s.split_at(split);

    let num: u64 = num
        .parse()
        .with_context(|| format!("Invalid number in duration {s:?}"))?;

    let millis = match unit.trim() {
        "ms" => Some(num),
        "s" => num.checked_mul(1_000),
        "m" => num.checked_mul(60 * 1_000),
        "h" => num.checked_mul(60 * 60 * 1_000),
        other => anyhow::bail!("Unknown duration unit {other:?}; use ms, s, m, or h"),
    }
    .context("Duration is too large")?;

    Ok(Duration::from_millis(millis))
}

/// Inverse of [`parse_duration`], using the largest unit that divides evenly.
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis();
    if millis == 0 {
        return "0s".to_string();
    }

    for (unit, size) in [("h", 3_600_000u128), ("m", 60_000), ("s", 1_000)] {
        if millis % size == 0 {
            return format!("{}{unit}", millis / size);
        }
    }
    format!("{millis}ms")
}

/// Serde adapter, for `#[serde(deserialize_with = "deserialize_duration")]`.
pub fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(de::Error::custom)
}
