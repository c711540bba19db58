//! Lifetime strings
//!
//! Parses the `<integer><unit>` lifetimes used in configuration
//! (`7d`, `12h`, `30m`, `45s`).

use std::time::Duration;

/// Lifetime used when a configured value is missing or unparseable
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Parse `<integer><d|h|m|s>` (case-insensitive).
///
/// Returns `None` for anything else, including overflow.
pub fn parse_lifetime(raw: &str) -> Option<Duration> {
    let value = raw.trim().to_ascii_lowercase();
    let unit = value.chars().last()?;
    let digits = &value[..value.len() - unit.len_utf8()];

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let amount: u64 = digits.parse().ok()?;
    let multiplier = match unit {
        'd' => 24 * 60 * 60,
        'h' => 60 * 60,
        'm' => 60,
        's' => 1,
        _ => return None,
    };

    amount.checked_mul(multiplier).map(Duration::from_secs)
}

/// [`parse_lifetime`] with a silent fallback to [`DEFAULT_LIFETIME`]
pub fn lifetime_or_default(raw: Option<&str>) -> Duration {
    raw.and_then(parse_lifetime).unwrap_or(DEFAULT_LIFETIME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert_eq!(parse_lifetime("7d"), Some(Duration::from_secs(604_800)));
        assert_eq!(parse_lifetime("12h"), Some(Duration::from_secs(43_200)));
        assert_eq!(parse_lifetime("30m"), Some(Duration::from_secs(1_800)));
        assert_eq!(parse_lifetime("45s"), Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_case_and_whitespace() {
        assert_eq!(parse_lifetime(" 1H "), Some(Duration::from_secs(3_600)));
        assert_eq!(parse_lifetime("30D"), Some(Duration::from_secs(2_592_000)));
    }

    #[test]
    fn test_rejects_unknown_shapes() {
        assert_eq!(parse_lifetime(""), None);
        assert_eq!(parse_lifetime("d"), None);
        assert_eq!(parse_lifetime("7w"), None);
        assert_eq!(parse_lifetime("7"), None);
        assert_eq!(parse_lifetime("-7d"), None);
        assert_eq!(parse_lifetime("1.5h"), None);
        assert_eq!(parse_lifetime("7 d"), None);
        assert_eq!(parse_lifetime("7é"), None);
        assert_eq!(parse_lifetime("99999999999999999999d"), None);
    }

    #[test]
    fn test_fallback_is_silent() {
        assert_eq!(lifetime_or_default(None), DEFAULT_LIFETIME);
        assert_eq!(lifetime_or_default(Some("soon")), DEFAULT_LIFETIME);
        assert_eq!(lifetime_or_default(Some("2h")), Duration::from_secs(7_200));
    }
}
