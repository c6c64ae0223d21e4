//! Duration strings for token lifetimes
//!
//! Lifetimes are written as a positive integer followed by a single unit
//! suffix: `s` seconds, `m` minutes, `h` hours, `d` days, `w` weeks and
//! `y` years (365 days). Examples: `"15m"`, `"7d"`, `"1y"`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::time::Duration;

static DURATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)([smhdwy])$").expect("duration pattern is valid"));

/// Error returned when a duration string does not follow the grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    /// The string does not match `\d+[smhdwy]`
    Malformed(String),
    /// The amount does not fit into a number of seconds
    Overflow(String),
}

impl fmt::Display for DurationParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationParseError::Malformed(value) => {
                write!(f, "invalid duration '{}', expected <number><s|m|h|d|w|y>", value)
            }
            DurationParseError::Overflow(value) => write!(f, "duration '{}' is too large", value),
        }
    }
}

impl std::error::Error for DurationParseError {}

/// Check whether a string follows the duration grammar without converting it
pub fn is_valid_duration(value: &str) -> bool {
    DURATION_PATTERN.is_match(value)
}

/// Parse a duration string such as `"15m"` or `"7d"`
pub fn parse_duration(value: &str) -> Result<Duration, DurationParseError> {
    let captures = DURATION_PATTERN
        .captures(value)
        .ok_or_else(|| DurationParseError::Malformed(value.to_string()))?;

    let amount: u64 = captures[1]
        .parse()
        .map_err(|_| DurationParseError::Overflow(value.to_string()))?;

    let unit_seconds = match &captures[2] {
        "s" => 1,
        "m" => 60,
        "h" => 3_600,
        "d" => 86_400,
        "w" => 604_800,
        "y" => 31_536_000,
        _ => return Err(DurationParseError::Malformed(value.to_string())),
    };

    amount
        .checked_mul(unit_seconds)
        .map(Duration::from_secs)
        .ok_or_else(|| DurationParseError::Overflow(value.to_string()))
}
