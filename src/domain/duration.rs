//! Duration value object used for timeouts

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default timeout for the metadata lookup (5 seconds)
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 5;

/// Default time allowed for both capture permission prompts (60 seconds)
pub const DEFAULT_PERMISSION_TIMEOUT_SECS: u64 = 60;

/// Value object representing a time duration.
/// Immutable and validated on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    /// Create a Duration from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    /// Create a Duration from seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs * 1000,
        }
    }

    /// Default metadata lookup timeout
    pub const fn default_lookup_timeout() -> Self {
        Self::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS)
    }

    /// Default capture permission timeout
    pub const fn default_permission_timeout() -> Self {
        Self::from_secs(DEFAULT_PERMISSION_TIMEOUT_SECS)
    }

    /// Get duration in whole seconds
    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    /// Get duration in milliseconds
    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    /// Convert to std::time::Duration
    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Supported formats: "500ms", "30s", "1m", "2m30s"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_lowercase();
        let err = || DurationParseError {
            input: s.to_string(),
        };

        if let Some(ms) = input.strip_suffix("ms") {
            let value: u64 = ms.parse().map_err(|_| err())?;
            if value == 0 {
                return Err(err());
            }
            return Ok(Self::from_millis(value));
        }

        let mut minutes: u64 = 0;
        let mut seconds: u64 = 0;
        let mut current_num = String::new();
        let mut found_any = false;

        for ch in input.chars() {
            if ch.is_ascii_digit() {
                current_num.push(ch);
            } else if ch == 'm' && !current_num.is_empty() && !found_any {
                minutes = current_num.parse().map_err(|_| err())?;
                current_num.clear();
                found_any = true;
            } else if ch == 's' && !current_num.is_empty() {
                seconds = current_num.parse().map_err(|_| err())?;
                current_num.clear();
                found_any = true;
            } else {
                return Err(err());
            }
        }

        if !current_num.is_empty() || !found_any {
            return Err(err());
        }

        let total_ms = minutes
            .checked_mul(60)
            .and_then(|m| m.checked_add(seconds))
            .and_then(|secs| secs.checked_mul(1000))
            .ok_or_else(err)?;

        if total_ms == 0 {
            return Err(err());
        }

        Ok(Self {
            milliseconds: total_ms,
        })
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.milliseconds % 1000 != 0 {
            return write!(f, "{}ms", self.milliseconds);
        }

        let total_secs = self.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;

        if minutes == 0 {
            write!(f, "{}s", seconds)
        } else if seconds == 0 {
            write!(f, "{}m", minutes)
        } else {
            write!(f, "{}m{}s", minutes, seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_seconds_only() {
        let d: Duration = "30s".parse().unwrap();
        assert_eq!(d.as_secs(), 30);
        assert_eq!(d.as_millis(), 30000);
    }

    #[test]
    fn parse_minutes_and_seconds() {
        let d: Duration = "2m30s".parse().unwrap();
        assert_eq!(d.as_secs(), 150);
    }

    #[test]
    fn parse_milliseconds() {
        let d: Duration = "250ms".parse().unwrap();
        assert_eq!(d.as_millis(), 250);
        assert_eq!(d.as_std(), StdDuration::from_millis(250));
    }

    #[test]
    fn parse_case_insensitive_and_trimmed() {
        let d: Duration = "  1M30S ".parse().unwrap();
        assert_eq!(d.as_secs(), 90);
    }

    #[test]
    fn parse_rejects_zero_and_garbage() {
        assert!("".parse::<Duration>().is_err());
        assert!("0s".parse::<Duration>().is_err());
        assert!("0ms".parse::<Duration>().is_err());
        assert!("30".parse::<Duration>().is_err());
        assert!("30x".parse::<Duration>().is_err());
        assert!("1m2m".parse::<Duration>().is_err());
    }

    #[test]
    fn display_formats() {
        assert_eq!(Duration::from_secs(30).to_string(), "30s");
        assert_eq!(Duration::from_secs(120).to_string(), "2m");
        assert_eq!(Duration::from_secs(150).to_string(), "2m30s");
        assert_eq!(Duration::from_millis(1500).to_string(), "1500ms");
    }

    #[test]
    fn default_values() {
        assert_eq!(Duration::default_lookup_timeout().as_secs(), 5);
        assert_eq!(Duration::default_permission_timeout().as_secs(), 60);
    }
}
