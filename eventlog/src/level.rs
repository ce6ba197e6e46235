//! Severity levels and configured thresholds.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Severity of a log record.
///
/// Ordered from least to most severe, so a threshold comparison is a plain
/// `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Severity {
    /// Very fine-grained diagnostics
    Trace = 0,
    /// Technical details useful while debugging
    Debug = 1,
    /// Normal business events
    Info = 2,
    /// Unusual but recoverable situations
    Warn = 3,
    /// Failures that need attention
    Error = 4,
}

impl Severity {
    /// All severities in ascending order.
    pub const ALL: [Severity; 5] = [
        Severity::Trace,
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
    ];

    /// Upper-case label used in rendered output (`"INFO"`, `"WARN"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }

    pub(crate) fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `pad` so that `{:<5}` alignment works in layouts
        f.pad(self.as_str())
    }
}

/// Error returned when a level name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level '{0}' (expected trace, debug, info, warn, error or off)")]
pub struct ParseLevelError(pub String);

impl FromStr for Severity {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Severity::Trace),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl From<Severity> for tracing::Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Trace => tracing::Level::TRACE,
            Severity::Debug => tracing::Level::DEBUG,
            Severity::Info => tracing::Level::INFO,
            Severity::Warn => tracing::Level::WARN,
            Severity::Error => tracing::Level::ERROR,
        }
    }
}

/// Minimum severity a logger accepts.
///
/// `Off` suppresses everything and only exists in configuration; no record
/// ever carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Threshold {
    /// Records at this severity or above are emitted.
    At(Severity),
    /// Nothing is emitted.
    Off,
}

/// Sentinel stored in per-logger atomics for [`Threshold::Off`].
pub(crate) const OFF_SENTINEL: u8 = u8::MAX;

impl Threshold {
    /// Whether a record of `severity` passes this threshold.
    #[inline]
    pub fn allows(&self, severity: Severity) -> bool {
        match self {
            Threshold::At(min) => severity >= *min,
            Threshold::Off => false,
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Threshold::At(severity) => severity.as_u8(),
            Threshold::Off => OFF_SENTINEL,
        }
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold::At(Severity::Info)
    }
}

impl From<Severity> for Threshold {
    fn from(severity: Severity) -> Self {
        Threshold::At(severity)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::At(severity) => fmt::Display::fmt(severity, f),
            Threshold::Off => f.pad("OFF"),
        }
    }
}

impl FromStr for Threshold {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("off") {
            return Ok(Threshold::Off);
        }
        s.parse().map(Threshold::At)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Debug);
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
    }

    #[test]
    fn test_severity_display_is_padded() {
        assert_eq!(format!("{:<5}", Severity::Info), "INFO ");
        assert_eq!(Severity::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_parse_severity() {
        assert_eq!("DEBUG".parse::<Severity>().unwrap(), Severity::Debug);
        assert_eq!(" warning ".parse::<Severity>().unwrap(), Severity::Warn);
        assert!("verbose".parse::<Severity>().is_err());
    }

    #[test]
    fn test_parse_threshold_off() {
        assert_eq!("off".parse::<Threshold>().unwrap(), Threshold::Off);
        assert_eq!(
            "trace".parse::<Threshold>().unwrap(),
            Threshold::At(Severity::Trace)
        );
    }

    #[test]
    fn test_threshold_allows() {
        let info = Threshold::At(Severity::Info);
        assert!(!info.allows(Severity::Debug));
        assert!(info.allows(Severity::Info));
        assert!(info.allows(Severity::Error));

        for severity in Severity::ALL {
            assert!(!Threshold::Off.allows(severity));
        }
    }

    #[test]
    fn test_default_threshold_is_info() {
        assert_eq!(Threshold::default(), Threshold::At(Severity::Info));
    }

    #[test]
    fn test_into_tracing_level() {
        let level: tracing::Level = Severity::Warn.into();
        assert_eq!(level, tracing::Level::WARN);
    }
}
