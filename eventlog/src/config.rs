//! Threshold configuration.
//!
//! A [`LogConfig`] answers one question: what is the minimum severity for
//! logger `X`? It holds a root threshold plus per-name overrides, where the
//! most specific configured prefix of a logger name wins:
//!
//! ```
//! use eventlog::{LogConfig, Severity, Threshold};
//!
//! let config: LogConfig = "warn,calculator=debug,auth::audit=off".parse().unwrap();
//!
//! assert_eq!(config.threshold_for("calculator"), Threshold::At(Severity::Debug));
//! assert_eq!(config.threshold_for("calculator::divide"), Threshold::At(Severity::Debug));
//! assert_eq!(config.threshold_for("auth::audit"), Threshold::Off);
//! assert_eq!(config.threshold_for("student"), Threshold::At(Severity::Warn));
//! ```
//!
//! Configuration is supplied once at startup, either built in code or read
//! from the `EVENTLOG_LEVEL` environment variable using the same directive
//! syntax.

use std::collections::BTreeMap;
use std::str::FromStr;

use thiserror::Error;

use crate::level::Threshold;

/// Environment variable read by [`LogConfig::from_env`].
pub const DEFAULT_ENV_VAR: &str = "EVENTLOG_LEVEL";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A directive could not be parsed
    #[error("invalid log directive '{directive}': {reason}")]
    InvalidDirective { directive: String, reason: String },

    /// The environment variable is set but not valid unicode
    #[error("environment variable {0} is not valid unicode")]
    NotUnicode(String),
}

/// Root threshold plus per-logger-name overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    root: Threshold,
    levels: BTreeMap<String, Threshold>,
}

impl LogConfig {
    /// Config with the given root threshold and no overrides.
    pub fn new(root: impl Into<Threshold>) -> Self {
        Self {
            root: root.into(),
            levels: BTreeMap::new(),
        }
    }

    /// Builder-style override for `name`.
    pub fn with_level(mut self, name: impl Into<String>, threshold: impl Into<Threshold>) -> Self {
        self.set_level(name, threshold);
        self
    }

    /// Set the override for `name` (and everything below it).
    pub fn set_level(&mut self, name: impl Into<String>, threshold: impl Into<Threshold>) {
        self.levels.insert(name.into(), threshold.into());
    }

    /// Drop the override for `name`.
    pub fn clear_level(&mut self, name: &str) -> Option<Threshold> {
        self.levels.remove(name)
    }

    pub fn root(&self) -> Threshold {
        self.root
    }

    pub fn set_root(&mut self, threshold: impl Into<Threshold>) {
        self.root = threshold.into();
    }

    /// Configured overrides, sorted by name.
    pub fn levels(&self) -> impl Iterator<Item = (&str, Threshold)> {
        self.levels.iter().map(|(name, t)| (name.as_str(), *t))
    }

    /// Threshold for logger `name`: longest matching prefix, else root.
    pub fn threshold_for(&self, name: &str) -> Threshold {
        self.levels
            .iter()
            .filter(|(prefix, _)| name_matches_prefix(name, prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, threshold)| *threshold)
            .unwrap_or(self.root)
    }

    /// Parse a comma-separated directive list such as
    /// `"info,calculator=debug,auth=off"`.
    ///
    /// A bare level sets the root; `name=level` sets an override. Later
    /// directives replace earlier ones for the same target.
    pub fn parse_directives(directives: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for directive in directives.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match directive.split_once('=') {
                Some((name, level)) => {
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(ConfigError::InvalidDirective {
                            directive: directive.to_string(),
                            reason: "missing logger name before '='".to_string(),
                        });
                    }
                    let threshold = parse_threshold(directive, level)?;
                    config.set_level(name, threshold);
                }
                None => {
                    config.root = parse_threshold(directive, directive)?;
                }
            }
        }

        Ok(config)
    }

    /// Load from [`DEFAULT_ENV_VAR`]; defaults when it is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_var(DEFAULT_ENV_VAR)
    }

    /// Load from the named environment variable; defaults when it is unset.
    pub fn from_env_var(var: &str) -> Result<Self, ConfigError> {
        match std::env::var(var) {
            Ok(value) => Self::parse_directives(&value),
            Err(std::env::VarError::NotPresent) => Ok(Self::default()),
            Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(var.to_string())),
        }
    }
}

impl FromStr for LogConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_directives(s)
    }
}

fn parse_threshold(directive: &str, level: &str) -> Result<Threshold, ConfigError> {
    level.parse().map_err(|_| ConfigError::InvalidDirective {
        directive: directive.to_string(),
        reason: "level must be one of: trace, debug, info, warn, error, off".to_string(),
    })
}

/// Whether `prefix` names `name` itself or one of its ancestors.
///
/// Segments are separated by `::` or `.`, so `auth` matches `auth::login`
/// and `org.example.Auth` matches `org.example.Auth.inner`, but `auth` does
/// not match `authority`.
pub(crate) fn name_matches_prefix(name: &str, prefix: &str) -> bool {
    match name.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with("::") || rest.starts_with('.'),
        None => false,
    }
}
