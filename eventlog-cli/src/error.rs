//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the demo binary, providing consistent
//! formatting and exit codes.

use std::fmt;
use std::process;

use eventlog::{ConfigError, SinkError};

use crate::demos::DemoError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Failed to install the tracing subscriber
    LoggingInit(String),
    /// Bad `--level` directives or `EVENTLOG_LEVEL`
    Config(ConfigError),
    /// A log file could not be opened
    SinkOpen { path: String, error: SinkError },
    /// A demo returned a domain error (already logged)
    Demo(DemoError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Level directives look like: info,calculator=debug,auth=off");
                eprintln!("Valid levels: trace, debug, info, warn, error, off");
            }
            CliError::SinkOpen { .. } => {
                eprintln!();
                eprintln!("Check that --log-dir points to a writable directory.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::SinkOpen { path, error } => {
                write!(f, "Failed to open log file '{}': {}", path, error)
            }
            CliError::Demo(e) => write!(f, "Demo failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::SinkOpen { error, .. } => Some(error),
            CliError::Demo(e) => Some(e),
            CliError::LoggingInit(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<DemoError> for CliError {
    fn from(e: DemoError) -> Self {
        CliError::Demo(e)
    }
}
