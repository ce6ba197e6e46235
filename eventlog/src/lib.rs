//! eventlog - structured event logging with task-scoped context
//!
//! A small in-process logging facade:
//! - named loggers with five severities and hierarchical thresholds
//! - `{}` message templates, rendered only when the severity is enabled
//! - context tags (request id, user id, ...) that follow the current task
//! - interned categories (`AUDIT`, `SECURITY`, ...) for downstream routing
//! - pluggable sinks; a failing sink never disturbs the caller
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use eventlog::context::{self, TaskContext};
//! use eventlog::sink::MemorySink;
//! use eventlog::{log_error, log_info, LogConfig, LogManager, Severity};
//!
//! let sink = Arc::new(MemorySink::new());
//! let manager = LogManager::new(LogConfig::new(Severity::Info), sink.clone());
//! let logger = manager.logger("calculator");
//!
//! TaskContext::new().scope(|| {
//!     context::put("requestId", "REQ-1");
//!     log_info!(logger, "Result: {}", 10 + 5);
//!     log_error!(logger, "Error: Division by zero");
//! });
//!
//! let records = sink.records();
//! assert_eq!(records[0].message, "Result: 15");
//! assert_eq!(records[1].tag("requestId"), Some("REQ-1"));
//! ```

pub mod category;
pub mod config;
pub mod context;
pub mod error;
pub mod level;
pub mod logging;
pub mod manager;
mod macros;
pub mod record;
pub mod sink;
pub mod template;

pub use category::{Category, CategoryRegistry};
pub use config::{ConfigError, LogConfig};
pub use context::TaskContext;
pub use error::{LoggingError, SinkError};
pub use level::{Severity, Threshold};
pub use manager::{EventLogger, LogManager};
pub use record::LogRecord;
pub use sink::Sink;

/// Version of the eventlog library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
