//! Logging macros with lazy argument evaluation.
//!
//! The severity check runs before any argument expression is evaluated, so
//! something like `log_debug!(logger, "state {}", expensive())` costs one
//! atomic load when debug output is off.
//!
//! ```
//! use std::sync::Arc;
//! use eventlog::sink::MemorySink;
//! use eventlog::{log_info, log_warn, LogConfig, LogManager, Severity};
//!
//! let sink = Arc::new(MemorySink::new());
//! let manager = LogManager::new(LogConfig::new(Severity::Info), sink.clone());
//! let logger = manager.logger("auth");
//! let audit = manager.category("AUDIT");
//!
//! log_info!(logger, category: audit, "Login successful for user: {}", "admin@example.com");
//! log_warn!(logger, "Invalid grade: {}", 11);
//!
//! assert_eq!(sink.len(), 2);
//! ```

/// Log at an explicit severity, optionally with a category.
#[macro_export]
macro_rules! log_event {
    ($logger:expr, $level:expr, category: $category:expr, $template:expr $(, $arg:expr)* $(,)?) => {{
        let logger = &$logger;
        let level = $level;
        if logger.is_enabled(level) {
            logger.log_categorized(
                level,
                &$category,
                $template,
                &[$(&$arg as &dyn ::std::fmt::Display),*],
            );
        }
    }};
    ($logger:expr, $level:expr, $template:expr $(, $arg:expr)* $(,)?) => {{
        let logger = &$logger;
        let level = $level;
        if logger.is_enabled(level) {
            logger.log(level, $template, &[$(&$arg as &dyn ::std::fmt::Display),*]);
        }
    }};
}

/// Log at [`Severity::Trace`](crate::Severity::Trace).
#[macro_export]
macro_rules! log_trace {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log_event!($logger, $crate::Severity::Trace, $($rest)+)
    };
}

/// Log at [`Severity::Debug`](crate::Severity::Debug).
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log_event!($logger, $crate::Severity::Debug, $($rest)+)
    };
}

/// Log at [`Severity::Info`](crate::Severity::Info).
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log_event!($logger, $crate::Severity::Info, $($rest)+)
    };
}

/// Log at [`Severity::Warn`](crate::Severity::Warn).
#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log_event!($logger, $crate::Severity::Warn, $($rest)+)
    };
}

/// Log at [`Severity::Error`](crate::Severity::Error).
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log_event!($logger, $crate::Severity::Error, $($rest)+)
    };
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::Arc;

    use crate::sink::MemorySink;
    use crate::{LogConfig, LogManager, Severity};

    fn setup(root: Severity) -> (LogManager, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let manager = LogManager::new(LogConfig::new(root), sink.clone());
        (manager, sink)
    }

    #[test]
    fn test_suppressed_macro_skips_argument_evaluation() {
        let (manager, sink) = setup(Severity::Info);
        let logger = manager.logger("calculator");
        let calls = Cell::new(0);
        let expensive = || {
            calls.set(calls.get() + 1);
            42
        };

        log_debug!(logger, "value {}", expensive());
        assert_eq!(calls.get(), 0);
        assert!(sink.is_empty());

        log_info!(logger, "value {}", expensive());
        assert_eq!(calls.get(), 1);
        assert_eq!(sink.messages(), vec!["value 42"]);
    }

    #[test]
    fn test_macro_with_category() {
        let (manager, sink) = setup(Severity::Trace);
        let logger = manager.logger("auth");
        let security = manager.category("SECURITY");

        log_warn!(logger, category: security, "Failed login attempt for user: {}", "x@y.z");

        let records = sink.records();
        assert_eq!(records[0].severity, Severity::Warn);
        assert_eq!(records[0].category.as_ref().map(|c| c.name()), Some("SECURITY"));
    }

    #[test]
    fn test_macro_variants_and_trailing_comma() {
        let (manager, sink) = setup(Severity::Trace);
        let logger = manager.logger("levels");

        log_trace!(logger, "trace");
        log_debug!(logger, "{} + {}", 1, 2,);
        log_info!(logger, "info");
        log_warn!(logger, "warn");
        log_error!(logger, "error {}", "x");
        log_event!(logger, Severity::Info, "explicit");

        assert_eq!(
            sink.messages(),
            vec!["trace", "1 + 2", "info", "warn", "error x", "explicit"]
        );
    }

    #[test]
    fn test_macro_accepts_borrowed_logger() {
        let (manager, sink) = setup(Severity::Info);
        let logger = manager.logger("student");
        let by_ref = &logger;

        log_info!(by_ref, "Student: {}", "Juan");
        assert_eq!(sink.len(), 1);
    }
}
