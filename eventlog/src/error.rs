//! Infrastructure errors.
//!
//! None of these ever reach code that calls a logger. Sinks return
//! [`SinkError`]; the manager wraps failures in [`LoggingError`] and hands
//! them to the fallback reporter.

use std::time::Duration;

use thiserror::Error;

/// Failure of a single sink write or flush.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Underlying writer failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sink could not be opened
    #[error("failed to initialize sink: {0}")]
    Init(String),

    /// Bounded queue stayed full for the whole timeout
    #[error("timed out after {0:?} waiting for queue space")]
    Timeout(Duration),

    /// Queued records were not written before the flush deadline
    #[error("timed out after {0:?} waiting for queued records to drain")]
    FlushTimeout(Duration),

    /// Sink has been shut down
    #[error("sink is closed")]
    Closed,

    /// Sink refused the record for another reason
    #[error("record rejected: {0}")]
    Rejected(String),

    /// Earlier writes failed on a background thread
    #[error("{failed} background write(s) failed, last: {last}")]
    Background { failed: usize, last: String },

    /// One or more routes of a routing sink failed
    #[error("{}", describe_route_failures(.0))]
    Routes(Vec<(String, SinkError)>),
}

fn describe_route_failures(failures: &[(String, SinkError)]) -> String {
    let details: Vec<String> = failures
        .iter()
        .map(|(sink, error)| format!("{}: {}", sink, error))
        .collect();
    format!("{} route(s) failed: {}", failures.len(), details.join("; "))
}

/// An error inside the logging machinery, reported through the fallback
/// channel and then swallowed.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A sink returned an error
    #[error("sink '{sink}' failed: {source}")]
    Sink {
        sink: String,
        #[source]
        source: SinkError,
    },

    /// A sink panicked while writing
    #[error("sink '{sink}' panicked while writing a record")]
    SinkPanicked { sink: String },

    /// An argument could not be rendered
    #[error("logger '{logger}': {count} argument(s) failed to render")]
    Format { logger: String, count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_error_display() {
        let err = SinkError::Timeout(Duration::from_millis(50));
        assert_eq!(err.to_string(), "timed out after 50ms waiting for queue space");
        let err = SinkError::FlushTimeout(Duration::from_secs(5));
        assert_eq!(
            err.to_string(),
            "timed out after 5s waiting for queued records to drain"
        );
        assert_eq!(SinkError::Closed.to_string(), "sink is closed");
    }

    #[test]
    fn test_logging_error_keeps_source() {
        use std::error::Error as _;

        let err = LoggingError::Sink {
            sink: "file".to_string(),
            source: SinkError::Rejected("disk full".to_string()),
        };
        assert_eq!(err.to_string(), "sink 'file' failed: record rejected: disk full");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_routes_error_lists_each_failure() {
        let err = SinkError::Routes(vec![
            ("file:a.log".to_string(), SinkError::Closed),
            ("memory".to_string(), SinkError::Rejected("full".to_string())),
        ]);
        assert_eq!(
            err.to_string(),
            "2 route(s) failed: file:a.log: sink is closed; memory: record rejected: full"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: SinkError = io.into();
        assert!(matches!(err, SinkError::Io(_)));
    }
}
