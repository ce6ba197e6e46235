//! No-operation sink.

use super::Sink;
use crate::error::SinkError;
use crate::record::LogRecord;

/// A sink that discards all records.
///
/// Useful for:
/// - Unit tests where log output would be noise
/// - Benchmarks where sink cost should be eliminated
/// - Silent operation modes
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl Sink for NoOpSink {
    #[inline]
    fn write(&self, _record: &LogRecord) -> Result<(), SinkError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Severity;
    use std::sync::Arc;

    #[test]
    fn test_noop_sink_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NoOpSink>();
    }

    #[test]
    fn test_noop_sink_as_trait_object() {
        let sink: Box<dyn Sink> = Box::new(NoOpSink);
        let record = LogRecord::new(Severity::Error, Arc::from("t"), "discarded");
        assert!(sink.write(&record).is_ok());
        assert!(sink.flush().is_ok());
        assert_eq!(sink.name(), "noop");
    }

    #[test]
    fn test_noop_sink_debug_impl() {
        assert_eq!(format!("{:?}", NoOpSink), "NoOpSink");
    }
}
