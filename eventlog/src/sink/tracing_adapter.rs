//! Bridge into the `tracing` ecosystem.

use super::layout::format_tags;
use super::Sink;
use crate::error::SinkError;
use crate::level::Severity;
use crate::record::LogRecord;

/// Sink that re-emits records as `tracing` events.
///
/// Lets an application that already runs a `tracing` subscriber (see
/// [`crate::logging::init_logging`]) receive eventlog records through its
/// existing layers. Logger name, category and context tags become event
/// fields.
///
/// Records are delivered regardless of the subscriber's own filter
/// outcome; a subscriber that is not interested simply drops them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Create a new tracing sink.
    pub fn new() -> Self {
        Self
    }
}

impl Sink for TracingSink {
    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        let logger: &str = &record.logger;
        let category = record.category.as_ref().map(|c| c.name()).unwrap_or("");
        let context = format_tags(&record.context);
        let message = &record.message;

        match record.severity {
            Severity::Trace => tracing::trace!(logger, category, %context, "{}", message),
            Severity::Debug => tracing::debug!(logger, category, %context, "{}", message),
            Severity::Info => tracing::info!(logger, category, %context, "{}", message),
            Severity::Warn => tracing::warn!(logger, category, %context, "{}", message),
            Severity::Error => tracing::error!(logger, category, %context, "{}", message),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}
