//! In-memory capture.

use parking_lot::Mutex;

use super::Sink;
use crate::error::SinkError;
use crate::record::LogRecord;

/// Keeps every record it receives, in arrival order.
///
/// Meant for tests and for callers that want to inspect what was logged:
///
/// ```
/// use std::sync::Arc;
/// use eventlog::{LogManager, LogConfig, Severity};
/// use eventlog::sink::MemorySink;
///
/// let sink = Arc::new(MemorySink::new());
/// let manager = LogManager::builder()
///     .config(LogConfig::new(Severity::Info))
///     .sink(sink.clone())
///     .build();
///
/// let logger = manager.logger("calculator");
/// logger.debug("hidden", &[]);
/// logger.info("Result: {}", &[&15]);
///
/// assert_eq!(sink.messages(), vec!["Result: 15".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all captured records.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Rendered messages of all captured records.
    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|record| record.message.clone())
            .collect()
    }

    /// Remove and return all captured records.
    pub fn take(&self) -> Vec<LogRecord> {
        std::mem::take(&mut *self.records.lock())
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
