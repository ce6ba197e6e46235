//! Sink abstraction: where records go.
//!
//! The manager depends only on the [`Sink`] trait, so the destination is a
//! matter of wiring at startup. Implementations here cover the common
//! cases:
//!
//! - [`ConsoleSink`]: one pattern-formatted line per record on stdout/stderr
//! - [`FileSink`]: the same lines appended to a file in a log directory
//! - [`MemorySink`]: keeps records in memory for tests and inspection
//! - [`NoOpSink`]: discards everything
//! - [`TracingSink`]: re-emits records as `tracing` events
//! - [`RoutingSink`]: fans records out to several sinks by filter
//! - [`AsyncSink`]: moves writes of another sink to a background thread
//!   behind a bounded queue

mod async_sink;
mod console;
mod file;
pub mod layout;
mod memory;
mod noop;
mod routing;
mod tracing_adapter;

use std::sync::Arc;

use crate::error::SinkError;
use crate::record::LogRecord;

pub use async_sink::{AsyncSink, OverflowPolicy, DEFAULT_FLUSH_TIMEOUT, DEFAULT_QUEUE_CAPACITY};
pub use console::{ConsoleSink, ConsoleTarget};
pub use file::FileSink;
pub use memory::MemorySink;
pub use noop::NoOpSink;
pub use routing::{RecordFilter, Route, RoutingSink};
pub use tracing_adapter::TracingSink;

/// Destination for log records.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the manager shares one sink
/// across every logger and thread.
pub trait Sink: Send + Sync {
    /// Record one event. Errors are reported by the manager, never to the
    /// code that logged.
    fn write(&self, record: &LogRecord) -> Result<(), SinkError>;

    /// Push buffered output to its destination.
    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Short name used when reporting failures.
    fn name(&self) -> &str;
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        (**self).write(record)
    }

    fn flush(&self) -> Result<(), SinkError> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
