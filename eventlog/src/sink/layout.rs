//! Single-line text layout shared by the console and file sinks.
//!
//! ```text
//! 2024-01-15 14:30:25.123 [main] INFO  calculator [requestId=REQ-1] {AUDIT} - Result: 15
//! ```

use std::fmt::Write;

use crate::context::ContextTags;
use crate::record::LogRecord;

/// Timestamp format used in rendered lines.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Render `record` as one line, without a trailing newline.
pub fn format_line(record: &LogRecord) -> String {
    let mut line = String::with_capacity(64 + record.message.len());
    let _ = write!(
        line,
        "{} [{}] {:<5} {}",
        record.timestamp.format(TIMESTAMP_FORMAT),
        record.thread.as_deref().unwrap_or("unnamed"),
        record.severity,
        record.logger,
    );
    if !record.context.is_empty() {
        let _ = write!(line, " [{}]", format_tags(&record.context));
    }
    if let Some(category) = &record.category {
        let _ = write!(line, " {{{}}}", category);
    }
    let _ = write!(line, " - {}", record.message);
    line
}

/// `key=value` pairs joined by `", "`, in key order.
pub fn format_tags(tags: &ContextTags) -> String {
    tags.iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(", ")
}
