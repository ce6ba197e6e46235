//! The emitted event.

use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::category::Category;
use crate::context::ContextTags;
use crate::level::Severity;

/// One log event, built after the severity check passed and handed to the
/// active sink by reference.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// When the event was emitted.
    pub timestamp: DateTime<Local>,
    /// Severity of the event.
    pub severity: Severity,
    /// Name of the emitting logger.
    pub logger: Arc<str>,
    /// Name of the emitting thread, when it has one.
    pub thread: Option<String>,
    /// The unrendered message template.
    pub template: String,
    /// Positional arguments, rendered to text, in call order.
    pub args: Vec<String>,
    /// The template with arguments substituted.
    pub message: String,
    /// Tags of the emitting task at emission time.
    pub context: ContextTags,
    /// Category attached to the call, if any.
    pub category: Option<Category>,
}

impl LogRecord {
    /// Build a record stamped with the current time and thread.
    pub fn new(severity: Severity, logger: Arc<str>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            timestamp: Local::now(),
            severity,
            logger,
            thread: std::thread::current().name().map(str::to_string),
            template: message.clone(),
            args: Vec::new(),
            message,
            context: ContextTags::new(),
            category: None,
        }
    }

    /// Whether the record carries the given category.
    pub fn has_category(&self, category: &Category) -> bool {
        self.category.as_ref() == Some(category)
    }

    /// Look up a context tag captured with the record.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.context.get(key).map(String::as_str)
    }
}
