//! Logger registry, dispatch and failure containment.
//!
//! A [`LogManager`] owns the process-wide logging state: the threshold
//! configuration, the active sink, the category registry and one shared
//! state object per logger name. [`EventLogger`] handles are cheap clones
//! pointing into it.
//!
//! # Failure containment
//!
//! Logging never fails the caller. Sink errors, sink panics and arguments
//! that cannot be rendered are turned into [`LoggingError`]s, counted, and
//! handed once to the fallback reporter (stderr by default). The caller's
//! control flow and return values are unaffected.

use std::fmt;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::Local;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::category::{Category, CategoryRegistry};
use crate::config::LogConfig;
use crate::context;
use crate::error::LoggingError;
use crate::level::{Severity, Threshold, OFF_SENTINEL};
use crate::record::LogRecord;
use crate::sink::{ConsoleSink, Sink};
use crate::template;

/// Callback that receives infrastructure errors.
pub type FallbackReporter = Arc<dyn Fn(&LoggingError) + Send + Sync>;

static GLOBAL: OnceLock<LogManager> = OnceLock::new();

/// Install `manager` as the process-wide manager used by
/// [`EventLogger::for_name`].
///
/// Only the first call succeeds; later calls get their manager back.
pub fn install_global(manager: LogManager) -> Result<(), LogManager> {
    GLOBAL.set(manager)
}

/// The process-wide manager.
///
/// If none was installed, one is created on first use with a stdout console
/// sink and the configuration from `EVENTLOG_LEVEL`.
pub fn global() -> &'static LogManager {
    GLOBAL.get_or_init(LogManager::from_env)
}

/// Default fallback: one line on stderr, ignoring failures to write it.
fn report_to_stderr(error: &LoggingError) {
    let _ = writeln!(std::io::stderr().lock(), "eventlog: {}", error);
}

struct LoggerState {
    name: Arc<str>,
    threshold: AtomicU8,
}

impl LoggerState {
    fn threshold(&self) -> Threshold {
        match self.threshold.load(Ordering::Relaxed) {
            OFF_SENTINEL => Threshold::Off,
            raw => Severity::ALL
                .into_iter()
                .find(|s| s.as_u8() == raw)
                .map(Threshold::At)
                .unwrap_or(Threshold::Off),
        }
    }
}

struct ManagerInner {
    config: RwLock<LogConfig>,
    sink: RwLock<Arc<dyn Sink>>,
    categories: CategoryRegistry,
    loggers: DashMap<String, Arc<LoggerState>>,
    fallback: FallbackReporter,
    infrastructure_errors: AtomicU64,
}

impl ManagerInner {
    fn dispatch(&self, record: &LogRecord) {
        let sink = Arc::clone(&*self.sink.read());
        match panic::catch_unwind(AssertUnwindSafe(|| sink.write(record))) {
            Ok(Ok(())) => {}
            Ok(Err(source)) => self.report(LoggingError::Sink {
                sink: sink.name().to_string(),
                source,
            }),
            Err(_) => self.report(LoggingError::SinkPanicked {
                sink: sink.name().to_string(),
            }),
        }
    }

    fn report(&self, error: LoggingError) {
        self.infrastructure_errors.fetch_add(1, Ordering::Relaxed);
        let fallback = Arc::clone(&self.fallback);
        let _ = panic::catch_unwind(AssertUnwindSafe(|| fallback(&error)));
    }

    fn refresh_thresholds(&self, config: &LogConfig) {
        for entry in self.loggers.iter() {
            let threshold = config.threshold_for(entry.key());
            entry.value().threshold.store(threshold.to_u8(), Ordering::Relaxed);
        }
    }
}

/// Process-wide logging state.
///
/// Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct LogManager {
    inner: Arc<ManagerInner>,
}

impl LogManager {
    /// Manager with `config` and `sink`, reporting failures to stderr.
    pub fn new(config: LogConfig, sink: Arc<dyn Sink>) -> Self {
        Self::builder().config(config).sink(sink).build()
    }

    pub fn builder() -> LogManagerBuilder {
        LogManagerBuilder::default()
    }

    /// Stdout console sink with configuration from `EVENTLOG_LEVEL`.
    ///
    /// A malformed variable is reported on stderr and the defaults are used.
    pub fn from_env() -> Self {
        let config = LogConfig::from_env().unwrap_or_else(|e| {
            let _ = writeln!(std::io::stderr().lock(), "eventlog: {}; using defaults", e);
            LogConfig::default()
        });
        Self::new(config, Arc::new(ConsoleSink::stdout()))
    }

    /// Logger for `name`.
    ///
    /// Every call with the same name returns a handle to the same shared
    /// state, so a level change for that name is seen by all of them.
    pub fn logger(&self, name: &str) -> EventLogger {
        if let Some(state) = self.inner.loggers.get(name) {
            return EventLogger {
                state: Arc::clone(state.value()),
                manager: Arc::clone(&self.inner),
            };
        }

        // config lock before map lock, same order as set_level
        let config = self.inner.config.read();
        let state = self
            .inner
            .loggers
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(LoggerState {
                    name: Arc::from(name),
                    threshold: AtomicU8::new(config.threshold_for(name).to_u8()),
                })
            })
            .clone();
        drop(config);

        EventLogger {
            state,
            manager: Arc::clone(&self.inner),
        }
    }

    /// Intern a category in this manager's registry.
    pub fn category(&self, name: &str) -> Category {
        self.inner.categories.intern(name)
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.inner.categories
    }

    /// Copy of the current configuration.
    pub fn config(&self) -> LogConfig {
        self.inner.config.read().clone()
    }

    /// Threshold that applies to logger `name`.
    pub fn threshold_for(&self, name: &str) -> Threshold {
        self.inner.config.read().threshold_for(name)
    }

    /// Override the threshold for `name` and everything below it.
    pub fn set_level(&self, name: &str, threshold: impl Into<Threshold>) {
        let mut config = self.inner.config.write();
        config.set_level(name, threshold);
        self.inner.refresh_thresholds(&config);
    }

    /// Change the root threshold.
    pub fn set_root_level(&self, threshold: impl Into<Threshold>) {
        let mut config = self.inner.config.write();
        config.set_root(threshold);
        self.inner.refresh_thresholds(&config);
    }

    /// Replace the whole configuration.
    pub fn reconfigure(&self, new_config: LogConfig) {
        let mut config = self.inner.config.write();
        *config = new_config;
        self.inner.refresh_thresholds(&config);
    }

    /// Replace the active sink.
    pub fn set_sink(&self, sink: Arc<dyn Sink>) {
        *self.inner.sink.write() = sink;
    }

    pub fn sink(&self) -> Arc<dyn Sink> {
        Arc::clone(&*self.inner.sink.read())
    }

    /// Flush the active sink. Failures go to the fallback reporter.
    pub fn flush(&self) {
        let sink = self.sink();
        match panic::catch_unwind(AssertUnwindSafe(|| sink.flush())) {
            Ok(Ok(())) => {}
            Ok(Err(source)) => self.inner.report(LoggingError::Sink {
                sink: sink.name().to_string(),
                source,
            }),
            Err(_) => self.inner.report(LoggingError::SinkPanicked {
                sink: sink.name().to_string(),
            }),
        }
    }

    /// Number of infrastructure errors reported so far.
    pub fn infrastructure_errors(&self) -> u64 {
        self.inner.infrastructure_errors.load(Ordering::Relaxed)
    }

    /// Names of all loggers created so far, sorted.
    pub fn logger_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.loggers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl fmt::Debug for LogManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogManager")
            .field("config", &*self.inner.config.read())
            .field("sink", &self.inner.sink.read().name())
            .field("loggers", &self.inner.loggers.len())
            .finish()
    }
}

/// Builder for [`LogManager`].
#[derive(Default)]
pub struct LogManagerBuilder {
    config: Option<LogConfig>,
    sink: Option<Arc<dyn Sink>>,
    fallback: Option<FallbackReporter>,
}

impl LogManagerBuilder {
    /// Threshold configuration (default: root `Info`).
    pub fn config(mut self, config: LogConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Active sink (default: stdout console).
    pub fn sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Where infrastructure errors go (default: one line on stderr).
    pub fn fallback<F>(mut self, reporter: F) -> Self
    where
        F: Fn(&LoggingError) + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(reporter));
        self
    }

    pub fn build(self) -> LogManager {
        LogManager {
            inner: Arc::new(ManagerInner {
                config: RwLock::new(self.config.unwrap_or_default()),
                sink: RwLock::new(
                    self.sink
                        .unwrap_or_else(|| Arc::new(ConsoleSink::stdout())),
                ),
                categories: CategoryRegistry::new(),
                loggers: DashMap::new(),
                fallback: self.fallback.unwrap_or_else(|| Arc::new(report_to_stderr)),
                infrastructure_errors: AtomicU64::new(0),
            }),
        }
    }
}

/// Named source of log records.
///
/// Obtained from [`LogManager::logger`] or [`EventLogger::for_name`]. Cheap
/// to clone; clones share configuration.
///
/// Methods take already-evaluated arguments but only render them when the
/// severity is enabled. The `log_*!` macros additionally skip evaluating
/// the argument expressions.
#[derive(Clone)]
pub struct EventLogger {
    state: Arc<LoggerState>,
    manager: Arc<ManagerInner>,
}

impl EventLogger {
    /// Logger `name` from the process-wide manager.
    pub fn for_name(name: &str) -> Self {
        global().logger(name)
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Current threshold of this logger.
    pub fn threshold(&self) -> Threshold {
        self.state.threshold()
    }

    /// Whether a record of `severity` would be emitted.
    #[inline]
    pub fn is_enabled(&self, severity: Severity) -> bool {
        severity.as_u8() >= self.state.threshold.load(Ordering::Relaxed)
    }

    /// Emit a record if `severity` is enabled.
    pub fn log(&self, severity: Severity, template: &str, args: &[&dyn fmt::Display]) {
        if self.is_enabled(severity) {
            self.emit(severity, None, template, args);
        }
    }

    /// Emit a record tagged with `category` if `severity` is enabled.
    pub fn log_categorized(
        &self,
        severity: Severity,
        category: &Category,
        template: &str,
        args: &[&dyn fmt::Display],
    ) {
        if self.is_enabled(severity) {
            self.emit(severity, Some(category), template, args);
        }
    }

    pub fn trace(&self, template: &str, args: &[&dyn fmt::Display]) {
        self.log(Severity::Trace, template, args);
    }

    pub fn debug(&self, template: &str, args: &[&dyn fmt::Display]) {
        self.log(Severity::Debug, template, args);
    }

    pub fn info(&self, template: &str, args: &[&dyn fmt::Display]) {
        self.log(Severity::Info, template, args);
    }

    pub fn warn(&self, template: &str, args: &[&dyn fmt::Display]) {
        self.log(Severity::Warn, template, args);
    }

    pub fn error(&self, template: &str, args: &[&dyn fmt::Display]) {
        self.log(Severity::Error, template, args);
    }

    fn emit(
        &self,
        severity: Severity,
        category: Option<&Category>,
        template: &str,
        args: &[&dyn fmt::Display],
    ) {
        let rendered = template::render(template, args);
        if rendered.failed_args > 0 {
            self.manager.report(LoggingError::Format {
                logger: self.name().to_string(),
                count: rendered.failed_args,
            });
        }

        let record = LogRecord {
            timestamp: Local::now(),
            severity,
            logger: Arc::clone(&self.state.name),
            thread: std::thread::current().name().map(str::to_string),
            template: template.to_string(),
            args: rendered.args,
            message: rendered.message,
            context: context::snapshot(),
            category: category.cloned(),
        };
        self.manager.dispatch(&record);
    }
}

impl fmt::Debug for EventLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLogger")
            .field("name", &self.name())
            .field("threshold", &self.threshold())
            .finish()
    }
}
