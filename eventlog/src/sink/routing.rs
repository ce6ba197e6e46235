//! Filter-based fan-out to several sinks.
//!
//! A [`RoutingSink`] holds an ordered list of [`Route`]s. Every record is
//! offered to every route; each route whose [`RecordFilter`] accepts it
//! writes it. This is how categories are used downstream, for example an
//! audit trail that only receives `AUDIT` records:
//!
//! ```
//! use std::sync::Arc;
//! use eventlog::category::CategoryRegistry;
//! use eventlog::sink::{MemorySink, RecordFilter, RoutingSink};
//!
//! let registry = CategoryRegistry::new();
//! let audit_trail = Arc::new(MemorySink::new());
//! let everything = Arc::new(MemorySink::new());
//!
//! let router = RoutingSink::new()
//!     .route(RecordFilter::all(), everything.clone())
//!     .route(RecordFilter::all().category(registry.intern("AUDIT")), audit_trail.clone());
//! # let _ = router;
//! ```

use std::fmt;
use std::sync::Arc;

use super::Sink;
use crate::category::Category;
use crate::config::name_matches_prefix;
use crate::error::SinkError;
use crate::level::Severity;
use crate::record::LogRecord;

/// Predicate over records. An empty filter accepts everything; each
/// configured criterion narrows it.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    min_severity: Option<Severity>,
    logger_prefix: Option<String>,
    category: Option<Category>,
    excluded_category: Option<Category>,
}

impl RecordFilter {
    /// Filter that accepts every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Only records at `severity` or above.
    pub fn min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = Some(severity);
        self
    }

    /// Only records from `prefix` or loggers below it.
    pub fn logger(mut self, prefix: impl Into<String>) -> Self {
        self.logger_prefix = Some(prefix.into());
        self
    }

    /// Only records tagged with `category`.
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Only records *not* tagged with `category`.
    pub fn exclude_category(mut self, category: Category) -> Self {
        self.excluded_category = Some(category);
        self
    }

    pub fn accepts(&self, record: &LogRecord) -> bool {
        if let Some(min) = self.min_severity {
            if record.severity < min {
                return false;
            }
        }
        if let Some(prefix) = &self.logger_prefix {
            if !name_matches_prefix(&record.logger, prefix) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !record.has_category(category) {
                return false;
            }
        }
        if let Some(excluded) = &self.excluded_category {
            if record.has_category(excluded) {
                return false;
            }
        }
        true
    }
}

/// One filter/sink pair.
#[derive(Clone)]
pub struct Route {
    pub filter: RecordFilter,
    pub sink: Arc<dyn Sink>,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("filter", &self.filter)
            .field("sink", &self.sink.name())
            .finish()
    }
}

/// Delivers each record to every route that accepts it.
///
/// A failing route does not stop the others. All failures of one record
/// are returned together as [`SinkError::Routes`].
#[derive(Debug, Default, Clone)]
pub struct RoutingSink {
    routes: Vec<Route>,
}

impl RoutingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route.
    pub fn route(mut self, filter: RecordFilter, sink: Arc<dyn Sink>) -> Self {
        self.routes.push(Route { filter, sink });
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    fn collect_failures<F>(&self, mut op: F) -> Result<(), SinkError>
    where
        F: FnMut(&Route) -> Option<Result<(), SinkError>>,
    {
        let failures: Vec<(String, SinkError)> = self
            .routes
            .iter()
            .filter_map(|route| match op(route) {
                Some(Err(e)) => Some((route.sink.name().to_string(), e)),
                _ => None,
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(SinkError::Routes(failures))
        }
    }
}

impl Sink for RoutingSink {
    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.collect_failures(|route| {
            route
                .filter
                .accepts(record)
                .then(|| route.sink.write(record))
        })
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.collect_failures(|route| Some(route.sink.flush()))
    }

    fn name(&self) -> &str {
        "router"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryRegistry;
    use crate::sink::MemorySink;

    struct RejectingSink;

    impl Sink for RejectingSink {
        fn write(&self, _record: &LogRecord) -> Result<(), SinkError> {
            Err(SinkError::Rejected("always".to_string()))
        }

        fn name(&self) -> &str {
            "rejecting"
        }
    }

    fn record(logger: &str, severity: Severity, category: Option<Category>) -> LogRecord {
        let mut record = LogRecord::new(severity, Arc::from(logger), "msg");
        record.category = category;
        record
    }

    #[test]
    fn test_empty_filter_accepts_all() {
        let filter = RecordFilter::all();
        assert!(filter.accepts(&record("any", Severity::Trace, None)));
    }

    #[test]
    fn test_filter_criteria() {
        let registry = CategoryRegistry::new();
        let audit = registry.intern("AUDIT");
        let security = registry.intern("SECURITY");

        let filter = RecordFilter::all()
            .min_severity(Severity::Info)
            .logger("auth")
            .category(audit.clone());

        assert!(filter.accepts(&record("auth", Severity::Info, Some(audit.clone()))));
        assert!(filter.accepts(&record("auth::login", Severity::Warn, Some(audit.clone()))));
        assert!(!filter.accepts(&record("auth", Severity::Debug, Some(audit.clone()))));
        assert!(!filter.accepts(&record("calculator", Severity::Info, Some(audit.clone()))));
        assert!(!filter.accepts(&record("auth", Severity::Info, Some(security))));
        assert!(!filter.accepts(&record("auth", Severity::Info, None)));
    }

    #[test]
    fn test_exclude_category() {
        let registry = CategoryRegistry::new();
        let filter = RecordFilter::all().exclude_category(registry.intern("AUDIT"));

        assert!(filter.accepts(&record("auth", Severity::Info, None)));
        assert!(!filter.accepts(&record("auth", Severity::Info, Some(registry.intern("AUDIT")))));
    }

    #[test]
    fn test_routes_by_category_and_logger() {
        let registry = CategoryRegistry::new();
        let audit = registry.intern("AUDIT");
        let everything = Arc::new(MemorySink::new());
        let audit_only = Arc::new(MemorySink::new());
        let calculator = Arc::new(MemorySink::new());

        let router = RoutingSink::new()
            .route(RecordFilter::all(), everything.clone())
            .route(RecordFilter::all().category(audit.clone()), audit_only.clone())
            .route(RecordFilter::all().logger("calculator"), calculator.clone());

        router.write(&record("auth", Severity::Info, Some(audit))).unwrap();
        router.write(&record("calculator", Severity::Info, None)).unwrap();
        router.write(&record("student", Severity::Warn, None)).unwrap();

        assert_eq!(everything.len(), 3);
        assert_eq!(audit_only.len(), 1);
        assert_eq!(calculator.len(), 1);
        assert_eq!(&*calculator.records()[0].logger, "calculator");
    }

    #[test]
    fn test_failing_route_does_not_block_others() {
        let captured = Arc::new(MemorySink::new());
        let router = RoutingSink::new()
            .route(RecordFilter::all(), Arc::new(RejectingSink))
            .route(RecordFilter::all(), captured.clone());

        let err = router
            .write(&record("auth", Severity::Info, None))
            .unwrap_err();

        assert_eq!(captured.len(), 1);
        match err {
            SinkError::Routes(failures) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].0, "rejecting");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_filtered_out_failing_route_is_not_called() {
        let router = RoutingSink::new().route(
            RecordFilter::all().min_severity(Severity::Error),
            Arc::new(RejectingSink),
        );
        assert!(router.write(&record("auth", Severity::Info, None)).is_ok());
    }
}
