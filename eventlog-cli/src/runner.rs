//! Sink wiring and manager setup for the demo binary.
//!
//! Every record goes to the terminal and to `logs/app.log`. Calculator and
//! student records also get their own files, and `AUDIT` records are
//! copied to `logs/audit.log`:
//!
//! ```text
//! <log-dir>/logsCalculadora/calculator.log   logger "calculator"
//! <log-dir>/logsEstudiantes/student.log      logger "student"
//! <log-dir>/logs/app.log                     everything (background writer)
//! <log-dir>/logs/audit.log                   category AUDIT
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use eventlog::logging::{init_logging, LoggingGuard};
use eventlog::sink::{
    AsyncSink, ConsoleSink, FileSink, RecordFilter, RoutingSink, TracingSink,
};
use eventlog::{LogConfig, LogManager, Sink};

use crate::demos::auth::AUDIT;
use crate::demos::{calculator, student};
use crate::error::CliError;

/// File name of the `tracing` subscriber's own log when `--tracing` is on.
pub const TRACING_LOG_FILE: &str = "eventlog-demo.log";

/// Options that shape the manager.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Level directives; `None` reads `EVENTLOG_LEVEL`
    pub level: Option<String>,
    /// Base directory for all log files
    pub log_dir: PathBuf,
    /// Send terminal output through a `tracing` subscriber
    pub tracing: bool,
}

/// Owns the manager and anything that must outlive it.
pub struct DemoRunner {
    manager: LogManager,
    /// Keeps the tracing file writer alive when `--tracing` is on
    #[allow(dead_code)]
    logging_guard: Option<LoggingGuard>,
}

impl DemoRunner {
    pub fn new(options: &RunnerOptions) -> Result<Self, CliError> {
        let config = match &options.level {
            Some(directives) => LogConfig::parse_directives(directives)?,
            None => LogConfig::from_env()?,
        };

        let (terminal, logging_guard) = if options.tracing {
            let dir = options.log_dir.join("logs");
            let guard = init_logging(&dir.to_string_lossy(), TRACING_LOG_FILE)
                .map_err(|e| CliError::LoggingInit(e.to_string()))?;
            let sink: Arc<dyn Sink> = Arc::new(TracingSink::new());
            (sink, Some(guard))
        } else {
            let sink: Arc<dyn Sink> = Arc::new(ConsoleSink::stdout());
            (sink, None)
        };

        let router = build_router(&options.log_dir, terminal)?;
        let manager = LogManager::new(config, Arc::new(router));

        info!("eventlog-demo v{}", eventlog::VERSION);
        info!("Writing log files under {}", options.log_dir.display());

        Ok(Self {
            manager,
            logging_guard,
        })
    }

    pub fn manager(&self) -> &LogManager {
        &self.manager
    }

    /// Flush every sink; call before exiting.
    pub fn finish(&self) {
        self.manager.flush();
        let failures = self.manager.infrastructure_errors();
        if failures > 0 {
            info!(failures, "Logging reported infrastructure errors");
        }
    }
}

fn open_file(dir: &Path, file_name: &str) -> Result<Arc<FileSink>, CliError> {
    FileSink::open(dir, file_name)
        .map(Arc::new)
        .map_err(|error| CliError::SinkOpen {
            path: dir.join(file_name).display().to_string(),
            error,
        })
}

/// Routing table described in the module docs.
pub fn build_router(log_dir: &Path, terminal: Arc<dyn Sink>) -> Result<RoutingSink, CliError> {
    let calculator_file = open_file(&log_dir.join("logsCalculadora"), "calculator.log")?;
    let student_file = open_file(&log_dir.join("logsEstudiantes"), "student.log")?;
    let app_file = open_file(&log_dir.join("logs"), "app.log")?;
    let audit_file = open_file(&log_dir.join("logs"), "audit.log")?;

    let app_background = AsyncSink::new(app_file).map_err(|error| CliError::SinkOpen {
        path: log_dir.join("logs").join("app.log").display().to_string(),
        error,
    })?;

    let audit = eventlog::CategoryRegistry::new().intern(AUDIT);

    Ok(RoutingSink::new()
        .route(RecordFilter::all(), terminal)
        .route(RecordFilter::all().logger(calculator::LOGGER_NAME), calculator_file)
        .route(RecordFilter::all().logger(student::LOGGER_NAME), student_file)
        .route(RecordFilter::all(), Arc::new(app_background))
        .route(RecordFilter::all().category(audit), audit_file))
}
