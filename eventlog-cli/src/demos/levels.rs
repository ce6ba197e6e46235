//! One message per severity.

use eventlog::{log_debug, log_error, log_info, log_trace, log_warn, LogManager};

pub const LOGGER_NAME: &str = "main";

pub fn run(manager: &LogManager) {
    let log = manager.logger(LOGGER_NAME);

    log_trace!(log, "This is a TRACE message - very detailed");
    log_debug!(log, "This is a DEBUG message - technical information");
    log_info!(log, "This is an INFO message - normal business event");
    log_warn!(log, "This is a WARN message - unusual but manageable situation");
    log_error!(log, "This is an ERROR message - failure that needs attention");
}
