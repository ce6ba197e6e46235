//! Process-wide manager installation.
//!
//! Kept in its own test binary: the global manager can only be installed
//! once per process.

use std::sync::Arc;

use eventlog::manager::{global, install_global};
use eventlog::sink::MemorySink;
use eventlog::{EventLogger, LogConfig, LogManager, Severity};

#[test]
fn test_install_global_then_for_name() {
    let sink = Arc::new(MemorySink::new());
    let manager = LogManager::new(LogConfig::new(Severity::Debug), sink.clone());
    assert!(install_global(manager).is_ok());

    let logger = EventLogger::for_name("calculator");
    logger.debug("Calculator started", &[]);
    logger.info("Result: {}", &[&15]);
    assert_eq!(sink.messages(), vec!["Calculator started", "Result: 15"]);

    // same shared state through the global handle
    global().set_level("calculator", Severity::Error);
    assert!(!logger.is_enabled(Severity::Warn));

    let second = LogManager::new(LogConfig::default(), Arc::new(MemorySink::new()));
    assert!(install_global(second).is_err(), "only the first install wins");
}
