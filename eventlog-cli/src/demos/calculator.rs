//! Calculator demo.

use eventlog::{log_debug, log_error, log_info, EventLogger, LogManager};
use thiserror::Error;

/// Logger name used by the calculator; also the prefix its file route
/// filters on.
pub const LOGGER_NAME: &str = "calculator";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculatorError {
    #[error("cannot divide by zero")]
    DivisionByZero,
}

/// Four-function calculator that logs every operation.
#[derive(Debug, Clone)]
pub struct Calculator {
    log: EventLogger,
}

impl Calculator {
    pub fn new(manager: &LogManager) -> Self {
        Self {
            log: manager.logger(LOGGER_NAME),
        }
    }

    pub fn add(&self, a: f64, b: f64) -> f64 {
        log_info!(self.log, "Starting addition: {} + {}", a, b);
        let result = a + b;
        log_info!(self.log, "Addition result: {}", result);
        result
    }

    pub fn subtract(&self, a: f64, b: f64) -> f64 {
        log_info!(self.log, "Starting subtraction: {} - {}", a, b);
        let result = a - b;
        log_info!(self.log, "Subtraction result: {}", result);
        result
    }

    pub fn multiply(&self, a: f64, b: f64) -> f64 {
        log_info!(self.log, "Starting multiplication: {} * {}", a, b);
        let result = a * b;
        log_info!(self.log, "Multiplication result: {}", result);
        result
    }

    /// Divide `a` by `b`.
    ///
    /// # Errors
    ///
    /// [`CalculatorError::DivisionByZero`] when `b` is zero; an `Error`
    /// record is emitted first.
    pub fn divide(&self, a: f64, b: f64) -> Result<f64, CalculatorError> {
        log_info!(self.log, "Starting division: {} / {}", a, b);
        if b == 0.0 {
            log_error!(self.log, "Error: division by zero is not allowed");
            return Err(CalculatorError::DivisionByZero);
        }
        let result = a / b;
        log_info!(self.log, "Division result: {}", result);
        Ok(result)
    }

    /// The demo sequence: all four operations on 10 and 5.
    pub fn run_operations(&self) -> Result<(), CalculatorError> {
        log_debug!(self.log, "Calculator started");
        self.add(10.0, 5.0);
        self.subtract(10.0, 5.0);
        self.multiply(10.0, 5.0);
        self.divide(10.0, 5.0)?;
        log_debug!(self.log, "Calculator finished");
        Ok(())
    }
}
