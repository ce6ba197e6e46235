//! Authentication service demo.
//!
//! Shows when to use each severity and how categories mark records for
//! downstream routing: `AUDIT` records also land in the audit log file.

use eventlog::{
    log_debug, log_error, log_info, log_warn, Category, EventLogger, LogManager,
};
use thiserror::Error;

pub const LOGGER_NAME: &str = "auth";

pub const AUDIT: &str = "AUDIT";
pub const SECURITY: &str = "SECURITY";
pub const AUTHENTICATION: &str = "AUTHENTICATION";

const DEMO_EMAIL: &str = "admin@example.com";
const DEMO_PASSWORD: &str = "admin123";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid email: '{0}'")]
    InvalidEmail(String),
}

/// Toy login/registration service with one hard-coded account.
#[derive(Debug, Clone)]
pub struct AuthService {
    log: EventLogger,
    audit: Category,
    security: Category,
    authentication: Category,
}

impl AuthService {
    pub fn new(manager: &LogManager) -> Self {
        Self {
            log: manager.logger(LOGGER_NAME),
            audit: manager.category(AUDIT),
            security: manager.category(SECURITY),
            authentication: manager.category(AUTHENTICATION),
        }
    }

    /// Check credentials. Never fails; a rejected login returns `false`.
    pub fn login(&self, email: &str, password: &str) -> bool {
        log_info!(self.log, category: self.authentication, "Login attempt started for user: {}", email);
        log_debug!(self.log, "Validating credentials...");

        if email.is_empty() {
            log_warn!(self.log, category: self.authentication, "Login attempt with empty email");
            return false;
        }

        if email == DEMO_EMAIL && password == DEMO_PASSWORD {
            log_info!(self.log, category: self.audit, "Login successful for user: {}", email);
            true
        } else {
            log_warn!(
                self.log,
                category: self.security,
                "Failed login attempt for user: {}. Invalid credentials",
                email
            );
            false
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidEmail`] when `email` has no `@`; an `Error`
    /// record is emitted first.
    pub fn register(&self, email: &str, name: &str) -> Result<(), AuthError> {
        log_info!(
            self.log,
            category: self.audit,
            "New user registration started: email={}, name={}",
            email,
            name
        );

        if !email.contains('@') {
            log_error!(self.log, "Invalid email provided: {}", email);
            return Err(AuthError::InvalidEmail(email.to_string()));
        }

        log_debug!(self.log, "Checking email uniqueness");
        log_debug!(self.log, "Hashing password");

        log_info!(self.log, category: self.audit, "User registered successfully: email={}", email);
        Ok(())
    }
}
