//! Demo programs that use the eventlog facade.
//!
//! - [`calculator`] - arithmetic with a division-by-zero failure path
//! - [`student`] - grade tracking with range warnings
//! - [`auth`] - login and registration with `AUDIT` / `SECURITY` /
//!   `AUTHENTICATION` categories
//! - [`levels`] - one message per severity
//! - [`context`] - request and user tags across concurrent requests
//!
//! Every demo logs a failure at `Error` before returning it.

pub mod auth;
pub mod calculator;
pub mod context;
pub mod levels;
pub mod student;

use thiserror::Error;

/// Any demo's domain error.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Calculator(#[from] calculator::CalculatorError),

    #[error(transparent)]
    Student(#[from] student::StudentError),

    #[error(transparent)]
    Auth(#[from] auth::AuthError),
}
