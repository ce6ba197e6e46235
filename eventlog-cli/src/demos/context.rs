//! Request and user tags across concurrent requests.
//!
//! Each simulated request runs as its own task with its own
//! [`TaskContext`]; the tags set at the start of the request show up on
//! every record emitted while handling it, including records from helper
//! functions that never see the tags directly.

use eventlog::context::{self, TaskContext};
use eventlog::{log_debug, log_info, EventLogger, LogManager};
use tokio::task::JoinError;

pub const LOGGER_NAME: &str = "main";

/// A simulated incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub request_id: String,
    pub user_id: String,
}

impl Request {
    pub fn new(request_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            user_id: user_id.into(),
        }
    }
}

/// Requests handled by [`run`].
pub fn demo_requests() -> Vec<Request> {
    vec![
        Request::new("REQ-1001", "USR-12345"),
        Request::new("REQ-1002", "USR-67890"),
    ]
}

/// Handle every request concurrently, each in its own context.
pub async fn run(manager: &LogManager, requests: Vec<Request>) -> Result<(), JoinError> {
    let mut handles = Vec::with_capacity(requests.len());
    for request in requests {
        let log = manager.logger(LOGGER_NAME);
        handles.push(tokio::spawn(
            TaskContext::new().scope_async(handle_request(log, request)),
        ));
    }

    for handle in handles {
        handle.await?;
    }
    Ok(())
}

async fn handle_request(log: EventLogger, request: Request) {
    context::put("requestId", request.request_id);
    context::put("userId", request.user_id);

    log_info!(log, "Request started");
    tokio::task::yield_now().await;
    process_user_data(&log);
    log_info!(log, "Request processed successfully");

    context::clear();
}

fn process_user_data(log: &EventLogger) {
    log_debug!(log, "Processing user data for {}", context::get("userId").unwrap_or_default());
}
