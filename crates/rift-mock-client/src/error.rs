//! Error types for pattern configuration and request resolution.

use std::error::Error;
use std::sync::Arc;
use thiserror::Error;

/// An application-level error handed back as the "response" of a pattern.
///
/// Shared so an `always` pattern hands out the same error object on every call.
pub type ConfiguredError = Arc<dyn Error + Send + Sync + 'static>;

/// Errors raised by a response queue, before the owning pattern adds its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("Response already added, add always not possible")]
    ResponseAlreadyAdded,
    #[error("Single response already added, add not possible")]
    SingleResponseAlreadyAdded,
    #[error("No response configured")]
    NoResponseConfigured,
    #[error("All responses have already been processed")]
    AllResponsesProcessed,
}

/// Errors surfaced by the mock engine.
///
/// Configuration errors come from building patterns, resolution errors from
/// handling a real call. `Configured` carries the error a pattern was told to
/// throw and is passed through unchanged.
#[derive(Debug, Error)]
pub enum MockError {
    #[error("No valid xml: {0}")]
    MalformedMockRequest(String),

    #[error("Response already added, add always not possible for:\n{request}\n")]
    ResponseAlreadyAdded { request: String },

    #[error("Single response already added, add not possible for:\n{request}\n")]
    SingleResponseAlreadyAdded { request: String },

    #[error("No uri configured, can't replace template key {{{key}}}")]
    NoUriConfigured { key: String },

    #[error("Body must be specified as string or bytes")]
    UnprocessableBody,

    #[error("Invalid status code {0} in mock response")]
    InvalidStatusCode(u16),

    #[error(
        "No matching mock request builder found for:\n{request}\n{}",
        render_reasons(.reasons)
    )]
    NoMatchingMockRequest {
        request: String,
        reasons: Vec<String>,
    },

    #[error("No response configured for:\n{request}\n")]
    NoResponseConfigured { request: String },

    #[error("All responses have already been processed for:\n{request}\n")]
    AllResponsesProcessed { request: String },

    #[error(transparent)]
    Configured(ConfiguredError),
}

impl MockError {
    /// Attach the rendering of the owning request to a queue error.
    pub fn from_queue(error: QueueError, request: impl ToString) -> Self {
        let request = request.to_string();
        match error {
            QueueError::ResponseAlreadyAdded => MockError::ResponseAlreadyAdded { request },
            QueueError::SingleResponseAlreadyAdded => {
                MockError::SingleResponseAlreadyAdded { request }
            }
            QueueError::NoResponseConfigured => MockError::NoResponseConfigured { request },
            QueueError::AllResponsesProcessed => MockError::AllResponsesProcessed { request },
        }
    }

    /// Whether this error was raised while building a pattern.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            MockError::MalformedMockRequest(_)
                | MockError::ResponseAlreadyAdded { .. }
                | MockError::SingleResponseAlreadyAdded { .. }
                | MockError::NoUriConfigured { .. }
                | MockError::UnprocessableBody
                | MockError::InvalidStatusCode(_)
        )
    }

    /// Whether this error is the simulated failure a pattern was configured with.
    pub fn is_configured(&self) -> bool {
        matches!(self, MockError::Configured(_))
    }
}

fn render_reasons(reasons: &[String]) -> String {
    if reasons.is_empty() {
        return String::new();
    }

    let mut rendered = String::from("\nReasons:\n");
    for reason in reasons {
        rendered.push_str("- ");
        rendered.push_str(reason);
        rendered.push('\n');
    }
    rendered
}

/// Error raised by patterns declared in fixture files (`error:` responses).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FixtureError(pub String);
