//! Errors surfaced by board operations

use std::collections::BTreeMap;

use thiserror::Error;

use crate::task::TaskId;

/// Shown when a request failed without the server telling us why
pub const COMMUNICATION_ERROR: &str = "A communication error occurred, please try again";

/// Why a board operation did not go through
#[derive(Clone, Debug, PartialEq, Error)]
pub enum BoardError {
    /// A client-side check rejected the input before any request was sent
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The server answered with `success: false`
    #[error("rejected by the server: {}", .message.as_deref().unwrap_or("no details"))]
    Rejected {
        errors: BTreeMap<String, String>,
        message: Option<String>,
    },

    /// The request did not complete, or its response could not be understood
    #[error("transport error: {0}")]
    Transport(String),

    #[error("no task {0} on this board")]
    UnknownTask(TaskId),

    #[error("a request for {0} is already in flight")]
    AlreadyInFlight(String),

    /// The response arrived for a request that has since been cancelled or superseded
    #[error("stale response for {0} ignored")]
    Stale(String),
}

impl BoardError {
    pub fn transport<E: std::fmt::Display + ?Sized>(err: &E) -> Self {
        BoardError::Transport(err.to_string())
    }

    /// The message a UI should display for this error.
    ///
    /// Field errors win (`name`, then `deadline`, then any other field), then the general error string,
    /// then a generic communication error.
    pub fn user_message(&self) -> String {
        match self {
            BoardError::Validation { message, .. } => message.clone(),
            BoardError::Rejected { errors, message } => {
                first_field_error(errors)
                    .or_else(|| message.clone())
                    .unwrap_or_else(|| COMMUNICATION_ERROR.to_string())
            },
            _ => COMMUNICATION_ERROR.to_string(),
        }
    }
}

fn first_field_error(errors: &BTreeMap<String, String>) -> Option<String> {
    for preferred in &["name", "deadline"] {
        if let Some(msg) = errors.get(*preferred) {
            return Some(msg.clone());
        }
    }
    errors.values().next().cloned()
}
