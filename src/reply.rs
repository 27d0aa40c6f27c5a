//! Replies of the task service
//!
//! Every endpoint answers with the same envelope: a `success` flag, and on failure either a per-field `errors` map,
//! a general `error` string, or both. On success, the endpoint-specific payload sits next to the flag.

use std::collections::BTreeMap;
use std::error::Error;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::BoardError;
use crate::task::{Task, TaskId};

/// What a service call returned, once the transport succeeded
#[derive(Clone, Debug, PartialEq)]
pub enum Reply<T> {
    Success(T),
    Failure {
        errors: BTreeMap<String, String>,
        error: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: BTreeMap<String, String>,
}

impl<T: DeserializeOwned> Reply<T> {
    /// Parse a JSON response body
    pub fn from_json(text: &str) -> Result<Self, Box<dyn Error>> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let envelope: Envelope = serde_json::from_value(value.clone())?;
        if envelope.success == false {
            return Ok(Reply::Failure { errors: envelope.errors, error: envelope.error });
        }
        let payload: T = serde_json::from_value(value)?;
        Ok(Reply::Success(payload))
    }
}

impl<T> Reply<T> {
    pub fn failure<S: ToString>(error: S) -> Self {
        Reply::Failure { errors: BTreeMap::new(), error: Some(error.to_string()) }
    }

    pub fn field_errors(errors: BTreeMap<String, String>) -> Self {
        Reply::Failure { errors, error: None }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Reply::Success(_) => true,
            _ => false,
        }
    }

    pub fn into_result(self) -> Result<T, BoardError> {
        match self {
            Reply::Success(payload) => Ok(payload),
            Reply::Failure { errors, error } => Err(BoardError::Rejected { errors, message: error }),
        }
    }
}

/// Folds a transport result and an application reply into what the board consumes
pub fn settle<T>(result: Result<Reply<T>, Box<dyn Error>>) -> Result<T, BoardError> {
    match result {
        Err(err) => {
            log::warn!("Request failed: {}", err);
            Err(BoardError::transport(&*err))
        },
        Ok(reply) => reply.into_result(),
    }
}


/// Reply to a completion toggle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToggleReply {
    #[serde(default)]
    pub is_overdue: bool,
    /// Completion state as stored by the server. Older servers omit it
    #[serde(default)]
    pub is_done: Option<bool>,
}

/// A task as serialized by the server after a create or an update
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskReply {
    pub pk: u64,
    pub name: String,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default)]
    pub deadline_iso: Option<String>,
    pub deadline_display: String,
    pub date_key: String,
    pub relative_text: String,
    #[serde(default)]
    pub is_overdue: bool,
}

impl TaskReply {
    pub fn id(&self) -> TaskId {
        TaskId::from(self.pk)
    }

    /// The deadline the server stored, read from its date key
    pub fn deadline(&self) -> Result<NaiveDate, BoardError> {
        crate::utils::parse_date_key(&self.date_key)
            .ok_or_else(|| BoardError::Transport(format!("invalid date key {:?} in reply", self.date_key)))
    }

    pub fn to_task(&self) -> Result<Task, BoardError> {
        Ok(Task::new(self.id(), self.name.clone(), self.deadline()?, self.is_done, self.is_overdue))
    }
}

/// A task template as serialized by the server
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateTaskReply {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub relative_days_before: Option<i64>,
    #[serde(default)]
    pub default_assignee: String,
    #[serde(default)]
    pub default_notes: String,
    #[serde(default)]
    pub when_display: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FavoriteReply {
    pub is_favorite: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntegrationReply {
    pub id: u64,
    pub provider: String,
    pub name: String,
    pub is_active: bool,
    #[serde(default)]
    pub config: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotificationReply {
    #[serde(default)]
    pub days_before: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommentReply {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub content: Option<String>,
}

/// A reply that carries nothing but its success flag
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ack {}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_task_reply() {
        let text = r#"{"success": true, "pk": 12, "name": "Send invitations", "is_done": false,
            "deadline_iso": "2026-11-02", "deadline_display": "2026/11/02 (Mon)", "date_key": "2026-11-02",
            "relative_text": "in 15 days", "is_overdue": false}"#;
        let reply: Reply<TaskReply> = Reply::from_json(text).unwrap();
        let task = reply.into_result().unwrap().to_task().unwrap();
        assert_eq!(task.id(), TaskId::from(12));
        assert_eq!(task.deadline(), NaiveDate::from_ymd_opt(2026, 11, 2).unwrap());
    }

    #[test]
    fn parses_failures() {
        let reply: Reply<TaskReply> = Reply::from_json(r#"{"success": false, "errors": {"name": "required"}}"#).unwrap();
        match reply.into_result() {
            Err(err) => assert_eq!(err.user_message(), "required"),
            Ok(_) => panic!("should be a failure"),
        }

        // A missing success flag is a failure too
        let reply: Reply<Ack> = Reply::from_json(r#"{"error": "Task not found"}"#).unwrap();
        assert_eq!(reply, Reply::failure("Task not found"));
    }

    #[test]
    fn malformed_bodies_are_transport_errors() {
        assert!(Reply::<Ack>::from_json("<html>502 Bad Gateway</html>").is_err());
        // success, but the payload is incomplete
        assert!(Reply::<ToggleReply>::from_json(r#"{"success": true}"#).is_ok());
        assert!(Reply::<TaskReply>::from_json(r#"{"success": true}"#).is_err());
    }
}
