//! The seams between the board and the task service

use std::error::Error;

use async_trait::async_trait;

use crate::reply::{Ack, Reply, TaskReply, TemplateTaskReply, ToggleReply};
use crate::task::TaskId;
use crate::templates::{TemplateFields, TemplateId, TemplateTaskId};

/// The identifier of the seminar a board shows the tasks of
pub type SeminarId = u64;

/// A source of truth for seminar tasks (usually the HTTP [`Client`](crate::client::Client))
///
/// `Err` means the request did not complete. A completed request the server refused is an `Ok(Reply::Failure)`.
#[async_trait]
pub trait TaskService {
    /// Ask the server to set the completion state of a task
    async fn toggle_task(&self, id: TaskId, completed: bool) -> Result<Reply<ToggleReply>, Box<dyn Error>>;

    /// Rename a task and/or move its deadline. `deadline` is sent as typed (it should be `YYYY-MM-DD`)
    async fn update_task(&self, id: TaskId, name: &str, deadline: &str) -> Result<Reply<TaskReply>, Box<dyn Error>>;

    /// Create a new task in a seminar
    async fn create_task(&self, seminar: SeminarId, name: &str, deadline: &str) -> Result<Reply<TaskReply>, Box<dyn Error>>;
}

/// A source of truth for the task templates that seminars are created from
#[async_trait]
pub trait TemplateService {
    async fn create_template_task(&self, template: TemplateId, fields: &TemplateFields) -> Result<Reply<TemplateTaskReply>, Box<dyn Error>>;
    async fn update_template_task(&self, id: TemplateTaskId, fields: &TemplateFields) -> Result<Reply<TemplateTaskReply>, Box<dyn Error>>;
    async fn delete_template_task(&self, id: TemplateTaskId) -> Result<Reply<Ack>, Box<dyn Error>>;
}
