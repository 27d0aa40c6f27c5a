//! Seminar preparation tasks

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

/// The identifier the server assigned to a task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl TaskId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}

/// The visual status of a task row.
///
/// These are mutually exclusive: a row never shows more than one of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Completed,
    Pending,
    Overdue,
}

impl TaskStatus {
    /// The CSS class a row with this status carries
    pub fn css_class(&self) -> &'static str {
        match self {
            TaskStatus::Completed => "task-completed",
            TaskStatus::Pending => "task-pending",
            TaskStatus::Overdue => "task-overdue",
        }
    }
}

/// A preparation task, as last confirmed by the server
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    /// The display name of the task
    name: String,
    deadline: NaiveDate,
    completed: bool,
    /// Whether the server considered this task overdue the last time it told us about it.
    /// This is never computed client-side, see [`Task::is_overdue_on`] for the server rule.
    overdue: bool,
}

impl Task {
    pub fn new(id: TaskId, name: String, deadline: NaiveDate, completed: bool, overdue: bool) -> Self {
        Self { id, name, deadline, completed, overdue }
    }

    pub fn id(&self) -> TaskId            { self.id }
    pub fn name(&self) -> &str            { &self.name }
    pub fn deadline(&self) -> NaiveDate   { self.deadline }
    pub fn completed(&self) -> bool       { self.completed }
    pub fn overdue(&self) -> bool         { self.overdue }

    /// The key of the date group this task belongs to
    pub fn date_key(&self) -> String {
        crate::utils::date_key(self.deadline)
    }

    pub fn status(&self) -> TaskStatus {
        if self.completed {
            TaskStatus::Completed
        } else if self.overdue {
            TaskStatus::Overdue
        } else {
            TaskStatus::Pending
        }
    }

    /// The rule the server applies: a task is overdue when its deadline has passed and it is not done yet
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        !self.completed && self.deadline < today
    }

    pub fn set_name(&mut self, new_name: String) {
        self.name = new_name;
    }

    pub fn set_deadline(&mut self, new_deadline: NaiveDate) {
        self.deadline = new_deadline;
    }

    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    pub fn set_overdue(&mut self, overdue: bool) {
        self.overdue = overdue;
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn status_priority() {
        let mut task = Task::new(TaskId::from(1), "Book the room".to_string(), date(2026, 10, 1), false, true);
        assert_eq!(task.status(), TaskStatus::Overdue);
        assert_eq!(task.status().css_class(), "task-overdue");

        // A completed task never shows as overdue, whatever the stale flag says
        task.set_completed(true);
        assert_eq!(task.status(), TaskStatus::Completed);

        task.set_completed(false);
        task.set_overdue(false);
        assert_eq!(task.status(), TaskStatus::Pending);
    }

    #[test]
    fn server_overdue_rule() {
        let today = date(2026, 10, 18);
        let mut task = Task::new(TaskId::from(1), "Print handouts".to_string(), date(2026, 10, 17), false, false);
        assert!(task.is_overdue_on(today));
        assert!(!task.is_overdue_on(date(2026, 10, 17)));
        task.set_completed(true);
        assert!(!task.is_overdue_on(today));
    }
}
