//! Task templates: the reusable lists of tasks a seminar is created from

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::MAX_TASK_NAME_LEN;
use crate::error::BoardError;
use crate::reply::{settle, TemplateTaskReply};
use crate::traits::TemplateService;
use crate::utils::comparison::compare_templates_alpha;

/// The identifier of a template (a named list of template tasks)
pub type TemplateId = u64;
/// The identifier of a single task inside a template
pub type TemplateTaskId = u64;

/// A task of a template, which deadline is given relative to the seminar date
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskTemplate {
    id: TemplateTaskId,
    name: String,
    /// Days from the seminar date. Negative values are before the seminar
    relative_days_before: Option<i64>,
    default_assignee: String,
    default_notes: String,
}

impl TaskTemplate {
    pub fn new(id: TemplateTaskId, name: String, relative_days_before: Option<i64>, default_assignee: String, default_notes: String) -> Self {
        Self { id, name, relative_days_before, default_assignee, default_notes }
    }

    pub fn from_reply(reply: &TemplateTaskReply) -> Self {
        Self::new(reply.id, reply.name.clone(), reply.relative_days_before,
                  reply.default_assignee.clone(), reply.default_notes.clone())
    }

    pub fn id(&self) -> TemplateTaskId                 { self.id }
    pub fn name(&self) -> &str                         { &self.name }
    pub fn relative_days_before(&self) -> Option<i64>  { self.relative_days_before }
    pub fn default_assignee(&self) -> &str             { &self.default_assignee }
    pub fn default_notes(&self) -> &str                { &self.default_notes }

    /// e.g. `-55 days (-7 weeks -6 days)`, `-56 days (-8 weeks)`, `-3 days`, or `unset`
    pub fn when_display(&self) -> String {
        let n = match self.relative_days_before {
            None => return "unset".to_string(),
            Some(n) => n,
        };
        let sign = if n < 0 { -1 } else { 1 };
        let weeks = n.abs() / 7;
        let days = n.abs() % 7;
        match (weeks, days) {
            (0, _) => format!("{} days", n),
            (w, 0) => format!("{} days ({} weeks)", n, sign * w),
            (w, d) => format!("{} days ({} weeks {} days)", n, sign * w, sign * d),
        }
    }

    /// The deadline of a task created from this template, or `None` when this template has no relative date
    pub fn deadline_from(&self, base_date: NaiveDate) -> Option<NaiveDate> {
        self.relative_days_before.map(|n| base_date + Duration::days(n))
    }
}

/// The form fields of a template task, as typed
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TemplateFields {
    pub name: String,
    pub relative_days_before: String,
    pub default_assignee: String,
    pub default_notes: String,
}

impl TemplateFields {
    pub fn new(name: &str, relative_days_before: &str) -> Self {
        Self {
            name: name.to_string(),
            relative_days_before: relative_days_before.to_string(),
            ..Self::default()
        }
    }

    /// Same checks as the server. Returns the trimmed fields and the parsed relative days
    pub fn validate(&self) -> Result<(Self, i64), BoardError> {
        let name = self.check_name()?;
        let days = self.check_relative_days()?;
        let trimmed = Self {
            name,
            relative_days_before: days.to_string(),
            default_assignee: self.default_assignee.trim().to_string(),
            default_notes: self.default_notes.trim().to_string(),
        };
        Ok((trimmed, days))
    }

    /// The trimmed name, if it is neither empty nor too long
    pub fn check_name(&self) -> Result<String, BoardError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(BoardError::Validation { field: "name", message: "Please enter a task name".to_string() });
        }
        if name.chars().count() > MAX_TASK_NAME_LEN {
            return Err(BoardError::Validation {
                field: "name",
                message: format!("Task names must be at most {} characters", MAX_TASK_NAME_LEN),
            });
        }
        Ok(name.to_string())
    }

    /// The relative days, which are mandatory and must be a whole number
    pub fn check_relative_days(&self) -> Result<i64, BoardError> {
        let raw_days = self.relative_days_before.trim();
        if raw_days.is_empty() {
            return Err(BoardError::Validation { field: "relative_days_before", message: "Please enter a relative date".to_string() });
        }
        raw_days.parse::<i64>()
            .map_err(|_| BoardError::Validation { field: "relative_days_before", message: "Please enter a whole number".to_string() })
    }
}

/// A task to create in a seminar, planned from a template
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedTask {
    pub name: String,
    pub deadline: NaiveDate,
    pub assignee: String,
    pub notes: String,
}

/// Plans the tasks of a seminar which reference date is `base_date`.
///
/// Templates without a relative date are skipped.
pub fn instantiate(templates: &[TaskTemplate], base_date: NaiveDate) -> Vec<PlannedTask> {
    templates.iter()
        .filter_map(|template| {
            template.deadline_from(base_date).map(|deadline| PlannedTask {
                name: template.name().to_string(),
                deadline,
                assignee: template.default_assignee().to_string(),
                notes: template.default_notes().to_string(),
            })
        })
        .collect()
}


/// The list of tasks of a template, kept in sync with a [`TemplateService`]
#[derive(Clone, Debug)]
pub struct TemplateEditor {
    template: TemplateId,
    tasks: Vec<TaskTemplate>,
}

impl TemplateEditor {
    pub fn new(template: TemplateId, tasks: Vec<TaskTemplate>) -> Self {
        Self { template, tasks }
    }

    pub fn template(&self) -> TemplateId { self.template }
    pub fn tasks(&self) -> &[TaskTemplate] { &self.tasks }

    pub fn task(&self, id: TemplateTaskId) -> Option<&TaskTemplate> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    /// The tasks, sorted alphabetically
    pub fn sorted_by_name(&self) -> Vec<&TaskTemplate> {
        let mut sorted: Vec<&TaskTemplate> = self.tasks.iter().collect();
        sorted.sort_by(|l, r| compare_templates_alpha(l, r));
        sorted
    }

    /// Appends a new task to this template
    pub async fn create<S>(&mut self, service: &S, fields: &TemplateFields) -> Result<&TaskTemplate, BoardError>
    where
        S: TemplateService + ?Sized,
    {
        let (fields, _) = fields.validate()?;
        log::debug!("Creating template task {:?} in template {}", fields.name, self.template);
        let reply = settle(service.create_template_task(self.template, &fields).await)?;
        self.tasks.push(TaskTemplate::from_reply(&reply));
        let index = self.tasks.len() - 1;
        Ok(&self.tasks[index])
    }

    /// Replaces a task in place, keeping its position
    pub async fn update<S>(&mut self, service: &S, id: TemplateTaskId, fields: &TemplateFields) -> Result<&TaskTemplate, BoardError>
    where
        S: TemplateService + ?Sized,
    {
        let index = self.position(id)?;
        let (fields, _) = fields.validate()?;
        log::debug!("Updating template task {}", id);
        let reply = settle(service.update_template_task(id, &fields).await)?;
        self.tasks[index] = TaskTemplate::from_reply(&reply);
        Ok(&self.tasks[index])
    }

    pub async fn delete<S>(&mut self, service: &S, id: TemplateTaskId) -> Result<TaskTemplate, BoardError>
    where
        S: TemplateService + ?Sized,
    {
        let index = self.position(id)?;
        log::debug!("Deleting template task {}", id);
        settle(service.delete_template_task(id).await)?;
        Ok(self.tasks.remove(index))
    }

    fn position(&self, id: TemplateTaskId) -> Result<usize, BoardError> {
        self.tasks.iter()
            .position(|t| t.id() == id)
            .ok_or_else(|| BoardError::Rejected { errors: Default::default(), message: Some("TaskTemplate not found".to_string()) })
    }
}
