//! An in-memory task service, that answers the way the server does.
//!
//! It is useful to work offline, and to test boards and controllers without any network.

use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::MAX_TASK_NAME_LEN;
use crate::mock_behaviour::MockBehaviour;
use crate::reply::{Ack, Reply, TaskReply, TemplateTaskReply, ToggleReply};
use crate::task::{Task, TaskId};
use crate::templates::{TaskTemplate, TemplateFields, TemplateId, TemplateTaskId};
use crate::traits::{SeminarId, TaskService, TemplateService};
use crate::utils;
use crate::utils::comparison::compare_tasks_by_deadline;

/// The error a request with a wrong anti-forgery token gets
pub const FORBIDDEN_ERROR: &str = "CSRF verification failed";

#[derive(Debug, Default)]
struct LocalData {
    tasks: BTreeMap<TaskId, (SeminarId, Task)>,
    templates: BTreeMap<TemplateTaskId, (TemplateId, TaskTemplate)>,
    last_task_id: u64,
    last_template_task_id: u64,
}

/// A [`TaskService`] and [`TemplateService`] that keeps everything in memory
#[derive(Debug)]
pub struct LocalTaskService {
    today: Mutex<NaiveDate>,
    data: Mutex<LocalData>,

    /// The anti-forgery token this service issued
    token: String,
    /// The anti-forgery token requests currently present
    presented_token: Mutex<Option<String>>,

    mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>,
}

impl LocalTaskService {
    pub fn new(today: NaiveDate) -> Self {
        let token = uuid::Uuid::new_v4().to_hyphenated().to_string();
        Self {
            today: Mutex::new(today),
            data: Mutex::new(LocalData::default()),
            presented_token: Mutex::new(Some(token.clone())),
            token,
            mock_behaviour: None,
        }
    }

    /// Make this service fail some requests, the way a flaky network would
    pub fn with_mock_behaviour(mut self, mock_behaviour: Arc<Mutex<MockBehaviour>>) -> Self {
        self.mock_behaviour = Some(mock_behaviour);
        self
    }

    /// The anti-forgery token issued to clients
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Set the anti-forgery token subsequent requests present. Requests with a wrong token are rejected
    pub fn present_token(&self, token: Option<String>) -> Result<(), Box<dyn Error>> {
        *self.presented_token.lock().map_err(|_| "poisoned token lock")? = token;
        Ok(())
    }

    pub fn today(&self) -> Result<NaiveDate, Box<dyn Error>> {
        Ok(*self.today.lock().map_err(|_| "poisoned date lock")?)
    }

    /// Moves the reference date overdue flags are computed against
    pub fn set_today(&self, today: NaiveDate) -> Result<(), Box<dyn Error>> {
        *self.today.lock().map_err(|_| "poisoned date lock")? = today;
        Ok(())
    }

    /// Insert a task directly, without any validation
    pub fn add_task(&self, seminar: SeminarId, name: &str, deadline: NaiveDate, completed: bool) -> Result<Task, Box<dyn Error>> {
        let today = self.today()?;
        let mut data = self.lock_data()?;
        data.last_task_id += 1;
        let id = TaskId::from(data.last_task_id);
        let mut task = Task::new(id, name.to_string(), deadline, completed, false);
        task.set_overdue(task.is_overdue_on(today));
        data.tasks.insert(id, (seminar, task.clone()));
        Ok(task)
    }

    /// The tasks of a seminar, in the order the server renders them, with fresh overdue flags
    pub fn tasks(&self, seminar: SeminarId) -> Result<Vec<Task>, Box<dyn Error>> {
        let today = self.today()?;
        let data = self.lock_data()?;
        let mut tasks: Vec<Task> = data.tasks.values()
            .filter(|(owner, _)| *owner == seminar)
            .map(|(_, task)| {
                let mut task = task.clone();
                task.set_overdue(task.is_overdue_on(today));
                task
            })
            .collect();
        tasks.sort_by(compare_tasks_by_deadline);
        Ok(tasks)
    }

    pub fn task(&self, id: TaskId) -> Result<Option<Task>, Box<dyn Error>> {
        Ok(self.lock_data()?.tasks.get(&id).map(|(_, task)| task.clone()))
    }

    /// Insert a template task directly, without any validation
    pub fn add_template_task(&self, template: TemplateId, name: &str, relative_days_before: Option<i64>) -> Result<TaskTemplate, Box<dyn Error>> {
        let mut data = self.lock_data()?;
        data.last_template_task_id += 1;
        let task = TaskTemplate::new(data.last_template_task_id, name.to_string(), relative_days_before, String::new(), String::new());
        data.templates.insert(task.id(), (template, task.clone()));
        Ok(task)
    }

    pub fn template_tasks(&self, template: TemplateId) -> Result<Vec<TaskTemplate>, Box<dyn Error>> {
        let data = self.lock_data()?;
        Ok(data.templates.values()
            .filter(|(owner, _)| *owner == template)
            .map(|(_, task)| task.clone())
            .collect())
    }

    fn lock_data(&self) -> Result<MutexGuard<'_, LocalData>, Box<dyn Error>> {
        self.data.lock().map_err(|_| "poisoned data lock".into())
    }

    fn mock<F>(&self, check: F) -> Result<(), Box<dyn Error>>
    where
        F: FnOnce(&mut MockBehaviour) -> Result<(), Box<dyn Error>>,
    {
        match &self.mock_behaviour {
            None => Ok(()),
            Some(behaviour) => check(&mut *behaviour.lock().map_err(|_| "poisoned mock behaviour")?),
        }
    }

    fn token_is_valid(&self) -> Result<bool, Box<dyn Error>> {
        let presented = self.presented_token.lock().map_err(|_| "poisoned token lock")?;
        Ok(presented.as_deref() == Some(self.token.as_str()))
    }

    fn serialize_task(task: &Task, today: NaiveDate) -> TaskReply {
        let deadline = task.deadline();
        TaskReply {
            pk: task.id().as_u64(),
            name: task.name().to_string(),
            is_done: task.completed(),
            deadline_iso: Some(utils::date_key(deadline)),
            deadline_display: utils::format_date_with_weekday(deadline),
            date_key: utils::date_key(deadline),
            relative_text: utils::describe_relative_days(deadline, today),
            is_overdue: task.is_overdue_on(today),
        }
    }

    fn serialize_template_task(task: &TaskTemplate) -> TemplateTaskReply {
        TemplateTaskReply {
            id: task.id(),
            name: task.name().to_string(),
            relative_days_before: task.relative_days_before(),
            default_assignee: task.default_assignee().to_string(),
            default_notes: task.default_notes().to_string(),
            when_display: task.when_display(),
        }
    }
}

/// The server-side checks of a task form. Every invalid field gets an error
fn validate_task_payload(name: &str, deadline: &str) -> Result<(String, NaiveDate), BTreeMap<String, String>> {
    let name = name.trim();
    let mut errors = BTreeMap::new();
    if name.is_empty() {
        errors.insert("name".to_string(), "Please enter a task name".to_string());
    } else if name.chars().count() > MAX_TASK_NAME_LEN {
        errors.insert("name".to_string(), format!("Task names must be at most {} characters", MAX_TASK_NAME_LEN));
    }
    let deadline = utils::parse_date_key(deadline);
    if deadline.is_none() {
        errors.insert("deadline".to_string(), "Please enter a valid date (YYYY-MM-DD)".to_string());
    }
    match deadline {
        Some(deadline) if errors.is_empty() => Ok((name.to_string(), deadline)),
        _ => Err(errors),
    }
}

/// The server-side checks of a template task form. Every invalid field gets an error
fn validate_template_payload(fields: &TemplateFields) -> Result<TaskTemplate, BTreeMap<String, String>> {
    let mut errors = BTreeMap::new();
    let name = match fields.check_name() {
        Ok(name) => Some(name),
        Err(err) => { errors.insert("name".to_string(), err.user_message()); None },
    };
    let days = match fields.check_relative_days() {
        Ok(days) => Some(days),
        Err(err) => { errors.insert("relative_days_before".to_string(), err.user_message()); None },
    };
    match (name, days) {
        (Some(name), Some(days)) => Ok(TaskTemplate::new(0, name, Some(days),
                                                         fields.default_assignee.trim().to_string(),
                                                         fields.default_notes.trim().to_string())),
        _ => Err(errors),
    }
}


#[async_trait]
impl TaskService for LocalTaskService {
    async fn toggle_task(&self, id: TaskId, completed: bool) -> Result<Reply<ToggleReply>, Box<dyn Error>> {
        self.mock(|b| b.can_toggle_task())?;
        if self.token_is_valid()? == false {
            return Ok(Reply::failure(FORBIDDEN_ERROR));
        }
        let today = self.today()?;
        let mut data = self.lock_data()?;
        let task = match data.tasks.get_mut(&id) {
            None => return Ok(Reply::failure("Task not found")),
            Some((_, task)) => task,
        };
        task.set_completed(completed);
        task.set_overdue(task.is_overdue_on(today));
        log::debug!("Local service: task {} is now {}", id, if completed { "done" } else { "not done" });
        Ok(Reply::Success(ToggleReply { is_overdue: task.overdue(), is_done: Some(task.completed()) }))
    }

    async fn update_task(&self, id: TaskId, name: &str, deadline: &str) -> Result<Reply<TaskReply>, Box<dyn Error>> {
        self.mock(|b| b.can_update_task())?;
        if self.token_is_valid()? == false {
            return Ok(Reply::failure(FORBIDDEN_ERROR));
        }
        let today = self.today()?;
        let mut data = self.lock_data()?;
        let task = match data.tasks.get_mut(&id) {
            None => return Ok(Reply::failure("Task not found")),
            Some((_, task)) => task,
        };
        let (name, deadline) = match validate_task_payload(name, deadline) {
            Err(errors) => return Ok(Reply::field_errors(errors)),
            Ok(valid) => valid,
        };
        task.set_name(name);
        task.set_deadline(deadline);
        task.set_overdue(task.is_overdue_on(today));
        Ok(Reply::Success(Self::serialize_task(task, today)))
    }

    async fn create_task(&self, seminar: SeminarId, name: &str, deadline: &str) -> Result<Reply<TaskReply>, Box<dyn Error>> {
        self.mock(|b| b.can_create_task())?;
        if self.token_is_valid()? == false {
            return Ok(Reply::failure(FORBIDDEN_ERROR));
        }
        let (name, deadline) = match validate_task_payload(name, deadline) {
            Err(errors) => return Ok(Reply::field_errors(errors)),
            Ok(valid) => valid,
        };
        let task = self.add_task(seminar, &name, deadline, false)?;
        Ok(Reply::Success(Self::serialize_task(&task, self.today()?)))
    }
}

#[async_trait]
impl TemplateService for LocalTaskService {
    async fn create_template_task(&self, template: TemplateId, fields: &TemplateFields) -> Result<Reply<TemplateTaskReply>, Box<dyn Error>> {
        self.mock(|b| b.can_create_template_task())?;
        if self.token_is_valid()? == false {
            return Ok(Reply::failure(FORBIDDEN_ERROR));
        }
        let valid = match validate_template_payload(fields) {
            Err(errors) => return Ok(Reply::field_errors(errors)),
            Ok(valid) => valid,
        };
        let mut data = self.lock_data()?;
        data.last_template_task_id += 1;
        let task = TaskTemplate::new(data.last_template_task_id, valid.name().to_string(), valid.relative_days_before(),
                                     valid.default_assignee().to_string(), valid.default_notes().to_string());
        let reply = Self::serialize_template_task(&task);
        data.templates.insert(task.id(), (template, task));
        Ok(Reply::Success(reply))
    }

    async fn update_template_task(&self, id: TemplateTaskId, fields: &TemplateFields) -> Result<Reply<TemplateTaskReply>, Box<dyn Error>> {
        self.mock(|b| b.can_update_template_task())?;
        if self.token_is_valid()? == false {
            return Ok(Reply::failure(FORBIDDEN_ERROR));
        }
        let mut data = self.lock_data()?;
        let entry = match data.templates.get_mut(&id) {
            None => return Ok(Reply::failure("TaskTemplate not found")),
            Some((_, task)) => task,
        };
        let valid = match validate_template_payload(fields) {
            Err(errors) => return Ok(Reply::field_errors(errors)),
            Ok(valid) => valid,
        };
        *entry = TaskTemplate::new(id, valid.name().to_string(), valid.relative_days_before(),
                                   valid.default_assignee().to_string(), valid.default_notes().to_string());
        Ok(Reply::Success(Self::serialize_template_task(entry)))
    }

    async fn delete_template_task(&self, id: TemplateTaskId) -> Result<Reply<Ack>, Box<dyn Error>> {
        self.mock(|b| b.can_delete_template_task())?;
        if self.token_is_valid()? == false {
            return Ok(Reply::failure(FORBIDDEN_ERROR));
        }
        match self.lock_data()?.templates.remove(&id) {
            None => Ok(Reply::failure("TaskTemplate not found")),
            Some(_) => Ok(Reply::Success(Ack {})),
        }
    }
}
