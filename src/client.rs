//! This module provides a client to connect to the seminar server
//!
//! Every endpoint is a form-encoded `POST` that answers with a JSON [`Reply`].

use std::error::Error;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::CSRF_HEADER_NAME;
use crate::reply::{Ack, CommentReply, FavoriteReply, IntegrationReply, NotificationReply, Reply, TaskReply, TemplateTaskReply, ToggleReply};
use crate::resource::Resource;
use crate::task::TaskId;
use crate::templates::{TemplateFields, TemplateId, TemplateTaskId};
use crate::traits::{SeminarId, TaskService, TemplateService};


/// The fields of an external integration (a chat webhook, for instance)
#[derive(Clone, Debug, PartialEq)]
pub struct IntegrationFields {
    pub provider: String,
    pub name: String,
    pub is_active: bool,
    /// Provider-specific settings. `None` keeps the stored ones on updates, and means `{}` on creation
    pub config: Option<serde_json::Value>,
}

impl IntegrationFields {
    fn to_form(&self, default_config: Option<&str>) -> Result<Vec<(&'static str, String)>, Box<dyn Error>> {
        let mut form = vec![
            ("provider", self.provider.clone()),
            ("name", self.name.clone()),
            ("is_active", if self.is_active { "1" } else { "0" }.to_string()),
        ];
        match (&self.config, default_config) {
            (Some(config), _) => form.push(("config", serde_json::to_string(config)?)),
            (None, Some(default)) => form.push(("config", default.to_string())),
            (None, None) => (),
        }
        Ok(form)
    }
}


/// A task service that talks to the seminar server
#[derive(Clone, Debug)]
pub struct Client {
    resource: Resource,
    http: reqwest::Client,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>>(url: S, csrf_token: Option<String>) -> Result<Self, Box<dyn Error>> {
        let url = Url::parse(url.as_ref())?;
        Self::from_resource(Resource::new(url, csrf_token))
    }

    pub fn from_resource(resource: Resource) -> Result<Self, Box<dyn Error>> {
        let http = reqwest::Client::builder()
            .user_agent(crate::config::user_agent())
            .build()?;
        Ok(Self { resource, http })
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn resource_mut(&mut self) -> &mut Resource {
        &mut self.resource
    }

    async fn post_form<T: DeserializeOwned>(&self, path: &str, form: &[(&str, String)]) -> Result<Reply<T>, Box<dyn Error>> {
        let url = self.resource.combine(path);
        log::debug!("POST {}", url);

        let mut request = self.http.post(url.as_str()).form(form);
        if let Some(token) = self.resource.csrf_token() {
            request = request.header(CSRF_HEADER_NAME, token);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        match Reply::from_json(&text) {
            Ok(reply) => {
                if let Reply::Failure { errors, error } = &reply {
                    log::warn!("{} was rejected ({}): {:?} {:?}", url, status, error, errors);
                }
                Ok(reply)
            },
            Err(err) if status.is_success() => {
                Err(format!("Unexpected reply from {}: {}", url, err).into())
            },
            Err(_) => {
                Err(format!("Unexpected HTTP status code {:?} from {}", status, url).into())
            },
        }
    }


    /// Mark or unmark a news article as a favorite
    pub async fn toggle_favorite(&self, article_id: u64) -> Result<Reply<FavoriteReply>, Box<dyn Error>> {
        // This endpoint reads the anti-forgery token from the form rather than from the header
        let token = self.resource.csrf_token().unwrap_or_default().to_string();
        self.post_form(&format!("/news/toggle_favorite/{}/", article_id), &[("csrfmiddlewaretoken", token)]).await
    }

    /// Create or replace the comment of the current user on an article
    pub async fn save_comment(&self, article_id: u64, content: &str) -> Result<Reply<CommentReply>, Box<dyn Error>> {
        self.post_form(&format!("/news/comment/{}/", article_id), &[("content", content.to_string())]).await
    }

    pub async fn delete_comment(&self, article_id: u64) -> Result<Reply<Ack>, Box<dyn Error>> {
        self.post_form(&format!("/news/comment/delete/{}/", article_id), &[]).await
    }

    pub async fn create_integration(&self, fields: &IntegrationFields) -> Result<Reply<IntegrationReply>, Box<dyn Error>> {
        self.post_form("/account/integrations/create/", &fields.to_form(Some("{}"))?).await
    }

    pub async fn update_integration(&self, id: u64, fields: &IntegrationFields) -> Result<Reply<IntegrationReply>, Box<dyn Error>> {
        self.post_form(&format!("/account/integrations/{}/update/", id), &fields.to_form(None)?).await
    }

    pub async fn delete_integration(&self, id: u64) -> Result<Reply<Ack>, Box<dyn Error>> {
        self.post_form(&format!("/account/integrations/{}/delete/", id), &[]).await
    }

    /// Change when a notification is sent and where to. Empty values leave the stored ones untouched
    pub async fn update_notification(&self, id: u64, days_before: Option<i64>, integration_ids: &[u64]) -> Result<Reply<NotificationReply>, Box<dyn Error>> {
        let mut form = Vec::new();
        if let Some(days) = days_before {
            form.push(("days_before", days.to_string()));
        }
        if integration_ids.is_empty() == false {
            let ids: Vec<String> = integration_ids.iter().map(|id| id.to_string()).collect();
            form.push(("integration_ids", ids.join(",")));
        }
        self.post_form(&format!("/seminars/notifications/{}/update/", id), &form).await
    }

    pub async fn delete_notification(&self, id: u64) -> Result<Reply<Ack>, Box<dyn Error>> {
        self.post_form(&format!("/seminars/notifications/{}/delete/", id), &[]).await
    }
}

fn template_form(fields: &TemplateFields) -> Vec<(&'static str, String)> {
    vec![
        ("name", fields.name.clone()),
        ("relative_days_before", fields.relative_days_before.clone()),
        ("default_assignee", fields.default_assignee.clone()),
        ("default_notes", fields.default_notes.clone()),
    ]
}

#[async_trait]
impl TaskService for Client {
    async fn toggle_task(&self, id: TaskId, completed: bool) -> Result<Reply<ToggleReply>, Box<dyn Error>> {
        let form = [
            ("task_id", id.to_string()),
            ("is_completed", completed.to_string()),
        ];
        self.post_form(&format!("/seminars/tasks/{}/toggle-ajax/", id), &form).await
    }

    async fn update_task(&self, id: TaskId, name: &str, deadline: &str) -> Result<Reply<TaskReply>, Box<dyn Error>> {
        let form = [
            ("name", name.to_string()),
            ("deadline", deadline.to_string()),
        ];
        self.post_form(&format!("/seminars/tasks/{}/update-ajax/", id), &form).await
    }

    async fn create_task(&self, seminar: SeminarId, name: &str, deadline: &str) -> Result<Reply<TaskReply>, Box<dyn Error>> {
        let form = [
            ("name", name.to_string()),
            ("deadline", deadline.to_string()),
        ];
        self.post_form(&format!("/seminars/{}/tasks/create-ajax/", seminar), &form).await
    }
}

#[async_trait]
impl TemplateService for Client {
    async fn create_template_task(&self, template: TemplateId, fields: &TemplateFields) -> Result<Reply<TemplateTaskReply>, Box<dyn Error>> {
        self.post_form(&format!("/seminars/templates/{}/tasks/create-ajax/", template), &template_form(fields)).await
    }

    async fn update_template_task(&self, id: TemplateTaskId, fields: &TemplateFields) -> Result<Reply<TemplateTaskReply>, Box<dyn Error>> {
        self.post_form(&format!("/seminars/templates/tasks/{}/update-ajax/", id), &template_form(fields)).await
    }

    async fn delete_template_task(&self, id: TemplateTaskId) -> Result<Reply<Ack>, Box<dyn Error>> {
        self.post_form(&format!("/seminars/templates/tasks/{}/delete-ajax/", id), &[]).await
    }
}
