//! Mail listeners.

use super::{
    ports::{MailMessage, Mailer, MailerError, MailerResult},
    recipients::RecipientResolver,
};
use crate::accounts::{UserDirectory, UserId};
use crate::activity::{EventListener, ListenerError, ProjectEvent};
use crate::project::domain::Project;
use crate::project::ports::ProjectRepository;
use crate::tracker::domain::{Changeset, FieldValue, LabelKind, Task};
use crate::tracker::ports::{TaskRepository, WorkflowRepository, WorkflowRepositoryError};
use async_trait::async_trait;
use minijinja::{Environment, context};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const TASK_MAIL_TEMPLATE: &str = "\
{{ project }} #{{ number }}: {{ summary }}
{% if created %}New task opened by {{ editor }}.{% else %}Changed by {{ editor }} (revision {{ revision }}).{% endif %}
{% for change in changes %}
  {{ change.field }}: {{ change.old }} -> {{ change.new }}
{%- endfor %}
{% if comment %}
{{ comment }}
{% endif %}";

#[derive(Debug, Serialize)]
struct RenderedChange {
    field: &'static str,
    old: String,
    new: String,
}

/// Mails watcher candidates when a task is created or changed.
///
/// The editor never receives mail about their own change.
pub struct TaskNotifier<T, P, W, D, M>
where
    T: TaskRepository,
    P: ProjectRepository,
    W: WorkflowRepository,
    D: UserDirectory,
    M: Mailer,
{
    recipients: RecipientResolver<T, P, D>,
    workflow: Arc<W>,
    directory: Arc<D>,
    mailer: Arc<M>,
    from: String,
}

impl<T, P, W, D, M> TaskNotifier<T, P, W, D, M>
where
    T: TaskRepository,
    P: ProjectRepository,
    W: WorkflowRepository,
    D: UserDirectory,
    M: Mailer,
{
    /// Creates a notifier sending from `from`.
    #[must_use]
    pub fn new(
        recipients: RecipientResolver<T, P, D>,
        workflow: Arc<W>,
        directory: Arc<D>,
        mailer: Arc<M>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            recipients,
            workflow,
            directory,
            mailer,
            from: from.into(),
        }
    }

    async fn notify(
        &self,
        project: &Project,
        task: &Task,
        changes: Option<&Changeset>,
        comment: Option<&str>,
    ) -> Result<(), ListenerError> {
        let editor = task.editor();
        let users = self
            .recipients
            .recipients(project, task, editor)
            .await
            .map_err(ListenerError::new)?;
        let to: Vec<String> = users
            .iter()
            .filter_map(|user| user.email().map(str::to_owned))
            .collect();
        if to.is_empty() {
            debug!(task = %task.pk(), "no notification recipients");
            return Ok(());
        }

        let names = self
            .display_names(project)
            .await
            .map_err(ListenerError::new)?;
        let mut rendered = Vec::new();
        for change in changes.into_iter().flatten() {
            rendered.push(RenderedChange {
                field: change.field.as_str(),
                old: self.describe(&change.old, &names).await,
                new: self.describe(&change.new, &names).await,
            });
        }

        let body = Environment::new()
            .render_str(
                TASK_MAIL_TEMPLATE,
                context! {
                    project => project.name().as_str(),
                    number => task.number().value(),
                    summary => task.fields().summary.as_str(),
                    created => changes.is_none(),
                    editor => self.username_of(editor).await,
                    revision => task.revision(),
                    changes => rendered,
                    comment => comment,
                },
            )
            .map_err(|err| ListenerError::new(MailerError::Template(err.to_string())))?;
        let subject = format!(
            "[{}] {} {}",
            project.name(),
            task.number(),
            task.fields().summary
        );
        let message = MailMessage::new(self.from.clone(), to, subject, body);
        self.mailer
            .send(&message)
            .await
            .map_err(ListenerError::new)?;
        info!(
            task = %task.pk(),
            recipients = message.to.len(),
            "sent task notification"
        );
        Ok(())
    }

    async fn display_names(
        &self,
        project: &Project,
    ) -> Result<HashMap<Uuid, String>, WorkflowRepositoryError> {
        let id = project.id();
        let mut names = HashMap::new();
        for status in self.workflow.list_statuses(id).await? {
            names.insert(status.id.into_inner(), status.name);
        }
        for component in self.workflow.list_components(id).await? {
            names.insert(component.id.into_inner(), component.name);
        }
        for kind in [LabelKind::TaskType, LabelKind::Priority] {
            for label in self.workflow.list_labels(id, kind).await? {
                names.insert(label.id.into_inner(), label.name);
            }
        }
        for milestone in self.workflow.list_milestones(id).await? {
            names.insert(milestone.id.into_inner(), milestone.name);
        }
        Ok(names)
    }

    async fn describe(&self, value: &FieldValue, names: &HashMap<Uuid, String>) -> String {
        let key = match value {
            FieldValue::Status(id) => Some(id.into_inner()),
            FieldValue::Component(id) => Some(id.into_inner()),
            FieldValue::Milestone(id) => Some(id.into_inner()),
            FieldValue::Label(id) => Some(id.into_inner()),
            FieldValue::User(id) => return self.username_of(*id).await,
            FieldValue::Empty | FieldValue::Text(_) | FieldValue::Date(_) => None,
        };
        key.and_then(|uuid| names.get(&uuid).cloned())
            .unwrap_or_else(|| value.to_string())
    }

    async fn username_of(&self, id: UserId) -> String {
        match self.directory.find_user(id).await {
            Ok(Some(user)) => user.username().as_str().to_owned(),
            _ => id.to_string(),
        }
    }
}

#[async_trait]
impl<T, P, W, D, M> EventListener for TaskNotifier<T, P, W, D, M>
where
    T: TaskRepository + 'static,
    P: ProjectRepository + 'static,
    W: WorkflowRepository + 'static,
    D: UserDirectory + 'static,
    M: Mailer + 'static,
{
    fn name(&self) -> &'static str {
        "task_notifier"
    }

    async fn on_event(&self, event: &ProjectEvent) -> Result<(), ListenerError> {
        match event {
            ProjectEvent::TaskCreated { project, task, .. } => {
                self.notify(project, task, None, None).await
            }
            ProjectEvent::TaskChanged {
                project,
                task,
                revision,
                changes,
                ..
            } => {
                self.notify(project, task, Some(changes), revision.comment.as_deref())
                    .await
            }
            _ => Ok(()),
        }
    }
}

/// Sends operational alerts to the configured administrators.
pub struct AdminMailer<M>
where
    M: Mailer,
{
    mailer: Arc<M>,
    from: String,
    admins: Vec<String>,
}

impl<M> Clone for AdminMailer<M>
where
    M: Mailer,
{
    fn clone(&self) -> Self {
        Self {
            mailer: Arc::clone(&self.mailer),
            from: self.from.clone(),
            admins: self.admins.clone(),
        }
    }
}

impl<M> AdminMailer<M>
where
    M: Mailer,
{
    /// Creates an admin mailer.
    #[must_use]
    pub fn new(mailer: Arc<M>, from: impl Into<String>, admins: Vec<String>) -> Self {
        Self {
            mailer,
            from: from.into(),
            admins,
        }
    }

    /// Mails every administrator. Does nothing when none are configured.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError`] when delivery fails.
    pub async fn alert(&self, subject: &str, body: &str) -> MailerResult<()> {
        if self.admins.is_empty() {
            debug!(subject, "no administrators configured, alert dropped");
            return Ok(());
        }
        let message = MailMessage::new(self.from.clone(), self.admins.clone(), subject, body);
        self.mailer.send(&message).await
    }
}
