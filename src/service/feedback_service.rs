//! Feedback intake: thank-you clicks and messages from end users.
//!
//! Recording never waits for email. When the owning developer opted into
//! instant notifications, a background task sends them and only logs
//! failures.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::names::validate_message;
use crate::domain::{
    DeveloperId, Message, MessageEntry, NewMessage, NewThankYou, Project, ProjectName,
    ThankYouClick, ThankYouEntry, UserHandle,
};
use crate::error::AppError;
use crate::notify::InstantNotifier;
use crate::persistence::Store;

/// A batch of thank-you clicks addressed by project name and owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThankYouSubmission {
    /// Target project name.
    pub project_name: ProjectName,
    /// Owner of the project.
    pub developer_id: DeveloperId,
    /// End-user handle.
    pub user_id: UserHandle,
    /// Number of clicks, must be positive.
    pub clicks: i32,
}

/// A message addressed by project name and owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSubmission {
    /// Target project name.
    pub project_name: ProjectName,
    /// Owner of the project.
    pub developer_id: DeveloperId,
    /// End-user handle.
    pub user_id: UserHandle,
    /// Message body.
    pub content: String,
}

/// Records end-user feedback.
#[derive(Debug, Clone)]
pub struct FeedbackService {
    store: Arc<dyn Store>,
    notifier: InstantNotifier,
}

impl FeedbackService {
    /// Creates a new `FeedbackService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, notifier: InstantNotifier) -> Self {
        Self { store, notifier }
    }

    async fn target(
        &self,
        developer_id: DeveloperId,
        project_name: &ProjectName,
    ) -> Result<Project, AppError> {
        self.store
            .project_by_name(developer_id, project_name.as_str())
            .await?
            .ok_or_else(|| AppError::ProjectNotFound {
                project_name: project_name.to_string(),
                developer_id,
            })
    }

    /// Records a thank-you click batch.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidRequest`] if `clicks` is not positive.
    /// - [`AppError::ProjectNotFound`] if the developer has no such project.
    pub async fn record_thank_you(
        &self,
        submission: ThankYouSubmission,
    ) -> Result<ThankYouClick, AppError> {
        if submission.clicks <= 0 {
            return Err(AppError::InvalidRequest(
                "clicks must be a positive integer".to_string(),
            ));
        }
        let project = self
            .target(submission.developer_id, &submission.project_name)
            .await?;
        let click = self
            .store
            .insert_thank_you(NewThankYou {
                project_id: project.id,
                user_id: submission.user_id.to_string(),
                count: submission.clicks,
                timestamp: Utc::now(),
            })
            .await?;
        tracing::info!(project_id = %project.id, clicks = click.count, "thank-you recorded");

        let this = self.clone();
        let recorded = click.clone();
        tokio::spawn(async move { this.notify_thank_you(&project, &recorded).await });
        Ok(click)
    }

    /// Records a message.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidRequest`] for an empty or oversized body.
    /// - [`AppError::ProjectNotFound`] if the developer has no such project.
    pub async fn record_message(&self, submission: MessageSubmission) -> Result<Message, AppError> {
        validate_message(&submission.content)?;
        let project = self
            .target(submission.developer_id, &submission.project_name)
            .await?;
        let message = self
            .store
            .insert_message(NewMessage {
                project_id: project.id,
                user_id: submission.user_id.to_string(),
                content: submission.content,
                timestamp: Utc::now(),
            })
            .await?;
        tracing::info!(project_id = %project.id, message_id = message.id, "message recorded");

        let this = self.clone();
        let recorded = message.clone();
        tokio::spawn(async move { this.notify_message(&project, &recorded).await });
        Ok(message)
    }

    /// Sends the instant message email for `message` if the owner wants it.
    /// Errors are logged. Returns whether an email went out.
    pub async fn notify_message(&self, project: &Project, message: &Message) -> bool {
        let outcome = match self.store.developer_by_id(project.developer_id).await {
            Ok(Some(developer)) => {
                self.notifier
                    .new_message(&developer, &project.name, &MessageEntry::from(message))
                    .await
            }
            Ok(None) => Err(AppError::DeveloperNotFound(project.developer_id)),
            Err(e) => Err(e),
        };
        log_outcome(project, "message", outcome)
    }

    /// Sends the instant thank-you email for `click` if the owner wants it.
    /// Errors are logged. Returns whether an email went out.
    pub async fn notify_thank_you(&self, project: &Project, click: &ThankYouClick) -> bool {
        let outcome = match self.store.developer_by_id(project.developer_id).await {
            Ok(Some(developer)) => {
                self.notifier
                    .new_thank_you(&developer, &project.name, &ThankYouEntry::from(click))
                    .await
            }
            Ok(None) => Err(AppError::DeveloperNotFound(project.developer_id)),
            Err(e) => Err(e),
        };
        log_outcome(project, "thank-you", outcome)
    }
}

fn log_outcome(project: &Project, kind: &str, outcome: Result<bool, AppError>) -> bool {
    match outcome {
        Ok(sent) => {
            if sent {
                tracing::debug!(project_id = %project.id, kind, "instant notification sent");
            }
            sent
        }
        Err(e) => {
            tracing::warn!(project_id = %project.id, kind, error = %e, "instant notification failed");
            false
        }
    }
}
