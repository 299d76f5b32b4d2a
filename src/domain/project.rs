//! Projects and the feedback left on them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{DeveloperId, MessageEntry, ProjectId, ThankYouEntry};

/// A project owned by a developer. `(name, developer_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    /// Primary key.
    pub id: ProjectId,
    /// Project name, unique per developer.
    pub name: String,
    /// Owning developer.
    pub developer_id: DeveloperId,
}

/// A short text message an end user sent to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Primary key.
    pub id: i64,
    /// Target project.
    pub project_id: ProjectId,
    /// Handle of the end user.
    pub user_id: String,
    /// Message body, at most 5000 characters.
    pub content: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}

/// A batch of thank-you clicks from one end user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThankYouClick {
    /// Primary key.
    pub id: i64,
    /// Target project.
    pub project_id: ProjectId,
    /// Handle of the end user.
    pub user_id: String,
    /// Number of clicks, strictly positive.
    pub count: i32,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}

impl From<&Message> for MessageEntry {
    fn from(message: &Message) -> Self {
        Self {
            user_id: message.user_id.clone(),
            content: message.content.clone(),
            timestamp: message.timestamp,
        }
    }
}

impl From<&ThankYouClick> for ThankYouEntry {
    fn from(click: &ThankYouClick) -> Self {
        Self {
            user_id: click.user_id.clone(),
            count: click.count,
            timestamp: click.timestamp,
        }
    }
}

/// Data needed to insert a message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    /// Target project.
    pub project_id: ProjectId,
    /// Handle of the end user.
    pub user_id: String,
    /// Validated message body.
    pub content: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}

/// Data needed to insert a thank-you click batch.
#[derive(Debug, Clone)]
pub struct NewThankYou {
    /// Target project.
    pub project_id: ProjectId,
    /// Handle of the end user.
    pub user_id: String,
    /// Number of clicks, strictly positive.
    pub count: i32,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}
