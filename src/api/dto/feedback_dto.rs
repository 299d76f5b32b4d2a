//! Public feedback DTOs posted by the embeddable widget.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{DeveloperId, Message, ProjectId, ProjectName, ThankYouClick, UserHandle};
use crate::service::{MessageSubmission, ThankYouSubmission};

/// Request body for `POST /thank-you`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThankYouRequest {
    /// Target project name.
    pub project_name: ProjectName,
    /// Owner of the project.
    pub dev_id: DeveloperId,
    /// End-user handle.
    pub user_id: UserHandle,
    /// Number of clicks, positive.
    pub clicks: i32,
}

impl From<ThankYouRequest> for ThankYouSubmission {
    fn from(req: ThankYouRequest) -> Self {
        Self {
            project_name: req.project_name,
            developer_id: req.dev_id,
            user_id: req.user_id,
            clicks: req.clicks,
        }
    }
}

/// Request body for `POST /send-message`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    /// Target project name.
    pub project_name: ProjectName,
    /// Owner of the project.
    pub dev_id: DeveloperId,
    /// End-user handle.
    pub user_id: UserHandle,
    /// Message body, at most 5000 characters.
    pub message: String,
}

impl From<MessageRequest> for MessageSubmission {
    fn from(req: MessageRequest) -> Self {
        Self {
            project_name: req.project_name,
            developer_id: req.dev_id,
            user_id: req.user_id,
            content: req.message,
        }
    }
}

/// A recorded thank-you batch.
#[derive(Debug, Serialize, ToSchema)]
pub struct ThankYouResponse {
    /// Row id.
    pub id: i64,
    /// Target project.
    pub project_id: ProjectId,
    /// End-user handle.
    pub user_id: String,
    /// Number of clicks.
    pub count: i32,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}

impl From<ThankYouClick> for ThankYouResponse {
    fn from(click: ThankYouClick) -> Self {
        Self {
            id: click.id,
            project_id: click.project_id,
            user_id: click.user_id,
            count: click.count,
            timestamp: click.timestamp,
        }
    }
}

/// A recorded message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Row id.
    pub id: i64,
    /// Target project.
    pub project_id: ProjectId,
    /// End-user handle.
    pub user_id: String,
    /// Message body.
    pub content: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            project_id: message.project_id,
            user_id: message.user_id,
            content: message.content,
            timestamp: message.timestamp,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn widget_payload_parses() {
        let Ok(req) = serde_json::from_str::<ThankYouRequest>(
            r#"{"projectName": "my-lib", "devId": 3, "userId": "anon_42", "clicks": 2}"#,
        ) else {
            panic!("payload should parse");
        };
        let submission = ThankYouSubmission::from(req);
        assert_eq!(submission.developer_id, DeveloperId::new(3));
        assert_eq!(submission.project_name.as_str(), "my-lib");
        assert_eq!(submission.clicks, 2);
    }

    #[test]
    fn malformed_names_are_rejected() {
        assert!(serde_json::from_str::<MessageRequest>(
            r#"{"projectName": "no spaces", "devId": 3, "userId": "anon", "message": "hi"}"#,
        )
        .is_err());
        assert!(serde_json::from_str::<MessageRequest>(
            r#"{"projectName": "ok-name", "devId": 3, "userId": "x", "message": "hi"}"#,
        )
        .is_err());
    }
}
