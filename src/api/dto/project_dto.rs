//! Project DTOs for the owner dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{DeveloperId, MessageEntry, Project, ProjectId, ProjectName, ThankYouEntry};
use crate::service::{ProjectDetails, ProjectStats, ProjectSummary};

/// Request body for `POST /projects`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    /// Project name, 3-100 characters of `[A-Za-z0-9_-]`.
    pub name: ProjectName,
}

/// A project.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectResponse {
    /// Project id.
    pub id: ProjectId,
    /// Project name.
    pub name: String,
    /// Owning developer.
    pub dev_id: DeveloperId,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            dev_id: project.developer_id,
        }
    }
}

/// Response body for `GET /projects/{id}/stats`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectStatsResponse {
    /// Project name.
    pub project_name: String,
    /// Owning developer.
    pub dev_id: DeveloperId,
    /// Sum of all clicks.
    pub total_clicks: i64,
    /// Every message body, oldest first.
    pub messages: Vec<String>,
}

impl From<ProjectStats> for ProjectStatsResponse {
    fn from(stats: ProjectStats) -> Self {
        Self {
            project_name: stats.project.name,
            dev_id: stats.project.developer_id,
            total_clicks: stats.total_clicks,
            messages: stats.messages,
        }
    }
}

/// Latest message in a project summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct LastMessageDto {
    /// Message body.
    pub content: String,
    /// End-user handle.
    pub user_id: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}

impl From<MessageEntry> for LastMessageDto {
    fn from(entry: MessageEntry) -> Self {
        Self {
            content: entry.content,
            user_id: entry.user_id,
            timestamp: entry.timestamp,
        }
    }
}

/// One line of `GET /projects/summary`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectSummaryResponse {
    /// Project id.
    pub id: ProjectId,
    /// Project name.
    pub name: String,
    /// Owning developer.
    pub dev_id: DeveloperId,
    /// Sum of all clicks.
    #[serde(rename = "totalClicks")]
    pub total_clicks: i64,
    /// Most recent message, `null` if none.
    #[serde(rename = "lastMessage")]
    pub last_message: Option<LastMessageDto>,
}

impl From<ProjectSummary> for ProjectSummaryResponse {
    fn from(summary: ProjectSummary) -> Self {
        Self {
            id: summary.project.id,
            name: summary.project.name,
            dev_id: summary.project.developer_id,
            total_clicks: summary.total_clicks,
            last_message: summary.last_message.map(LastMessageDto::from),
        }
    }
}

/// Response body for `GET /projects/{id}/details`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectDetailsResponse {
    /// Project id.
    pub id: ProjectId,
    /// Project name.
    pub name: String,
    /// Owning developer.
    pub dev_id: DeveloperId,
    /// Ten latest thank-you batches, newest first.
    #[serde(rename = "recentClicks")]
    pub recent_clicks: Vec<ThankYouEntry>,
    /// Ten latest messages, newest first.
    #[serde(rename = "recentMessages")]
    pub recent_messages: Vec<MessageEntry>,
}

impl From<ProjectDetails> for ProjectDetailsResponse {
    fn from(details: ProjectDetails) -> Self {
        Self {
            id: details.project.id,
            name: details.project.name,
            dev_id: details.project.developer_id,
            recent_clicks: details.recent_clicks,
            recent_messages: details.recent_messages,
        }
    }
}
