//! Persistence layer: developers, projects, feedback and digest queries.
//!
//! Two traits split the store by consumer. [`Store`] carries the CRUD
//! operations used by the HTTP services; [`DigestSource`] is the narrow
//! read contract the digest aggregator depends on. Both are implemented by
//! [`PostgresStore`] (`sqlx::PgPool`) and [`InMemoryStore`] (development
//! and tests).

pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

use crate::domain::{
    ActivityRow, Developer, DeveloperAccount, DeveloperId, DigestWindow, Message, MessagePayload,
    NewDeveloper, NewMessage, NewThankYou, PreferenceUpdate, Project, ProjectId, ProjectName,
    ThankYouClick, ThankYouPayload,
};
use crate::error::AppError;

/// CRUD operations over developers, projects and feedback.
///
/// All methods return [`AppError::StoreUnavailable`] when the backend
/// cannot be reached.
#[async_trait]
pub trait Store: Send + Sync + fmt::Debug {
    /// Inserts a developer.
    ///
    /// Fails with [`AppError::UsernameTaken`] on a duplicate username.
    async fn create_developer(&self, new: NewDeveloper) -> Result<Developer, AppError>;

    /// Looks a developer up by username, including the password hash.
    async fn developer_by_username(
        &self,
        username: &str,
    ) -> Result<Option<DeveloperAccount>, AppError>;

    /// Looks a developer up by id.
    async fn developer_by_id(&self, id: DeveloperId) -> Result<Option<Developer>, AppError>;

    /// Applies a partial preference update and returns the new state.
    ///
    /// Fails with [`AppError::DeveloperNotFound`] for an unknown id.
    async fn update_preferences(
        &self,
        id: DeveloperId,
        update: PreferenceUpdate,
    ) -> Result<Developer, AppError>;

    /// Advances the developer's `last_summary_sent` watermark to `sent_at`.
    /// The watermark never moves backwards.
    ///
    /// Fails with [`AppError::DeveloperNotFound`] for an unknown id.
    async fn mark_summary_sent(
        &self,
        id: DeveloperId,
        sent_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Inserts a project.
    ///
    /// Fails with [`AppError::ProjectNameTaken`] if the developer already
    /// owns a project with this name.
    async fn create_project(
        &self,
        developer_id: DeveloperId,
        name: &ProjectName,
    ) -> Result<Project, AppError>;

    /// Looks a project up by id.
    async fn project_by_id(&self, id: ProjectId) -> Result<Option<Project>, AppError>;

    /// Looks a project up by owner and name.
    async fn project_by_name(
        &self,
        developer_id: DeveloperId,
        name: &str,
    ) -> Result<Option<Project>, AppError>;

    /// All projects of a developer, by id.
    async fn projects_for_developer(
        &self,
        developer_id: DeveloperId,
    ) -> Result<Vec<Project>, AppError>;

    /// Inserts a message.
    async fn insert_message(&self, new: NewMessage) -> Result<Message, AppError>;

    /// Inserts a thank-you click batch.
    async fn insert_thank_you(&self, new: NewThankYou) -> Result<ThankYouClick, AppError>;

    /// Sum of all click counts of a project.
    async fn total_clicks(&self, project_id: ProjectId) -> Result<i64, AppError>;

    /// Bodies of all messages of a project, oldest first.
    async fn message_contents(&self, project_id: ProjectId) -> Result<Vec<String>, AppError>;

    /// Latest messages of a project, newest first.
    async fn recent_messages(
        &self,
        project_id: ProjectId,
        limit: u32,
    ) -> Result<Vec<Message>, AppError>;

    /// Latest thank-you batches of a project, newest first.
    async fn recent_thank_yous(
        &self,
        project_id: ProjectId,
        limit: u32,
    ) -> Result<Vec<ThankYouClick>, AppError>;
}

/// Read contract of the digest aggregator.
///
/// Implementations return only rows admitted by the window (see
/// [`DigestWindow::admits`]), ordered by developer id, then project id,
/// then item timestamp descending (item id descending on ties).
#[async_trait]
pub trait DigestSource: Send + Sync + fmt::Debug {
    /// Unsent messages joined with their project and developer.
    async fn unsent_message_rows(
        &self,
        window: &DigestWindow,
    ) -> Result<Vec<ActivityRow<MessagePayload>>, AppError>;

    /// Unsent thank-you clicks joined with their project and developer.
    async fn unsent_thank_you_rows(
        &self,
        window: &DigestWindow,
    ) -> Result<Vec<ActivityRow<ThankYouPayload>>, AppError>;
}
