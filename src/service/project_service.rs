//! Project service: creation, listing and owner-only statistics.

use std::sync::Arc;

use crate::domain::{DeveloperId, MessageEntry, Project, ProjectId, ProjectName, ThankYouEntry};
use crate::error::AppError;
use crate::persistence::Store;

/// Number of items returned by [`ProjectService::details`].
pub const DETAILS_LIMIT: u32 = 10;

/// All-time statistics of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectStats {
    /// The project.
    pub project: Project,
    /// Sum of all clicks.
    pub total_clicks: i64,
    /// All message bodies, oldest first.
    pub messages: Vec<String>,
}

/// Dashboard line of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    /// The project.
    pub project: Project,
    /// Sum of all clicks.
    pub total_clicks: i64,
    /// Most recent message, if any.
    pub last_message: Option<MessageEntry>,
}

/// Latest activity of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDetails {
    /// The project.
    pub project: Project,
    /// Latest thank-you batches, newest first.
    pub recent_clicks: Vec<ThankYouEntry>,
    /// Latest messages, newest first.
    pub recent_messages: Vec<MessageEntry>,
}

/// Project operations scoped to the authenticated developer.
#[derive(Debug, Clone)]
pub struct ProjectService {
    store: Arc<dyn Store>,
}

impl ProjectService {
    /// Creates a new `ProjectService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Creates a project owned by `developer_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ProjectNameTaken`] if the developer already owns
    /// a project with this name.
    pub async fn create(
        &self,
        developer_id: DeveloperId,
        name: &ProjectName,
    ) -> Result<Project, AppError> {
        let project = self.store.create_project(developer_id, name).await?;
        tracing::info!(developer_id = %developer_id, project_id = %project.id, name = %project.name, "project created");
        Ok(project)
    }

    /// Lists the developer's projects.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on backend failure.
    pub async fn list(&self, developer_id: DeveloperId) -> Result<Vec<Project>, AppError> {
        self.store.projects_for_developer(developer_id).await
    }

    /// Loads a project and checks that `developer_id` owns it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] if the project does not exist or
    /// belongs to someone else.
    pub async fn owned(
        &self,
        developer_id: DeveloperId,
        project_id: ProjectId,
    ) -> Result<Project, AppError> {
        match self.store.project_by_id(project_id).await? {
            Some(project) if project.developer_id == developer_id => Ok(project),
            _ => {
                tracing::warn!(developer_id = %developer_id, project_id = %project_id, "project access denied");
                Err(AppError::Forbidden)
            }
        }
    }

    /// Total clicks and every message body of an owned project.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] if the developer does not own it.
    pub async fn stats(
        &self,
        developer_id: DeveloperId,
        project_id: ProjectId,
    ) -> Result<ProjectStats, AppError> {
        let project = self.owned(developer_id, project_id).await?;
        let total_clicks = self.store.total_clicks(project.id).await?;
        let messages = self.store.message_contents(project.id).await?;
        Ok(ProjectStats {
            project,
            total_clicks,
            messages,
        })
    }

    /// One summary line per project of the developer.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on backend failure.
    pub async fn summaries(
        &self,
        developer_id: DeveloperId,
    ) -> Result<Vec<ProjectSummary>, AppError> {
        let projects = self.store.projects_for_developer(developer_id).await?;
        let mut summaries = Vec::with_capacity(projects.len());
        for project in projects {
            let total_clicks = self.store.total_clicks(project.id).await?;
            let last_message = self
                .store
                .recent_messages(project.id, 1)
                .await?
                .first()
                .map(MessageEntry::from);
            summaries.push(ProjectSummary {
                project,
                total_clicks,
                last_message,
            });
        }
        Ok(summaries)
    }

    /// The [`DETAILS_LIMIT`] latest clicks and messages of an owned
    /// project.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] if the developer does not own it.
    pub async fn details(
        &self,
        developer_id: DeveloperId,
        project_id: ProjectId,
    ) -> Result<ProjectDetails, AppError> {
        let project = self.owned(developer_id, project_id).await?;
        let recent_clicks = self
            .store
            .recent_thank_yous(project.id, DETAILS_LIMIT)
            .await?
            .iter()
            .map(ThankYouEntry::from)
            .collect();
        let recent_messages = self
            .store
            .recent_messages(project.id, DETAILS_LIMIT)
            .await?
            .iter()
            .map(MessageEntry::from)
            .collect();
        Ok(ProjectDetails {
            project,
            recent_clicks,
            recent_messages,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tokio_test::{assert_err, assert_ok};

    use crate::domain::SummaryFrequency;
    use crate::persistence::InMemoryStore;
    use crate::test_support::{seed_developer, seed_message, seed_project, seed_thank_you};

    fn name(raw: &str) -> ProjectName {
        let Ok(n) = ProjectName::try_from(raw.to_string()) else {
            panic!("invalid name {raw}");
        };
        n
    }

    #[tokio::test]
    async fn create_and_list() {
        let store = Arc::new(InMemoryStore::new());
        let dev = seed_developer(&store, "ada", SummaryFrequency::Daily, Utc::now()).await;
        let svc = ProjectService::new(Arc::clone(&store) as Arc<dyn Store>);

        assert_ok!(svc.create(dev.id, &name("alpha")).await);
        assert_ok!(svc.create(dev.id, &name("beta")).await);
        let err = assert_err!(svc.create(dev.id, &name("alpha")).await);
        assert!(matches!(err, AppError::ProjectNameTaken(_)));

        let names: Vec<String> = assert_ok!(svc.list(dev.id).await)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[tokio::test]
    async fn foreign_and_missing_projects_are_forbidden() {
        let store = Arc::new(InMemoryStore::new());
        let owner = seed_developer(&store, "owner", SummaryFrequency::Daily, Utc::now()).await;
        let other = seed_developer(&store, "other", SummaryFrequency::Daily, Utc::now()).await;
        let project = seed_project(&store, owner.id, "private").await;
        let svc = ProjectService::new(Arc::clone(&store) as Arc<dyn Store>);

        assert!(matches!(svc.stats(other.id, project.id).await, Err(AppError::Forbidden)));
        assert!(matches!(svc.details(other.id, project.id).await, Err(AppError::Forbidden)));
        assert!(matches!(
            svc.stats(owner.id, ProjectId::new(9999)).await,
            Err(AppError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn stats_summary_and_details() {
        let store = Arc::new(InMemoryStore::new());
        let dev = seed_developer(&store, "ada", SummaryFrequency::Daily, Utc::now()).await;
        let busy = seed_project(&store, dev.id, "busy").await;
        let quiet = seed_project(&store, dev.id, "quiet").await;
        let t0 = Utc::now() - Duration::hours(20);
        for i in 0..12 {
            seed_message(&store, busy.id, t0 + Duration::hours(i), &format!("m{i}")).await;
            seed_thank_you(&store, busy.id, t0 + Duration::hours(i), 2).await;
        }
        let svc = ProjectService::new(Arc::clone(&store) as Arc<dyn Store>);

        let stats = assert_ok!(svc.stats(dev.id, busy.id).await);
        assert_eq!(stats.total_clicks, 24);
        assert_eq!(stats.messages.len(), 12);
        assert_eq!(stats.messages.first().map(String::as_str), Some("m0"));

        let summaries = assert_ok!(svc.summaries(dev.id).await);
        assert_eq!(summaries.len(), 2);
        let Some(busy_summary) = summaries.iter().find(|s| s.project.id == busy.id) else {
            panic!("busy project missing");
        };
        assert_eq!(
            busy_summary.last_message.as_ref().map(|m| m.content.as_str()),
            Some("m11")
        );
        let Some(quiet_summary) = summaries.iter().find(|s| s.project.id == quiet.id) else {
            panic!("quiet project missing");
        };
        assert_eq!(quiet_summary.total_clicks, 0);
        assert!(quiet_summary.last_message.is_none());

        let details = assert_ok!(svc.details(dev.id, busy.id).await);
        assert_eq!(details.recent_clicks.len(), 10);
        assert_eq!(details.recent_messages.len(), 10);
        assert_eq!(
            details.recent_messages.first().map(|m| m.content.as_str()),
            Some("m11")
        );
    }
}
