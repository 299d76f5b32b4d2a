//! In-memory store for development and tests.
//!
//! [`InMemoryStore`] keeps every table behind a single
//! [`tokio::sync::RwLock`]. Reads run concurrently, writes are serialized.
//! It enforces the same uniqueness rules and digest ordering as the
//! PostgreSQL store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{DigestSource, Store};
use crate::domain::{
    ActivityRow, Developer, DeveloperAccount, DeveloperId, DigestWindow, Message, MessagePayload,
    NewDeveloper, NewMessage, NewThankYou, PreferenceUpdate, Project, ProjectId, ProjectName,
    SummaryFrequency, ThankYouClick, ThankYouPayload,
};
use crate::error::AppError;

#[derive(Debug, Default)]
struct Tables {
    developers: BTreeMap<DeveloperId, DeveloperAccount>,
    projects: BTreeMap<ProjectId, Project>,
    messages: Vec<Message>,
    thank_yous: Vec<ThankYouClick>,
    next_developer_id: i64,
    next_project_id: i64,
    next_item_id: i64,
}

impl Tables {
    fn next_item_id(&mut self) -> i64 {
        self.next_item_id += 1;
        self.next_item_id
    }

    fn require_project(&self, id: ProjectId) -> Result<&Project, AppError> {
        self.projects
            .get(&id)
            .ok_or_else(|| AppError::InvalidRequest(format!("unknown project id {id}")))
    }

    /// Joins items with their project and developer, keeps the admitted
    /// ones and sorts them in digest order.
    fn digest_rows<'a, I, P>(
        &self,
        window: &DigestWindow,
        items: I,
    ) -> Vec<ActivityRow<P>>
    where
        I: Iterator<Item = (i64, ProjectId, &'a str, P, DateTime<Utc>)>,
    {
        let mut rows: Vec<ActivityRow<P>> = items
            .filter_map(|(item_id, project_id, author, payload, timestamp)| {
                let project = self.projects.get(&project_id)?;
                let account = self.developers.get(&project.developer_id)?;
                let developer = &account.developer;
                if !window.admits(developer, timestamp) {
                    return None;
                }
                Some(ActivityRow {
                    developer_id: developer.id,
                    developer_username: developer.username.clone(),
                    developer_email: developer.email.clone(),
                    project_id,
                    project_name: project.name.clone(),
                    item_id,
                    author_id: author.to_string(),
                    payload,
                    timestamp,
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            a.developer_id
                .cmp(&b.developer_id)
                .then(a.project_id.cmp(&b.project_id))
                .then(b.timestamp.cmp(&a.timestamp))
                .then(b.item_id.cmp(&a.item_id))
        });
        rows
    }
}

/// Store holding all data in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_developer(&self, new: NewDeveloper) -> Result<Developer, AppError> {
        let mut tables = self.tables.write().await;
        if tables
            .developers
            .values()
            .any(|a| a.developer.username == new.username)
        {
            return Err(AppError::UsernameTaken(new.username));
        }
        tables.next_developer_id += 1;
        let developer = Developer {
            id: DeveloperId::new(tables.next_developer_id),
            username: new.username,
            email: new.email,
            instant_messages: true,
            instant_thank_you: false,
            summary_frequency: SummaryFrequency::default(),
            last_summary_sent: new.registered_at,
        };
        tables.developers.insert(
            developer.id,
            DeveloperAccount {
                developer: developer.clone(),
                hashed_password: new.hashed_password,
            },
        );
        Ok(developer)
    }

    async fn developer_by_username(
        &self,
        username: &str,
    ) -> Result<Option<DeveloperAccount>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .developers
            .values()
            .find(|a| a.developer.username == username)
            .cloned())
    }

    async fn developer_by_id(&self, id: DeveloperId) -> Result<Option<Developer>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.developers.get(&id).map(|a| a.developer.clone()))
    }

    async fn update_preferences(
        &self,
        id: DeveloperId,
        update: PreferenceUpdate,
    ) -> Result<Developer, AppError> {
        let mut tables = self.tables.write().await;
        let account = tables
            .developers
            .get_mut(&id)
            .ok_or(AppError::DeveloperNotFound(id))?;
        update.apply(&mut account.developer);
        Ok(account.developer.clone())
    }

    async fn mark_summary_sent(
        &self,
        id: DeveloperId,
        sent_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let account = tables
            .developers
            .get_mut(&id)
            .ok_or(AppError::DeveloperNotFound(id))?;
        let watermark = &mut account.developer.last_summary_sent;
        *watermark = (*watermark).max(sent_at);
        Ok(())
    }

    async fn create_project(
        &self,
        developer_id: DeveloperId,
        name: &ProjectName,
    ) -> Result<Project, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.developers.contains_key(&developer_id) {
            return Err(AppError::DeveloperNotFound(developer_id));
        }
        if tables
            .projects
            .values()
            .any(|p| p.developer_id == developer_id && p.name == name.as_str())
        {
            return Err(AppError::ProjectNameTaken(name.to_string()));
        }
        tables.next_project_id += 1;
        let project = Project {
            id: ProjectId::new(tables.next_project_id),
            name: name.to_string(),
            developer_id,
        };
        tables.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn project_by_id(&self, id: ProjectId) -> Result<Option<Project>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.projects.get(&id).cloned())
    }

    async fn project_by_name(
        &self,
        developer_id: DeveloperId,
        name: &str,
    ) -> Result<Option<Project>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .values()
            .find(|p| p.developer_id == developer_id && p.name == name)
            .cloned())
    }

    async fn projects_for_developer(
        &self,
        developer_id: DeveloperId,
    ) -> Result<Vec<Project>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .values()
            .filter(|p| p.developer_id == developer_id)
            .cloned()
            .collect())
    }

    async fn insert_message(&self, new: NewMessage) -> Result<Message, AppError> {
        let mut tables = self.tables.write().await;
        tables.require_project(new.project_id)?;
        let message = Message {
            id: tables.next_item_id(),
            project_id: new.project_id,
            user_id: new.user_id,
            content: new.content,
            timestamp: new.timestamp,
        };
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn insert_thank_you(&self, new: NewThankYou) -> Result<ThankYouClick, AppError> {
        let mut tables = self.tables.write().await;
        tables.require_project(new.project_id)?;
        let click = ThankYouClick {
            id: tables.next_item_id(),
            project_id: new.project_id,
            user_id: new.user_id,
            count: new.count,
            timestamp: new.timestamp,
        };
        tables.thank_yous.push(click.clone());
        Ok(click)
    }

    async fn total_clicks(&self, project_id: ProjectId) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .thank_yous
            .iter()
            .filter(|c| c.project_id == project_id)
            .map(|c| i64::from(c.count))
            .sum())
    }

    async fn message_contents(&self, project_id: ProjectId) -> Result<Vec<String>, AppError> {
        let tables = self.tables.read().await;
        let mut messages: Vec<&Message> = tables
            .messages
            .iter()
            .filter(|m| m.project_id == project_id)
            .collect();
        messages.sort_by_key(|m| (m.timestamp, m.id));
        Ok(messages.into_iter().map(|m| m.content.clone()).collect())
    }

    async fn recent_messages(
        &self,
        project_id: ProjectId,
        limit: u32,
    ) -> Result<Vec<Message>, AppError> {
        let tables = self.tables.read().await;
        let mut messages: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        messages.truncate(limit as usize);
        Ok(messages)
    }

    async fn recent_thank_yous(
        &self,
        project_id: ProjectId,
        limit: u32,
    ) -> Result<Vec<ThankYouClick>, AppError> {
        let tables = self.tables.read().await;
        let mut clicks: Vec<ThankYouClick> = tables
            .thank_yous
            .iter()
            .filter(|c| c.project_id == project_id)
            .cloned()
            .collect();
        clicks.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        clicks.truncate(limit as usize);
        Ok(clicks)
    }
}

#[async_trait]
impl DigestSource for InMemoryStore {
    async fn unsent_message_rows(
        &self,
        window: &DigestWindow,
    ) -> Result<Vec<ActivityRow<MessagePayload>>, AppError> {
        let tables = self.tables.read().await;
        let items = tables.messages.iter().map(|m| {
            (
                m.id,
                m.project_id,
                m.user_id.as_str(),
                MessagePayload {
                    content: m.content.clone(),
                },
                m.timestamp,
            )
        });
        Ok(tables.digest_rows(window, items))
    }

    async fn unsent_thank_you_rows(
        &self,
        window: &DigestWindow,
    ) -> Result<Vec<ActivityRow<ThankYouPayload>>, AppError> {
        let tables = self.tables.read().await;
        let items = tables.thank_yous.iter().map(|c| {
            (
                c.id,
                c.project_id,
                c.user_id.as_str(),
                ThankYouPayload { count: c.count },
                c.timestamp,
            )
        });
        Ok(tables.digest_rows(window, items))
    }
}
