//! Seeding helpers shared by unit tests.

#![allow(clippy::panic)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{
    Developer, NewDeveloper, NewMessage, NewThankYou, PreferenceUpdate, Project, ProjectName,
    SummaryFrequency,
};
use crate::error::AppError;
use crate::notify::{MailTransport, OutgoingMail};
use crate::persistence::{InMemoryStore, Store};

/// Transport that records every mail and fails for chosen recipients.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutgoingMail>>,
    failing: Vec<String>,
}

impl RecordingTransport {
    pub fn failing_for(recipients: &[&str]) -> Self {
        Self {
            sent: Mutex::default(),
            failing: recipients.iter().map(|r| (*r).to_string()).collect(),
        }
    }

    pub async fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), AppError> {
        if self.failing.contains(&mail.to) {
            return Err(AppError::MailDelivery(format!("mailbox {} full", mail.to)));
        }
        self.sent.lock().await.push(mail.clone());
        Ok(())
    }
}

/// Creates `username` with email `username@example.org` and the given
/// cadence; the watermark starts at `watermark`.
pub async fn seed_developer(
    store: &InMemoryStore,
    username: &str,
    frequency: SummaryFrequency,
    watermark: DateTime<Utc>,
) -> Developer {
    let new = NewDeveloper {
        username: username.to_string(),
        email: format!("{username}@example.org"),
        hashed_password: "not-a-hash".to_string(),
        registered_at: watermark,
    };
    let Ok(developer) = store.create_developer(new).await else {
        panic!("seeding developer {username} failed");
    };
    let update = PreferenceUpdate {
        summary_frequency: Some(frequency),
        ..PreferenceUpdate::default()
    };
    let Ok(developer) = store.update_preferences(developer.id, update).await else {
        panic!("seeding preferences of {username} failed");
    };
    developer
}

pub async fn seed_project(
    store: &InMemoryStore,
    developer_id: crate::domain::DeveloperId,
    name: &str,
) -> Project {
    let Ok(name) = ProjectName::try_from(name.to_string()) else {
        panic!("invalid project name {name}");
    };
    let Ok(project) = store.create_project(developer_id, &name).await else {
        panic!("seeding project failed");
    };
    project
}

pub async fn seed_message(
    store: &InMemoryStore,
    project_id: crate::domain::ProjectId,
    at: DateTime<Utc>,
    content: &str,
) {
    let new = NewMessage {
        project_id,
        user_id: "visitor".to_string(),
        content: content.to_string(),
        timestamp: at,
    };
    if store.insert_message(new).await.is_err() {
        panic!("seeding message failed");
    }
}

pub async fn seed_thank_you(
    store: &InMemoryStore,
    project_id: crate::domain::ProjectId,
    at: DateTime<Utc>,
    count: i32,
) {
    let new = NewThankYou {
        project_id,
        user_id: "visitor".to_string(),
        count,
        timestamp: at,
    };
    if store.insert_thank_you(new).await.is_err() {
        panic!("seeding thank-you failed");
    }
}
