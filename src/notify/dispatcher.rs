//! Digest delivery.
//!
//! Renders each [`DeveloperDigest`], hands it to the [`MailTransport`] and,
//! once delivered, advances that developer's watermark. A failure for one
//! developer is recorded and the run moves on.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::template::render_summary;
use super::transport::{MailTransport, OutgoingMail};
use crate::domain::{DeveloperDigest, DeveloperId};
use crate::error::AppError;
use crate::persistence::Store;

/// One developer whose digest could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DispatchFailure {
    /// Developer the digest was for.
    pub developer_id: DeveloperId,
    /// Error description.
    pub error: String,
}

/// Outcome of one dispatch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DispatchReport {
    /// Developers whose digest was delivered and whose watermark advanced.
    pub sent: Vec<DeveloperId>,
    /// Developers whose digest failed; their watermark is unchanged.
    pub failed: Vec<DispatchFailure>,
}

impl DispatchReport {
    /// Number of delivered digests.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.len()
    }

    /// Number of failed digests.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Returns `true` if every digest was delivered.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Sends digests and advances watermarks.
#[derive(Debug, Clone)]
pub struct DigestDispatcher {
    transport: Arc<dyn MailTransport>,
    store: Arc<dyn Store>,
    subject: String,
}

impl DigestDispatcher {
    /// Creates a dispatcher using `subject` for every digest email.
    #[must_use]
    pub fn new(
        transport: Arc<dyn MailTransport>,
        store: Arc<dyn Store>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            store,
            subject: subject.into(),
        }
    }

    /// Delivers every digest in order. `sent_at` is the reference time of
    /// the aggregation run and becomes the new watermark of each developer
    /// whose digest went out.
    pub async fn dispatch(
        &self,
        digests: &[DeveloperDigest],
        sent_at: DateTime<Utc>,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        for digest in digests {
            let developer_id = digest.developer_id;
            match self.deliver(digest, sent_at).await {
                Ok(()) => {
                    tracing::info!(
                        developer_id = %developer_id,
                        projects = digest.projects.len(),
                        "digest sent"
                    );
                    report.sent.push(developer_id);
                }
                Err(e) => {
                    tracing::error!(developer_id = %developer_id, error = %e, "digest failed");
                    report.failed.push(DispatchFailure {
                        developer_id,
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }

    async fn deliver(
        &self,
        digest: &DeveloperDigest,
        sent_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mail = OutgoingMail {
            to: digest.email.clone(),
            subject: self.subject.clone(),
            html: render_summary(digest)?,
        };
        self.transport.send(&mail).await?;
        self.store.mark_summary_sent(digest.developer_id, sent_at).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::domain::{ProjectDigest, ProjectId, SummaryFrequency};
    use crate::persistence::InMemoryStore;
    use crate::test_support::{RecordingTransport, seed_developer};

    fn digest_for(developer_id: DeveloperId, email: &str) -> DeveloperDigest {
        DeveloperDigest {
            developer_id,
            username: "dev".to_string(),
            email: email.to_string(),
            projects: vec![ProjectDigest {
                id: ProjectId::new(1),
                name: "proj".to_string(),
                recent_messages: Vec::new(),
                recent_clicks: Vec::new(),
            }],
        }
    }

    async fn watermark(store: &InMemoryStore, id: DeveloperId) -> DateTime<Utc> {
        let Ok(Some(developer)) = store.developer_by_id(id).await else {
            panic!("developer {id} missing");
        };
        developer.last_summary_sent
    }

    #[tokio::test]
    async fn successful_send_advances_watermark() {
        let store = Arc::new(InMemoryStore::new());
        let start = Utc::now() - Duration::days(1);
        let dev = seed_developer(&store, "ada", SummaryFrequency::Daily, start).await;
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = DigestDispatcher::new(
            Arc::clone(&transport) as Arc<dyn MailTransport>,
            Arc::clone(&store) as Arc<dyn Store>,
            "Résumé MerkitBocou",
        );

        let sent_at = Utc::now();
        let report = dispatcher
            .dispatch(&[digest_for(dev.id, &dev.email)], sent_at)
            .await;

        assert_eq!(report.sent, vec![dev.id]);
        assert!(report.is_clean());
        assert_eq!(watermark(&store, dev.id).await, sent_at);

        let sent = transport.sent().await;
        assert_eq!(sent.len(), 1);
        let Some(mail) = sent.first() else {
            panic!("mail expected");
        };
        assert_eq!(mail.to, "ada@example.org");
        assert_eq!(mail.subject, "Résumé MerkitBocou");
        assert!(mail.html.contains("proj"));
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_run() {
        let store = Arc::new(InMemoryStore::new());
        let start = Utc::now() - Duration::days(1);
        let failing = seed_developer(&store, "bounce", SummaryFrequency::Daily, start).await;
        let ok = seed_developer(&store, "fine", SummaryFrequency::Daily, start).await;
        let transport = Arc::new(RecordingTransport::failing_for(&["bounce@example.org"]));
        let dispatcher = DigestDispatcher::new(
            Arc::clone(&transport) as Arc<dyn MailTransport>,
            Arc::clone(&store) as Arc<dyn Store>,
            "subject",
        );

        let sent_at = Utc::now();
        let report = dispatcher
            .dispatch(
                &[
                    digest_for(failing.id, &failing.email),
                    digest_for(ok.id, &ok.email),
                ],
                sent_at,
            )
            .await;

        assert_eq!(report.sent, vec![ok.id]);
        assert_eq!(report.failed_count(), 1);
        assert!(report.failed.iter().all(|f| f.developer_id == failing.id));
        assert_eq!(watermark(&store, failing.id).await, start);
        assert_eq!(watermark(&store, ok.id).await, sent_at);
    }

    #[tokio::test]
    async fn unknown_developer_is_reported() {
        let store = Arc::new(InMemoryStore::new());
        let dispatcher = DigestDispatcher::new(
            Arc::new(RecordingTransport::default()),
            Arc::clone(&store) as Arc<dyn Store>,
            "subject",
        );
        let report = dispatcher
            .dispatch(&[digest_for(DeveloperId::new(99), "ghost@example.org")], Utc::now())
            .await;
        assert_eq!(report.sent_count(), 0);
        assert_eq!(report.failed_count(), 1);
    }
}
