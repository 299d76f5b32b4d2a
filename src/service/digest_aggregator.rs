//! Digest aggregation: groups unsent feedback per developer and project.
//!
//! The aggregator asks a [`DigestSource`] for rows admitted by a
//! [`DigestWindow`], folds them into [`ActivityGroups`] (developer id →
//! projects in first-seen order → items in source order), then merges the
//! message and thank-you groupings into [`DeveloperDigest`]s.
//!
//! The merge walks the message grouping only. A project with new
//! thank-you clicks but no new message produces no digest entry, and a
//! developer with only clicks gets no digest at all.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::domain::digest::DEFAULT_LOOKBACK_DAYS;
use crate::domain::{
    ActivityRow, DeveloperDigest, DeveloperId, DigestWindow, MessageEntry, MessagePayload,
    ProjectDigest, ProjectId, ThankYouEntry, ThankYouPayload,
};
use crate::error::AppError;
use crate::persistence::DigestSource;

/// One feedback item inside a project bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityItem<P> {
    /// Primary key of the message or click.
    pub item_id: i64,
    /// End-user handle.
    pub author_id: String,
    /// Item-specific data.
    pub payload: P,
    /// Item creation time.
    pub timestamp: DateTime<Utc>,
}

/// Items of one project, in the order the source returned them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectActivity<P> {
    /// Project identifier.
    pub project_id: ProjectId,
    /// Project name.
    pub name: String,
    /// Items, newest first when the source honours its ordering contract.
    pub items: Vec<ActivityItem<P>>,
}

/// Identity of one developer plus their project buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeveloperActivity<P> {
    /// Developer username.
    pub username: String,
    /// Developer email.
    pub email: String,
    projects: Vec<ProjectActivity<P>>,
}

impl<P> DeveloperActivity<P> {
    /// Project buckets in first-seen order.
    #[must_use]
    pub fn projects(&self) -> &[ProjectActivity<P>] {
        &self.projects
    }

    /// Items of one project, empty if the project has none.
    #[must_use]
    pub fn project_items(&self, project_id: ProjectId) -> &[ActivityItem<P>] {
        self.projects
            .iter()
            .find(|p| p.project_id == project_id)
            .map_or(&[], |p| p.items.as_slice())
    }

    fn push(&mut self, project_id: ProjectId, project_name: String, item: ActivityItem<P>) {
        // Sorted input always hits the last bucket, so search from the back.
        if let Some(bucket) = self
            .projects
            .iter_mut()
            .rev()
            .find(|p| p.project_id == project_id)
        {
            bucket.items.push(item);
            return;
        }
        self.projects.push(ProjectActivity {
            project_id,
            name: project_name,
            items: vec![item],
        });
    }
}

/// Typed accumulator: developer id → [`DeveloperActivity`].
///
/// Developers iterate in ascending id order; projects in first-seen
/// order; items keep their insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityGroups<P> {
    developers: BTreeMap<DeveloperId, DeveloperActivity<P>>,
}

impl<P> Default for ActivityGroups<P> {
    fn default() -> Self {
        Self {
            developers: BTreeMap::new(),
        }
    }
}

impl<P> ActivityGroups<P> {
    /// Creates an empty grouping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups rows in a single pass.
    #[must_use]
    pub fn from_rows(rows: impl IntoIterator<Item = ActivityRow<P>>) -> Self {
        let mut groups = Self::new();
        for row in rows {
            groups.insert(row);
        }
        groups
    }

    /// Adds one row, creating the developer and project buckets on first
    /// sight.
    pub fn insert(&mut self, row: ActivityRow<P>) {
        let developer = self
            .developers
            .entry(row.developer_id)
            .or_insert_with(|| DeveloperActivity {
                username: row.developer_username,
                email: row.developer_email,
                projects: Vec::new(),
            });
        developer.push(
            row.project_id,
            row.project_name,
            ActivityItem {
                item_id: row.item_id,
                author_id: row.author_id,
                payload: row.payload,
                timestamp: row.timestamp,
            },
        );
    }

    /// Looks one developer up.
    #[must_use]
    pub fn developer(&self, developer_id: DeveloperId) -> Option<&DeveloperActivity<P>> {
        self.developers.get(&developer_id)
    }

    /// Developers in ascending id order.
    pub fn developers(&self) -> impl Iterator<Item = (DeveloperId, &DeveloperActivity<P>)> {
        self.developers.iter().map(|(id, activity)| (*id, activity))
    }

    /// Items of one (developer, project) pair, empty if absent.
    #[must_use]
    pub fn project_items(
        &self,
        developer_id: DeveloperId,
        project_id: ProjectId,
    ) -> &[ActivityItem<P>] {
        self.developer(developer_id)
            .map_or(&[], |d| d.project_items(project_id))
    }

    /// Returns `true` if no row was grouped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.developers.is_empty()
    }

    /// Total number of items across all buckets.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.developers
            .values()
            .flat_map(|d| d.projects.iter())
            .map(|p| p.items.len())
            .sum()
    }
}

fn message_entry(item: &ActivityItem<MessagePayload>) -> MessageEntry {
    MessageEntry {
        user_id: item.author_id.clone(),
        content: item.payload.content.clone(),
        timestamp: item.timestamp,
    }
}

fn thank_you_entry(item: &ActivityItem<ThankYouPayload>) -> ThankYouEntry {
    ThankYouEntry {
        user_id: item.author_id.clone(),
        count: item.payload.count,
        timestamp: item.timestamp,
    }
}

/// Merges the two groupings into digests, driven by the message side.
#[must_use]
pub fn merge_digests(
    messages: &ActivityGroups<MessagePayload>,
    thank_yous: &ActivityGroups<ThankYouPayload>,
) -> Vec<DeveloperDigest> {
    messages
        .developers()
        .map(|(developer_id, activity)| DeveloperDigest {
            developer_id,
            username: activity.username.clone(),
            email: activity.email.clone(),
            projects: activity
                .projects()
                .iter()
                .map(|project| ProjectDigest {
                    id: project.project_id,
                    name: project.name.clone(),
                    recent_messages: project.items.iter().map(message_entry).collect(),
                    recent_clicks: thank_yous
                        .project_items(developer_id, project.project_id)
                        .iter()
                        .map(thank_you_entry)
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

/// Builds developer digests from a [`DigestSource`].
///
/// Read-only: running it twice without advancing any watermark yields the
/// same result.
#[derive(Debug, Clone)]
pub struct DigestAggregator {
    source: Arc<dyn DigestSource>,
    lookback: Duration,
    enforce_cadence: bool,
}

impl DigestAggregator {
    /// Creates an aggregator with the default 14-day lookback and no
    /// cadence gating.
    #[must_use]
    pub fn new(source: Arc<dyn DigestSource>) -> Self {
        Self {
            source,
            lookback: Duration::days(DEFAULT_LOOKBACK_DAYS),
            enforce_cadence: false,
        }
    }

    /// Overrides the lookback horizon.
    #[must_use]
    pub fn with_lookback(mut self, lookback: Duration) -> Self {
        self.lookback = lookback;
        self
    }

    /// Enables or disables cadence gating.
    #[must_use]
    pub fn with_cadence(mut self, enforce: bool) -> Self {
        self.enforce_cadence = enforce;
        self
    }

    /// The window a run at `now` uses.
    #[must_use]
    pub fn window_at(&self, now: DateTime<Utc>) -> DigestWindow {
        DigestWindow::new(now, self.lookback).with_cadence(self.enforce_cadence)
    }

    /// Unsent messages grouped by developer and project, as of now.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if the source query fails.
    pub async fn collect_unsent_messages(
        &self,
    ) -> Result<ActivityGroups<MessagePayload>, AppError> {
        self.collect_unsent_messages_at(Utc::now()).await
    }

    /// Unsent messages grouped by developer and project, as of `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if the source query fails.
    pub async fn collect_unsent_messages_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<ActivityGroups<MessagePayload>, AppError> {
        self.collect_messages(&self.window_at(now)).await
    }

    /// Unsent thank-you clicks grouped by developer and project, as of now.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if the source query fails.
    pub async fn collect_unsent_thank_yous(
        &self,
    ) -> Result<ActivityGroups<ThankYouPayload>, AppError> {
        self.collect_unsent_thank_yous_at(Utc::now()).await
    }

    /// Unsent thank-you clicks grouped by developer and project, as of `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if the source query fails.
    pub async fn collect_unsent_thank_yous_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<ActivityGroups<ThankYouPayload>, AppError> {
        self.collect_thank_yous(&self.window_at(now)).await
    }

    /// Builds all digests that are due now.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if either source query fails.
    pub async fn build_digests(&self) -> Result<Vec<DeveloperDigest>, AppError> {
        self.build_digests_at(Utc::now()).await
    }

    /// Builds all digests due at `now`. Both collections share one window.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if either source query fails.
    pub async fn build_digests_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<DeveloperDigest>, AppError> {
        let window = self.window_at(now);
        let messages = self.collect_messages(&window).await?;
        let thank_yous = self.collect_thank_yous(&window).await?;

        let digests = merge_digests(&messages, &thank_yous);
        tracing::debug!(
            developers = digests.len(),
            messages = messages.item_count(),
            thank_yous = thank_yous.item_count(),
            horizon = %window.horizon,
            "digests built"
        );
        Ok(digests)
    }

    async fn collect_messages(
        &self,
        window: &DigestWindow,
    ) -> Result<ActivityGroups<MessagePayload>, AppError> {
        let rows = self.source.unsent_message_rows(window).await?;
        Ok(ActivityGroups::from_rows(rows))
    }

    async fn collect_thank_yous(
        &self,
        window: &DigestWindow,
    ) -> Result<ActivityGroups<ThankYouPayload>, AppError> {
        let rows = self.source.unsent_thank_you_rows(window).await?;
        Ok(ActivityGroups::from_rows(rows))
    }
}
