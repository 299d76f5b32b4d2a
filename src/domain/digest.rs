//! Digest window, store rows and the digest aggregate.
//!
//! A digest run reads [`ActivityRow`]s admitted by a [`DigestWindow`] and
//! folds them into one [`DeveloperDigest`] per developer. Digests are
//! derived values and never persisted.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{Developer, DeveloperId, ProjectId, SummaryFrequency};

/// Default maximum lookback of a digest, independent of the watermark.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 14;

/// Time bounds of one digest run.
///
/// An item is admitted when its developer takes part in digests, the item
/// is strictly newer than both the horizon and the developer's
/// `last_summary_sent` watermark, and it is not newer than `now`. Items
/// after `now` belong to the next run, since delivery moves the watermark
/// to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestWindow {
    /// Reference time of the run.
    pub now: DateTime<Utc>,
    /// `now` minus the lookback.
    pub horizon: DateTime<Utc>,
    /// Skip developers whose watermark is younger than their cadence.
    pub enforce_cadence: bool,
}

impl DigestWindow {
    /// Window ending at `now` with the given lookback.
    #[must_use]
    pub fn new(now: DateTime<Utc>, lookback: Duration) -> Self {
        Self {
            now,
            horizon: now - lookback,
            enforce_cadence: false,
        }
    }

    /// Window ending at `now` with the default 14-day lookback.
    #[cfg(test)]
    #[must_use]
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        Self::new(now, Duration::days(DEFAULT_LOOKBACK_DAYS))
    }

    /// Enables or disables cadence gating.
    #[must_use]
    pub const fn with_cadence(mut self, enforce: bool) -> Self {
        self.enforce_cadence = enforce;
        self
    }

    /// Watermark cutoff for a frequency when cadence gating is on: the
    /// developer is due only if `last_summary_sent` is before it.
    #[must_use]
    pub fn cadence_cutoff(&self, frequency: SummaryFrequency) -> Option<DateTime<Utc>> {
        if !self.enforce_cadence {
            return None;
        }
        frequency.min_interval().map(|interval| self.now - interval)
    }

    /// Returns `true` if the developer takes part in this run at all.
    #[must_use]
    pub fn is_due(&self, developer: &Developer) -> bool {
        if !developer.summary_frequency.wants_digest() {
            return false;
        }
        match self.cadence_cutoff(developer.summary_frequency) {
            Some(cutoff) => developer.last_summary_sent < cutoff,
            None => true,
        }
    }

    /// Returns `true` if an item created at `timestamp` belongs in the
    /// developer's digest.
    #[must_use]
    pub fn admits(&self, developer: &Developer, timestamp: DateTime<Utc>) -> bool {
        self.is_due(developer)
            && timestamp > self.horizon
            && timestamp > developer.last_summary_sent
            && timestamp <= self.now
    }
}

/// Payload of a message row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePayload {
    /// Message body.
    pub content: String,
}

/// Payload of a thank-you row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThankYouPayload {
    /// Number of clicks.
    pub count: i32,
}

/// One joined (developer, project, item) row returned by a digest source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow<P> {
    /// Owning developer.
    pub developer_id: DeveloperId,
    /// Developer username.
    pub developer_username: String,
    /// Developer email.
    pub developer_email: String,
    /// Project the item belongs to.
    pub project_id: ProjectId,
    /// Project name.
    pub project_name: String,
    /// Primary key of the message or click.
    pub item_id: i64,
    /// End-user handle.
    pub author_id: String,
    /// Item-specific data.
    pub payload: P,
    /// Item creation time.
    pub timestamp: DateTime<Utc>,
}

/// A message as shown in digests and project details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MessageEntry {
    /// End-user handle.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Message body.
    #[serde(rename = "message")]
    pub content: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}

/// A thank-you event as shown in digests and project details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ThankYouEntry {
    /// End-user handle.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Number of clicks.
    #[serde(rename = "clicks")]
    pub count: i32,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}

/// Unsent activity for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDigest {
    /// Project identifier.
    pub id: ProjectId,
    /// Project name.
    pub name: String,
    /// New messages, newest first.
    pub recent_messages: Vec<MessageEntry>,
    /// New thank-you events, newest first.
    pub recent_clicks: Vec<ThankYouEntry>,
}

impl ProjectDigest {
    /// Sum of all clicks in this digest.
    #[must_use]
    pub fn total_clicks(&self) -> i64 {
        self.recent_clicks.iter().map(|c| i64::from(c.count)).sum()
    }
}

/// Unsent activity for one developer, rendered into one email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeveloperDigest {
    /// Developer identifier, used to advance the watermark after sending.
    pub developer_id: DeveloperId,
    /// Developer username.
    pub username: String,
    /// Recipient address.
    pub email: String,
    /// Projects in first-appearance order.
    pub projects: Vec<ProjectDigest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn developer(frequency: SummaryFrequency, last_sent: DateTime<Utc>) -> Developer {
        Developer {
            id: DeveloperId::new(1),
            username: "dev".to_string(),
            email: "dev@example.org".to_string(),
            instant_messages: false,
            instant_thank_you: false,
            summary_frequency: frequency,
            last_summary_sent: last_sent,
        }
    }

    #[test]
    fn window_requires_newer_than_watermark_and_horizon() {
        let now = Utc::now();
        let window = DigestWindow::ending_at(now);
        let dev = developer(SummaryFrequency::Daily, now - Duration::days(1));

        assert!(window.admits(&dev, now - Duration::hours(1)));
        assert!(!window.admits(&dev, dev.last_summary_sent));
        assert!(!window.admits(&dev, now - Duration::days(2)));
    }

    #[test]
    fn items_after_the_reference_time_wait_for_the_next_run() {
        let now = Utc::now();
        let window = DigestWindow::ending_at(now);
        let dev = developer(SummaryFrequency::Daily, now - Duration::days(1));

        assert!(window.admits(&dev, now));
        assert!(!window.admits(&dev, now + Duration::milliseconds(1)));
        assert!(DigestWindow::ending_at(now + Duration::seconds(1))
            .admits(&dev, now + Duration::milliseconds(1)));
    }

    #[test]
    fn horizon_bounds_an_old_watermark() {
        let now = Utc::now();
        let window = DigestWindow::ending_at(now);
        let dev = developer(SummaryFrequency::Weekly, now - Duration::days(60));

        assert!(!window.admits(&dev, now - Duration::days(15)));
        assert!(!window.admits(&dev, now - Duration::days(14)));
        assert!(window.admits(&dev, now - Duration::days(13)));
    }

    #[test]
    fn none_frequency_is_never_due() {
        let now = Utc::now();
        let dev = developer(SummaryFrequency::None, now - Duration::days(3));
        assert!(!DigestWindow::ending_at(now).admits(&dev, now));
    }

    #[test]
    fn cadence_gating_is_opt_in() {
        let now = Utc::now();
        let dev = developer(SummaryFrequency::Daily, now - Duration::hours(2));

        assert!(DigestWindow::ending_at(now).is_due(&dev));
        assert!(!DigestWindow::ending_at(now).with_cadence(true).is_due(&dev));

        let stale = developer(SummaryFrequency::Daily, now - Duration::hours(24));
        assert!(DigestWindow::ending_at(now).with_cadence(true).is_due(&stale));

        let weekly = developer(SummaryFrequency::Weekly, now - Duration::days(3));
        assert!(!DigestWindow::ending_at(now).with_cadence(true).is_due(&weekly));
    }

    #[test]
    fn entries_use_wire_names() {
        let entry = ThankYouEntry {
            user_id: "user-1".to_string(),
            count: 5,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&entry).unwrap_or_default();
        assert_eq!(json.get("userId").and_then(|v| v.as_str()), Some("user-1"));
        assert_eq!(json.get("clicks").and_then(serde_json::Value::as_i64), Some(5));
    }
}
