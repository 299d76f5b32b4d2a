//! Developer accounts and their notification preferences.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::DeveloperId;
use crate::error::AppError;

/// How often a developer wants to receive a digest email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFrequency {
    /// One digest per day.
    #[default]
    Daily,
    /// One digest per week.
    Weekly,
    /// No digest at all.
    None,
}

impl SummaryFrequency {
    /// Storage / wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::None => "none",
        }
    }

    /// Returns `true` if this developer takes part in digest runs.
    #[must_use]
    pub const fn wants_digest(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Minimum age of the watermark before another digest is due, when
    /// cadence gating is enabled. Slightly under the nominal period so a
    /// trigger that fires a little early is not skipped.
    #[must_use]
    pub fn min_interval(self) -> Option<Duration> {
        match self {
            Self::Daily => Some(Duration::hours(23) + Duration::minutes(31)),
            Self::Weekly => Some(Duration::days(6) + Duration::hours(23) + Duration::minutes(31)),
            Self::None => None,
        }
    }
}

impl fmt::Display for SummaryFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryFrequency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "none" => Ok(Self::None),
            other => Err(AppError::InvalidRequest(format!(
                "unknown summary frequency: {other}"
            ))),
        }
    }
}

/// A developer as seen by the rest of the service (no credentials).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Developer {
    /// Primary key.
    pub id: DeveloperId,
    /// Unique login name.
    pub username: String,
    /// Address digests and instant notifications are sent to.
    pub email: String,
    /// Email on every new message.
    pub instant_messages: bool,
    /// Email on every thank-you click.
    pub instant_thank_you: bool,
    /// Digest cadence.
    pub summary_frequency: SummaryFrequency,
    /// Watermark: activity at or before this instant was already reported.
    pub last_summary_sent: DateTime<Utc>,
}

/// A developer row together with the stored password hash.
#[derive(Debug, Clone)]
pub struct DeveloperAccount {
    /// Public part of the account.
    pub developer: Developer,
    /// PHC-formatted Argon2 hash.
    pub hashed_password: String,
}

/// Data needed to insert a developer.
#[derive(Debug, Clone)]
pub struct NewDeveloper {
    /// Validated username.
    pub username: String,
    /// Validated email address.
    pub email: String,
    /// PHC-formatted Argon2 hash.
    pub hashed_password: String,
    /// Initial watermark, normally the registration time.
    pub registered_at: DateTime<Utc>,
}

/// Partial preference update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreferenceUpdate {
    /// New `instant_messages` value.
    pub instant_messages: Option<bool>,
    /// New `instant_thank_you` value.
    pub instant_thank_you: Option<bool>,
    /// New digest cadence.
    pub summary_frequency: Option<SummaryFrequency>,
}

impl PreferenceUpdate {
    /// Applies the update in place.
    pub fn apply(&self, developer: &mut Developer) {
        if let Some(v) = self.instant_messages {
            developer.instant_messages = v;
        }
        if let Some(v) = self.instant_thank_you {
            developer.instant_thank_you = v;
        }
        if let Some(v) = self.summary_frequency {
            developer.summary_frequency = v;
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn developer() -> Developer {
        Developer {
            id: DeveloperId::new(1),
            username: "alice".to_string(),
            email: "alice@example.org".to_string(),
            instant_messages: true,
            instant_thank_you: false,
            summary_frequency: SummaryFrequency::Daily,
            last_summary_sent: Utc::now(),
        }
    }

    #[test]
    fn frequency_round_trips_through_str() {
        for freq in [SummaryFrequency::Daily, SummaryFrequency::Weekly, SummaryFrequency::None] {
            let Ok(parsed) = freq.as_str().parse::<SummaryFrequency>() else {
                panic!("parse failed for {freq}");
            };
            assert_eq!(parsed, freq);
        }
        assert!("hourly".parse::<SummaryFrequency>().is_err());
    }

    #[test]
    fn none_opts_out() {
        assert!(!SummaryFrequency::None.wants_digest());
        assert!(SummaryFrequency::Weekly.wants_digest());
        assert!(SummaryFrequency::None.min_interval().is_none());
    }

    #[test]
    fn partial_update_touches_only_given_fields() {
        let mut dev = developer();
        PreferenceUpdate {
            summary_frequency: Some(SummaryFrequency::Weekly),
            ..PreferenceUpdate::default()
        }
        .apply(&mut dev);
        assert_eq!(dev.summary_frequency, SummaryFrequency::Weekly);
        assert!(dev.instant_messages);
        assert!(!dev.instant_thank_you);
    }
}
