//! Developer DTOs: registration, login, profile and preferences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Developer, DeveloperId, PreferenceUpdate, SummaryFrequency, UserHandle};

/// Request body for `POST /developers`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Login name, 3-50 characters of `[A-Za-z0-9_-]`.
    pub username: UserHandle,
    /// Password, at least 8 characters.
    pub password: String,
    /// Address digests are sent to.
    pub email: String,
}

/// Public identity of a developer.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeveloperResponse {
    /// Developer id, used by widgets as `devId`.
    pub id: DeveloperId,
    /// Login name.
    pub username: String,
}

impl From<&Developer> for DeveloperResponse {
    fn from(developer: &Developer) -> Self {
        Self {
            id: developer.id,
            username: developer.username.clone(),
        }
    }
}

/// Request body for `POST /developers/login`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Response body of a successful login.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// HS256 bearer token.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

impl TokenResponse {
    /// Wraps a freshly issued token.
    #[must_use]
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Full profile of the authenticated developer.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    /// Developer id.
    pub id: DeveloperId,
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Email on every new message.
    pub instant_messages: bool,
    /// Email on every thank-you click.
    pub instant_thank_you: bool,
    /// Digest cadence.
    pub summary_frequency: SummaryFrequency,
    /// Activity up to this instant was already reported.
    pub last_summary_sent: DateTime<Utc>,
}

impl From<Developer> for ProfileResponse {
    fn from(developer: Developer) -> Self {
        Self {
            id: developer.id,
            username: developer.username,
            email: developer.email,
            instant_messages: developer.instant_messages,
            instant_thank_you: developer.instant_thank_you,
            summary_frequency: developer.summary_frequency,
            last_summary_sent: developer.last_summary_sent,
        }
    }
}

/// Request body for `PATCH /developers/me/preferences`. Omitted fields
/// stay unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesRequest {
    /// Email on every new message.
    #[serde(default)]
    pub instant_messages: Option<bool>,
    /// Email on every thank-you click.
    #[serde(default)]
    pub instant_thank_you: Option<bool>,
    /// `daily`, `weekly` or `none`.
    #[serde(default)]
    pub summary_frequency: Option<SummaryFrequency>,
}

impl From<PreferencesRequest> for PreferenceUpdate {
    fn from(req: PreferencesRequest) -> Self {
        Self {
            instant_messages: req.instant_messages,
            instant_thank_you: req.instant_thank_you,
            summary_frequency: req.summary_frequency,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn preferences_accept_camel_case_and_partial_bodies() {
        let Ok(req) = serde_json::from_str::<PreferencesRequest>(
            r#"{"instantThankYou": true, "summaryFrequency": "weekly"}"#,
        ) else {
            panic!("body should parse");
        };
        let update = PreferenceUpdate::from(req);
        assert_eq!(update.instant_messages, None);
        assert_eq!(update.instant_thank_you, Some(true));
        assert_eq!(update.summary_frequency, Some(SummaryFrequency::Weekly));
    }

    #[test]
    fn unknown_frequency_is_rejected() {
        assert!(serde_json::from_str::<PreferencesRequest>(r#"{"summaryFrequency": "hourly"}"#).is_err());
    }

    #[test]
    fn register_rejects_bad_username() {
        assert!(serde_json::from_str::<RegisterRequest>(
            r#"{"username": "a b", "password": "password123", "email": "a@b.c"}"#
        )
        .is_err());
    }
}
