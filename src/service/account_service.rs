//! Account service: registration, login, profile and preferences.

use std::sync::Arc;

use chrono::Utc;

use crate::auth::{JwtKeys, hash_password, verify_password};
use crate::domain::names::validate_email;
use crate::domain::{Developer, DeveloperId, NewDeveloper, PreferenceUpdate, UserHandle};
use crate::error::AppError;
use crate::persistence::Store;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Orchestrates developer accounts on top of a [`Store`].
#[derive(Debug, Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    jwt: Arc<JwtKeys>,
}

/// Runs CPU-bound work on the blocking pool.
async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("blocking task failed: {e}")))?
}

impl AccountService {
    /// Creates a new `AccountService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, jwt: Arc<JwtKeys>) -> Self {
        Self { store, jwt }
    }

    /// Registers a developer. The watermark starts at registration time
    /// and preferences take their defaults.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidRequest`] for a bad email or short password.
    /// - [`AppError::UsernameTaken`] if the username exists.
    pub async fn register(
        &self,
        username: &UserHandle,
        email: &str,
        password: &str,
    ) -> Result<Developer, AppError> {
        validate_email(email)?;
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AppError::InvalidRequest(format!(
                "password must be at least {MIN_PASSWORD_CHARS} characters long"
            )));
        }
        if self
            .store
            .developer_by_username(username.as_str())
            .await?
            .is_some()
        {
            return Err(AppError::UsernameTaken(username.to_string()));
        }

        let password = password.to_string();
        let hashed_password = blocking(move || hash_password(&password)).await?;

        let developer = self
            .store
            .create_developer(NewDeveloper {
                username: username.to_string(),
                email: email.to_string(),
                hashed_password,
                registered_at: Utc::now(),
            })
            .await?;
        tracing::info!(developer_id = %developer.id, username = %developer.username, "developer registered");
        Ok(developer)
    }

    /// Checks credentials and issues an access token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidCredentials`] for an unknown username or
    /// wrong password.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let account = self
            .store
            .developer_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password = password.to_string();
        let stored = account.hashed_password.clone();
        let valid = blocking(move || verify_password(&password, &stored)).await?;
        if !valid {
            tracing::debug!(username, "login rejected");
            return Err(AppError::InvalidCredentials);
        }
        self.jwt.issue(&account.developer)
    }

    /// Loads the developer's profile.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DeveloperNotFound`] if the account was removed
    /// after the token was issued.
    pub async fn profile(&self, id: DeveloperId) -> Result<Developer, AppError> {
        self.store
            .developer_by_id(id)
            .await?
            .ok_or(AppError::DeveloperNotFound(id))
    }

    /// Applies a partial preference update.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DeveloperNotFound`] for an unknown id.
    pub async fn update_preferences(
        &self,
        id: DeveloperId,
        update: PreferenceUpdate,
    ) -> Result<Developer, AppError> {
        let developer = self.store.update_preferences(id, update).await?;
        tracing::info!(
            developer_id = %id,
            summary_frequency = %developer.summary_frequency,
            "preferences updated"
        );
        Ok(developer)
    }
}
