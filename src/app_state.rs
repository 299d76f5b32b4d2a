//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::config::{Secret, ServerConfig};
use crate::error::AppError;
use crate::notify::{DigestDispatcher, InstantNotifier, MailTransport, transport_from_config};
use crate::persistence::{DigestSource, Store};
use crate::service::{AccountService, DigestAggregator, DigestJob, FeedbackService, ProjectService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Registration, login and preferences.
    pub accounts: Arc<AccountService>,
    /// Owner-facing project operations.
    pub projects: Arc<ProjectService>,
    /// Public feedback intake.
    pub feedback: Arc<FeedbackService>,
    /// Digest pipeline started by the cron endpoint.
    pub digest_job: Arc<DigestJob>,
    /// Token signing and verification.
    pub jwt: Arc<JwtKeys>,
    /// Shared secret of the cron endpoint.
    pub cron_secret: Secret,
}

impl AppState {
    /// Wires every service on top of one backend.
    ///
    /// `store` and `source` are normally the same object seen through both
    /// traits.
    #[must_use]
    pub fn new(
        config: &ServerConfig,
        store: Arc<dyn Store>,
        source: Arc<dyn DigestSource>,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        let jwt = Arc::new(JwtKeys::new(config.jwt_secret.expose(), config.jwt_ttl()));

        let aggregator = DigestAggregator::new(source)
            .with_lookback(config.digest.lookback())
            .with_cadence(config.digest.enforce_cadence);
        let dispatcher = DigestDispatcher::new(
            Arc::clone(&transport),
            Arc::clone(&store),
            config.mail.summary_subject.clone(),
        );

        Self {
            accounts: Arc::new(AccountService::new(Arc::clone(&store), Arc::clone(&jwt))),
            projects: Arc::new(ProjectService::new(Arc::clone(&store))),
            feedback: Arc::new(FeedbackService::new(
                Arc::clone(&store),
                InstantNotifier::new(transport),
            )),
            digest_job: Arc::new(DigestJob::new(aggregator, dispatcher)),
            jwt,
            cron_secret: config.cron_secret.clone(),
        }
    }

    /// Like [`AppState::new`], with the transport chosen from the mail
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the mail API URL is invalid.
    pub fn from_config(
        config: &ServerConfig,
        store: Arc<dyn Store>,
        source: Arc<dyn DigestSource>,
    ) -> Result<Self, AppError> {
        let transport = transport_from_config(&config.mail)?;
        Ok(Self::new(config, store, source, transport))
    }
}
