//! Mail transports.
//!
//! [`HttpMailTransport`] posts a JSON document to a transactional mail API
//! with a bearer token. [`LogTransport`] only logs, and is selected when no
//! API is configured.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::config::{MailConfig, Secret};
use crate::error::AppError;

/// A rendered email ready to be handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

/// Delivers one email.
#[async_trait]
pub trait MailTransport: Send + Sync + fmt::Debug {
    /// Sends `mail`.
    ///
    /// Fails with [`AppError::MailDelivery`] if the provider rejects it or
    /// cannot be reached.
    async fn send(&self, mail: &OutgoingMail) -> Result<(), AppError>;
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: Address<'a>,
    to: [Address<'a>; 1],
    subject: &'a str,
    html: &'a str,
}

/// JSON mail API client.
#[derive(Clone)]
pub struct HttpMailTransport {
    http: Client,
    endpoint: Url,
    token: Option<Secret>,
    from_address: String,
    from_name: String,
}

impl fmt::Debug for HttpMailTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMailTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("from_address", &self.from_address)
            .finish_non_exhaustive()
    }
}

impl HttpMailTransport {
    /// Creates a client posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the endpoint is not a valid URL or
    /// the HTTP client cannot be built.
    pub fn new(
        endpoint: &str,
        token: Option<Secret>,
        from_address: impl Into<String>,
        from_name: impl Into<String>,
    ) -> Result<Self, AppError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AppError::Internal(format!("invalid mail API URL {endpoint}: {e}")))?;
        let http = Client::builder()
            .user_agent(concat!("merkibocou/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| AppError::Internal(format!("mail client: {e}")))?;
        Ok(Self {
            http,
            endpoint,
            token,
            from_address: from_address.into(),
            from_name: from_name.into(),
        })
    }

    /// Builds the HTTP request for `mail` without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::MailDelivery`] if the request cannot be built.
    pub fn build_request(&self, mail: &OutgoingMail) -> Result<reqwest::Request, AppError> {
        let body = SendRequest {
            from: Address {
                email: &self.from_address,
                name: Some(&self.from_name),
            },
            to: [Address {
                email: &mail.to,
                name: None,
            }],
            subject: &mail.subject,
            html: &mail.html,
        };
        let mut request = self.http.post(self.endpoint.clone()).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose());
        }
        request
            .build()
            .map_err(|e| AppError::MailDelivery(format!("failed to build mail request: {e}")))
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), AppError> {
        let request = self.build_request(mail)?;
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| AppError::MailDelivery(format!("mail API unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "mail API rejected message");
            return Err(AppError::MailDelivery(format!("mail API returned {status}")));
        }
        tracing::debug!(to = %mail.to, subject = %mail.subject, "mail accepted");
        Ok(())
    }
}

/// Logs emails instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), AppError> {
        tracing::info!(
            to = %mail.to,
            subject = %mail.subject,
            bytes = mail.html.len(),
            "mail API not configured, email logged only"
        );
        Ok(())
    }
}

/// Picks the transport matching the configuration.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the configured API URL is invalid.
pub fn transport_from_config(config: &MailConfig) -> Result<Arc<dyn MailTransport>, AppError> {
    match &config.api_url {
        Some(url) => Ok(Arc::new(HttpMailTransport::new(
            url,
            config.api_token.clone(),
            config.from_address.clone(),
            config.from_name.clone(),
        )?)),
        None => Ok(Arc::new(LogTransport)),
    }
}
