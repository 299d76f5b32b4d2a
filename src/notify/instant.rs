//! Per-event emails, sent when a developer opted in.

use std::sync::Arc;

use super::template::{
    instant_message_subject, instant_thank_you_subject, render_instant_message,
    render_instant_thank_you,
};
use super::transport::{MailTransport, OutgoingMail};
use crate::domain::{Developer, MessageEntry, ThankYouEntry};
use crate::error::AppError;

/// Sends instant notifications according to developer preferences.
#[derive(Debug, Clone)]
pub struct InstantNotifier {
    transport: Arc<dyn MailTransport>,
}

impl InstantNotifier {
    /// Creates a notifier on top of `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self { transport }
    }

    /// Emails `developer` about a new message if `instant_messages` is on.
    /// Returns whether an email was sent.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TemplateRender`] or [`AppError::MailDelivery`].
    pub async fn new_message(
        &self,
        developer: &Developer,
        project_name: &str,
        message: &MessageEntry,
    ) -> Result<bool, AppError> {
        if !developer.instant_messages {
            return Ok(false);
        }
        let mail = OutgoingMail {
            to: developer.email.clone(),
            subject: instant_message_subject(project_name),
            html: render_instant_message(&developer.username, project_name, message)?,
        };
        self.transport.send(&mail).await?;
        Ok(true)
    }

    /// Emails `developer` about thank-you clicks if `instant_thank_you` is
    /// on. Returns whether an email was sent.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TemplateRender`] or [`AppError::MailDelivery`].
    pub async fn new_thank_you(
        &self,
        developer: &Developer,
        project_name: &str,
        click: &ThankYouEntry,
    ) -> Result<bool, AppError> {
        if !developer.instant_thank_you {
            return Ok(false);
        }
        let mail = OutgoingMail {
            to: developer.email.clone(),
            subject: instant_thank_you_subject(project_name),
            html: render_instant_thank_you(&developer.username, project_name, click)?,
        };
        self.transport.send(&mail).await?;
        Ok(true)
    }
}
