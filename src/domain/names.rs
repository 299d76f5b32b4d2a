//! Validated string newtypes shared by developers, projects and feedback.
//!
//! Project names and user handles accept ASCII letters, digits, `-` and
//! `_` only. Construction goes through `TryFrom<String>` so that serde
//! rejects malformed input before a handler runs.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Maximum length of a message body, in characters.
pub const MAX_MESSAGE_CHARS: usize = 5000;

fn is_slug_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn check_slug(kind: &str, value: &str, min: usize, max: usize) -> Result<(), AppError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(AppError::InvalidRequest(format!(
            "{kind} must be {min}-{max} characters long"
        )));
    }
    if !value.chars().all(is_slug_char) {
        return Err(AppError::InvalidRequest(format!(
            "{kind} may only contain letters, digits, '-' and '_'"
        )));
    }
    Ok(())
}

/// Project name: 3–100 characters of `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String)]
pub struct ProjectName(String);

impl ProjectName {
    /// Borrows the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProjectName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        check_slug("project name", &value, 3, 100)?;
        Ok(Self(value))
    }
}

impl From<ProjectName> for String {
    fn from(name: ProjectName) -> Self {
        name.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle of a developer or of an end user leaving feedback:
/// 3–50 characters of `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String)]
pub struct UserHandle(String);

impl UserHandle {
    /// Borrows the handle.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserHandle {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        check_slug("user id", &value, 3, 50)?;
        Ok(Self(value))
    }
}

impl From<UserHandle> for String {
    fn from(handle: UserHandle) -> Self {
        handle.0
    }
}

impl fmt::Display for UserHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checks message length against [`MAX_MESSAGE_CHARS`].
///
/// # Errors
///
/// Returns [`AppError::InvalidRequest`] for an empty or oversized body.
pub fn validate_message(content: &str) -> Result<(), AppError> {
    if content.trim().is_empty() {
        return Err(AppError::InvalidRequest("message must not be empty".to_string()));
    }
    if content.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::InvalidRequest(format!(
            "message must not exceed {MAX_MESSAGE_CHARS} characters"
        )));
    }
    Ok(())
}

/// Minimal structural email check: one `@`, non-empty local part, a dot
/// in the domain, no whitespace.
///
/// # Errors
///
/// Returns [`AppError::InvalidRequest`] when the address is malformed.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    let invalid = || AppError::InvalidRequest(format!("invalid email address: {email}"));
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.split_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() && !domain.ends_with('.') => {
            Ok(())
        }
        _ => Err(invalid()),
    }
}
