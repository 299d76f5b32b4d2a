//! Service error types with HTTP status code mapping.
//!
//! [`AppError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::DeveloperId;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "project not found: demo (developer 4)",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see the code ranges on [`AppError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                       |
/// |-----------|-----------------|-----------------------------------|
/// | 1000–1099 | Validation      | 400 Bad Request                   |
/// | 1100–1199 | Authentication  | 401 Unauthorized / 403 Forbidden  |
/// | 2000–2999 | Not Found       | 404 Not Found                     |
/// | 3000–3999 | Server          | 5xx                               |
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A developer with this username already exists.
    #[error("username already taken: {0}")]
    UsernameTaken(String),

    /// The developer already owns a project with this name.
    #[error("project name already taken: {0}")]
    ProjectNameTaken(String),

    /// Username / password pair did not match.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Missing or invalid bearer token, or wrong shared secret.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The authenticated developer does not own the requested project.
    #[error("access to this project is forbidden")]
    Forbidden,

    /// No project with this name exists for the developer.
    #[error("project not found: {project_name} (developer {developer_id})")]
    ProjectNotFound {
        /// Requested project name.
        project_name: String,
        /// Developer the project was looked up under.
        developer_id: DeveloperId,
    },

    /// Developer with the given ID was not found.
    #[error("developer not found: {0}")]
    DeveloperNotFound(DeveloperId),

    /// Store query or transport failure.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// An email body could not be rendered.
    #[error("template render error: {0}")]
    TemplateRender(String),

    /// The mail transport rejected or failed to deliver a message.
    #[error("mail delivery failed: {0}")]
    MailDelivery(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::UsernameTaken(_) => 1002,
            Self::ProjectNameTaken(_) => 1003,
            Self::InvalidCredentials => 1101,
            Self::Unauthorized(_) => 1102,
            Self::Forbidden => 1103,
            Self::ProjectNotFound { .. } => 2001,
            Self::DeveloperNotFound(_) => 2002,
            Self::Internal(_) => 3000,
            Self::StoreUnavailable(_) => 3001,
            Self::TemplateRender(_) => 3002,
            Self::MailDelivery(_) => 3003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::UsernameTaken(_) | Self::ProjectNameTaken(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidCredentials | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::ProjectNotFound { .. } | Self::DeveloperNotFound(_) => StatusCode::NOT_FOUND,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::MailDelivery(_) => StatusCode::BAD_GATEWAY,
            Self::TemplateRender(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = AppError::ProjectNotFound {
            project_name: "demo".to_string(),
            developer_id: DeveloperId::new(4),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), 2001);
        assert_eq!(err.to_string(), "project not found: demo (developer 4)");
    }

    #[test]
    fn store_unavailable_is_transient() {
        let err = AppError::StoreUnavailable("connection refused".to_string());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn duplicate_names_are_client_errors() {
        assert_eq!(
            AppError::UsernameTaken("alice".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ProjectNameTaken("demo".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn response_carries_status() {
        let response = AppError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
