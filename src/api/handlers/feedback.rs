//! Public feedback handlers called by the embeddable widget.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{MessageRequest, MessageResponse, ThankYouRequest, ThankYouResponse};
use crate::app_state::AppState;
use crate::error::{AppError, ErrorResponse};

/// `POST /thank-you`: Record thank-you clicks.
///
/// # Errors
///
/// Returns [`AppError::ProjectNotFound`] if the developer has no project
/// with this name.
#[utoipa::path(
    post,
    path = "/thank-you",
    tag = "Feedback",
    summary = "Say thanks",
    request_body = ThankYouRequest,
    responses(
        (status = 201, description = "Clicks recorded", body = ThankYouResponse),
        (status = 400, description = "Invalid click count", body = ErrorResponse),
        (status = 404, description = "Unknown project", body = ErrorResponse),
    )
)]
pub async fn thank_you(
    State(state): State<AppState>,
    Json(req): Json<ThankYouRequest>,
) -> Result<impl IntoResponse, AppError> {
    let click = state.feedback.record_thank_you(req.into()).await?;
    Ok((StatusCode::CREATED, Json(ThankYouResponse::from(click))))
}

/// `POST /send-message`: Leave a message.
///
/// # Errors
///
/// Returns [`AppError::ProjectNotFound`] if the developer has no project
/// with this name.
#[utoipa::path(
    post,
    path = "/send-message",
    tag = "Feedback",
    summary = "Send a message",
    request_body = MessageRequest,
    responses(
        (status = 201, description = "Message recorded", body = MessageResponse),
        (status = 400, description = "Empty or oversized message", body = ErrorResponse),
        (status = 404, description = "Unknown project", body = ErrorResponse),
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<MessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let message = state.feedback.record_message(req.into()).await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}

/// Feedback routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/thank-you", post(thank_you))
        .route("/send-message", post(send_message))
}
