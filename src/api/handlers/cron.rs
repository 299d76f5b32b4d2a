//! Digest trigger called by an external scheduler.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::CronQuery;
use crate::app_state::AppState;
use crate::error::{AppError, ErrorResponse};

/// `GET /triggerwebcron?secret=…`: Start a digest run in the background.
///
/// # Errors
///
/// Returns [`AppError::Unauthorized`] if the secret does not match.
#[utoipa::path(
    get,
    path = "/triggerwebcron",
    tag = "System",
    summary = "Trigger digest emails",
    description = "Aggregates unsent activity and emails one digest per developer. Answers immediately; the run continues in the background.",
    params(CronQuery),
    responses(
        (status = 200, description = "Run started", body = bool),
        (status = 401, description = "Wrong secret", body = ErrorResponse),
    )
)]
pub async fn trigger_cron(
    State(state): State<AppState>,
    Query(query): Query<CronQuery>,
) -> Result<impl IntoResponse, AppError> {
    if query.secret != state.cron_secret.expose() {
        tracing::warn!("digest trigger rejected");
        return Err(AppError::Unauthorized("wrong cron secret".to_string()));
    }
    state.digest_job.spawn();
    Ok(Json(true))
}

/// Cron routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/triggerwebcron", get(trigger_cron))
}
