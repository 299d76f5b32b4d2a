//! Developer handlers: register, login, profile, preferences.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::api::dto::{
    DeveloperResponse, LoginRequest, PreferencesRequest, ProfileResponse, RegisterRequest,
    TokenResponse,
};
use crate::app_state::AppState;
use crate::auth::AuthenticatedDeveloper;
use crate::error::{AppError, ErrorResponse};

/// `POST /developers`: Register a developer account.
///
/// # Errors
///
/// Returns [`AppError`] if the username is taken or the input is invalid.
#[utoipa::path(
    post,
    path = "/developers",
    tag = "Developers",
    summary = "Register",
    description = "Creates a developer account. Notification preferences start at their defaults (instant messages on, instant thank-yous off, daily digest).",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = DeveloperResponse),
        (status = 400, description = "Username taken or invalid input", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let developer = state
        .accounts
        .register(&req.username, &req.email, &req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(DeveloperResponse::from(&developer))))
}

/// `POST /developers/login`: Exchange credentials for a bearer token.
///
/// # Errors
///
/// Returns [`AppError::InvalidCredentials`] on a bad username or password.
#[utoipa::path(
    post,
    path = "/developers/login",
    tag = "Developers",
    summary = "Log in",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token", body = TokenResponse),
        (status = 401, description = "Bad credentials", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let token = state.accounts.login(&req.username, &req.password).await?;
    Ok(Json(TokenResponse::bearer(token)))
}

/// `GET /developers/me`: Profile of the authenticated developer.
///
/// # Errors
///
/// Returns [`AppError`] if the token is invalid or the account is gone.
#[utoipa::path(
    get,
    path = "/developers/me",
    tag = "Developers",
    summary = "Own profile",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile and preferences", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn me(
    State(state): State<AppState>,
    auth: AuthenticatedDeveloper,
) -> Result<impl IntoResponse, AppError> {
    let developer = state.accounts.profile(auth.id()).await?;
    Ok(Json(ProfileResponse::from(developer)))
}

/// `PATCH /developers/me/preferences`: Update notification preferences.
///
/// # Errors
///
/// Returns [`AppError`] if the token is invalid or the account is gone.
#[utoipa::path(
    patch,
    path = "/developers/me/preferences",
    tag = "Developers",
    summary = "Update preferences",
    description = "Partial update: omitted fields keep their current value. `summaryFrequency` accepts `daily`, `weekly` or `none`.",
    security(("bearer" = [])),
    request_body = PreferencesRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn update_preferences(
    State(state): State<AppState>,
    auth: AuthenticatedDeveloper,
    Json(req): Json<PreferencesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let developer = state
        .accounts
        .update_preferences(auth.id(), req.into())
        .await?;
    Ok(Json(ProfileResponse::from(developer)))
}

/// Developer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/developers", post(register))
        .route("/developers/login", post(login))
        .route("/developers/me", get(me))
        .route("/developers/me/preferences", patch(update_preferences))
}
