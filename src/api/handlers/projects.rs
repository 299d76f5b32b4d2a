//! Project handlers for the owner dashboard. All routes require a token.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    CreateProjectRequest, ProjectDetailsResponse, ProjectResponse, ProjectStatsResponse,
    ProjectSummaryResponse,
};
use crate::app_state::AppState;
use crate::auth::AuthenticatedDeveloper;
use crate::domain::ProjectId;
use crate::error::{AppError, ErrorResponse};

/// `POST /projects`: Create a project.
///
/// # Errors
///
/// Returns [`AppError::ProjectNameTaken`] if the developer already owns
/// a project with this name.
#[utoipa::path(
    post,
    path = "/projects",
    tag = "Projects",
    summary = "Create a project",
    security(("bearer" = [])),
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Name already used", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthenticatedDeveloper,
    Json(req): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    let project = state.projects.create(auth.id(), &req.name).await?;
    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

/// `GET /projects`: List own projects.
///
/// # Errors
///
/// Returns [`AppError`] on store failure.
#[utoipa::path(
    get,
    path = "/projects",
    tag = "Projects",
    summary = "List own projects",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Projects by id", body = Vec<ProjectResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthenticatedDeveloper,
) -> Result<impl IntoResponse, AppError> {
    let projects: Vec<ProjectResponse> = state
        .projects
        .list(auth.id())
        .await?
        .into_iter()
        .map(ProjectResponse::from)
        .collect();
    Ok(Json(projects))
}

/// `GET /projects/summary`: Total clicks and last message per project.
///
/// # Errors
///
/// Returns [`AppError`] on store failure.
#[utoipa::path(
    get,
    path = "/projects/summary",
    tag = "Projects",
    summary = "Dashboard summary",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "One line per project", body = Vec<ProjectSummaryResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn project_summary(
    State(state): State<AppState>,
    auth: AuthenticatedDeveloper,
) -> Result<impl IntoResponse, AppError> {
    let summaries: Vec<ProjectSummaryResponse> = state
        .projects
        .summaries(auth.id())
        .await?
        .into_iter()
        .map(ProjectSummaryResponse::from)
        .collect();
    Ok(Json(summaries))
}

/// `GET /projects/{id}/stats`: All-time statistics of an owned project.
///
/// # Errors
///
/// Returns [`AppError::Forbidden`] if the caller does not own it.
#[utoipa::path(
    get,
    path = "/projects/{id}/stats",
    tag = "Projects",
    summary = "Project statistics",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Project id")),
    responses(
        (status = 200, description = "Total clicks and every message", body = ProjectStatsResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
    )
)]
pub async fn project_stats(
    State(state): State<AppState>,
    auth: AuthenticatedDeveloper,
    Path(id): Path<ProjectId>,
) -> Result<impl IntoResponse, AppError> {
    let stats = state.projects.stats(auth.id(), id).await?;
    Ok(Json(ProjectStatsResponse::from(stats)))
}

/// `GET /projects/{id}/details`: Latest activity of an owned project.
///
/// # Errors
///
/// Returns [`AppError::Forbidden`] if the caller does not own it.
#[utoipa::path(
    get,
    path = "/projects/{id}/details",
    tag = "Projects",
    summary = "Project details",
    description = "The ten most recent thank-you batches and messages, newest first.",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Project id")),
    responses(
        (status = 200, description = "Recent activity", body = ProjectDetailsResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
    )
)]
pub async fn project_details(
    State(state): State<AppState>,
    auth: AuthenticatedDeveloper,
    Path(id): Path<ProjectId>,
) -> Result<impl IntoResponse, AppError> {
    let details = state.projects.details(auth.id(), id).await?;
    Ok(Json(ProjectDetailsResponse::from(details)))
}

/// Project routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/summary", get(project_summary))
        .route("/projects/{id}/stats", get(project_stats))
        .route("/projects/{id}/details", get(project_details))
}
