//! OpenAPI document for every REST endpoint.

use axum::Json;
use axum::response::IntoResponse;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::handlers;

/// Path of the generated JSON document.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Generated API description.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "merkibocou",
        description = "Thank-you counter and feedback service for developer projects."
    ),
    paths(
        handlers::system::health_handler,
        handlers::developers::register,
        handlers::developers::login,
        handlers::developers::me,
        handlers::developers::update_preferences,
        handlers::projects::create_project,
        handlers::projects::list_projects,
        handlers::projects::project_summary,
        handlers::projects::project_stats,
        handlers::projects::project_details,
        handlers::feedback::thank_you,
        handlers::feedback::send_message,
        handlers::cron::trigger_cron,
    ),
    components(schemas(crate::error::ErrorResponse, crate::error::ErrorBody)),
    modifiers(&BearerAuth),
    tags(
        (name = "Developers", description = "Accounts and notification preferences"),
        (name = "Projects", description = "Owner dashboard"),
        (name = "Feedback", description = "Public widget endpoints"),
        (name = "System", description = "Health and scheduled jobs"),
    )
)]
pub struct ApiDoc;

#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// `GET /api-docs/openapi.json` when Swagger UI is compiled out.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
