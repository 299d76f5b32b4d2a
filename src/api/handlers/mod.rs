//! REST endpoint handlers organized by resource.

pub mod cron;
pub mod developers;
pub mod feedback;
pub mod projects;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(developers::routes())
        .merge(projects::routes())
        .merge(feedback::routes())
        .merge(cron::routes())
        .merge(system::routes())
}
