//! Data Transfer Objects for REST request/response serialization.
//!
//! Public intake bodies use the widget's camelCase field names; dashboard
//! responses keep the snake_case names with a few camelCase aggregates.

pub mod common_dto;
pub mod developer_dto;
pub mod feedback_dto;
pub mod project_dto;

pub use common_dto::*;
pub use developer_dto::*;
pub use feedback_dto::*;
pub use project_dto::*;
