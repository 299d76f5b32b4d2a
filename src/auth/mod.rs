//! Developer authentication: Argon2 password hashes, HS256 bearer tokens
//! and the axum extractor guarding developer-only routes.

pub mod extractor;
pub mod password;
pub mod token;

pub use extractor::AuthenticatedDeveloper;
pub use password::{hash_password, verify_password};
pub use token::{Claims, JwtKeys};
