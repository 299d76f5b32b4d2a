//! # merkibocou
//!
//! Thank-you counter and feedback service for developer projects.
//!
//! End users click "thank you" or leave a short message on a project
//! through an embeddable widget. Developers manage their projects from a
//! dashboard, can be notified instantly, and receive a periodic digest of
//! everything new since the last one.
//!
//! ## Architecture
//!
//! ```text
//! Clients (widget, dashboard, scheduler)
//!     │
//!     ├── REST Handlers (api/)  ── AuthenticatedDeveloper (auth/)
//!     │
//!     ├── Account / Project / Feedback services (service/)
//!     ├── DigestJob = DigestAggregator + DigestDispatcher
//!     │
//!     ├── Store + DigestSource (persistence/)
//!     │       ├── PostgresStore (sqlx)
//!     │       └── InMemoryStore
//!     │
//!     └── MailTransport (notify/)
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod notify;
pub mod persistence;
pub mod service;

#[cfg(test)]
mod test_support;
