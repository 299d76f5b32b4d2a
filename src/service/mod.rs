//! Service layer: business logic orchestration.
//!
//! [`AccountService`], [`ProjectService`] and [`FeedbackService`] back the
//! HTTP handlers. [`DigestAggregator`] builds digests from unsent activity
//! and [`DigestJob`] runs aggregation plus delivery.

pub mod account_service;
pub mod digest_aggregator;
pub mod digest_job;
pub mod feedback_service;
pub mod project_service;

pub use account_service::AccountService;
pub use digest_aggregator::{ActivityGroups, DigestAggregator, merge_digests};
pub use digest_job::DigestJob;
pub use feedback_service::{FeedbackService, MessageSubmission, ThankYouSubmission};
pub use project_service::{ProjectDetails, ProjectService, ProjectStats, ProjectSummary};
