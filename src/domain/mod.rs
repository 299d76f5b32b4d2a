//! Domain layer: core types shared by the store, services and API.
//!
//! This module contains typed identifiers, validated names, developer
//! accounts, projects with their feedback items, and the digest model
//! (window, store rows, and the per-developer aggregate).

pub mod developer;
pub mod digest;
pub mod ids;
pub mod names;
pub mod project;

pub use developer::{Developer, DeveloperAccount, NewDeveloper, PreferenceUpdate, SummaryFrequency};
pub use digest::{
    ActivityRow, DeveloperDigest, DigestWindow, MessageEntry, MessagePayload, ProjectDigest,
    ThankYouEntry, ThankYouPayload,
};
pub use ids::{DeveloperId, ProjectId};
pub use names::{ProjectName, UserHandle};
pub use project::{Message, NewMessage, NewThankYou, Project, ThankYouClick};
