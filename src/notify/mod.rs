//! Outgoing email: HTML templates, transports, digest dispatch and
//! instant notifications.

pub mod dispatcher;
pub mod instant;
pub mod template;
pub mod transport;

pub use dispatcher::{DigestDispatcher, DispatchFailure, DispatchReport};
pub use instant::InstantNotifier;
pub use transport::{HttpMailTransport, LogTransport, MailTransport, OutgoingMail, transport_from_config};
