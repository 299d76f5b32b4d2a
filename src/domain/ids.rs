//! Type-safe row identifiers.
//!
//! [`DeveloperId`] and [`ProjectId`] are newtype wrappers around the
//! `BIGSERIAL` primary keys so that a developer id can never be passed
//! where a project id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifier of a registered developer.
///
/// Ordering follows the numeric key, which is also the order in which
/// digests are produced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct DeveloperId(i64);

impl DeveloperId {
    /// Wraps a raw key.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw key.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for DeveloperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for DeveloperId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// Identifier of a project.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct ProjectId(i64);

impl ProjectId {
    /// Wraps a raw key.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw key.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProjectId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_raw_key() {
        assert_eq!(DeveloperId::new(42).to_string(), "42");
        assert_eq!(ProjectId::new(7).to_string(), "7");
    }

    #[test]
    fn serializes_transparently() {
        let Ok(json) = serde_json::to_string(&ProjectId::new(9)) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "9");
        let Ok(id) = serde_json::from_str::<DeveloperId>("12") else {
            panic!("deserialization failed");
        };
        assert_eq!(id.get(), 12);
    }

    #[test]
    fn orders_by_key() {
        let mut ids = vec![DeveloperId::new(3), DeveloperId::new(1), DeveloperId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![DeveloperId::new(1), DeveloperId::new(2), DeveloperId::new(3)]);
    }
}
