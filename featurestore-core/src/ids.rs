//! Identity types shared across the feature store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// UTC timestamp used for all stored and cached feature values.
pub type Timestamp = DateTime<Utc>;

/// Stable identifier for a registered feature schema row.
///
/// Backed by a Postgres `bigserial`, never reused, assigned at registration
/// time. Two schemas with the same `(name, version)` always resolve to the
/// same `FeatureId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct FeatureId(pub i64);

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for FeatureId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Opaque entity identifier (e.g. a user id, a session id).
///
/// The feature store never interprets this value; it is whatever the
/// upstream system used to key the entity it is describing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct EntityId(pub String);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_id_display() {
        assert_eq!(FeatureId(42).to_string(), "42");
    }

    #[test]
    fn entity_id_roundtrips_through_serde() {
        let id = EntityId::from("user-1234");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"user-1234\"");
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
