//! Client-generated session identifiers.
//!
//! A session scopes one cart/wishlist instance on the Pricing Service. The
//! identifier is opaque to the server; clients generate it once and reuse it
//! for the lifetime of the installation. Engines receive a `SessionId`
//! explicitly rather than reading it from ambient storage, so tests can
//! supply distinct sessions freely.

use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// An opaque per-client session identifier.
///
/// Generated identifiers follow the `session_<timestamp>_<random>` wire
/// convention, but any opaque string a client previously persisted is
/// accepted as-is via [`SessionId::from_raw`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh session identifier.
    #[must_use]
    pub fn generate() -> Self {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let random: u32 = rand::rng().random_range(0..1_000_000);
        Self(format!("session_{timestamp}_{random:06}"))
    }

    /// Wrap a previously persisted session identifier.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_has_expected_shape() {
        let id = SessionId::generate();
        let mut parts = id.as_str().splitn(3, '_');
        assert_eq!(parts.next(), Some("session"));

        let timestamp = parts.next().unwrap();
        assert!(timestamp.parse::<i64>().is_ok());

        let random = parts.next().unwrap();
        assert_eq!(random.len(), 6);
        assert!(random.parse::<u32>().is_ok());
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        // Timestamps can collide within a millisecond; the random suffix
        // makes collisions vanishingly unlikely.
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_raw_round_trips() {
        let id = SessionId::from_raw("session_1700000000000_123456");
        assert_eq!(id.as_str(), "session_1700000000000_123456");
    }

    #[test]
    fn test_serde_transparent() {
        let id = SessionId::from_raw("session_1_000001");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"session_1_000001\"");
    }
}
