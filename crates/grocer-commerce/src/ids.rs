//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up different ID types,
//! e.g., passing a UserId where an OrderId is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Product and order ids are assigned by the document store, user ids by the
// authentication provider.
define_id!(ProductId);
define_id!(UserId);
define_id!(OrderId);
define_id!(IdempotencyKey);

impl IdempotencyKey {
    /// Generate a fresh key for one order placement attempt.
    ///
    /// A retry of the same attempt must reuse the key; a new attempt gets a
    /// new one.
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use rand::Rng;

        let bytes: [u8; 18] = rand::thread_rng().gen();
        Self(format!("idem_{}", URL_SAFE_NO_PAD.encode(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ProductId::new("prod-123");
        assert_eq!(id.as_str(), "prod-123");
    }

    #[test]
    fn test_idempotency_key_generation() {
        let k1 = IdempotencyKey::generate();
        let k2 = IdempotencyKey::generate();
        assert!(k1.as_str().starts_with("idem_"));
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = OrderId::new("ord-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ord-1\"");
        let back: OrderId = serde_json::from_str("\"ord-1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_equality() {
        let id1 = UserId::new("same");
        let id2: UserId = "same".into();
        let id3 = UserId::new("different");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(format!("{}", id1), "same");
    }
}
