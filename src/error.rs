//! Error types for the cachestack library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in a cache stack.
#[derive(Error, Debug)]
pub enum Error {
    /// Requested key is absent. Expected and frequent; never logged as an
    /// error by the library itself.
    #[error("key not found")]
    NotFound,

    /// A decrypted or decoded value failed its integrity check. Classified
    /// as a miss for callers (see [`Error::is_not_found`]) since an
    /// untrusted store makes absence and corruption indistinguishable, but
    /// kept as a distinct variant for observability.
    #[error("invalid cached value: integrity check failed")]
    Integrity,

    /// Invalid constructor or setup arguments. Raised eagerly, before any
    /// cache operation is attempted.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Key or value not representable in the required codec.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Capability not supported by this store (e.g. key enumeration on a
    /// hash-keyed remote store).
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    /// Any other failure reported by a backing store.
    #[error("backing store error: {0}")]
    Backing(String),
}

impl Error {
    /// Creates a backing-store error with the given description.
    pub fn backing(msg: impl Into<String>) -> Self {
        Error::Backing(msg.into())
    }

    /// Creates a configuration error with the given description.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Whether this error means "no usable value for this key". Covers both
    /// plain absence and integrity failures; miss-handling paths (tiering,
    /// memoization) branch on this rather than on the exact variant.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound | Error::Integrity)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(Error::NotFound.is_not_found());
        assert!(Error::Integrity.is_not_found());
        assert!(!Error::Config("x".into()).is_not_found());
        assert!(!Error::Backing("x".into()).is_not_found());
        assert!(!Error::Unsupported("keys").is_not_found());
    }

    #[test]
    fn test_integrity_message_identifies_corruption() {
        // Distinct from the plain absence message.
        let msg = Error::Integrity.to_string();
        assert!(msg.contains("invalid"));
        assert_ne!(msg, Error::NotFound.to_string());
    }

    #[test]
    fn test_serde_json_conversion() {
        let bad = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = bad.into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_display_includes_context() {
        let err = Error::Config("secret must be at least 16 bytes".into());
        assert!(err.to_string().contains("secret must be at least 16 bytes"));
    }
}
