use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of failure categories surfaced by Kiln.
///
/// Handler code switches on this tag only. Store-specific error types never
/// cross the repository boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The object does not exist, or the caller may not see it. The two are
    /// indistinguishable on purpose so that existence does not leak.
    PermissionDeniedOrNotFound,
    /// Concurrent modification or create-on-existing. Retry with a fresh read.
    Conflict,
    /// The store rejected a write for schema or field reasons.
    Validation,
    /// Several objects share an identifier that must be unique.
    DuplicateObject,
    /// The credential scheme is unsupported or the credential is absent.
    NotAuthenticated,
    /// Transport failure, timeout, cancellation or anything unexpected.
    Unknown,
}

impl ErrorKind {
    /// Stable machine-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionDeniedOrNotFound => "permission_denied_or_not_found",
            Self::Conflict => "conflict",
            Self::Validation => "validation",
            Self::DuplicateObject => "duplicate_object",
            Self::NotAuthenticated => "not_authenticated",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid GUID: {0}")]
    InvalidGuid(String),

    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_stable() {
        assert_eq!(
            ErrorKind::PermissionDeniedOrNotFound.to_string(),
            "permission_denied_or_not_found"
        );
        assert_eq!(ErrorKind::DuplicateObject.as_str(), "duplicate_object");
    }

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&ErrorKind::Conflict).unwrap();
        let back: ErrorKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ErrorKind::Conflict);
    }
}
