use std::fmt;

use crate::object::ResourceKind;

/// The structured reason attached to every store failure.
///
/// This mirrors the `reason` field a store puts in its status responses.
/// Classification code matches on this enum, never on [`StoreError`] variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusReason {
    NotFound,
    Unauthorized,
    Forbidden,
    AlreadyExists,
    Conflict,
    Invalid,
    Timeout,
    Cancelled,
    Unknown,
}

/// One offending field reported by a store-side validation failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldViolation {
    /// Dotted path of the field, e.g. `spec.destinations[0].protocol`.
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors returned by resource-store calls.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The object does not exist.
    #[error("{kind} {name:?} not found")]
    NotFound { kind: ResourceKind, name: String },

    /// The credentials on the client were not accepted.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The authenticated identity may not perform this call.
    #[error("forbidden: {user} cannot {verb} {kind} in namespace {namespace:?}")]
    Forbidden {
        user: String,
        verb: String,
        kind: ResourceKind,
        namespace: String,
    },

    /// An object with this name, or with the same uniqueness key, exists.
    #[error("{kind} {name:?} already exists")]
    AlreadyExists { kind: ResourceKind, name: String },

    /// Optimistic-concurrency version mismatch on a conditional write.
    #[error("operation on {kind} {name:?} conflicted: {message}")]
    Conflict {
        kind: ResourceKind,
        name: String,
        message: String,
    },

    /// The object failed schema or field validation.
    #[error("{kind} {name:?} is invalid: {}", join_violations(.violations))]
    Invalid {
        kind: ResourceKind,
        name: String,
        violations: Vec<FieldViolation>,
    },

    /// The call exceeded its deadline.
    #[error("request timed out")]
    Timeout,

    /// The caller abandoned the call.
    #[error("request cancelled")]
    Cancelled,

    /// The store could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// Kind-to-endpoint mapping failed (bad or missing discovery data).
    #[error("discovery error: {0}")]
    Discovery(String),

    /// A response could not be decoded into the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Unexpected failure inside the store.
    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// The structured reason for this failure.
    pub fn reason(&self) -> StatusReason {
        match self {
            Self::NotFound { .. } => StatusReason::NotFound,
            Self::Unauthorized(_) => StatusReason::Unauthorized,
            Self::Forbidden { .. } => StatusReason::Forbidden,
            Self::AlreadyExists { .. } => StatusReason::AlreadyExists,
            Self::Conflict { .. } => StatusReason::Conflict,
            Self::Invalid { .. } => StatusReason::Invalid,
            Self::Timeout => StatusReason::Timeout,
            Self::Cancelled => StatusReason::Cancelled,
            Self::Transport(_) | Self::Discovery(_) | Self::Decode(_) | Self::Internal(_) => {
                StatusReason::Unknown
            }
        }
    }

    /// Field violations carried by an `Invalid` failure; empty otherwise.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Invalid { violations, .. } => violations,
            _ => &[],
        }
    }

    pub(crate) fn invalid(kind: ResourceKind, name: &str, violation: FieldViolation) -> Self {
        Self::Invalid {
            kind,
            name: name.to_string(),
            violations: vec![violation],
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    const WIDGET: ResourceKind = ResourceKind::new("Widget");

    #[test]
    fn reasons_are_structured() {
        let nf = StoreError::NotFound { kind: WIDGET, name: "w".into() };
        assert_eq!(nf.reason(), StatusReason::NotFound);
        assert_eq!(StoreError::Transport("refused".into()).reason(), StatusReason::Unknown);
        assert_eq!(StoreError::Decode("bad json".into()).reason(), StatusReason::Unknown);
        assert_eq!(StoreError::Cancelled.reason(), StatusReason::Cancelled);
    }

    #[test]
    fn invalid_lists_every_violation() {
        let err = StoreError::Invalid {
            kind: WIDGET,
            name: "w".into(),
            violations: vec![
                FieldViolation::new("spec.a", "required"),
                FieldViolation::new("spec.b", "too long"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Widget \"w\" is invalid: spec.a: required, spec.b: too long"
        );
        assert_eq!(err.violations().len(), 2);
    }
}
