use kiln_client::ClientError;
use kiln_store::{StatusReason, StoreError};
use kiln_types::ErrorKind;

/// Why a write conflicted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConflictReason {
    /// The create collided with an existing object of the same identity.
    AlreadyExists,
    /// A conditional write observed a newer version of the object.
    VersionMismatch,
}

/// Errors returned by repository operations.
///
/// Every variant maps onto exactly one [`ErrorKind`]. Store error types never
/// appear here; they are classified on the way out.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Covers both "does not exist" and "caller may not see it".
    #[error("{resource} not found")]
    PermissionDeniedOrNotFound { resource: &'static str },

    #[error("{resource} conflict: {message}")]
    Conflict {
        resource: &'static str,
        reason: ConflictReason,
        message: String,
    },

    /// The store rejected a write. `field` is the offending path when known.
    #[error("{message}")]
    Validation {
        field: Option<String>,
        message: String,
    },

    /// Several objects share an identifier that must be unique.
    #[error("duplicate {} GUID exists", .resource.to_lowercase())]
    DuplicateObject { resource: &'static str, guid: String },

    #[error("not authenticated: {0}")]
    NotAuthenticated(String),

    /// Details are logged where the error is classified, never returned.
    #[error("unexpected error during {operation}")]
    Unknown { operation: &'static str },
}

impl RepositoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDeniedOrNotFound { .. } => ErrorKind::PermissionDeniedOrNotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::DuplicateObject { .. } => ErrorKind::DuplicateObject,
            Self::NotAuthenticated(_) => ErrorKind::NotAuthenticated,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Whether this is a create that collided with an existing object.
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Self::Conflict {
                reason: ConflictReason::AlreadyExists,
                ..
            }
        )
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Map a store failure onto the error taxonomy.
///
/// Only the structured reason is consulted. Not-found, unauthorized and
/// forbidden collapse into one kind so a caller cannot discover objects it
/// is not allowed to see.
pub fn classify(err: &StoreError) -> ErrorKind {
    match err.reason() {
        StatusReason::NotFound | StatusReason::Unauthorized | StatusReason::Forbidden => {
            ErrorKind::PermissionDeniedOrNotFound
        }
        StatusReason::AlreadyExists | StatusReason::Conflict => ErrorKind::Conflict,
        StatusReason::Invalid => ErrorKind::Validation,
        StatusReason::Timeout | StatusReason::Cancelled | StatusReason::Unknown => {
            ErrorKind::Unknown
        }
    }
}

/// The repository call a failure happened in, for classification and logs.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Op<'a> {
    pub operation: &'static str,
    pub resource: &'static str,
    pub name: &'a str,
}

impl<'a> Op<'a> {
    pub fn new(operation: &'static str, resource: &'static str, name: &'a str) -> Self {
        Self {
            operation,
            resource,
            name,
        }
    }

    pub fn not_found(&self) -> RepositoryError {
        RepositoryError::PermissionDeniedOrNotFound {
            resource: self.resource,
        }
    }

    pub fn store_error(&self, err: StoreError) -> RepositoryError {
        match classify(&err) {
            ErrorKind::PermissionDeniedOrNotFound => self.not_found(),
            ErrorKind::Conflict => RepositoryError::Conflict {
                resource: self.resource,
                reason: match err.reason() {
                    StatusReason::AlreadyExists => ConflictReason::AlreadyExists,
                    _ => ConflictReason::VersionMismatch,
                },
                message: err.to_string(),
            },
            ErrorKind::Validation => {
                let violations = err.violations();
                RepositoryError::Validation {
                    field: violations.first().map(|v| v.field.clone()),
                    message: if violations.is_empty() {
                        err.to_string()
                    } else {
                        violations
                            .iter()
                            .map(|v| v.message.as_str())
                            .collect::<Vec<_>>()
                            .join("; ")
                    },
                }
            }
            _ => self.unknown(&err),
        }
    }

    pub fn client_error(&self, err: ClientError) -> RepositoryError {
        match err {
            ClientError::NotAuthenticated(reason) => RepositoryError::NotAuthenticated(reason),
            other => self.unknown(&other),
        }
    }

    fn unknown(&self, err: &dyn std::error::Error) -> RepositoryError {
        tracing::error!(
            operation = self.operation,
            kind = self.resource,
            name = self.name,
            error = %err,
            "repository operation failed"
        );
        RepositoryError::Unknown {
            operation: self.operation,
        }
    }
}
