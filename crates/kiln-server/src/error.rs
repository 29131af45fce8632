use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use kiln_client::ClientError;
use kiln_repositories::RepositoryError;
use kiln_types::ErrorKind;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

const UNKNOWN_DETAIL: &str = "An unknown error occurred.";

/// An error response in the platform's `{"errors": [...]}` shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: String,
    pub code: u32,
}

impl ApiError {
    /// Build the response for an error kind. `Unknown` never carries
    /// `detail`; it has already been logged where it was classified.
    pub fn from_kind(kind: ErrorKind, detail: impl Into<String>) -> Self {
        let (status, title, code) = match kind {
            ErrorKind::PermissionDeniedOrNotFound => {
                (StatusCode::NOT_FOUND, "CF-ResourceNotFound", 10010)
            }
            ErrorKind::Validation | ErrorKind::DuplicateObject => {
                (StatusCode::UNPROCESSABLE_ENTITY, "CF-UnprocessableEntity", 10008)
            }
            ErrorKind::Conflict => (StatusCode::CONFLICT, "CF-ConcurrencyError", 10022),
            ErrorKind::NotAuthenticated => (StatusCode::UNAUTHORIZED, "CF-NotAuthenticated", 10002),
            ErrorKind::Unknown => {
                return Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    title: "UnknownError",
                    detail: UNKNOWN_DETAIL.into(),
                    code: 10001,
                }
            }
        };
        Self {
            status,
            title,
            detail: detail.into(),
            code,
        }
    }

    pub fn not_authenticated() -> Self {
        Self::from_kind(ErrorKind::NotAuthenticated, "Authentication error")
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        Self::from_kind(err.kind(), err.to_string())
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        if err.kind() == ErrorKind::Unknown {
            tracing::error!(error = %err, "credential resolution failed");
        }
        Self::from_kind(err.kind(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "errors": [{
                "title": self.title,
                "detail": self.detail,
                "code": self.code,
            }]
        });
        (self.status, Json(body)).into_response()
    }
}
