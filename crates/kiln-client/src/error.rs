use kiln_store::StoreError;
use kiln_types::ErrorKind;
use thiserror::Error;

/// Errors from credential resolution and client construction.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No credential, or a credential scheme Kiln does not accept.
    #[error("not authenticated: {0}")]
    NotAuthenticated(String),

    /// A PEM block in a client-certificate credential could not be decoded.
    #[error("failed to decode {0} PEM")]
    CredentialDecode(&'static str),

    /// The store client could not be constructed.
    #[error("failed to build store client: {0}")]
    Connect(#[source] StoreError),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAuthenticated(_) => ErrorKind::NotAuthenticated,
            Self::CredentialDecode(_) | Self::Connect(_) => ErrorKind::Unknown,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
