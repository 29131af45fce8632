use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{ClientError, ClientResult};

pub const BEARER_SCHEME: &str = "bearer";
pub const CERT_SCHEME: &str = "clientcert";

/// The caller's identity for one request.
///
/// Created once per inbound request from its `Authorization` header, never
/// persisted, and dropped when the request ends.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthInfo {
    Bearer { token: String },
    /// A PEM certificate block followed by its PEM private key block.
    ClientCert { cert_data: Vec<u8> },
    /// Any scheme Kiln does not accept. Client construction rejects it.
    Unsupported { scheme: String },
}

impl AuthInfo {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    pub fn client_cert(pem: impl Into<Vec<u8>>) -> Self {
        Self::ClientCert {
            cert_data: pem.into(),
        }
    }

    /// Lowercase scheme name.
    pub fn scheme(&self) -> &str {
        match self {
            Self::Bearer { .. } => BEARER_SCHEME,
            Self::ClientCert { .. } => CERT_SCHEME,
            Self::Unsupported { scheme } => scheme,
        }
    }
}

impl fmt::Debug for AuthInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer { .. } => f.write_str("AuthInfo::Bearer(<redacted>)"),
            Self::ClientCert { cert_data } => {
                write!(f, "AuthInfo::ClientCert({} bytes)", cert_data.len())
            }
            Self::Unsupported { scheme } => write!(f, "AuthInfo::Unsupported({scheme})"),
        }
    }
}

/// Resolve the caller from the value of an `Authorization` header.
///
/// - `Bearer <token>` yields [`AuthInfo::Bearer`].
/// - `ClientCert <base64>` yields [`AuthInfo::ClientCert`]; the payload is the
///   base64 encoding of the PEM certificate and key.
/// - Any other scheme yields [`AuthInfo::Unsupported`], which the client
///   factory rejects.
///
/// A missing header, an empty credential, or an undecodable certificate
/// payload is [`ClientError::NotAuthenticated`].
pub fn auth_info_from_header(header: Option<&str>) -> ClientResult<AuthInfo> {
    let header = header
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ClientError::NotAuthenticated("missing Authorization header".into()))?;

    let (scheme, credential) = match header.split_once(char::is_whitespace) {
        Some((scheme, rest)) => (scheme, rest.trim()),
        None => (header, ""),
    };

    match scheme.to_ascii_lowercase().as_str() {
        BEARER_SCHEME => {
            if credential.is_empty() {
                return Err(ClientError::NotAuthenticated("empty bearer token".into()));
            }
            Ok(AuthInfo::bearer(credential))
        }
        CERT_SCHEME => {
            let pem = STANDARD.decode(credential).map_err(|e| {
                ClientError::NotAuthenticated(format!("malformed ClientCert credential: {e}"))
            })?;
            Ok(AuthInfo::client_cert(pem))
        }
        other => Ok(AuthInfo::Unsupported {
            scheme: other.to_string(),
        }),
    }
}
