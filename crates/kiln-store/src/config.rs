use std::fmt;
use std::time::Duration;

/// Credentials a client presents to the store on every call.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Credentials {
    /// No credentials. The store treats the caller as anonymous.
    #[default]
    Anonymous,
    Bearer(String),
    /// DER-encoded client certificate and private key for mutual TLS.
    ClientCertificate { cert_der: Vec<u8>, key_der: Vec<u8> },
}

impl Credentials {
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Bearer(_) => "bearer",
            Self::ClientCertificate { .. } => "client-certificate",
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secrets.
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Self::ClientCertificate { cert_der, .. } => f
                .debug_struct("ClientCertificate")
                .field("cert_len", &cert_der.len())
                .field("key", &"<redacted>")
                .finish(),
        }
    }
}

/// Connection configuration for a store client.
///
/// The process keeps one base configuration behind an `Arc`. Per-request
/// clients are built from copies of it and never write back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Address of the store's API endpoint.
    pub endpoint: String,
    pub credentials: Credentials,
    /// Upper bound for a single store call, enforced by the transport.
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            credentials: Credentials::Anonymous,
            timeout: Duration::from_secs(30),
            user_agent: concat!("kiln/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// A copy of this configuration with all credentials removed.
    pub fn anonymized(&self) -> Self {
        Self {
            credentials: Credentials::Anonymous,
            ..self.clone()
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymized_strips_credentials_only() {
        let base = ClientConfig::new("https://store.local:6443")
            .with_credentials(Credentials::Bearer("secret".into()))
            .with_timeout(Duration::from_secs(5));
        let anon = base.anonymized();
        assert_eq!(anon.credentials, Credentials::Anonymous);
        assert_eq!(anon.endpoint, base.endpoint);
        assert_eq!(anon.timeout, Duration::from_secs(5));
    }

    #[test]
    fn debug_redacts_secrets() {
        let bearer = format!("{:?}", Credentials::Bearer("hunter2".into()));
        assert!(!bearer.contains("hunter2"));

        let cert = Credentials::ClientCertificate {
            cert_der: vec![1, 2, 3],
            key_der: vec![9, 9, 9],
        };
        let printed = format!("{cert:?}");
        assert!(printed.contains("cert_len: 3"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn schemes() {
        assert_eq!(Credentials::default().scheme(), "anonymous");
        assert_eq!(Credentials::Bearer("t".into()).scheme(), "bearer");
    }
}
