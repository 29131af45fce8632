use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use kiln_store::{ClientConfig, Credentials};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    pub log_level: String,
    /// Upper bound on the store work done for one inbound request.
    pub request_timeout_secs: u64,
    pub store: StoreSettings,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub endpoint: String,
    /// Upper bound on a single store call.
    pub timeout_secs: u64,
    /// Bearer token of Kiln's own service identity, used for domains.
    pub service_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 9000)),
            log_level: "info".into(),
            request_timeout_secs: 60,
            store: StoreSettings::default(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://127.0.0.1:6443".into(),
            timeout_secs: 30,
            service_token: None,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(source: &str) -> ServerResult<Self> {
        toml::from_str(source).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The credential-free base configuration caller clients start from.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.store.endpoint.clone())
            .with_timeout(Duration::from_secs(self.store.timeout_secs))
    }

    /// Configuration for the privileged client. Falls back to anonymous
    /// access when no service token is configured.
    pub fn service_config(&self) -> ClientConfig {
        let credentials = match &self.store.service_token {
            Some(token) => Credentials::Bearer(token.clone()),
            None => Credentials::Anonymous,
        };
        self.client_config().with_credentials(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(c.log_level, "info");
        assert_eq!(c.request_timeout(), Duration::from_secs(60));
        assert!(c.store.service_token.is_none());
        assert_eq!(c.service_config().credentials, Credentials::Anonymous);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ServerConfig::from_toml_str(
            r#"
            log_level = "debug"

            [store]
            endpoint = "https://store.internal:6443"
            service_token = "svc"
            "#,
        )
        .unwrap();
        assert_eq!(c.log_level, "debug");
        assert_eq!(c.store.timeout_secs, 30);
        assert_eq!(c.client_config().endpoint, "https://store.internal:6443");
        assert_eq!(c.client_config().credentials, Credentials::Anonymous);
        assert_eq!(c.service_config().credentials, Credentials::Bearer("svc".into()));
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = ServerConfig::from_toml_str("bind_addr = 12").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_addr = \"0.0.0.0:8080\"\nrequest_timeout_secs = 5").unwrap();
        let c = ServerConfig::load(file.path()).unwrap();
        assert_eq!(c.bind_addr.port(), 8080);
        assert_eq!(c.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ServerConfig::load("/nonexistent/kiln.toml").unwrap_err();
        assert!(matches!(err, ServerError::Io(_)));
    }
}
