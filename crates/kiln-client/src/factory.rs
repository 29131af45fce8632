use std::sync::Arc;

use kiln_store::{ClientConfig, Credentials, SchemaRegistry, StoreConnector};

use crate::auth::AuthInfo;
use crate::error::{ClientError, ClientResult};
use crate::scoped::ScopedClient;

/// Builds store clients for a request.
///
/// Repositories hold a factory and build a fresh client per operation.
/// Implementations are shared across requests and must be thread-safe.
pub trait ClientFactory: Send + Sync {
    fn build_client(&self, auth: &AuthInfo) -> ClientResult<ScopedClient>;
}

/// Decode a PEM bundle holding one certificate and one private key into
/// their DER forms.
///
/// The certificate block must come first in well-formed input, but either
/// order is accepted. Extra blocks are ignored.
pub fn decode_client_certificate(pem: &[u8]) -> ClientResult<(Vec<u8>, Vec<u8>)> {
    let cert = rustls_pemfile::certs(&mut &pem[..])
        .next()
        .and_then(Result::ok)
        .ok_or(ClientError::CredentialDecode("cert"))?;

    let key = rustls_pemfile::private_key(&mut &pem[..])
        .ok()
        .flatten()
        .ok_or(ClientError::CredentialDecode("key"))?;

    Ok((cert.as_ref().to_vec(), key.secret_der().to_vec()))
}

/// Builds clients that authenticate as the calling user.
///
/// The base configuration is anonymized once at construction; every client
/// gets a copy carrying only the caller's own credential.
pub struct UnprivilegedClientFactory {
    base: Arc<ClientConfig>,
    registry: Arc<SchemaRegistry>,
    connector: Arc<dyn StoreConnector>,
}

impl UnprivilegedClientFactory {
    pub fn new(
        base: &ClientConfig,
        registry: Arc<SchemaRegistry>,
        connector: Arc<dyn StoreConnector>,
    ) -> Self {
        Self {
            base: Arc::new(base.anonymized()),
            registry,
            connector,
        }
    }

    /// The anonymized configuration clients are derived from.
    pub fn base_config(&self) -> &ClientConfig {
        &self.base
    }

    fn credentials_for(auth: &AuthInfo) -> ClientResult<Credentials> {
        match auth {
            AuthInfo::Bearer { token } => Ok(Credentials::Bearer(token.clone())),
            AuthInfo::ClientCert { cert_data } => {
                let (cert_der, key_der) = decode_client_certificate(cert_data)?;
                Ok(Credentials::ClientCertificate { cert_der, key_der })
            }
            AuthInfo::Unsupported { scheme } => Err(ClientError::NotAuthenticated(format!(
                "unsupported authorization scheme {scheme:?}"
            ))),
        }
    }
}

impl ClientFactory for UnprivilegedClientFactory {
    fn build_client(&self, auth: &AuthInfo) -> ClientResult<ScopedClient> {
        let credentials = Self::credentials_for(auth)?;
        tracing::debug!(scheme = auth.scheme(), "building caller-scoped store client");

        let config = self.base.as_ref().clone().with_credentials(credentials);
        let store = self
            .connector
            .connect(&config, Arc::clone(&self.registry))
            .map_err(ClientError::Connect)?;
        Ok(ScopedClient::new(store, config.timeout))
    }
}

/// Builds clients that authenticate as Kiln's own service identity.
///
/// Used only for platform-internal objects such as shared domains, which
/// callers may read without holding store permissions on them.
pub struct PrivilegedClientFactory {
    config: ClientConfig,
    registry: Arc<SchemaRegistry>,
    connector: Arc<dyn StoreConnector>,
}

impl PrivilegedClientFactory {
    /// `config` must carry the service identity's credentials.
    pub fn new(
        config: ClientConfig,
        registry: Arc<SchemaRegistry>,
        connector: Arc<dyn StoreConnector>,
    ) -> Self {
        Self {
            config,
            registry,
            connector,
        }
    }

    pub fn build(&self) -> ClientResult<ScopedClient> {
        tracing::debug!(
            scheme = self.config.credentials.scheme(),
            "building privileged store client"
        );
        let store = self
            .connector
            .connect(&self.config, Arc::clone(&self.registry))
            .map_err(ClientError::Connect)?;
        Ok(ScopedClient::new(store, self.config.timeout))
    }
}

impl ClientFactory for PrivilegedClientFactory {
    /// The caller's credential is ignored.
    fn build_client(&self, _auth: &AuthInfo) -> ClientResult<ScopedClient> {
        self.build()
    }
}
