use std::sync::Arc;

use kiln_client::{PrivilegedClientFactory, UnprivilegedClientFactory};
use kiln_repositories::{DomainRepository, PackageRepository, RouteRepository};
use kiln_store::StoreConnector;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;
use crate::telemetry;

/// The Kiln API server.
pub struct KilnServer {
    config: ServerConfig,
    state: AppState,
}

impl KilnServer {
    /// Wire repositories to `connector`. Caller-scoped factories start from
    /// the anonymized store configuration; domains go through the service
    /// identity.
    pub fn new(config: ServerConfig, connector: Arc<dyn StoreConnector>) -> Self {
        let registry = Arc::new(kiln_resources::registry());
        let user = Arc::new(UnprivilegedClientFactory::new(
            &config.client_config(),
            Arc::clone(&registry),
            Arc::clone(&connector),
        ));
        let privileged = Arc::new(PrivilegedClientFactory::new(
            config.service_config(),
            registry,
            connector,
        ));

        let state = AppState {
            domains: Arc::new(DomainRepository::new(privileged)),
            packages: Arc::new(PackageRepository::new(user.clone())),
            routes: Arc::new(RouteRepository::new(user)),
            request_timeout: config.request_timeout(),
        };
        Self { config, state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Install the global subscriber at the configured `log_level`.
    pub fn init_tracing(&self) -> ServerResult<()> {
        telemetry::init_tracing(&self.config.log_level)
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "kiln server listening");
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
