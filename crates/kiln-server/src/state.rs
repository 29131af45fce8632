use std::sync::Arc;
use std::time::Duration;

use kiln_client::RequestContext;
use kiln_repositories::{DomainRepository, PackageRepository, RouteRepository};

/// Shared handler state. Repositories hold only factories and configuration,
/// so one instance serves every request.
#[derive(Clone)]
pub struct AppState {
    pub domains: Arc<DomainRepository>,
    pub packages: Arc<PackageRepository>,
    pub routes: Arc<RouteRepository>,
    pub request_timeout: Duration,
}

impl AppState {
    /// A fresh context for one inbound request.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::background().with_timeout(self.request_timeout)
    }
}
