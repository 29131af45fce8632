//! Shared fixtures for repository tests.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use kiln_client::{AuthInfo, ClientFactory, PrivilegedClientFactory, UnprivilegedClientFactory};
use kiln_resources::CF_DOMAIN;
use kiln_store::{ClientConfig, Credentials, InMemoryCluster, RoleBinding, SteppingClock};

pub const ENDPOINT: &str = "https://store.test:6443";
pub const SPACE: &str = "space-1";
pub const OTHER_SPACE: &str = "space-2";

pub struct Fixture {
    pub cluster: InMemoryCluster,
    pub user: Arc<dyn ClientFactory>,
    pub privileged: Arc<dyn ClientFactory>,
}

impl Fixture {
    /// A cluster whose clock advances one minute per write, with:
    /// `alice` admin of both spaces, `bob` with no bindings, and a service
    /// identity allowed to manage domains.
    pub fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let cluster =
            InMemoryCluster::with_clock(ENDPOINT, SteppingClock::new(start, Duration::minutes(1)));
        cluster.add_token("alice-token", "alice").unwrap();
        cluster.add_token("bob-token", "bob").unwrap();
        cluster.add_token("svc-token", "kiln").unwrap();
        cluster.bind(RoleBinding::namespace_admin("alice", SPACE)).unwrap();
        cluster.bind(RoleBinding::namespace_admin("alice", OTHER_SPACE)).unwrap();
        cluster
            .bind(RoleBinding::cluster_admin("kiln").for_kinds(&[CF_DOMAIN]))
            .unwrap();

        let registry = Arc::new(kiln_resources::registry());
        let base = ClientConfig::new(ENDPOINT);
        let user = UnprivilegedClientFactory::new(
            &base,
            Arc::clone(&registry),
            Arc::new(cluster.clone()),
        );
        let privileged = PrivilegedClientFactory::new(
            base.with_credentials(Credentials::Bearer("svc-token".into())),
            registry,
            Arc::new(cluster.clone()),
        );

        Self {
            cluster,
            user: Arc::new(user),
            privileged: Arc::new(privileged),
        }
    }
}

pub fn alice() -> AuthInfo {
    AuthInfo::bearer("alice-token")
}

pub fn bob() -> AuthInfo {
    AuthInfo::bearer("bob-token")
}
