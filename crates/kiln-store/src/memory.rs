//! In-memory resource store for tests and embedding.
//!
//! [`InMemoryCluster`] holds every object in a `BTreeMap` behind a `RwLock`
//! and implements the same contract an external store offers: it
//! authenticates the credentials on each client, authorizes every call
//! against namespace role bindings, versions objects for conditional writes,
//! and validates specs through the [`SchemaRegistry`].

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::{ClientConfig, Credentials};
use crate::error::{FieldViolation, StoreError, StoreResult};
use crate::object::{apply_merge_patch, Patch, ResourceKind, StoredObject};
use crate::schema::{SchemaRegistry, Scope};
use crate::traits::{ResourceStore, StoreConnector};

const MODIFIED_MESSAGE: &str = "the object has been modified; please apply your changes \
                                to the latest version and try again";

/// Name the cluster gives to callers without credentials.
pub const ANONYMOUS_USER: &str = "system:anonymous";

/// A store operation subject to authorization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    List,
    Create,
    Patch,
    Delete,
}

impl Verb {
    pub const ALL: [Verb; 5] = [Verb::Get, Verb::List, Verb::Create, Verb::Patch, Verb::Delete];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::List => "list",
            Self::Create => "create",
            Self::Patch => "patch",
            Self::Delete => "delete",
        }
    }
}

/// Grants a user some verbs on some kinds, in one namespace or cluster-wide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleBinding {
    pub user: String,
    /// `None` grants cluster-wide, including cluster-scoped kinds.
    pub namespace: Option<String>,
    /// Empty means every kind.
    pub kinds: Vec<ResourceKind>,
    pub verbs: Vec<Verb>,
}

impl RoleBinding {
    /// Every verb on every kind inside one namespace.
    pub fn namespace_admin(user: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            namespace: Some(namespace.into()),
            kinds: Vec::new(),
            verbs: Verb::ALL.to_vec(),
        }
    }

    /// Every verb on every kind everywhere.
    pub fn cluster_admin(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            namespace: None,
            kinds: Vec::new(),
            verbs: Verb::ALL.to_vec(),
        }
    }

    /// `get` and `list` on every kind inside one namespace.
    pub fn namespace_reader(user: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            namespace: Some(namespace.into()),
            kinds: Vec::new(),
            verbs: vec![Verb::Get, Verb::List],
        }
    }

    /// Restrict the binding to the given kinds.
    pub fn for_kinds(mut self, kinds: &[ResourceKind]) -> Self {
        self.kinds = kinds.to_vec();
        self
    }

    fn grants(&self, user: &str, verb: Verb, kind: ResourceKind, namespace: &str) -> bool {
        self.user == user
            && self.verbs.contains(&verb)
            && (self.kinds.is_empty() || self.kinds.contains(&kind))
            && match &self.namespace {
                None => true,
                Some(ns) => !namespace.is_empty() && ns == namespace,
            }
    }
}

type ObjectKey = (ResourceKind, String, String);

struct ClusterState {
    endpoint: String,
    objects: RwLock<BTreeMap<ObjectKey, StoredObject>>,
    tokens: RwLock<HashMap<String, String>>,
    certificates: RwLock<HashMap<[u8; 32], String>>,
    bindings: RwLock<Vec<RoleBinding>>,
    next_version: AtomicU64,
    reachable: AtomicBool,
    connects: AtomicUsize,
    requests: AtomicUsize,
    clock: Box<dyn Clock>,
}

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|e| StoreError::Internal(format!("lock poisoned: {e}")))
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|e| StoreError::Internal(format!("lock poisoned: {e}")))
}

/// An in-memory, RBAC-enforcing resource store.
///
/// Cloning is cheap and every clone shares the same state. The cluster is
/// also a [`StoreConnector`]: clients built from it authenticate with the
/// credentials in their [`ClientConfig`].
#[derive(Clone)]
pub struct InMemoryCluster {
    state: Arc<ClusterState>,
}

impl InMemoryCluster {
    /// Create an empty cluster reachable at `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_clock(endpoint, SystemClock)
    }

    /// Create an empty cluster that stamps objects using `clock`.
    pub fn with_clock(endpoint: impl Into<String>, clock: impl Clock + 'static) -> Self {
        Self {
            state: Arc::new(ClusterState {
                endpoint: endpoint.into(),
                objects: RwLock::new(BTreeMap::new()),
                tokens: RwLock::new(HashMap::new()),
                certificates: RwLock::new(HashMap::new()),
                bindings: RwLock::new(Vec::new()),
                next_version: AtomicU64::new(1),
                reachable: AtomicBool::new(true),
                connects: AtomicUsize::new(0),
                requests: AtomicUsize::new(0),
                clock: Box::new(clock),
            }),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.state.endpoint
    }

    /// Accept `token` as a bearer credential for `user`.
    pub fn add_token(&self, token: impl Into<String>, user: impl Into<String>) -> StoreResult<()> {
        write(&self.state.tokens)?.insert(token.into(), user.into());
        Ok(())
    }

    /// Accept the DER certificate as a client credential for `user`.
    pub fn add_certificate(&self, cert_der: &[u8], user: impl Into<String>) -> StoreResult<()> {
        let fingerprint = *blake3::hash(cert_der).as_bytes();
        write(&self.state.certificates)?.insert(fingerprint, user.into());
        Ok(())
    }

    pub fn bind(&self, binding: RoleBinding) -> StoreResult<()> {
        write(&self.state.bindings)?.push(binding);
        Ok(())
    }

    /// Simulate the store going away (or coming back).
    pub fn set_reachable(&self, reachable: bool) {
        self.state.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Number of client constructions attempted against this cluster.
    pub fn connect_count(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    /// Number of store calls received from any client.
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// Number of objects of `kind` across all namespaces.
    pub fn object_count(&self, kind: ResourceKind) -> StoreResult<usize> {
        Ok(read(&self.state.objects)?
            .keys()
            .filter(|(k, _, _)| *k == kind)
            .count())
    }
}

impl StoreConnector for InMemoryCluster {
    fn connect(
        &self,
        config: &ClientConfig,
        registry: Arc<SchemaRegistry>,
    ) -> StoreResult<Box<dyn ResourceStore>> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);

        if !self.state.reachable.load(Ordering::SeqCst) || config.endpoint != self.state.endpoint {
            return Err(StoreError::Transport(format!(
                "dial {}: connection refused",
                config.endpoint
            )));
        }
        if registry.is_empty() {
            return Err(StoreError::Discovery(
                "schema registry has no kinds; cannot build REST mapping".into(),
            ));
        }

        Ok(Box::new(InMemoryStoreClient {
            state: Arc::clone(&self.state),
            credentials: config.credentials.clone(),
            registry,
        }))
    }
}

struct InMemoryStoreClient {
    state: Arc<ClusterState>,
    credentials: Credentials,
    registry: Arc<SchemaRegistry>,
}

impl InMemoryStoreClient {
    /// Count the request, check reachability, and resolve the caller.
    fn begin(&self) -> StoreResult<String> {
        self.state.requests.fetch_add(1, Ordering::SeqCst);
        if !self.state.reachable.load(Ordering::SeqCst) {
            return Err(StoreError::Transport(format!(
                "dial {}: connection refused",
                self.state.endpoint
            )));
        }

        match &self.credentials {
            Credentials::Anonymous => Ok(ANONYMOUS_USER.to_string()),
            Credentials::Bearer(token) => read(&self.state.tokens)?
                .get(token)
                .cloned()
                .ok_or_else(|| StoreError::Unauthorized("invalid bearer token".into())),
            Credentials::ClientCertificate { cert_der, .. } => {
                let fingerprint = *blake3::hash(cert_der).as_bytes();
                read(&self.state.certificates)?
                    .get(&fingerprint)
                    .cloned()
                    .ok_or_else(|| StoreError::Unauthorized("unknown client certificate".into()))
            }
        }
    }

    fn allowed(
        &self,
        user: &str,
        verb: Verb,
        kind: ResourceKind,
        namespace: &str,
    ) -> StoreResult<bool> {
        Ok(read(&self.state.bindings)?
            .iter()
            .any(|b| b.grants(user, verb, kind, namespace)))
    }

    fn authorize(
        &self,
        user: &str,
        verb: Verb,
        kind: ResourceKind,
        namespace: &str,
    ) -> StoreResult<()> {
        if self.allowed(user, verb, kind, namespace)? {
            Ok(())
        } else {
            Err(StoreError::Forbidden {
                user: user.to_string(),
                verb: verb.as_str().to_string(),
                kind,
                namespace: namespace.to_string(),
            })
        }
    }

    fn check_scope(&self, object: &StoredObject) -> StoreResult<()> {
        let scope = self.registry.require(object.kind)?.scope;
        match (scope, object.meta.namespace.is_empty()) {
            (Scope::Namespaced, true) => Err(StoreError::invalid(
                object.kind,
                &object.meta.name,
                FieldViolation::new(
                    "metadata.namespace",
                    "an empty namespace may not be set during creation",
                ),
            )),
            (Scope::Cluster, false) => Err(StoreError::invalid(
                object.kind,
                &object.meta.name,
                FieldViolation::new(
                    "metadata.namespace",
                    "cluster-scoped objects have no namespace",
                ),
            )),
            _ => Ok(()),
        }
    }

    /// Reject `object` if another object in its namespace shares its key.
    fn check_unique(
        &self,
        objects: &BTreeMap<ObjectKey, StoredObject>,
        object: &StoredObject,
    ) -> StoreResult<()> {
        let Some(key) = self.registry.unique_key(object)? else {
            return Ok(());
        };
        for other in objects.values() {
            if other.kind != object.kind
                || other.meta.namespace != object.meta.namespace
                || other.meta.name == object.meta.name
            {
                continue;
            }
            if self.registry.unique_key(other)?.as_deref() == Some(key.as_str()) {
                return Err(StoreError::AlreadyExists {
                    kind: object.kind,
                    name: object.meta.name.clone(),
                });
            }
        }
        Ok(())
    }

    fn now(&self) -> DateTime<Utc> {
        let now = self.state.clock.now();
        now.with_nanosecond(0).unwrap_or(now)
    }

    fn next_version(&self) -> String {
        self.state.next_version.fetch_add(1, Ordering::SeqCst).to_string()
    }
}

#[async_trait]
impl ResourceStore for InMemoryStoreClient {
    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> StoreResult<StoredObject> {
        let user = self.begin()?;
        self.registry.require(kind)?;
        self.authorize(&user, Verb::Get, kind, namespace)?;

        read(&self.state.objects)?
            .get(&(kind, namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind,
                name: name.to_string(),
            })
    }

    async fn list(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
    ) -> StoreResult<Vec<StoredObject>> {
        let user = self.begin()?;
        self.registry.require(kind)?;
        if let Some(ns) = namespace {
            self.authorize(&user, Verb::List, kind, ns)?;
        }

        let objects = read(&self.state.objects)?;
        let mut result = Vec::new();
        for ((k, ns, _), object) in objects.iter() {
            if *k != kind {
                continue;
            }
            let in_scope = match namespace {
                Some(wanted) => ns == wanted,
                // Cross-namespace lists only return what the caller may list.
                None => self.allowed(&user, Verb::List, kind, ns)?,
            };
            if in_scope {
                result.push(object.clone());
            }
        }
        Ok(result)
    }

    async fn create(&self, mut object: StoredObject) -> StoreResult<StoredObject> {
        let user = self.begin()?;
        self.check_scope(&object)?;
        if object.meta.name.is_empty() {
            return Err(StoreError::invalid(
                object.kind,
                "",
                FieldViolation::new("metadata.name", "name or generateName is required"),
            ));
        }
        self.authorize(&user, Verb::Create, object.kind, &object.meta.namespace)?;
        self.registry.validate(&object)?;

        let mut objects = write(&self.state.objects)?;
        let key = (
            object.kind,
            object.meta.namespace.clone(),
            object.meta.name.clone(),
        );
        if objects.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                kind: object.kind,
                name: object.meta.name.clone(),
            });
        }
        self.check_unique(&objects, &object)?;

        object.meta.uid = Uuid::new_v4().to_string();
        object.meta.resource_version = self.next_version();
        object.meta.creation_timestamp = Some(self.now());
        object.meta.last_updated = None;

        debug!(
            kind = %object.kind,
            namespace = %object.meta.namespace,
            name = %object.meta.name,
            "object created"
        );
        objects.insert(key, object.clone());
        Ok(object)
    }

    async fn patch(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        patch: &Patch,
    ) -> StoreResult<StoredObject> {
        let user = self.begin()?;
        self.registry.require(kind)?;
        self.authorize(&user, Verb::Patch, kind, namespace)?;

        let mut objects = write(&self.state.objects)?;
        let key = (kind, namespace.to_string(), name.to_string());
        let current = objects.get(&key).ok_or_else(|| StoreError::NotFound {
            kind,
            name: name.to_string(),
        })?;

        if let Some(expected) = &patch.expected_version {
            if *expected != current.meta.resource_version {
                return Err(StoreError::Conflict {
                    kind,
                    name: name.to_string(),
                    message: MODIFIED_MESSAGE.into(),
                });
            }
        }

        let mut updated = current.clone();
        apply_merge_patch(&mut updated.spec, &patch.spec);
        self.registry.validate(&updated)?;
        self.check_unique(&objects, &updated)?;

        updated.meta.resource_version = self.next_version();
        updated.meta.last_updated = Some(self.now());

        debug!(%kind, namespace, name, version = %updated.meta.resource_version, "object patched");
        objects.insert(key, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, kind: ResourceKind, namespace: &str, name: &str) -> StoreResult<()> {
        let user = self.begin()?;
        self.registry.require(kind)?;
        self.authorize(&user, Verb::Delete, kind, namespace)?;

        write(&self.state.objects)?
            .remove(&(kind, namespace.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                kind,
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SteppingClock;
    use crate::error::StatusReason;
    use crate::object::ObjectMeta;
    use crate::schema::KindSchema;
    use chrono::{Duration, TimeZone};
    use serde_json::{json, Value};

    const ENDPOINT: &str = "https://store.test:6443";
    const THING: ResourceKind = ResourceKind::new("Thing");
    const ZONE: ResourceKind = ResourceKind::new("Zone");

    fn port_is_positive(spec: &Value) -> Vec<FieldViolation> {
        match spec.get("port").and_then(Value::as_i64) {
            Some(p) if p <= 0 => vec![FieldViolation::new("spec.port", "must be positive")],
            _ => Vec::new(),
        }
    }

    fn host_key(spec: &Value) -> Option<String> {
        spec.get("host").and_then(Value::as_str).map(str::to_string)
    }

    fn registry() -> Arc<SchemaRegistry> {
        Arc::new(
            SchemaRegistry::new()
                .with(
                    KindSchema::namespaced(THING)
                        .with_validator(port_is_positive)
                        .with_unique_key(host_key),
                )
                .with(KindSchema::cluster(ZONE)),
        )
    }

    fn cluster() -> InMemoryCluster {
        let start = Utc.with_ymd_and_hms(2022, 3, 1, 12, 0, 0).unwrap();
        let clock = SteppingClock::new(start, Duration::seconds(1));
        let cluster = InMemoryCluster::with_clock(ENDPOINT, clock);
        cluster.add_token("admin-token", "admin").unwrap();
        cluster.add_token("alice-token", "alice").unwrap();
        cluster.bind(RoleBinding::cluster_admin("admin")).unwrap();
        cluster.bind(RoleBinding::namespace_admin("alice", "space-a")).unwrap();
        cluster
    }

    fn client(cluster: &InMemoryCluster, token: &str) -> Box<dyn ResourceStore> {
        let config =
            ClientConfig::new(ENDPOINT).with_credentials(Credentials::Bearer(token.into()));
        cluster.connect(&config, registry()).unwrap()
    }

    fn thing(name: &str, ns: &str, host: &str) -> StoredObject {
        StoredObject::new(THING, ObjectMeta::new(name, ns), json!({"host": host, "port": 8080}))
    }

    // ---- Test 1: create assigns store metadata ----
    #[tokio::test]
    async fn create_assigns_metadata() {
        let cluster = cluster();
        let admin = client(&cluster, "admin-token");
        let created = admin.create(thing("t1", "space-a", "h1")).await.unwrap();
        assert!(!created.meta.uid.is_empty());
        assert!(!created.meta.resource_version.is_empty());
        assert!(created.meta.creation_timestamp.is_some());
        assert!(created.meta.last_updated.is_none());
    }

    // ---- Test 2: empty namespace rejected for namespaced kinds ----
    #[tokio::test]
    async fn create_rejects_empty_namespace() {
        let cluster = cluster();
        let admin = client(&cluster, "admin-token");
        let err = admin.create(thing("t1", "", "h1")).await.unwrap_err();
        assert_eq!(err.reason(), StatusReason::Invalid);
        assert!(err.to_string().contains("an empty namespace may not be set during creation"));
    }

    // ---- Test 3: duplicate names and unique keys ----
    #[tokio::test]
    async fn create_enforces_name_and_key_uniqueness() {
        let cluster = cluster();
        let admin = client(&cluster, "admin-token");
        admin.create(thing("t1", "space-a", "h1")).await.unwrap();

        let same_name = admin.create(thing("t1", "space-a", "other")).await.unwrap_err();
        assert_eq!(same_name.reason(), StatusReason::AlreadyExists);

        let same_key = admin.create(thing("t2", "space-a", "h1")).await.unwrap_err();
        assert_eq!(same_key.reason(), StatusReason::AlreadyExists);

        // Same name and key in another namespace is fine.
        admin.create(thing("t1", "space-b", "h1")).await.unwrap();
    }

    // ---- Test 4: validator failures carry the field path ----
    #[tokio::test]
    async fn create_runs_validator() {
        let cluster = cluster();
        let admin = client(&cluster, "admin-token");
        let bad = StoredObject::new(
            THING,
            ObjectMeta::new("t", "space-a"),
            json!({"host": "h", "port": -1}),
        );
        let err = admin.create(bad).await.unwrap_err();
        assert_eq!(err.violations()[0].field, "spec.port");
    }

    // ---- Test 5: unknown tokens are unauthorized on every call ----
    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let cluster = cluster();
        let stranger = client(&cluster, "nope");
        let err = stranger.get(THING, "space-a", "t1").await.unwrap_err();
        assert_eq!(err.reason(), StatusReason::Unauthorized);
    }

    // ---- Test 6: bindings scope access to namespaces ----
    #[tokio::test]
    async fn namespace_bindings_are_enforced() {
        let cluster = cluster();
        let admin = client(&cluster, "admin-token");
        admin.create(thing("t1", "space-b", "h1")).await.unwrap();

        let alice = client(&cluster, "alice-token");
        let err = alice.get(THING, "space-b", "t1").await.unwrap_err();
        assert_eq!(err.reason(), StatusReason::Forbidden);

        let err = alice.create(thing("t2", "space-b", "h2")).await.unwrap_err();
        assert_eq!(err.reason(), StatusReason::Forbidden);

        alice.create(thing("t3", "space-a", "h3")).await.unwrap();
    }

    // ---- Test 7: cross-namespace list returns only listable namespaces ----
    #[tokio::test]
    async fn cross_namespace_list_is_authorization_filtered() {
        let cluster = cluster();
        let admin = client(&cluster, "admin-token");
        admin.create(thing("t1", "space-a", "h1")).await.unwrap();
        admin.create(thing("t2", "space-b", "h2")).await.unwrap();

        assert_eq!(admin.list(THING, None).await.unwrap().len(), 2);

        let alice = client(&cluster, "alice-token");
        let visible = alice.list(THING, None).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].meta.namespace, "space-a");

        let err = alice.list(THING, Some("space-b")).await.unwrap_err();
        assert_eq!(err.reason(), StatusReason::Forbidden);
    }

    // ---- Test 8: conditional patch detects concurrent modification ----
    #[tokio::test]
    async fn conditional_patch_conflicts_on_stale_version() {
        let cluster = cluster();
        let admin = client(&cluster, "admin-token");
        let created = admin.create(thing("t1", "space-a", "h1")).await.unwrap();
        let observed = created.meta.resource_version.clone();

        admin
            .patch(THING, "space-a", "t1", &Patch::merge(json!({"port": 9000})))
            .await
            .unwrap();

        let stale = Patch::merge(json!({"port": 9001})).with_expected_version(observed);
        let err = admin.patch(THING, "space-a", "t1", &stale).await.unwrap_err();
        assert_eq!(err.reason(), StatusReason::Conflict);
    }

    // ---- Test 9: patch bumps version and update time ----
    #[tokio::test]
    async fn patch_updates_version_and_timestamp() {
        let cluster = cluster();
        let admin = client(&cluster, "admin-token");
        let created = admin.create(thing("t1", "space-a", "h1")).await.unwrap();
        let patch = Patch::merge(json!({"port": 9000}))
            .with_expected_version(created.meta.resource_version.clone());
        let patched = admin.patch(THING, "space-a", "t1", &patch).await.unwrap();
        assert_ne!(patched.meta.resource_version, created.meta.resource_version);
        assert!(patched.meta.last_updated.unwrap() > created.meta.creation_timestamp.unwrap());
        assert_eq!(patched.spec["port"], 9000);
        assert_eq!(patched.spec["host"], "h1");
    }

    // ---- Test 10: cluster-scoped kinds need cluster-wide bindings ----
    #[tokio::test]
    async fn cluster_scoped_kinds() {
        let cluster = cluster();
        let admin = client(&cluster, "admin-token");
        admin
            .create(StoredObject::new(ZONE, ObjectMeta::new("z1", ""), json!({})))
            .await
            .unwrap();

        let alice = client(&cluster, "alice-token");
        let err = alice.get(ZONE, "", "z1").await.unwrap_err();
        assert_eq!(err.reason(), StatusReason::Forbidden);
        assert!(alice.list(ZONE, None).await.unwrap().is_empty());
    }

    // ---- Test 11: unreachable store ----
    #[tokio::test]
    async fn unreachable_cluster_fails_connect_and_calls() {
        let cluster = cluster();
        let admin = client(&cluster, "admin-token");
        cluster.set_reachable(false);

        let config = ClientConfig::new(ENDPOINT);
        assert!(matches!(
            cluster.connect(&config, registry()),
            Err(StoreError::Transport(_))
        ));
        let err = admin.list(THING, None).await.unwrap_err();
        assert_eq!(err.reason(), StatusReason::Unknown);
    }

    // ---- Test 12: empty registry is a discovery failure ----
    #[test]
    fn empty_registry_fails_connect() {
        let cluster = cluster();
        let result = cluster.connect(&ClientConfig::new(ENDPOINT), Arc::new(SchemaRegistry::new()));
        assert!(matches!(result, Err(StoreError::Discovery(_))));
        assert_eq!(cluster.connect_count(), 1);
    }

    // ---- Test 13: certificates authenticate by fingerprint ----
    #[tokio::test]
    async fn certificate_credentials() {
        let cluster = cluster();
        cluster.add_certificate(b"cert-bytes", "carol").unwrap();
        cluster.bind(RoleBinding::namespace_reader("carol", "space-a")).unwrap();

        let config = ClientConfig::new(ENDPOINT).with_credentials(Credentials::ClientCertificate {
            cert_der: b"cert-bytes".to_vec(),
            key_der: b"key-bytes".to_vec(),
        });
        let carol = cluster.connect(&config, registry()).unwrap();
        assert!(carol.list(THING, Some("space-a")).await.unwrap().is_empty());

        let err = carol.create(thing("t1", "space-a", "h")).await.unwrap_err();
        assert_eq!(err.reason(), StatusReason::Forbidden);
    }

    // ---- Test 14: delete ----
    #[tokio::test]
    async fn delete_removes_object() {
        let cluster = cluster();
        let admin = client(&cluster, "admin-token");
        admin.create(thing("t1", "space-a", "h1")).await.unwrap();
        admin.delete(THING, "space-a", "t1").await.unwrap();
        let err = admin.get(THING, "space-a", "t1").await.unwrap_err();
        assert_eq!(err.reason(), StatusReason::NotFound);
        assert_eq!(cluster.object_count(THING).unwrap(), 0);
    }
}
