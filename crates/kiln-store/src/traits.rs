use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::error::StoreResult;
use crate::object::{Patch, ResourceKind, StoredObject};
use crate::schema::SchemaRegistry;

/// A client handle to the resource store, bound to one identity.
///
/// Every call is authorized by the store against the identity the handle was
/// built with. Implementations must be thread-safe (`Send + Sync`), but a
/// handle built for one caller must never be used for another.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Read one object. Cluster-scoped kinds use an empty namespace.
    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> StoreResult<StoredObject>;

    /// List every object of a kind, optionally restricted to one namespace.
    ///
    /// No other server-side filtering is available.
    async fn list(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
    ) -> StoreResult<Vec<StoredObject>>;

    /// Persist a new object and return it with store-assigned metadata.
    async fn create(&self, object: StoredObject) -> StoreResult<StoredObject>;

    /// Merge a patch into an object's spec and return the updated object.
    async fn patch(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        patch: &Patch,
    ) -> StoreResult<StoredObject>;

    /// Remove an object.
    async fn delete(&self, kind: ResourceKind, namespace: &str, name: &str) -> StoreResult<()>;
}

/// Builds store clients from a connection configuration.
///
/// Construction resolves kinds against the schema registry. A failure here is
/// a transport or discovery problem, never an authentication one.
pub trait StoreConnector: Send + Sync {
    fn connect(
        &self,
        config: &ClientConfig,
        registry: Arc<SchemaRegistry>,
    ) -> StoreResult<Box<dyn ResourceStore>>;
}
