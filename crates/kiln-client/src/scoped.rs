use std::fmt;
use std::time::Duration;

use kiln_resources::{decode_all, Object, ResourceSpec};
use kiln_store::{Patch, ResourceStore, StoreResult};

use crate::context::RequestContext;

/// A store client bound to one identity, with typed access by spec type.
///
/// Every call runs under the request's context, further limited by the
/// configured per-call timeout.
pub struct ScopedClient {
    store: Box<dyn ResourceStore>,
    timeout: Duration,
}

impl fmt::Debug for ScopedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedClient")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ScopedClient {
    pub fn new(store: Box<dyn ResourceStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    fn call_context(&self, ctx: &RequestContext) -> RequestContext {
        ctx.clone().with_timeout(self.timeout)
    }

    pub async fn get<S: ResourceSpec>(
        &self,
        ctx: &RequestContext,
        namespace: &str,
        name: &str,
    ) -> StoreResult<Object<S>> {
        let stored = self
            .call_context(ctx)
            .run(self.store.get(S::KIND, namespace, name))
            .await?;
        Object::from_stored(stored)
    }

    /// `None` lists across every namespace the caller can see.
    pub async fn list<S: ResourceSpec>(
        &self,
        ctx: &RequestContext,
        namespace: Option<&str>,
    ) -> StoreResult<Vec<Object<S>>> {
        let stored = self
            .call_context(ctx)
            .run(self.store.list(S::KIND, namespace))
            .await?;
        decode_all(stored)
    }

    pub async fn create<S: ResourceSpec>(
        &self,
        ctx: &RequestContext,
        object: Object<S>,
    ) -> StoreResult<Object<S>> {
        let stored = object.into_stored()?;
        let created = self.call_context(ctx).run(self.store.create(stored)).await?;
        Object::from_stored(created)
    }

    pub async fn patch<S: ResourceSpec>(
        &self,
        ctx: &RequestContext,
        namespace: &str,
        name: &str,
        patch: &Patch,
    ) -> StoreResult<Object<S>> {
        let patched = self
            .call_context(ctx)
            .run(self.store.patch(S::KIND, namespace, name, patch))
            .await?;
        Object::from_stored(patched)
    }

    pub async fn delete<S: ResourceSpec>(
        &self,
        ctx: &RequestContext,
        namespace: &str,
        name: &str,
    ) -> StoreResult<()> {
        self.call_context(ctx)
            .run(self.store.delete(S::KIND, namespace, name))
            .await
    }
}
