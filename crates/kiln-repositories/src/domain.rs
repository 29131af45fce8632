use std::sync::Arc;

use kiln_client::{AuthInfo, ClientFactory, RequestContext, ScopedClient};
use kiln_resources::{CfDomainSpec, Object};

use crate::error::{Op, RepositoryResult};
use crate::filter::{matches_filter, sort_by_creation};
use crate::mapper::domain_record;
use crate::messages::{ListDomainsMessage, SortOrder};
use crate::records::DomainRecord;

const RESOURCE: &str = "Domain";

/// Read access to the platform's shared domains.
///
/// Domains are cluster-scoped. Deployments normally hand this repository the
/// privileged factory, since callers hold no store permissions on domains.
pub struct DomainRepository {
    factory: Arc<dyn ClientFactory>,
}

impl DomainRepository {
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self { factory }
    }

    fn client(&self, auth: &AuthInfo, op: &Op<'_>) -> RepositoryResult<ScopedClient> {
        self.factory
            .build_client(auth)
            .map_err(|e| op.client_error(e))
    }

    async fn list_sorted(
        &self,
        ctx: &RequestContext,
        auth: &AuthInfo,
        op: &Op<'_>,
    ) -> RepositoryResult<Vec<Object<CfDomainSpec>>> {
        let client = self.client(auth, op)?;
        let mut domains = client
            .list::<CfDomainSpec>(ctx, None)
            .await
            .map_err(|e| op.store_error(e))?;
        sort_by_creation(&mut domains, SortOrder::Ascending);
        Ok(domains)
    }

    pub async fn get_domain(
        &self,
        ctx: &RequestContext,
        auth: &AuthInfo,
        guid: &str,
    ) -> RepositoryResult<DomainRecord> {
        let op = Op::new("get domain", RESOURCE, guid);
        let client = self.client(auth, &op)?;
        let domain = client
            .get::<CfDomainSpec>(ctx, "", guid)
            .await
            .map_err(|e| op.store_error(e))?;
        Ok(domain_record(domain))
    }

    /// Domains whose name is in `message.names`, oldest first.
    pub async fn list_domains(
        &self,
        ctx: &RequestContext,
        auth: &AuthInfo,
        message: &ListDomainsMessage,
    ) -> RepositoryResult<Vec<DomainRecord>> {
        let op = Op::new("list domains", RESOURCE, "");
        let domains = self.list_sorted(ctx, auth, &op).await?;
        Ok(domains
            .into_iter()
            .filter(|d| matches_filter(&message.names, &d.spec.name))
            .map(domain_record)
            .collect())
    }

    pub async fn get_domain_by_name(
        &self,
        ctx: &RequestContext,
        auth: &AuthInfo,
        name: &str,
    ) -> RepositoryResult<DomainRecord> {
        let op = Op::new("get domain by name", RESOURCE, name);
        self.list_sorted(ctx, auth, &op)
            .await?
            .into_iter()
            .find(|d| d.spec.name == name)
            .map(domain_record)
            .ok_or_else(|| op.not_found())
    }

    /// The oldest domain.
    pub async fn get_default_domain(
        &self,
        ctx: &RequestContext,
        auth: &AuthInfo,
    ) -> RepositoryResult<DomainRecord> {
        let op = Op::new("get default domain", RESOURCE, "");
        self.list_sorted(ctx, auth, &op)
            .await?
            .into_iter()
            .next()
            .map(domain_record)
            .ok_or_else(|| op.not_found())
    }
}
