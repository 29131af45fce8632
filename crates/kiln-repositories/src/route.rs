use std::sync::Arc;

use kiln_client::{AuthInfo, ClientFactory, RequestContext, ScopedClient};
use kiln_resources::{CfRouteSpec, Object};
use kiln_store::Patch;
use kiln_types::Guid;
use serde_json::json;

use crate::error::{Op, RepositoryError, RepositoryResult};
use crate::filter::{matches_filter, sort_by_creation};
use crate::mapper::{merge_destinations, route_matches, route_object, route_record};
use crate::messages::{AddDestinationsToRouteMessage, CreateRouteMessage, ListRoutesMessage};
use crate::records::RouteRecord;

const RESOURCE: &str = "Route";

/// Routes and their destinations.
pub struct RouteRepository {
    factory: Arc<dyn ClientFactory>,
}

impl RouteRepository {
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self { factory }
    }

    fn client(&self, auth: &AuthInfo, op: &Op<'_>) -> RepositoryResult<ScopedClient> {
        self.factory
            .build_client(auth)
            .map_err(|e| op.client_error(e))
    }

    /// Look a route up by GUID across every space the caller can see.
    pub async fn get_route(
        &self,
        ctx: &RequestContext,
        auth: &AuthInfo,
        guid: &str,
    ) -> RepositoryResult<RouteRecord> {
        let op = Op::new("get route", RESOURCE, guid);
        let client = self.client(auth, &op)?;

        let mut matches: Vec<_> = client
            .list::<CfRouteSpec>(ctx, None)
            .await
            .map_err(|e| op.store_error(e))?
            .into_iter()
            .filter(|r| r.meta.name == guid)
            .collect();

        match matches.len() {
            0 => Err(op.not_found()),
            1 => Ok(route_record(matches.remove(0))),
            _ => Err(RepositoryError::DuplicateObject {
                resource: RESOURCE,
                guid: guid.to_string(),
            }),
        }
    }

    pub async fn list_routes(
        &self,
        ctx: &RequestContext,
        auth: &AuthInfo,
        message: &ListRoutesMessage,
    ) -> RepositoryResult<Vec<RouteRecord>> {
        let op = Op::new("list routes", RESOURCE, "");
        let client = self.client(auth, &op)?;

        let mut routes: Vec<_> = client
            .list::<CfRouteSpec>(ctx, None)
            .await
            .map_err(|e| op.store_error(e))?
            .into_iter()
            .filter(|r| {
                matches_filter(&message.space_guids, &r.meta.namespace)
                    && matches_filter(&message.domain_guids, &r.spec.domain_ref.name)
                    && matches_filter(&message.hosts, &r.spec.host)
                    && matches_filter(&message.paths, &r.spec.path)
                    && (message.app_guids.is_empty()
                        || r.spec
                            .destinations
                            .iter()
                            .any(|d| message.app_guids.contains(&d.app_ref.name)))
            })
            .collect();
        sort_by_creation(&mut routes, message.order);

        Ok(routes.into_iter().map(route_record).collect())
    }

    /// Routes in `space_guid` with at least one destination for the app.
    pub async fn list_routes_for_app(
        &self,
        ctx: &RequestContext,
        auth: &AuthInfo,
        app_guid: &str,
        space_guid: &str,
    ) -> RepositoryResult<Vec<RouteRecord>> {
        let op = Op::new("list routes for app", RESOURCE, app_guid);
        let client = self.client(auth, &op)?;

        let mut routes: Vec<_> = client
            .list::<CfRouteSpec>(ctx, Some(space_guid))
            .await
            .map_err(|e| op.store_error(e))?
            .into_iter()
            .filter(|r| r.spec.destinations.iter().any(|d| d.app_ref.name == app_guid))
            .collect();
        sort_by_creation(&mut routes, Default::default());

        Ok(routes.into_iter().map(route_record).collect())
    }

    pub async fn create_route(
        &self,
        ctx: &RequestContext,
        auth: &AuthInfo,
        message: &CreateRouteMessage,
    ) -> RepositoryResult<RouteRecord> {
        let guid = Guid::generate().into_string();
        let op = Op::new("create route", RESOURCE, &guid);
        let client = self.client(auth, &op)?;
        create(&client, ctx, &op, guid.clone(), message).await
    }

    /// Create the route, or return the existing one with the same host,
    /// path and domain in the space.
    ///
    /// Not atomic: two callers may both find the route absent and both
    /// create. The store's uniqueness constraint picks a winner and the loser
    /// re-fetches the winner's route. If the re-fetch finds nothing (the
    /// route was deleted in between) the create conflict is returned.
    pub async fn get_or_create_route(
        &self,
        ctx: &RequestContext,
        auth: &AuthInfo,
        message: &CreateRouteMessage,
    ) -> RepositoryResult<RouteRecord> {
        let guid = Guid::generate().into_string();
        let op = Op::new("get or create route", RESOURCE, &guid);
        let client = self.client(auth, &op)?;

        let err = match create(&client, ctx, &op, guid.clone(), message).await {
            Err(err) if err.is_already_exists() => err,
            result => return result,
        };

        let existing = client
            .list::<CfRouteSpec>(ctx, Some(&message.space_guid))
            .await
            .map_err(|e| op.store_error(e))?
            .into_iter()
            .find(|r| route_matches(&r.spec, message));

        match existing {
            Some(route) => {
                tracing::debug!(guid = %route.meta.name, "route already exists");
                Ok(route_record(route))
            }
            None => Err(err),
        }
    }

    /// Merge destinations into a route without duplicating any.
    ///
    /// The write is conditional on the version that was read, so a concurrent
    /// change to the route surfaces as a conflict. Adding only destinations
    /// that are already present succeeds without writing.
    pub async fn add_destinations_to_route(
        &self,
        ctx: &RequestContext,
        auth: &AuthInfo,
        message: &AddDestinationsToRouteMessage,
    ) -> RepositoryResult<RouteRecord> {
        let op = Op::new("add destinations to route", RESOURCE, &message.route_guid);
        let client = self.client(auth, &op)?;

        let current = client
            .get::<CfRouteSpec>(ctx, &message.space_guid, &message.route_guid)
            .await
            .map_err(|e| op.store_error(e))?;
        add_destinations(&client, ctx, &op, current, message).await
    }
}

async fn create(
    client: &ScopedClient,
    ctx: &RequestContext,
    op: &Op<'_>,
    guid: String,
    message: &CreateRouteMessage,
) -> RepositoryResult<RouteRecord> {
    let created = client
        .create(ctx, route_object(guid, message))
        .await
        .map_err(|e| op.store_error(e))?;
    tracing::debug!(guid = %created.meta.name, space = %created.meta.namespace, "created route");
    Ok(route_record(created))
}

async fn add_destinations(
    client: &ScopedClient,
    ctx: &RequestContext,
    op: &Op<'_>,
    current: Object<CfRouteSpec>,
    message: &AddDestinationsToRouteMessage,
) -> RepositoryResult<RouteRecord> {
    let (merged, added) = merge_destinations(
        &current.spec.destinations,
        &message.new_destinations,
        || Guid::generate().into_string(),
    );
    if added == 0 {
        return Ok(route_record(current));
    }

    let destinations = serde_json::to_value(&merged).map_err(|e| {
        tracing::error!(
            operation = op.operation,
            name = op.name,
            error = %e,
            "encode destinations"
        );
        RepositoryError::Unknown {
            operation: op.operation,
        }
    })?;
    let patch = Patch::merge(json!({ "destinations": destinations }))
        .with_expected_version(current.meta.resource_version.clone());

    let patched = client
        .patch::<CfRouteSpec>(ctx, &current.meta.namespace, &current.meta.name, &patch)
        .await
        .map_err(|e| op.store_error(e))?;
    tracing::debug!(guid = %patched.meta.name, added, "added destinations");
    Ok(route_record(patched))
}
