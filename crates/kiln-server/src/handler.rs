use axum::extract::{Path, Query, State};
use axum::response::Json;
use kiln_repositories::{
    DomainRecord, ListDomainsMessage, ListRoutesMessage, PackageRecord, RouteRecord,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::AppState;

/// Health check handler.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn split(list: Option<String>) -> Vec<String> {
    list.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

fn resources<T: serde::Serialize>(records: Vec<T>) -> Json<Value> {
    Json(json!({ "resources": records }))
}

#[derive(Debug, Default, Deserialize)]
pub struct DomainQuery {
    names: Option<String>,
}

pub async fn list_domains(
    State(state): State<AppState>,
    Caller(auth): Caller,
    Query(query): Query<DomainQuery>,
) -> Result<Json<Value>, ApiError> {
    let message = ListDomainsMessage {
        names: split(query.names),
    };
    let records: Vec<DomainRecord> = state
        .domains
        .list_domains(&state.request_context(), &auth, &message)
        .await?;
    Ok(resources(records))
}

pub async fn get_package(
    State(state): State<AppState>,
    Caller(auth): Caller,
    Path(guid): Path<String>,
) -> Result<Json<PackageRecord>, ApiError> {
    let record = state
        .packages
        .get_package(&state.request_context(), &auth, &guid)
        .await?;
    Ok(Json(record))
}

pub async fn get_route(
    State(state): State<AppState>,
    Caller(auth): Caller,
    Path(guid): Path<String>,
) -> Result<Json<RouteRecord>, ApiError> {
    let record = state
        .routes
        .get_route(&state.request_context(), &auth, &guid)
        .await?;
    Ok(Json(record))
}

#[derive(Debug, Default, Deserialize)]
pub struct RouteQuery {
    app_guids: Option<String>,
    space_guids: Option<String>,
    domain_guids: Option<String>,
    hosts: Option<String>,
    paths: Option<String>,
}

pub async fn list_routes(
    State(state): State<AppState>,
    Caller(auth): Caller,
    Query(query): Query<RouteQuery>,
) -> Result<Json<Value>, ApiError> {
    let message = ListRoutesMessage {
        app_guids: split(query.app_guids),
        space_guids: split(query.space_guids),
        domain_guids: split(query.domain_guids),
        hosts: split(query.hosts),
        paths: split(query.paths),
        ..Default::default()
    };
    let records = state
        .routes
        .list_routes(&state.request_context(), &auth, &message)
        .await?;
    Ok(resources(records))
}
