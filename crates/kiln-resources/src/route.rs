use kiln_store::{FieldViolation, KindSchema, ResourceKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::typed::{LocalObjectReference, ResourceSpec};

pub const CF_ROUTE: ResourceKind = ResourceKind::new("CFRoute");

/// Protocols a destination may speak.
pub const SUPPORTED_DESTINATION_PROTOCOLS: &[&str] = &["http1"];

/// Protocol recorded on new routes.
pub const DEFAULT_ROUTE_PROTOCOL: &str = "http";

/// A host/path under a domain, bound to zero or more app processes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfRouteSpec {
    pub host: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub protocol: String,
    pub domain_ref: LocalObjectReference,
    #[serde(default)]
    pub destinations: Vec<Destination>,
}

impl ResourceSpec for CfRouteSpec {
    const KIND: ResourceKind = CF_ROUTE;
}

/// One app process receiving traffic for a route.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub guid: String,
    pub port: i32,
    pub app_ref: LocalObjectReference,
    pub process_type: String,
    pub protocol: String,
}

fn validate(spec: &Value) -> Vec<FieldViolation> {
    let route: CfRouteSpec = match serde_json::from_value(spec.clone()) {
        Ok(route) => route,
        Err(e) => return vec![FieldViolation::new("spec", e.to_string())],
    };

    let mut violations = Vec::new();
    if route.host.is_empty() {
        violations.push(FieldViolation::new("spec.host", "Required value"));
    }
    if route.domain_ref.name.is_empty() {
        violations.push(FieldViolation::new("spec.domainRef.name", "Required value"));
    }
    for (i, dest) in route.destinations.iter().enumerate() {
        if !SUPPORTED_DESTINATION_PROTOCOLS.contains(&dest.protocol.as_str()) {
            let supported = SUPPORTED_DESTINATION_PROTOCOLS
                .iter()
                .map(|p| format!("{p:?}"))
                .collect::<Vec<_>>()
                .join(", ");
            violations.push(FieldViolation::new(
                format!("spec.destinations[{i}].protocol"),
                format!("Unsupported value: {:?}: supported values: {supported}", dest.protocol),
            ));
        }
        if !(1..=65535).contains(&dest.port) {
            violations.push(FieldViolation::new(
                format!("spec.destinations[{i}].port"),
                format!("Invalid value: {}: must be between 1 and 65535", dest.port),
            ));
        }
        if dest.app_ref.name.is_empty() {
            violations.push(FieldViolation::new(
                format!("spec.destinations[{i}].appRef.name"),
                "Required value",
            ));
        }
    }
    violations
}

/// Routes are unique per namespace by host, path and domain.
fn unique_key(spec: &Value) -> Option<String> {
    let host = spec.get("host")?.as_str()?.to_ascii_lowercase();
    let path = spec.get("path").and_then(Value::as_str).unwrap_or_default();
    let domain = spec.get("domainRef")?.get("name")?.as_str()?;
    Some(format!("{host}|{path}|{domain}"))
}

pub(crate) fn schema() -> KindSchema {
    KindSchema::namespaced(CF_ROUTE)
        .with_validator(validate)
        .with_unique_key(unique_key)
}
