//! Pure conversions between store objects and platform records.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use kiln_resources::{
    CfDomainSpec, CfPackageSpec, CfRouteSpec, Destination, LocalObjectReference, Object,
    DEFAULT_ROUTE_PROTOCOL,
};
use kiln_store::ObjectMeta;
use kiln_types::format_timestamp;

use crate::messages::{CreatePackageMessage, CreateRouteMessage, DestinationMessage};
use crate::records::{DestinationRecord, DomainRecord, PackageRecord, PackageState, RouteRecord};

fn created_time(meta: &ObjectMeta) -> DateTime<Utc> {
    meta.creation_timestamp.unwrap_or_default()
}

/// The later of creation and last write, so it never precedes creation.
fn updated_time(meta: &ObjectMeta) -> DateTime<Utc> {
    let created = created_time(meta);
    meta.last_updated.map_or(created, |updated| updated.max(created))
}

fn timestamps(meta: &ObjectMeta) -> (String, String) {
    (
        format_timestamp(&created_time(meta)),
        format_timestamp(&updated_time(meta)),
    )
}

// ---------------------------------------------------------------------------
// Domains
// ---------------------------------------------------------------------------

pub fn domain_record(domain: Object<CfDomainSpec>) -> DomainRecord {
    let (created_at, updated_at) = timestamps(&domain.meta);
    DomainRecord {
        name: domain.spec.name,
        guid: domain.meta.name,
        labels: domain.meta.labels,
        annotations: domain.meta.annotations,
        created_at,
        updated_at,
    }
}

// ---------------------------------------------------------------------------
// Packages
// ---------------------------------------------------------------------------

pub fn package_state(spec: &CfPackageSpec) -> PackageState {
    if spec.source.registry.image.is_empty() {
        PackageState::AwaitingUpload
    } else {
        PackageState::Ready
    }
}

pub fn package_record(package: Object<CfPackageSpec>) -> PackageRecord {
    let (created_at, updated_at) = timestamps(&package.meta);
    let state = package_state(&package.spec);
    PackageRecord {
        guid: package.meta.name,
        uid: package.meta.uid,
        package_type: package.spec.package_type,
        app_guid: package.spec.app_ref.name,
        space_guid: package.meta.namespace,
        state,
        image_ref: package.spec.source.registry.image,
        created_at,
        updated_at,
    }
}

pub fn package_object(guid: String, message: &CreatePackageMessage) -> Object<CfPackageSpec> {
    let mut meta = ObjectMeta::new(guid, message.space_guid.clone());
    meta.owner_references.push(message.owner_ref.clone());
    Object::new(
        meta,
        CfPackageSpec {
            package_type: message.package_type.clone(),
            app_ref: LocalObjectReference::new(message.app_guid.clone()),
            source: Default::default(),
        },
    )
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

pub fn destination_record(destination: Destination) -> DestinationRecord {
    DestinationRecord {
        guid: destination.guid,
        app_guid: destination.app_ref.name,
        process_type: destination.process_type,
        port: destination.port,
        protocol: destination.protocol,
    }
}

pub fn route_record(route: Object<CfRouteSpec>) -> RouteRecord {
    let (created_at, updated_at) = timestamps(&route.meta);
    RouteRecord {
        guid: route.meta.name,
        space_guid: route.meta.namespace,
        domain: DomainRecord::reference(route.spec.domain_ref.name),
        host: route.spec.host,
        path: route.spec.path,
        protocol: route.spec.protocol,
        destinations: route
            .spec
            .destinations
            .into_iter()
            .map(destination_record)
            .collect(),
        labels: route.meta.labels,
        annotations: route.meta.annotations,
        created_at,
        updated_at,
    }
}

pub fn route_object(guid: String, message: &CreateRouteMessage) -> Object<CfRouteSpec> {
    let mut meta = ObjectMeta::new(guid, message.space_guid.clone());
    meta.labels = message.labels.clone();
    meta.annotations = message.annotations.clone();
    Object::new(
        meta,
        CfRouteSpec {
            host: message.host.clone(),
            path: message.path.clone(),
            protocol: DEFAULT_ROUTE_PROTOCOL.to_string(),
            domain_ref: LocalObjectReference::new(message.domain_guid.clone()),
            destinations: Vec::new(),
        },
    )
}

/// Whether `route` is the object `message` would create.
pub fn route_matches(route: &CfRouteSpec, message: &CreateRouteMessage) -> bool {
    route.host.eq_ignore_ascii_case(&message.host)
        && route.path == message.path
        && route.domain_ref.name == message.domain_guid
}

type DestinationKey<'a> = (&'a str, &'a str, i32, &'a str);

fn destination_key(d: &Destination) -> DestinationKey<'_> {
    (&d.app_ref.name, &d.process_type, d.port, &d.protocol)
}

fn message_key(d: &DestinationMessage) -> DestinationKey<'_> {
    (&d.app_guid, &d.process_type, d.port, &d.protocol)
}

/// Union `existing` with `requested`, keyed by app, process type, port and
/// protocol.
///
/// Existing entries keep their order and GUIDs. Requested entries whose key
/// is already present, or repeats an earlier requested entry, are dropped.
/// Each survivor gets a GUID from `new_guid`. Returns the merged set and the
/// number of entries added.
pub fn merge_destinations(
    existing: &[Destination],
    requested: &[DestinationMessage],
    mut new_guid: impl FnMut() -> String,
) -> (Vec<Destination>, usize) {
    let mut seen: HashSet<DestinationKey<'_>> = existing.iter().map(destination_key).collect();
    let mut merged = existing.to_vec();

    for message in requested {
        if !seen.insert(message_key(message)) {
            continue;
        }
        merged.push(Destination {
            guid: new_guid(),
            port: message.port,
            app_ref: LocalObjectReference::new(message.app_guid.clone()),
            process_type: message.process_type.clone(),
            protocol: message.protocol.clone(),
        });
    }

    let added = merged.len() - existing.len();
    (merged, added)
}
