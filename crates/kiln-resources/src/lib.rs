//! Typed store kinds for Kiln.
//!
//! The platform's resources are persisted as store objects of the kinds
//! defined here. Each module provides the kind constant, the serde shape of
//! its spec, and the [`KindSchema`](kiln_store::KindSchema) the store uses to
//! validate writes.
//!
//! - [`domain`] -- `CFDomain`, cluster-scoped
//! - [`route`] -- `CFRoute`, namespaced, unique by host/path/domain
//! - [`package`] -- `CFPackage`, namespaced

pub mod domain;
pub mod package;
pub mod route;
pub mod typed;

use kiln_store::SchemaRegistry;

pub use domain::{CfDomainSpec, CF_DOMAIN};
pub use package::{
    CfPackageSpec, PackageSource, Registry, CF_PACKAGE, PACKAGE_TYPE_BITS, PACKAGE_TYPE_DOCKER,
};
pub use route::{CfRouteSpec, Destination, CF_ROUTE, DEFAULT_ROUTE_PROTOCOL};
pub use typed::{decode_all, LocalObjectReference, Object, ResourceSpec};

/// API group/version stamped on owner references created by Kiln.
pub const API_VERSION: &str = "kiln.platform/v1alpha1";

/// The schema registry for every kind Kiln reads or writes.
pub fn registry() -> SchemaRegistry {
    SchemaRegistry::new()
        .with(domain::schema())
        .with(route::schema())
        .with(package::schema())
}
