//! Platform resource repositories for Kiln.
//!
//! Each repository translates platform operations on one resource into
//! calls against the resource store, made through a client scoped to the
//! caller. Every operation takes the request's [`RequestContext`], the
//! caller's [`AuthInfo`] and an operation-specific message, and returns a
//! record or a [`RepositoryError`] whose [`kind`](RepositoryError::kind) is
//! one of the closed [`ErrorKind`] set.
//!
//! - [`DomainRepository`] -- shared, cluster-scoped domains
//! - [`PackageRepository`] -- application source packages
//! - [`RouteRepository`] -- routes and their destinations
//!
//! Nothing is retried here. Creates are not idempotent unless wrapped in
//! [`RouteRepository::get_or_create_route`], so retry policy belongs to the
//! caller.
//!
//! [`RequestContext`]: kiln_client::RequestContext
//! [`AuthInfo`]: kiln_client::AuthInfo
//! [`ErrorKind`]: kiln_types::ErrorKind

pub mod domain;
pub mod error;
pub mod filter;
pub mod mapper;
pub mod messages;
pub mod package;
pub mod records;
pub mod route;

#[cfg(test)]
mod testing;

pub use domain::DomainRepository;
pub use error::{classify, ConflictReason, RepositoryError, RepositoryResult};
pub use messages::{
    AddDestinationsToRouteMessage, CreatePackageMessage, CreateRouteMessage, DestinationMessage,
    ListDomainsMessage, ListPackagesMessage, ListRoutesMessage, SortOrder,
    UpdatePackageSourceMessage,
};
pub use package::PackageRepository;
pub use records::{DestinationRecord, DomainRecord, PackageRecord, PackageState, RouteRecord};
pub use route::RouteRepository;
