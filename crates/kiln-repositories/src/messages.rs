//! Write- and query-intent values consumed by one repository call each.
//!
//! In every list message an empty filter means "no restriction".

use std::collections::BTreeMap;

use kiln_store::OwnerReference;

use crate::records::PackageState;

/// Direction for creation-time ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListDomainsMessage {
    pub names: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatePackageMessage {
    /// `bits` or `docker`.
    pub package_type: String,
    pub app_guid: String,
    pub space_guid: String,
    /// Owner recorded on the package, normally its app.
    pub owner_ref: OwnerReference,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListPackagesMessage {
    pub app_guids: Vec<String>,
    pub states: Vec<PackageState>,
    pub order: SortOrder,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdatePackageSourceMessage {
    pub guid: String,
    pub space_guid: String,
    pub image_ref: String,
    /// Pull secret for the image's registry, if it needs one.
    pub registry_secret_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListRoutesMessage {
    /// Matches routes with at least one destination for any of these apps.
    pub app_guids: Vec<String>,
    pub space_guids: Vec<String>,
    pub domain_guids: Vec<String>,
    pub hosts: Vec<String>,
    pub paths: Vec<String>,
    pub order: SortOrder,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateRouteMessage {
    pub host: String,
    pub path: String,
    pub space_guid: String,
    pub domain_guid: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DestinationMessage {
    pub app_guid: String,
    pub process_type: String,
    pub port: i32,
    pub protocol: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddDestinationsToRouteMessage {
    pub route_guid: String,
    pub space_guid: String,
    pub new_destinations: Vec<DestinationMessage>,
}
