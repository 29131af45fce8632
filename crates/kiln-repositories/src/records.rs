//! Read-optimized views of store objects, handed to the handler layer.
//!
//! A record's `guid` is its store object's name and `space_guid` its
//! namespace. Timestamps are rendered in the fixed format from
//! [`kiln_types::format_timestamp`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    pub name: String,
    pub guid: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub created_at: String,
    pub updated_at: String,
}

impl DomainRecord {
    /// A record carrying only the GUID, as embedded in a route.
    pub fn reference(guid: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageState {
    /// No source image has been recorded yet.
    AwaitingUpload,
    Ready,
}

impl PackageState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingUpload => "AWAITING_UPLOAD",
            Self::Ready => "READY",
        }
    }
}

impl fmt::Display for PackageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub guid: String,
    /// Store-assigned UID of the backing object.
    pub uid: String,
    pub package_type: String,
    pub app_guid: String,
    pub space_guid: String,
    pub state: PackageState,
    pub image_ref: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationRecord {
    pub guid: String,
    pub app_guid: String,
    pub process_type: String,
    pub port: i32,
    pub protocol: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub guid: String,
    pub space_guid: String,
    pub domain: DomainRecord,
    pub host: String,
    pub path: String,
    pub protocol: String,
    /// No two entries share (app GUID, process type, port, protocol).
    pub destinations: Vec<DestinationRecord>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub created_at: String,
    pub updated_at: String,
}
