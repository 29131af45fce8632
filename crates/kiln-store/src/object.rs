use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The kind of a store object, e.g. `CFRoute`.
///
/// Kinds are static names known to the [`SchemaRegistry`](crate::SchemaRegistry).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKind(&'static str);

impl ResourceKind {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl fmt::Debug for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceKind({})", self.0)
    }
}

/// A reference from an object to the object that owns it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub uid: String,
}

/// Metadata shared by every store object.
///
/// `uid`, `resource_version`, `creation_timestamp` and `last_updated` are
/// assigned by the store; values supplied on create are overwritten.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectMeta {
    /// Unique within `namespace` for a given kind.
    pub name: String,
    /// Empty for cluster-scoped kinds.
    pub namespace: String,
    pub uid: String,
    /// Opaque version token used for conditional writes.
    pub resource_version: String,
    pub creation_timestamp: Option<DateTime<Utc>>,
    /// Time of the most recent successful write after creation.
    pub last_updated: Option<DateTime<Utc>>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub owner_references: Vec<OwnerReference>,
}

impl ObjectMeta {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }
}

/// An object as held by the resource store.
///
/// `spec` is desired state written by Kiln; `status` is the last observed
/// outcome written by controllers. Both are kind-specific JSON documents.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredObject {
    pub kind: ResourceKind,
    pub meta: ObjectMeta,
    pub spec: Value,
    pub status: Value,
}

impl StoredObject {
    pub fn new(kind: ResourceKind, meta: ObjectMeta, spec: Value) -> Self {
        Self {
            kind,
            meta,
            spec,
            status: Value::Null,
        }
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn namespace(&self) -> &str {
        &self.meta.namespace
    }
}

/// A spec merge patch, optionally conditioned on the last observed version.
#[derive(Clone, Debug, PartialEq)]
pub struct Patch {
    /// RFC 7386 merge document applied to the object's spec.
    pub spec: Value,
    /// When set, the patch fails with `Conflict` unless the object's current
    /// resource version equals this value.
    pub expected_version: Option<String>,
}

impl Patch {
    /// An unconditional merge patch.
    pub fn merge(spec: Value) -> Self {
        Self {
            spec,
            expected_version: None,
        }
    }

    /// Condition the patch on the given resource version.
    pub fn with_expected_version(mut self, version: impl Into<String>) -> Self {
        self.expected_version = Some(version.into());
        self
    }
}

/// Apply an RFC 7386 JSON merge patch to `target` in place.
///
/// Objects merge key by key, `null` removes a key, and every other value
/// (arrays included) replaces the target wholesale.
pub fn apply_merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(target_map) = target {
        for (key, value) in patch_map {
            if value.is_null() {
                target_map.remove(key);
            } else {
                apply_merge_patch(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}
