use kiln_store::{ObjectMeta, ResourceKind, StoreError, StoreResult, StoredObject};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A spec type bound to one store kind.
pub trait ResourceSpec: Serialize + DeserializeOwned + Clone + Send + Sync {
    const KIND: ResourceKind;
}

/// A by-name reference to another object in the same namespace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalObjectReference {
    pub name: String,
}

impl LocalObjectReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A store object with its spec decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct Object<S> {
    pub meta: ObjectMeta,
    pub spec: S,
}

impl<S: ResourceSpec> Object<S> {
    pub fn new(meta: ObjectMeta, spec: S) -> Self {
        Self { meta, spec }
    }

    /// Decode a stored object. A kind mismatch or malformed spec is a decode
    /// error: the store handed back something this kind cannot represent.
    pub fn from_stored(stored: StoredObject) -> StoreResult<Self> {
        if stored.kind != S::KIND {
            return Err(StoreError::Decode(format!(
                "expected {} but store returned {}",
                S::KIND,
                stored.kind
            )));
        }
        let spec = serde_json::from_value(stored.spec).map_err(|e| {
            StoreError::Decode(format!("{} {:?}: {e}", S::KIND, stored.meta.name))
        })?;
        Ok(Self {
            meta: stored.meta,
            spec,
        })
    }

    /// Encode into the store's untyped shape.
    pub fn into_stored(self) -> StoreResult<StoredObject> {
        let spec = serde_json::to_value(&self.spec)
            .map_err(|e| StoreError::Decode(format!("encode {}: {e}", S::KIND)))?;
        Ok(StoredObject {
            kind: S::KIND,
            meta: self.meta,
            spec,
            status: Value::Null,
        })
    }
}

/// Decode every object in a list, failing on the first malformed entry.
pub fn decode_all<S: ResourceSpec>(objects: Vec<StoredObject>) -> StoreResult<Vec<Object<S>>> {
    objects.into_iter().map(Object::from_stored).collect()
}
