use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{FieldViolation, StoreError, StoreResult};
use crate::object::{ResourceKind, StoredObject};

/// Whether objects of a kind live inside a namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Namespaced,
    Cluster,
}

/// Validates a spec document, returning every offending field.
pub type SpecValidator = fn(&Value) -> Vec<FieldViolation>;

/// Derives the value that must be unique among objects of a kind within a
/// namespace. `None` opts the object out of the constraint.
pub type UniqueKey = fn(&Value) -> Option<String>;

/// Schema and REST-mapping metadata for one kind.
#[derive(Clone, Debug)]
pub struct KindSchema {
    pub kind: ResourceKind,
    pub scope: Scope,
    pub validator: Option<SpecValidator>,
    pub unique_key: Option<UniqueKey>,
}

impl KindSchema {
    pub fn namespaced(kind: ResourceKind) -> Self {
        Self {
            kind,
            scope: Scope::Namespaced,
            validator: None,
            unique_key: None,
        }
    }

    pub fn cluster(kind: ResourceKind) -> Self {
        Self {
            kind,
            scope: Scope::Cluster,
            validator: None,
            unique_key: None,
        }
    }

    pub fn with_validator(mut self, validator: SpecValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_unique_key(mut self, unique_key: UniqueKey) -> Self {
        self.unique_key = Some(unique_key);
        self
    }
}

/// The object-schema registry clients are constructed against.
///
/// Built once at startup and shared read-only behind an `Arc`.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    kinds: BTreeMap<ResourceKind, KindSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the schema for a kind.
    pub fn register(&mut self, schema: KindSchema) {
        self.kinds.insert(schema.kind, schema);
    }

    /// Builder-style [`Self::register`].
    pub fn with(mut self, schema: KindSchema) -> Self {
        self.register(schema);
        self
    }

    pub fn get(&self, kind: ResourceKind) -> Option<&KindSchema> {
        self.kinds.get(&kind)
    }

    /// Look up a kind, failing with a discovery error if it is unmapped.
    pub fn require(&self, kind: ResourceKind) -> StoreResult<&KindSchema> {
        self.get(kind)
            .ok_or_else(|| StoreError::Discovery(format!("no mapping registered for kind {kind}")))
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.kinds.keys().copied()
    }

    /// Run the kind's spec validator against an object.
    pub fn validate(&self, object: &StoredObject) -> StoreResult<()> {
        let schema = self.require(object.kind)?;
        let Some(validator) = schema.validator else {
            return Ok(());
        };
        let violations = validator(&object.spec);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Invalid {
                kind: object.kind,
                name: object.meta.name.clone(),
                violations,
            })
        }
    }

    /// The uniqueness key for an object, if its kind declares one.
    pub fn unique_key(&self, object: &StoredObject) -> StoreResult<Option<String>> {
        let schema = self.require(object.kind)?;
        Ok(schema.unique_key.and_then(|key| key(&object.spec)))
    }
}
