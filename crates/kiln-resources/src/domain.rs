use kiln_store::{FieldViolation, KindSchema, ResourceKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::typed::ResourceSpec;

pub const CF_DOMAIN: ResourceKind = ResourceKind::new("CFDomain");

/// A DNS domain routes can be created under. Shared by all spaces.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfDomainSpec {
    pub name: String,
}

impl ResourceSpec for CfDomainSpec {
    const KIND: ResourceKind = CF_DOMAIN;
}

fn validate(spec: &Value) -> Vec<FieldViolation> {
    match spec.get("name").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => Vec::new(),
        _ => vec![FieldViolation::new("spec.name", "Required value")],
    }
}

pub(crate) fn schema() -> KindSchema {
    KindSchema::cluster(CF_DOMAIN).with_validator(validate)
}
