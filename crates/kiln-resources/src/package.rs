use kiln_store::{FieldViolation, KindSchema, ResourceKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::typed::{LocalObjectReference, ResourceSpec};

pub const CF_PACKAGE: ResourceKind = ResourceKind::new("CFPackage");

pub const PACKAGE_TYPE_BITS: &str = "bits";
pub const PACKAGE_TYPE_DOCKER: &str = "docker";
const PACKAGE_TYPES: &[&str] = &[PACKAGE_TYPE_BITS, PACKAGE_TYPE_DOCKER];

/// Application source bits, uploaded as an image to a registry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfPackageSpec {
    #[serde(rename = "type")]
    pub package_type: String,
    pub app_ref: LocalObjectReference,
    #[serde(default)]
    pub source: PackageSource,
}

impl ResourceSpec for CfPackageSpec {
    const KIND: ResourceKind = CF_PACKAGE;
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSource {
    #[serde(default)]
    pub registry: Registry,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    /// Empty until source has been uploaded.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub image_pull_secrets: Vec<LocalObjectReference>,
}

fn validate(spec: &Value) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    match spec.get("type").and_then(Value::as_str) {
        Some(t) if PACKAGE_TYPES.contains(&t) => {}
        Some(t) => violations.push(FieldViolation::new(
            "spec.type",
            format!("Unsupported value: {t:?}: supported values: \"bits\", \"docker\""),
        )),
        None => violations.push(FieldViolation::new("spec.type", "Required value")),
    }
    let app = spec
        .get("appRef")
        .and_then(|r| r.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    if app.is_empty() {
        violations.push(FieldViolation::new("spec.appRef.name", "Required value"));
    }
    if violations.is_empty() {
        if let Err(e) = serde_json::from_value::<CfPackageSpec>(spec.clone()) {
            violations.push(FieldViolation::new("spec", e.to_string()));
        }
    }
    violations
}

pub(crate) fn schema() -> KindSchema {
    KindSchema::namespaced(CF_PACKAGE).with_validator(validate)
}
