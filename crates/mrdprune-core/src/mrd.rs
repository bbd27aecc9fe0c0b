//! Crossplane ManagedResourceDefinition

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::gvr::GroupVersionResource;
use crate::record::ResourceRecord;

const KIND: &str = "ManagedResourceDefinition";

/// Names block of an MRD spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MrdNames {
    pub plural: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singular: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// One declared version of the managed resource type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrdVersion {
    pub name: String,
    #[serde(default)]
    pub served: bool,
    #[serde(default)]
    pub storage: bool,
}

/// The parts of `spec` the classifier relies on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MrdSpec {
    #[serde(default)]
    pub group: String,
    pub names: MrdNames,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default)]
    pub versions: Vec<MrdVersion>,
    /// `Active` / `Inactive`. Informational only: activation is decided by
    /// activation policies, not by this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// A decoded ManagedResourceDefinition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedResourceDefinition {
    pub name: String,
    pub uid: String,
    pub spec: MrdSpec,
}

impl ManagedResourceDefinition {
    /// Decode a generic record into a typed MRD
    ///
    /// Any structural problem is an error: a malformed definition must not
    /// silently disappear from the usage picture.
    pub fn decode(record: &ResourceRecord) -> Result<Self> {
        let name = record.name.as_str();
        if name.is_empty() {
            return Err(CoreError::missing(KIND, "<unnamed>", "metadata.name"));
        }

        let uid = match record.uid.as_deref() {
            Some(uid) if !uid.is_empty() => uid.to_string(),
            _ => return Err(CoreError::missing(KIND, name, "metadata.uid")),
        };

        let raw_spec = record
            .field("spec")
            .filter(|s| !s.is_null())
            .ok_or_else(|| CoreError::missing(KIND, name, "spec"))?;

        let spec: MrdSpec = serde_json::from_value(raw_spec.clone())
            .map_err(|e| CoreError::conversion(KIND, name, e))?;

        if spec.group.is_empty() {
            return Err(CoreError::missing(KIND, name, "spec.group"));
        }
        if spec.names.plural.is_empty() {
            return Err(CoreError::missing(KIND, name, "spec.names.plural"));
        }
        if let Some(idx) = spec.versions.iter().position(|v| v.name.is_empty()) {
            return Err(CoreError::missing(
                KIND,
                name,
                format!("spec.versions[{}].name", idx),
            ));
        }

        Ok(Self {
            name: name.to_string(),
            uid,
            spec,
        })
    }

    /// Declared version names, in declaration order
    pub fn version_names(&self) -> impl Iterator<Item = &str> {
        self.spec.versions.iter().map(|v| v.name.as_str())
    }

    /// Number of declared versions
    pub fn version_count(&self) -> usize {
        self.spec.versions.len()
    }

    /// Resource kind identity for one version of this MRD
    pub fn gvr_for(&self, version: &str) -> GroupVersionResource {
        GroupVersionResource::new(&self.spec.group, version, &self.spec.names.plural)
    }

    /// One identity per declared version, in declaration order
    pub fn version_gvrs(&self) -> Vec<GroupVersionResource> {
        self.version_names().map(|v| self.gvr_for(v)).collect()
    }
}

/// Total declared versions across a catalog of MRDs
pub fn total_versions(mrds: &[ManagedResourceDefinition]) -> usize {
    mrds.iter().map(ManagedResourceDefinition::version_count).sum()
}
