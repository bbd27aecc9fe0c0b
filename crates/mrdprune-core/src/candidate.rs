//! Candidate-for-deletion records

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gvr::GroupVersionResource;

/// A named object of a given kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceRef {
    pub gvr: GroupVersionResource,
    pub name: String,
}

impl ResourceRef {
    pub fn new(gvr: GroupVersionResource, name: impl Into<String>) -> Self {
        Self {
            gvr,
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.gvr.resource, self.name)
    }
}

/// An unused MRD paired with the CRD it owns
///
/// The MRD is deleted first, then the CRD.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeletionCandidate {
    pub mrd: ResourceRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crd: Option<ResourceRef>,
}

impl DeletionCandidate {
    /// Candidate for an MRD and the same-named CRD it owns
    pub fn paired(name: &str) -> Self {
        Self {
            mrd: ResourceRef::new(GroupVersionResource::managed_resource_definitions(), name),
            crd: Some(ResourceRef::new(
                GroupVersionResource::custom_resource_definitions(),
                name,
            )),
        }
    }

    /// MRD name, used as the display name of the candidate
    pub fn name(&self) -> &str {
        &self.mrd.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paired_candidate() {
        let candidate = DeletionCandidate::paired("widgets.example.org");

        assert_eq!(candidate.name(), "widgets.example.org");
        assert_eq!(
            candidate.mrd.gvr,
            GroupVersionResource::managed_resource_definitions()
        );
        let crd = candidate.crd.as_ref().unwrap();
        assert_eq!(crd.name, "widgets.example.org");
        assert_eq!(crd.gvr.resource, "customresourcedefinitions");
    }

    #[test]
    fn test_resource_ref_display() {
        let r = ResourceRef::new(
            GroupVersionResource::custom_resource_definitions(),
            "widgets.example.org",
        );
        assert_eq!(r.to_string(), "customresourcedefinitions/widgets.example.org");
    }
}
