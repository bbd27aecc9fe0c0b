//! Group-version-resource identities

use serde::{Deserialize, Serialize};
use std::fmt;

/// API group of Crossplane's extension types (MRDs and activation policies)
pub const CROSSPLANE_APIEXTENSIONS_GROUP: &str = "apiextensions.crossplane.io";

/// API group of Kubernetes CustomResourceDefinitions
pub const K8S_APIEXTENSIONS_GROUP: &str = "apiextensions.k8s.io";

/// Identity of a queryable resource kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupVersionResource {
    /// API group (empty for the core group)
    pub group: String,
    /// API version
    pub version: String,
    /// Plural resource name as used in request paths
    pub resource: String,
}

impl GroupVersionResource {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            resource: resource.into(),
        }
    }

    /// `managedresourcedefinitions.apiextensions.crossplane.io/v1alpha1`
    pub fn managed_resource_definitions() -> Self {
        Self::new(
            CROSSPLANE_APIEXTENSIONS_GROUP,
            "v1alpha1",
            "managedresourcedefinitions",
        )
    }

    /// `managedresourceactivationpolicies.apiextensions.crossplane.io/v1alpha1`
    pub fn managed_resource_activation_policies() -> Self {
        Self::new(
            CROSSPLANE_APIEXTENSIONS_GROUP,
            "v1alpha1",
            "managedresourceactivationpolicies",
        )
    }

    /// `customresourcedefinitions.apiextensions.k8s.io/v1`
    pub fn custom_resource_definitions() -> Self {
        Self::new(K8S_APIEXTENSIONS_GROUP, "v1", "customresourcedefinitions")
    }

    /// `apiVersion` string for this identity (`group/version` or `version`)
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for GroupVersionResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api_version(), self.resource)
    }
}
