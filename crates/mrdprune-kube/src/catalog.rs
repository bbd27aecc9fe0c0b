//! Cluster snapshot: everything classification reads, fetched once
//!
//! Phases run in a fixed order (activation policies, MRDs, CRDs) and the
//! result is immutable for the rest of the run. A failed list or a record
//! that does not decode aborts the load: an incomplete picture must never
//! drive a deletion decision.

use tracing::info;

use mrdprune_core::{
    ActivationIndex, CrdIndex, GroupVersionResource, ManagedResourceActivationPolicy,
    ManagedResourceDefinition, total_versions,
};

use crate::accessor::ResourceAccessor;
use crate::error::Result;

/// Inputs to classification, fetched once per run
#[derive(Debug, Clone, Default)]
pub struct ClusterSnapshot {
    /// MRDs activated by any activation policy
    pub activation: ActivationIndex,
    /// Every MRD in the cluster
    pub mrds: Vec<ManagedResourceDefinition>,
    /// Every CRD in the cluster, by name
    pub crds: CrdIndex,
}

impl ClusterSnapshot {
    /// Declared MRD versions across the catalog
    pub fn total_versions(&self) -> usize {
        total_versions(&self.mrds)
    }
}

/// Build the activation index from every activation policy in the cluster
///
/// A policy that fails to decode fails the whole build.
pub async fn build_activation_index<A>(accessor: &A) -> Result<ActivationIndex>
where
    A: ResourceAccessor + ?Sized,
{
    let records = accessor
        .list(&GroupVersionResource::managed_resource_activation_policies())
        .await?;

    let policies = records
        .iter()
        .map(ManagedResourceActivationPolicy::decode)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let index = ActivationIndex::from_policies(&policies);
    info!(
        policies = policies.len(),
        activated = index.len(),
        "built activation index"
    );
    Ok(index)
}

/// List and decode every MRD in the cluster
pub async fn list_mrds<A>(accessor: &A) -> Result<Vec<ManagedResourceDefinition>>
where
    A: ResourceAccessor + ?Sized,
{
    let records = accessor
        .list(&GroupVersionResource::managed_resource_definitions())
        .await?;

    let mrds = records
        .iter()
        .map(ManagedResourceDefinition::decode)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    info!(mrds = mrds.len(), versions = total_versions(&mrds), "listed MRDs");
    Ok(mrds)
}

/// List every CRD in the cluster and index it by name
pub async fn list_crds<A>(accessor: &A) -> Result<CrdIndex>
where
    A: ResourceAccessor + ?Sized,
{
    let records = accessor
        .list(&GroupVersionResource::custom_resource_definitions())
        .await?;

    let index = CrdIndex::from_records(records);
    info!(crds = index.len(), "listed CRDs");
    Ok(index)
}

/// Fetch the activation index, MRD catalog and CRD catalog, in that order
pub async fn load_snapshot<A>(accessor: &A) -> Result<ClusterSnapshot>
where
    A: ResourceAccessor + ?Sized,
{
    info!("getting active MRDs from activation policies");
    let activation = build_activation_index(accessor).await?;

    info!("getting all MRDs in cluster");
    let mrds = list_mrds(accessor).await?;

    info!("getting all CRDs in cluster");
    let crds = list_crds(accessor).await?;

    Ok(ClusterSnapshot {
        activation,
        mrds,
        crds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockAccessor;
    use mrdprune_core::ResourceRecord;
    use serde_json::json;

    fn mrap(name: &str, activated: &[&str]) -> ResourceRecord {
        ResourceRecord::new(name, format!("{}-uid", name))
            .with_body(json!({"status": {"activated": activated}}))
    }

    fn mrd(name: &str) -> ResourceRecord {
        ResourceRecord::new(name, format!("{}-uid", name)).with_body(json!({
            "spec": {
                "group": "example.org",
                "names": {"plural": name.split('.').next().unwrap()},
                "versions": [{"name": "v1"}, {"name": "v2"}]
            }
        }))
    }

    #[tokio::test]
    async fn test_activation_index_unions_policies() {
        let mock = MockAccessor::new().with_resources(
            GroupVersionResource::managed_resource_activation_policies(),
            vec![
                mrap("first", &["a.example.org", "b.example.org"]),
                mrap("second", &["b.example.org"]),
            ],
        );

        let index = build_activation_index(&mock).await.unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.is_activated("a.example.org"));
    }

    #[tokio::test]
    async fn test_activation_index_without_policies() {
        let index = build_activation_index(&MockAccessor::new()).await.unwrap();
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_policy_is_fatal() {
        let mock = MockAccessor::new().with_resources(
            GroupVersionResource::managed_resource_activation_policies(),
            vec![
                mrap("good", &["a.example.org"]),
                ResourceRecord::new("bad", "bad-uid")
                    .with_body(json!({"status": {"activated": 42}})),
            ],
        );

        let err = build_activation_index(&mock).await.unwrap_err();
        assert!(err.is_conversion());
        assert!(err.to_string().contains("'bad'"));
    }

    #[tokio::test]
    async fn test_policy_list_failure_is_backend_error() {
        let mock = MockAccessor::new()
            .fail_list(GroupVersionResource::managed_resource_activation_policies());

        let err = build_activation_index(&mock).await.unwrap_err();
        assert!(err.is_backend());
    }

    #[tokio::test]
    async fn test_load_snapshot() {
        let mock = MockAccessor::new()
            .with_resources(
                GroupVersionResource::managed_resource_activation_policies(),
                vec![mrap("p", &["gadgets.example.org"])],
            )
            .with_resources(
                GroupVersionResource::managed_resource_definitions(),
                vec![mrd("widgets.example.org"), mrd("gadgets.example.org")],
            )
            .with_resources(
                GroupVersionResource::custom_resource_definitions(),
                vec![ResourceRecord::new("widgets.example.org", "crd-uid")],
            );

        let snapshot = load_snapshot(&mock).await.unwrap();

        assert_eq!(snapshot.mrds.len(), 2);
        assert_eq!(snapshot.total_versions(), 4);
        assert_eq!(snapshot.crds.len(), 1);
        assert!(snapshot.activation.is_activated("gadgets.example.org"));
        assert_eq!(mock.operation_counts().lists, 3);
    }

    #[tokio::test]
    async fn test_malformed_mrd_is_fatal() {
        let mock = MockAccessor::new().with_resources(
            GroupVersionResource::managed_resource_definitions(),
            vec![
                mrd("widgets.example.org"),
                ResourceRecord::new("broken.example.org", "uid"),
            ],
        );

        let err = load_snapshot(&mock).await.unwrap_err();
        assert!(err.is_conversion());
        assert!(err.to_string().contains("broken.example.org"));
    }

    #[tokio::test]
    async fn test_crd_list_failure_aborts_load() {
        let mock =
            MockAccessor::new().fail_list(GroupVersionResource::custom_resource_definitions());

        let err = load_snapshot(&mock).await.unwrap_err();
        assert!(err.is_backend());
        assert!(err.to_string().contains("customresourcedefinitions"));
    }
}
