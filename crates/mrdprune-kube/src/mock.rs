//! Mock resource accessor for testing
//!
//! This accessor serves resources from memory, useful for unit tests
//! without requiring a Kubernetes cluster. Failures can be injected per
//! kind (list) or per object (delete), and every delete call is recorded
//! in order.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use mrdprune_core::{GroupVersionResource, InstanceCount, ResourceRecord};

use crate::accessor::ResourceAccessor;
use crate::error::{KubeError, Result};

/// In-memory accessor for testing
#[derive(Clone, Default)]
pub struct MockAccessor {
    /// Storage: GVR -> records in list order
    store: Arc<RwLock<HashMap<GroupVersionResource, Vec<ResourceRecord>>>>,
    /// Kinds whose list call fails
    failing_lists: Arc<RwLock<HashSet<GroupVersionResource>>>,
    /// Objects whose delete call fails
    failing_deletes: Arc<RwLock<HashSet<(GroupVersionResource, String)>>>,
    /// Every delete call, in call order
    deletes: Arc<RwLock<Vec<DeleteCall>>>,
    /// Track operation counts for assertions
    operations: Arc<RwLock<OperationCounts>>,
    /// Largest page served by `count`
    page_size: Option<usize>,
}

/// One recorded delete call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteCall {
    pub gvr: GroupVersionResource,
    pub name: String,
    pub dry_run: bool,
}

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone)]
pub struct OperationCounts {
    pub lists: usize,
    pub deletes: usize,
    /// List calls per GVR
    pub lists_by_gvr: HashMap<GroupVersionResource, usize>,
}

impl MockAccessor {
    /// Create a new empty mock accessor
    pub fn new() -> Self {
        Self::default()
    }

    /// Add records of a kind (appends to existing ones)
    pub fn with_resources(
        self,
        gvr: GroupVersionResource,
        records: impl IntoIterator<Item = ResourceRecord>,
    ) -> Self {
        self.store
            .write()
            .unwrap()
            .entry(gvr)
            .or_default()
            .extend(records);
        self
    }

    /// Serve `count` one page of at most `size` records
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Make every list call for `gvr` fail
    pub fn fail_list(self, gvr: GroupVersionResource) -> Self {
        self.failing_lists.write().unwrap().insert(gvr);
        self
    }

    /// Make deleting `name` of kind `gvr` fail
    pub fn fail_delete(self, gvr: GroupVersionResource, name: impl Into<String>) -> Self {
        self.failing_deletes
            .write()
            .unwrap()
            .insert((gvr, name.into()));
        self
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().unwrap().clone()
    }

    /// List calls issued for one kind
    pub fn list_count(&self, gvr: &GroupVersionResource) -> usize {
        self.operations
            .read()
            .unwrap()
            .lists_by_gvr
            .get(gvr)
            .copied()
            .unwrap_or(0)
    }

    /// Delete calls in the order they were made
    pub fn delete_calls(&self) -> Vec<DeleteCall> {
        self.deletes.read().unwrap().clone()
    }

    /// Whether an object is still present
    pub fn contains(&self, gvr: &GroupVersionResource, name: &str) -> bool {
        self.store
            .read()
            .unwrap()
            .get(gvr)
            .is_some_and(|records| records.iter().any(|r| r.name == name))
    }
}

fn injected(status: &str, code: u16) -> kube::Error {
    kube::Error::Api(kube::core::ErrorResponse {
        status: "Failure".to_string(),
        message: format!("injected {} failure", status),
        reason: status.to_string(),
        code,
    })
}

#[async_trait]
impl ResourceAccessor for MockAccessor {
    async fn list(&self, gvr: &GroupVersionResource) -> Result<Vec<ResourceRecord>> {
        {
            let mut ops = self.operations.write().unwrap();
            ops.lists += 1;
            *ops.lists_by_gvr.entry(gvr.clone()).or_insert(0) += 1;
        }

        if self.failing_lists.read().unwrap().contains(gvr) {
            return Err(KubeError::List {
                gvr: gvr.to_string(),
                source: injected("InternalError", 500),
            });
        }

        let store = self.store.read().unwrap();
        Ok(store.get(gvr).cloned().unwrap_or_default())
    }

    async fn count(&self, gvr: &GroupVersionResource) -> Result<InstanceCount> {
        let total = self.list(gvr).await?.len();
        Ok(match self.page_size {
            Some(size) if total > size => InstanceCount {
                seen: size,
                more: true,
            },
            _ => InstanceCount::exact(total),
        })
    }

    async fn delete(&self, gvr: &GroupVersionResource, name: &str, dry_run: bool) -> Result<()> {
        {
            let mut ops = self.operations.write().unwrap();
            ops.deletes += 1;
        }
        self.deletes.write().unwrap().push(DeleteCall {
            gvr: gvr.clone(),
            name: name.to_string(),
            dry_run,
        });

        if self
            .failing_deletes
            .read()
            .unwrap()
            .contains(&(gvr.clone(), name.to_string()))
        {
            return Err(KubeError::Delete {
                gvr: gvr.to_string(),
                name: name.to_string(),
                source: injected("Forbidden", 403),
            });
        }

        let mut store = self.store.write().unwrap();
        let records = store.get_mut(gvr);
        let Some(records) = records.filter(|r| r.iter().any(|o| o.name == name)) else {
            return Err(KubeError::Delete {
                gvr: gvr.to_string(),
                name: name.to_string(),
                source: injected("NotFound", 404),
            });
        };

        if !dry_run {
            records.retain(|r| r.name != name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widgets() -> GroupVersionResource {
        GroupVersionResource::new("example.org", "v1", "widgets")
    }

    #[tokio::test]
    async fn test_list_and_counts() {
        let mock = MockAccessor::new().with_resources(
            widgets(),
            vec![ResourceRecord::new("a", "1"), ResourceRecord::new("b", "2")],
        );

        assert_eq!(mock.list(&widgets()).await.unwrap().len(), 2);
        assert!(
            mock.list(&GroupVersionResource::new("example.org", "v2", "widgets"))
                .await
                .unwrap()
                .is_empty()
        );

        let counts = mock.operation_counts();
        assert_eq!(counts.lists, 2);
        assert_eq!(mock.list_count(&widgets()), 1);
    }

    #[tokio::test]
    async fn test_count_stops_at_one_page() {
        let records = (0..5).map(|i| ResourceRecord::new(format!("w{}", i), format!("{}", i)));
        let mock = MockAccessor::new()
            .with_resources(widgets(), records)
            .with_page_size(2);

        let count = mock.count(&widgets()).await.unwrap();
        assert_eq!(count, InstanceCount { seen: 2, more: true });
        assert_eq!(mock.list_count(&widgets()), 1);
    }

    #[tokio::test]
    async fn test_injected_list_failure() {
        let mock = MockAccessor::new().fail_list(widgets());
        let err = mock.list(&widgets()).await.unwrap_err();
        assert!(err.is_backend());
        assert!(err.to_string().contains("example.org/v1/widgets"));
    }

    #[tokio::test]
    async fn test_dry_run_delete_keeps_object() {
        let mock =
            MockAccessor::new().with_resources(widgets(), vec![ResourceRecord::new("a", "1")]);

        mock.delete(&widgets(), "a", true).await.unwrap();
        assert!(mock.contains(&widgets(), "a"));

        mock.delete(&widgets(), "a", false).await.unwrap();
        assert!(!mock.contains(&widgets(), "a"));

        let calls = mock.delete_calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].dry_run);
        assert!(!calls[1].dry_run);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let mock = MockAccessor::new();
        let err = mock.delete(&widgets(), "ghost", false).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_injected_delete_failure() {
        let mock = MockAccessor::new()
            .with_resources(widgets(), vec![ResourceRecord::new("a", "1")])
            .fail_delete(widgets(), "a");

        assert!(mock.delete(&widgets(), "a", false).await.is_err());
        assert!(mock.contains(&widgets(), "a"));
        assert_eq!(mock.operation_counts().deletes, 1);
    }
}
