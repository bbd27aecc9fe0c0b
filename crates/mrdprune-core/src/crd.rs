//! CustomResourceDefinition catalog indexed by name

use std::collections::HashMap;

use crate::record::ResourceRecord;

/// CRD records keyed by `metadata.name`
#[derive(Debug, Clone, Default)]
pub struct CrdIndex {
    by_name: HashMap<String, ResourceRecord>,
}

impl CrdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a list of CRD records. Names are unique in a cluster; if the
    /// input repeats one anyway, the last record wins.
    pub fn from_records(records: impl IntoIterator<Item = ResourceRecord>) -> Self {
        let by_name = records
            .into_iter()
            .map(|r| (r.name.clone(), r))
            .collect();
        Self { by_name }
    }

    pub fn get(&self, name: &str) -> Option<&ResourceRecord> {
        self.by_name.get(name)
    }

    /// Same-named CRD, only if it lists `owner_uid` among its owners
    pub fn owned_by(&self, name: &str, owner_uid: &str) -> Option<&ResourceRecord> {
        self.get(name).filter(|crd| crd.is_owned_by(owner_uid))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
