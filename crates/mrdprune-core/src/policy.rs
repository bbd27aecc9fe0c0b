//! Unused-MRD classification policy
//!
//! Classification is a pure function of four inputs fetched once per run:
//! the MRD catalog, the live instance counts per MRD version, the activation
//! index and the CRD index. Nothing here talks to a cluster.
//!
//! An MRD becomes a deletion candidate only when all of these hold:
//!
//! 1. it declares at least one version,
//! 2. every declared version was scanned and has zero live instances,
//! 3. no activation policy lists it as activated,
//! 4. a CRD with the same name exists,
//! 5. that CRD's owner references include the MRD's UID.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::activation::ActivationIndex;
use crate::candidate::DeletionCandidate;
use crate::crd::CrdIndex;
use crate::mrd::{ManagedResourceDefinition, total_versions};

/// Key of one scanned MRD version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionKey {
    pub mrd: String,
    pub version: String,
}

impl VersionKey {
    pub fn new(mrd: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            mrd: mrd.into(),
            version: version.into(),
        }
    }
}

/// Live instances of one MRD version
///
/// Counting stops after one page, so a busy version may only report a
/// lower bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceCount {
    /// Instances seen
    pub seen: usize,
    /// Further instances exist beyond those seen
    pub more: bool,
}

impl InstanceCount {
    pub fn exact(seen: usize) -> Self {
        Self { seen, more: false }
    }

    /// No live instance at all
    pub fn is_zero(&self) -> bool {
        self.seen == 0 && !self.more
    }
}

impl fmt::Display for InstanceCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.more {
            write!(f, "at least {}", self.seen.max(1))
        } else {
            write!(f, "{}", self.seen)
        }
    }
}

/// Live instance counts per (MRD, version)
///
/// Only versions that were actually listed have an entry. The table does not
/// depend on the order results arrived in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageTable {
    counts: HashMap<VersionKey, InstanceCount>,
}

impl UsageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an exact count
    pub fn record(&mut self, mrd: impl Into<String>, version: impl Into<String>, count: usize) {
        self.record_count(mrd, version, InstanceCount::exact(count));
    }

    pub fn record_count(
        &mut self,
        mrd: impl Into<String>,
        version: impl Into<String>,
        count: InstanceCount,
    ) {
        self.counts.insert(VersionKey::new(mrd, version), count);
    }

    /// Instances seen for a version, if it was listed
    pub fn get(&self, mrd: &str, version: &str) -> Option<usize> {
        self.count(mrd, version).map(|c| c.seen)
    }

    pub fn count(&self, mrd: &str, version: &str) -> Option<InstanceCount> {
        // HashMap<VersionKey, _> can't be queried by borrowed parts
        self.counts.get(&VersionKey::new(mrd, version)).copied()
    }

    /// Number of versions that were listed
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Merge another table into this one
    pub fn extend(&mut self, other: UsageTable) {
        self.counts.extend(other.counts);
    }
}

impl FromIterator<(VersionKey, InstanceCount)> for UsageTable {
    fn from_iter<I: IntoIterator<Item = (VersionKey, InstanceCount)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

/// Outcome of classifying one MRD
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// At least one version has live instances
    InUse {
        version: String,
        instances: usize,
        /// `instances` is a lower bound
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        more: bool,
    },
    /// No declared versions, so there is no evidence of disuse
    NoVersions,
    /// A declared version has no scan result
    Unscanned { version: String },
    /// Unused, but listed by an activation policy
    Activated,
    /// Unused, but no CRD of the same name exists
    NoMatchingCrd,
    /// Unused, and a same-named CRD exists that this MRD does not own
    NotOwned,
    /// Safe to delete
    Unused { candidate: DeletionCandidate },
}

impl Verdict {
    pub fn is_candidate(&self) -> bool {
        matches!(self, Self::Unused { .. })
    }

    pub fn candidate(&self) -> Option<&DeletionCandidate> {
        match self {
            Self::Unused { candidate } => Some(candidate),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InUse {
                version,
                instances,
                more,
            } => {
                let count = InstanceCount {
                    seen: *instances,
                    more: *more,
                };
                write!(f, "in use ({} instance(s) of {})", count, version)
            }
            Self::NoVersions => write!(f, "no declared versions"),
            Self::Unscanned { version } => write!(f, "version {} was not scanned", version),
            Self::Activated => write!(f, "activated by policy"),
            Self::NoMatchingCrd => write!(f, "no matching CRD"),
            Self::NotOwned => write!(f, "CRD not owned by this MRD"),
            Self::Unused { .. } => write!(f, "unused"),
        }
    }
}

/// Classify a single MRD
pub fn classify(
    mrd: &ManagedResourceDefinition,
    usage: &UsageTable,
    activation: &ActivationIndex,
    crds: &CrdIndex,
) -> Verdict {
    if mrd.version_count() == 0 {
        return Verdict::NoVersions;
    }

    // Usage of any version keeps the whole type
    for version in mrd.version_names() {
        if let Some(count) = usage.count(&mrd.name, version).filter(|c| !c.is_zero()) {
            return Verdict::InUse {
                version: version.to_string(),
                instances: count.seen,
                more: count.more,
            };
        }
    }

    if let Some(version) = mrd
        .version_names()
        .find(|v| usage.get(&mrd.name, v).is_none())
    {
        return Verdict::Unscanned {
            version: version.to_string(),
        };
    }

    if activation.is_activated(&mrd.name) {
        return Verdict::Activated;
    }

    let Some(crd) = crds.get(&mrd.name) else {
        return Verdict::NoMatchingCrd;
    };

    if !crd.is_owned_by(&mrd.uid) {
        return Verdict::NotOwned;
    }

    Verdict::Unused {
        candidate: DeletionCandidate::paired(&mrd.name),
    }
}

/// Verdict for one MRD, by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrdVerdict {
    pub name: String,
    #[serde(flatten)]
    pub verdict: Verdict,
}

/// Classification of a whole MRD catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// One entry per MRD, sorted by name
    pub entries: Vec<MrdVerdict>,
    /// Declared MRD versions across the catalog
    pub total_versions: usize,
    /// MRD versions whose instances were listed
    pub queried_versions: usize,
}

impl ClassificationReport {
    /// Classify every MRD of a catalog
    pub fn build(
        mrds: &[ManagedResourceDefinition],
        usage: &UsageTable,
        activation: &ActivationIndex,
        crds: &CrdIndex,
    ) -> Self {
        let mut entries: Vec<MrdVerdict> = mrds
            .iter()
            .map(|mrd| MrdVerdict {
                name: mrd.name.clone(),
                verdict: classify(mrd, usage, activation, crds),
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            entries,
            total_versions: total_versions(mrds),
            queried_versions: usage.len(),
        }
    }

    /// Deletion candidates, sorted by MRD name
    pub fn candidates(&self) -> Vec<DeletionCandidate> {
        self.entries
            .iter()
            .filter_map(|e| e.verdict.candidate().cloned())
            .collect()
    }

    /// Number of MRDs selected for deletion
    pub fn selected(&self) -> usize {
        self.entries.iter().filter(|e| e.verdict.is_candidate()).count()
    }

    /// Number of classified MRDs
    pub fn total_mrds(&self) -> usize {
        self.entries.len()
    }

    /// Look up the verdict for an MRD
    pub fn verdict(&self, name: &str) -> Option<&Verdict> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{OwnerReference, ResourceRecord};
    use serde_json::json;

    const WIDGETS: &str = "widgets.example.org";

    fn mrd(name: &str, uid: &str, versions: &[&str]) -> ManagedResourceDefinition {
        let plural = name.split('.').next().unwrap_or(name);
        let versions: Vec<_> = versions.iter().map(|v| json!({"name": v})).collect();
        let record = ResourceRecord::new(name, uid).with_body(json!({
            "spec": {
                "group": "example.org",
                "names": {"plural": plural},
                "versions": versions
            }
        }));
        ManagedResourceDefinition::decode(&record).unwrap()
    }

    fn crd(name: &str, owner_uid: Option<&str>) -> ResourceRecord {
        let record = ResourceRecord::new(name, format!("{}-crd-uid", name));
        match owner_uid {
            Some(uid) => record.with_owner(OwnerReference {
                api_version: "apiextensions.crossplane.io/v1alpha1".to_string(),
                kind: "ManagedResourceDefinition".to_string(),
                name: name.to_string(),
                uid: uid.to_string(),
            }),
            None => record,
        }
    }

    fn empty_usage(mrd: &ManagedResourceDefinition) -> UsageTable {
        let mut usage = UsageTable::new();
        for v in mrd.version_names() {
            usage.record(&mrd.name, v, 0);
        }
        usage
    }

    #[test]
    fn test_unused_owned_crd_is_candidate() {
        let widgets = mrd(WIDGETS, "mrd-uid", &["v1"]);
        let crds = CrdIndex::from_records(vec![crd(WIDGETS, Some("mrd-uid"))]);

        let verdict = classify(&widgets, &empty_usage(&widgets), &ActivationIndex::new(), &crds);

        assert_eq!(
            verdict,
            Verdict::Unused {
                candidate: DeletionCandidate::paired(WIDGETS)
            }
        );
    }

    #[test]
    fn test_activated_is_kept() {
        let widgets = mrd(WIDGETS, "mrd-uid", &["v1"]);
        let crds = CrdIndex::from_records(vec![crd(WIDGETS, Some("mrd-uid"))]);
        let activation: ActivationIndex = [WIDGETS].into_iter().collect();

        let verdict = classify(&widgets, &empty_usage(&widgets), &activation, &crds);
        assert_eq!(verdict, Verdict::Activated);
    }

    #[test]
    fn test_any_version_in_use_excludes() {
        let widgets = mrd(WIDGETS, "mrd-uid", &["v1", "v2"]);
        let crds = CrdIndex::from_records(vec![crd(WIDGETS, Some("mrd-uid"))]);
        let mut usage = UsageTable::new();
        usage.record(WIDGETS, "v1", 0);
        usage.record(WIDGETS, "v2", 3);

        let verdict = classify(&widgets, &usage, &ActivationIndex::new(), &crds);
        assert_eq!(
            verdict,
            Verdict::InUse {
                version: "v2".to_string(),
                instances: 3,
                more: false
            }
        );
    }

    #[test]
    fn test_lower_bound_count_is_in_use() {
        let widgets = mrd(WIDGETS, "mrd-uid", &["v1"]);
        let mut usage = UsageTable::new();
        usage.record_count(WIDGETS, "v1", InstanceCount { seen: 500, more: true });

        let verdict = classify(&widgets, &usage, &ActivationIndex::new(), &CrdIndex::new());
        assert_eq!(verdict.to_string(), "in use (at least 500 instance(s) of v1)");

        // An empty first page that still has a continuation is not proof of disuse
        usage.record_count(WIDGETS, "v1", InstanceCount { seen: 0, more: true });
        let verdict = classify(&widgets, &usage, &ActivationIndex::new(), &CrdIndex::new());
        assert!(matches!(verdict, Verdict::InUse { more: true, .. }));
    }

    #[test]
    fn test_in_use_wins_over_activation() {
        let widgets = mrd(WIDGETS, "mrd-uid", &["v1"]);
        let mut usage = UsageTable::new();
        usage.record(WIDGETS, "v1", 1);
        let activation: ActivationIndex = [WIDGETS].into_iter().collect();

        let verdict = classify(&widgets, &usage, &activation, &CrdIndex::new());
        assert!(matches!(verdict, Verdict::InUse { .. }));
    }

    #[test]
    fn test_zero_versions_never_candidate() {
        let empty = mrd(WIDGETS, "mrd-uid", &[]);
        let crds = CrdIndex::from_records(vec![crd(WIDGETS, Some("mrd-uid"))]);

        let verdict = classify(&empty, &UsageTable::new(), &ActivationIndex::new(), &crds);
        assert_eq!(verdict, Verdict::NoVersions);
    }

    #[test]
    fn test_unscanned_version_excludes() {
        let widgets = mrd(WIDGETS, "mrd-uid", &["v1", "v2"]);
        let crds = CrdIndex::from_records(vec![crd(WIDGETS, Some("mrd-uid"))]);
        let mut usage = UsageTable::new();
        usage.record(WIDGETS, "v1", 0);

        let verdict = classify(&widgets, &usage, &ActivationIndex::new(), &crds);
        assert_eq!(
            verdict,
            Verdict::Unscanned {
                version: "v2".to_string()
            }
        );
    }

    #[test]
    fn test_missing_crd_is_not_actionable() {
        let widgets = mrd(WIDGETS, "mrd-uid", &["v1"]);

        let verdict = classify(
            &widgets,
            &empty_usage(&widgets),
            &ActivationIndex::new(),
            &CrdIndex::new(),
        );
        assert_eq!(verdict, Verdict::NoMatchingCrd);
    }

    #[test]
    fn test_name_collision_without_ownership() {
        let widgets = mrd(WIDGETS, "mrd-uid", &["v1"]);
        for owner in [None, Some("someone-else")] {
            let crds = CrdIndex::from_records(vec![crd(WIDGETS, owner)]);
            let usage = empty_usage(&widgets);
            let verdict = classify(&widgets, &usage, &ActivationIndex::new(), &crds);
            assert_eq!(verdict, Verdict::NotOwned);
        }
    }

    #[test]
    fn test_report_sorted_and_counts() {
        let widgets = mrd(WIDGETS, "w-uid", &["v1", "v2"]);
        let gadgets = mrd("gadgets.example.org", "g-uid", &["v1"]);
        let sprockets = mrd("sprockets.example.org", "s-uid", &["v1"]);

        let mut usage = empty_usage(&widgets);
        usage.extend(empty_usage(&gadgets));
        usage.record("sprockets.example.org", "v1", 2);

        let crds = CrdIndex::from_records(vec![
            crd(WIDGETS, Some("w-uid")),
            crd("gadgets.example.org", Some("g-uid")),
            crd("sprockets.example.org", Some("s-uid")),
        ]);

        let mrds = vec![widgets, sprockets, gadgets];
        let report = ClassificationReport::build(&mrds, &usage, &ActivationIndex::new(), &crds);

        assert_eq!(report.total_mrds(), 3);
        assert_eq!(report.total_versions, 4);
        assert_eq!(report.queried_versions, 4);
        assert_eq!(report.selected(), 2);
        assert_eq!(
            report
                .candidates()
                .iter()
                .map(|c| c.name().to_string())
                .collect::<Vec<_>>(),
            vec!["gadgets.example.org", WIDGETS]
        );
        assert!(matches!(
            report.verdict("sprockets.example.org"),
            Some(Verdict::InUse { .. })
        ));
    }

    #[test]
    fn test_report_is_idempotent() {
        let widgets = mrd(WIDGETS, "w-uid", &["v1"]);
        let gadgets = mrd("gadgets.example.org", "g-uid", &["v1"]);
        let mut usage = empty_usage(&widgets);
        usage.extend(empty_usage(&gadgets));
        let crds = CrdIndex::from_records(vec![
            crd(WIDGETS, Some("w-uid")),
            crd("gadgets.example.org", Some("g-uid")),
        ]);
        let activation = ActivationIndex::new();

        let first = ClassificationReport::build(
            &[widgets.clone(), gadgets.clone()],
            &usage,
            &activation,
            &crds,
        );
        let second = ClassificationReport::build(&[gadgets, widgets], &usage, &activation, &crds);

        assert_eq!(first, second);
    }

    #[test]
    fn test_verdict_json_shape() {
        let entry = MrdVerdict {
            name: WIDGETS.to_string(),
            verdict: Verdict::InUse {
                version: "v1".to_string(),
                instances: 2,
                more: false,
            },
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({"name": WIDGETS, "verdict": "in_use", "version": "v1", "instances": 2})
        );
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Activated.to_string(), "activated by policy");
        assert_eq!(
            Verdict::InUse {
                version: "v2".to_string(),
                instances: 3,
                more: false
            }
            .to_string(),
            "in use (3 instance(s) of v2)"
        );
    }
}
