//! Live usage scan and classification
//!
//! Listing instances of every MRD version is the dominant cost of a run.
//! Only the first page of each version is read, which is enough to tell
//! used from unused. MRDs are scanned concurrently, bounded by the
//! configured concurrency; the versions of one MRD are listed in declared
//! order and the scan of that MRD stops at the first version with live
//! instances.
//!
//! A failed list aborts the whole scan with that error. Outstanding lists
//! are dropped, and no partial usage table is ever classified.

use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info};

use mrdprune_core::{
    ClassificationReport, InstanceCount, ManagedResourceDefinition, UsageTable, VersionKey,
};

use crate::accessor::ResourceAccessor;
use crate::catalog::ClusterSnapshot;
use crate::config::DEFAULT_CONCURRENCY;
use crate::error::Result;

/// Instance counts for the listed versions of one MRD
async fn scan_mrd<A>(
    accessor: &A,
    mrd: &ManagedResourceDefinition,
) -> Result<Vec<(VersionKey, InstanceCount)>>
where
    A: ResourceAccessor + ?Sized,
{
    let mut counts = Vec::with_capacity(mrd.version_count());

    for version in mrd.version_names() {
        let gvr = mrd.gvr_for(version);
        let instances = accessor.count(&gvr).await?;
        debug!(mrd = %mrd.name, version, %instances, "listed instances");

        counts.push((VersionKey::new(&mrd.name, version), instances));
        if !instances.is_zero() {
            break;
        }
    }

    Ok(counts)
}

/// Count live instances of every MRD version
///
/// At most `concurrency` MRDs are in flight at once (a value of 0 is
/// treated as 1). The resulting table does not depend on completion order.
pub async fn scan_usage<A>(
    accessor: &A,
    mrds: &[ManagedResourceDefinition],
    concurrency: usize,
) -> Result<UsageTable>
where
    A: ResourceAccessor + ?Sized,
{
    let per_mrd: Vec<Vec<(VersionKey, InstanceCount)>> = stream::iter(mrds)
        .map(|mrd| scan_mrd(accessor, mrd))
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await?;

    let usage: UsageTable = per_mrd.into_iter().flatten().collect();
    info!(mrds = mrds.len(), queried = usage.len(), "usage scan complete");
    Ok(usage)
}

/// Scans a snapshot's MRDs and classifies each one
pub struct UsageClassifier<'a, A: ?Sized> {
    accessor: &'a A,
    concurrency: usize,
}

impl<'a, A> UsageClassifier<'a, A>
where
    A: ResourceAccessor + ?Sized,
{
    pub fn new(accessor: &'a A) -> Self {
        Self {
            accessor,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set the number of MRDs scanned concurrently
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Scan live usage, then classify every MRD of the snapshot
    pub async fn classify(&self, snapshot: &ClusterSnapshot) -> Result<ClassificationReport> {
        let usage = scan_usage(self.accessor, &snapshot.mrds, self.concurrency).await?;

        let report = ClassificationReport::build(
            &snapshot.mrds,
            &usage,
            &snapshot.activation,
            &snapshot.crds,
        );
        info!(
            mrds = report.total_mrds(),
            selected = report.selected(),
            "classification complete"
        );
        Ok(report)
    }
}
