//! mrdprune Kube - cluster side of finding and pruning unused MRDs
//!
//! This crate provides:
//! - **Resource Accessor**: list and delete arbitrary kinds by group-version-resource,
//!   rate limited and paginated, with an in-memory mock for tests
//! - **Catalog Loading**: activation index, MRD catalog and CRD index, fetched once
//! - **Usage Scan**: bounded-concurrency instance counting with per-MRD short-circuit
//! - **Deletion Orchestrator**: sequential MRD-then-CRD deletion under dry-run gating

pub mod accessor;
pub mod catalog;
pub mod config;
pub mod deletion;
pub mod error;
pub mod mock;
pub mod rate_limit;
pub mod usage;

pub use accessor::{KubeAccessor, ResourceAccessor};
pub use catalog::{ClusterSnapshot, build_activation_index, list_crds, list_mrds, load_snapshot};
pub use config::{
    ConnectionConfig, DEFAULT_BURST, DEFAULT_CONCURRENCY, DEFAULT_PAGE_SIZE, DEFAULT_QPS, MIN_QPS,
};
pub use deletion::{
    DeletionOptions, DeletionOrchestrator, DeletionOutcome, DeletionResult, DeletionSummary,
};
pub use error::{KubeError, Result};
pub use mock::{DeleteCall, MockAccessor, OperationCounts};
pub use rate_limit::RateLimiter;
pub use usage::{UsageClassifier, scan_usage};
