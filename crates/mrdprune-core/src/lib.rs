//! mrdprune Core - domain types for finding unused Crossplane MRDs
//!
//! This crate provides:
//! - **Identities**: group-version-resource of every kind the tool touches
//! - **Records**: generic untyped resources as returned by the cluster backend
//! - **Typed entities**: ManagedResourceDefinitions and activation policies,
//!   decoded once at ingestion
//! - **Indices**: the activation index and the CRD-by-name index
//! - **Policy**: the pure classification of MRDs into in use, kept, or
//!   safe to delete

pub mod activation;
pub mod candidate;
pub mod crd;
pub mod error;
pub mod gvr;
pub mod mrd;
pub mod policy;
pub mod record;

pub use activation::{ActivationIndex, ManagedResourceActivationPolicy};
pub use candidate::{DeletionCandidate, ResourceRef};
pub use crd::CrdIndex;
pub use error::{CoreError, Result};
pub use gvr::GroupVersionResource;
pub use mrd::{ManagedResourceDefinition, MrdNames, MrdSpec, MrdVersion, total_versions};
pub use policy::{
    ClassificationReport, InstanceCount, MrdVerdict, UsageTable, Verdict, VersionKey, classify,
};
pub use record::{OwnerReference, ResourceRecord};
