//! Safety-gated deletion of unused MRD/CRD pairs
//!
//! Candidates are processed strictly one after another. For each one the
//! MRD is deleted first, then the CRD it owns, both with the same dry-run
//! flag. A failure is recorded against that candidate and the run moves on:
//! nothing is retried and a completed step is never undone.

use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

use mrdprune_core::DeletionCandidate;

use crate::accessor::ResourceAccessor;

/// Operator intent for the deletion phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionOptions {
    /// Issue delete calls at all
    pub destructive: bool,
    /// Ask the server to validate the deletes without persisting them
    pub dry_run: bool,
}

impl Default for DeletionOptions {
    fn default() -> Self {
        Self {
            destructive: false,
            dry_run: true,
        }
    }
}

impl DeletionOptions {
    /// Non-destructive with dry-run: does nothing useful
    pub fn is_noop(&self) -> bool {
        !self.destructive && self.dry_run
    }

    /// Non-destructive without dry-run: report only, no cluster writes
    pub fn is_report_only(&self) -> bool {
        !self.destructive && !self.dry_run
    }

    /// Whether the operator must confirm before the deletion phase
    pub fn needs_confirmation(&self) -> bool {
        self.destructive
    }
}

/// What happened to one candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeletionOutcome {
    /// Not attempted (non-destructive run)
    Skipped,
    /// MRD and CRD deleted
    Deleted,
    /// The server accepted both deletes in dry-run mode
    DryRunValidated,
    /// The MRD delete failed; the CRD was not attempted
    Failed { cause: String },
    /// The MRD step succeeded but the CRD step failed
    Partial { cause: String },
}

impl DeletionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Partial { .. })
    }
}

impl fmt::Display for DeletionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => write!(f, "skipped"),
            Self::Deleted => write!(f, "deleted"),
            Self::DryRunValidated => write!(f, "dry-run validated"),
            Self::Failed { cause } => write!(f, "failed: {}", cause),
            Self::Partial { cause } => {
                write!(f, "partial (MRD step succeeded, CRD step failed): {}", cause)
            }
        }
    }
}

/// Outcome for one candidate, by MRD name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionResult {
    pub name: String,
    #[serde(flatten)]
    pub outcome: DeletionOutcome,
}

/// Results of a deletion run
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeletionSummary {
    /// One result per candidate, in processing order
    pub results: Vec<DeletionResult>,
}

impl DeletionSummary {
    fn count(&self, pred: impl Fn(&DeletionOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn deleted(&self) -> usize {
        self.count(|o| *o == DeletionOutcome::Deleted)
    }

    pub fn validated(&self) -> usize {
        self.count(|o| *o == DeletionOutcome::DryRunValidated)
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| *o == DeletionOutcome::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DeletionOutcome::Failed { .. }))
    }

    pub fn partial(&self) -> usize {
        self.count(|o| matches!(o, DeletionOutcome::Partial { .. }))
    }

    /// Check if no candidate failed, fully or partially
    pub fn is_success(&self) -> bool {
        !self.results.iter().any(|r| r.outcome.is_failure())
    }

    /// Get total count
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Format as human-readable summary
    pub fn summary(&self) -> String {
        let counts = [
            (self.deleted(), "deleted"),
            (self.validated(), "validated (dry-run)"),
            (self.skipped(), "skipped"),
            (self.partial(), "partial"),
            (self.failed(), "failed"),
        ];
        let parts: Vec<String> = counts
            .iter()
            .filter(|(n, _)| *n > 0)
            .map(|(n, label)| format!("{} {}", n, label))
            .collect();

        if parts.is_empty() {
            "No candidates processed".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Executes deletions for classified candidates
pub struct DeletionOrchestrator<'a, A: ?Sized> {
    accessor: &'a A,
    options: DeletionOptions,
}

impl<'a, A> DeletionOrchestrator<'a, A>
where
    A: ResourceAccessor + ?Sized,
{
    pub fn new(accessor: &'a A, options: DeletionOptions) -> Self {
        Self { accessor, options }
    }

    /// Process every candidate in order
    pub async fn run(&self, candidates: &[DeletionCandidate]) -> DeletionSummary {
        let mut summary = DeletionSummary::default();

        for candidate in candidates {
            let outcome = self.process(candidate).await;
            match &outcome {
                DeletionOutcome::Failed { cause } | DeletionOutcome::Partial { cause } => {
                    warn!(mrd = candidate.name(), %cause, "deletion failed");
                }
                other => info!(mrd = candidate.name(), outcome = %other, "processed"),
            }
            summary.results.push(DeletionResult {
                name: candidate.name().to_string(),
                outcome,
            });
        }

        summary
    }

    async fn process(&self, candidate: &DeletionCandidate) -> DeletionOutcome {
        if !self.options.destructive {
            return DeletionOutcome::Skipped;
        }
        let dry_run = self.options.dry_run;

        let mrd = &candidate.mrd;
        if let Err(e) = self.accessor.delete(&mrd.gvr, &mrd.name, dry_run).await {
            return DeletionOutcome::Failed {
                cause: e.to_string(),
            };
        }

        if let Some(crd) = &candidate.crd
            && let Err(e) = self.accessor.delete(&crd.gvr, &crd.name, dry_run).await
        {
            // Garbage collection may remove the owned CRD before we get to it
            if !dry_run && e.is_not_found() {
                debug!(crd = %crd.name, "CRD already removed with its MRD");
            } else {
                return DeletionOutcome::Partial {
                    cause: e.to_string(),
                };
            }
        }

        if dry_run {
            DeletionOutcome::DryRunValidated
        } else {
            DeletionOutcome::Deleted
        }
    }
}
