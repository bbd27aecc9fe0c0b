//! Display formatting for CLI output
//!
//! Every formatter returns a `String` so the output can be snapshot-tested;
//! callers decide where it is written.

use console::style;
use mrdprune_core::ClassificationReport;
use mrdprune_kube::{DeletionOptions, DeletionOutcome, DeletionResult, DeletionSummary};

/// Format count with proper pluralization
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// List of MRDs selected for deletion
pub fn format_candidates(report: &ClassificationReport) -> String {
    let candidates = report.candidates();
    if candidates.is_empty() {
        return format!("{} No unused MRDs found", style("✓").green());
    }

    let mut lines = vec![format!(
        "{} Unused MRDs and their CRDs marked for deletion:",
        style("→").blue().bold()
    )];
    for candidate in &candidates {
        lines.push(format!("  - {}", style(candidate.name()).cyan()));
    }
    lines.join("\n")
}

/// Why each MRD that was not selected is kept
pub fn format_kept(report: &ClassificationReport) -> String {
    report
        .entries
        .iter()
        .filter(|e| !e.verdict.is_candidate())
        .map(|e| format!("  {} {}: {}", style("·").dim(), e.name, style(&e.verdict).dim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run-level counts and the effective deletion mode
pub fn format_run_summary(report: &ClassificationReport, options: &DeletionOptions) -> String {
    let counts = format!(
        "total MRD versions: {} ({}), unused MRDs selected for deletion: {}",
        report.total_versions,
        pluralize(report.total_mrds(), "MRD", "MRDs"),
        style(report.selected()).bold()
    );

    let mode = if options.is_report_only() {
        "dry-run: false (report only, nothing will be deleted)".to_string()
    } else if options.dry_run {
        "dry-run: true (deletes are validated by the API server, nothing is removed)".to_string()
    } else {
        format!(
            "dry-run: false ({})",
            style("DESTRUCTIVE: selected MRDs and CRDs will be deleted")
                .red()
                .bold()
        )
    };

    format!("{}\n{}", counts, mode)
}

/// One line per processed candidate
pub fn format_outcome(result: &DeletionResult) -> String {
    let icon = match &result.outcome {
        DeletionOutcome::Deleted | DeletionOutcome::DryRunValidated => style("✓").green(),
        DeletionOutcome::Skipped => style("-").dim(),
        DeletionOutcome::Partial { .. } => style("⚠").yellow(),
        DeletionOutcome::Failed { .. } => style("✗").red(),
    };
    format!("{} {} {}", icon, style(&result.name).cyan(), result.outcome)
}

/// Final line of a deletion run
pub fn format_deletion_summary(summary: &DeletionSummary) -> String {
    if summary.is_success() {
        format!("{} Done: {}", style("✓").green().bold(), summary.summary())
    } else {
        format!("{} Done with errors: {}", style("✗").red().bold(), summary.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrdprune_core::{DeletionCandidate, MrdVerdict, Verdict};

    fn report() -> ClassificationReport {
        console::set_colors_enabled(false);
        ClassificationReport {
            entries: vec![
                MrdVerdict {
                    name: "buckets.example.org".to_string(),
                    verdict: Verdict::InUse {
                        version: "v1".to_string(),
                        instances: 2,
                        more: false,
                    },
                },
                MrdVerdict {
                    name: "queues.example.org".to_string(),
                    verdict: Verdict::Activated,
                },
                MrdVerdict {
                    name: "widgets.example.org".to_string(),
                    verdict: Verdict::Unused {
                        candidate: DeletionCandidate::paired("widgets.example.org"),
                    },
                },
            ],
            total_versions: 5,
            queried_versions: 4,
        }
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(1, "MRD", "MRDs"), "1 MRD");
        assert_eq!(pluralize(0, "MRD", "MRDs"), "0 MRDs");
    }

    #[test]
    fn test_candidates() {
        insta::assert_snapshot!(format_candidates(&report()), @r"
        → Unused MRDs and their CRDs marked for deletion:
          - widgets.example.org
        ");
    }

    #[test]
    fn test_no_candidates() {
        console::set_colors_enabled(false);
        let empty = ClassificationReport::default();
        assert_eq!(format_candidates(&empty), "✓ No unused MRDs found");
    }

    #[test]
    fn test_kept_reasons() {
        assert_eq!(
            format_kept(&report()),
            "  · buckets.example.org: in use (2 instance(s) of v1)\n  \
             · queues.example.org: activated by policy"
        );
    }

    #[test]
    fn test_run_summary_dry_run() {
        let options = DeletionOptions {
            destructive: true,
            dry_run: true,
        };
        insta::assert_snapshot!(format_run_summary(&report(), &options), @r"
        total MRD versions: 5 (3 MRDs), unused MRDs selected for deletion: 1
        dry-run: true (deletes are validated by the API server, nothing is removed)
        ");
    }

    #[test]
    fn test_run_summary_report_only() {
        let options = DeletionOptions {
            destructive: false,
            dry_run: false,
        };
        let text = format_run_summary(&report(), &options);
        assert!(text.ends_with("report only, nothing will be deleted)"));
    }

    #[test]
    fn test_outcome_lines() {
        console::set_colors_enabled(false);
        let partial = DeletionResult {
            name: "widgets.example.org".to_string(),
            outcome: DeletionOutcome::Partial {
                cause: "forbidden".to_string(),
            },
        };
        assert_eq!(
            format_outcome(&partial),
            "⚠ widgets.example.org partial (MRD step succeeded, CRD step failed): forbidden"
        );

        let deleted = DeletionResult {
            name: "widgets.example.org".to_string(),
            outcome: DeletionOutcome::Deleted,
        };
        assert_eq!(format_outcome(&deleted), "✓ widgets.example.org deleted");
    }

    #[test]
    fn test_deletion_summary_line() {
        console::set_colors_enabled(false);
        let summary = DeletionSummary {
            results: vec![DeletionResult {
                name: "a".to_string(),
                outcome: DeletionOutcome::DryRunValidated,
            }],
        };
        assert_eq!(
            format_deletion_summary(&summary),
            "✓ Done: 1 validated (dry-run)"
        );
    }
}
