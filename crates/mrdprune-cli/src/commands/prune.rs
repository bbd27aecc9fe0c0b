//! Prune command - find unused MRDs and optionally delete them

use serde::Serialize;
use std::io::{self, BufRead, Write};
use tracing::info;

use mrdprune_core::ClassificationReport;
use mrdprune_kube::{
    ConnectionConfig, DeletionOptions, DeletionOrchestrator, DeletionResult, KubeAccessor,
    ResourceAccessor, UsageClassifier, load_snapshot,
};

use crate::confirm::confirm;
use crate::display;
use crate::error::{CliError, Result};

/// Per-run settings that do not concern the connection
#[derive(Debug, Clone, Copy)]
pub struct PruneSettings {
    pub options: DeletionOptions,
    pub concurrency: usize,
    pub json: bool,
    pub verbose: bool,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    destructive: bool,
    dry_run: bool,
    confirmed: bool,
    classification: &'a ClassificationReport,
    deletions: &'a [DeletionResult],
}

/// Run the prune command against the configured cluster
pub async fn run(config: &ConnectionConfig, settings: &PruneSettings) -> Result<()> {
    config.validate()?;
    let accessor = KubeAccessor::connect(config).await?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    // Keep stdout parseable in JSON mode
    let mut prompt: Box<dyn Write> = if settings.json {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };

    execute(&accessor, settings, &mut input, &mut out, &mut prompt).await
}

/// Load, classify, confirm and delete
pub async fn execute<A, R, W, P>(
    accessor: &A,
    settings: &PruneSettings,
    input: &mut R,
    out: &mut W,
    prompt: &mut P,
) -> Result<()>
where
    A: ResourceAccessor + ?Sized,
    R: BufRead,
    W: Write,
    P: Write,
{
    let options = settings.options;

    let snapshot = load_snapshot(accessor).await?;
    info!("building overview of unused MRDs and CRDs, this may take some time");
    let report = UsageClassifier::new(accessor)
        .with_concurrency(settings.concurrency)
        .classify(&snapshot)
        .await?;

    if !settings.json {
        writeln!(out, "{}", display::format_candidates(&report))?;
        if settings.verbose {
            let kept = display::format_kept(&report);
            if !kept.is_empty() {
                writeln!(out, "Kept:\n{}", kept)?;
            }
        }
        writeln!(out, "{}", display::format_run_summary(&report, &options))?;
    }

    // Nothing to act on means nothing to confirm
    let confirmed = if options.needs_confirmation() && report.selected() > 0 {
        confirm("continue", input, prompt)?
    } else {
        true
    };

    if !confirmed {
        info!("deletion declined");
        if settings.json {
            write_json(out, &report, &options, false, &[])?;
        } else {
            writeln!(out, "Aborted, nothing was deleted")?;
        }
        return Ok(());
    }

    let summary = DeletionOrchestrator::new(accessor, options)
        .run(&report.candidates())
        .await;

    if settings.json {
        write_json(out, &report, &options, true, &summary.results)?;
    } else if summary.total() > 0 {
        for result in &summary.results {
            writeln!(out, "{}", display::format_outcome(result))?;
        }
        writeln!(out, "{}", display::format_deletion_summary(&summary))?;
    }

    if summary.is_success() {
        Ok(())
    } else {
        Err(CliError::DeletionFailed {
            failed: summary.failed(),
            partial: summary.partial(),
        })
    }
}

fn write_json<W: Write>(
    out: &mut W,
    report: &ClassificationReport,
    options: &DeletionOptions,
    confirmed: bool,
    deletions: &[DeletionResult],
) -> Result<()> {
    let doc = JsonOutput {
        destructive: options.destructive,
        dry_run: options.dry_run,
        confirmed,
        classification: report,
        deletions,
    };
    serde_json::to_writer_pretty(&mut *out, &doc)?;
    writeln!(out)?;
    Ok(())
}
