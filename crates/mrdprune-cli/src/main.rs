//! mrdprune CLI - find and remove unused Crossplane MRDs and their CRDs

use clap::{ArgAction, CommandFactory, Parser};
use std::path::PathBuf;
use std::time::Duration;

use mrdprune_kube::{
    ConnectionConfig, DEFAULT_BURST, DEFAULT_CONCURRENCY, DEFAULT_PAGE_SIZE, DEFAULT_QPS,
    DeletionOptions,
};

mod commands;
mod confirm;
mod display;
mod error;
mod exit_codes;

use commands::prune::PruneSettings;

#[derive(Parser)]
#[command(name = "mrdprune")]
#[command(version)]
#[command(
    about = "Find unused Crossplane ManagedResourceDefinitions and delete them with their CRDs",
    long_about = None
)]
#[command(after_help = "\
Running with the defaults (no --delete, --dry-run=true) does nothing and prints this help.
  Report only:          mrdprune --dry-run=false
  Validate deletions:   mrdprune --delete
  Delete:               mrdprune --delete --dry-run=false")]
struct Cli {
    /// DESTRUCTIVE: delete unused MRDs and the CRDs they own
    #[arg(
        long,
        action = ArgAction::Set,
        default_value_t = false,
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    delete: bool,

    /// Validate deletions on the API server without persisting them
    #[arg(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    dry_run: bool,

    /// Path to the kubeconfig file (otherwise KUBECONFIG or ~/.kube/config)
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, env = "MRDPRUNE_CONTEXT")]
    context: Option<String>,

    /// Use the pod's service account
    #[arg(long)]
    in_cluster: bool,

    /// Sustained API requests per second
    #[arg(long, env = "MRDPRUNE_QPS", default_value_t = DEFAULT_QPS)]
    qps: f32,

    /// API requests allowed above the sustained rate
    #[arg(long, env = "MRDPRUNE_BURST", default_value_t = DEFAULT_BURST)]
    burst: u32,

    /// MRDs scanned concurrently
    #[arg(long, env = "MRDPRUNE_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Items requested per list page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,

    /// Per-request read timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Print the classification and deletion results as JSON
    #[arg(long)]
    json: bool,

    /// Debug logging and the reason each MRD is kept
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn deletion_options(&self) -> DeletionOptions {
        DeletionOptions {
            destructive: self.delete,
            dry_run: self.dry_run,
        }
    }

    fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            kubeconfig: self.kubeconfig.clone(),
            context: self.context.clone(),
            in_cluster: self.in_cluster,
            qps: self.qps,
            burst: self.burst,
            concurrency: self.concurrency,
            page_size: self.page_size,
            timeout: self.timeout.map(Duration::from_secs),
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("info,mrdprune=debug,mrdprune_kube=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            std::process::exit(exit_codes::USAGE_ERROR);
        }
    };
    let options = cli.deletion_options();

    // Neither destructive nor report-only: refuse to do anything
    if options.is_noop() {
        if let Err(err) = Cli::command().print_help() {
            eprintln!("{}", err);
        }
        std::process::exit(exit_codes::SUCCESS);
    }

    init_tracing(cli.verbose);

    let settings = PruneSettings {
        options,
        concurrency: cli.concurrency,
        json: cli.json,
        verbose: cli.verbose,
    };

    let code = match commands::prune::run(&cli.connection_config(), &settings).await {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}
