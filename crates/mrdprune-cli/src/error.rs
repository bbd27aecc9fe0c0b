//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use miette::Diagnostic;
use mrdprune_kube::KubeError;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Contradictory or invalid flags, or unusable kubeconfig
    #[error("Configuration error: {message}")]
    #[diagnostic(code(mrdprune::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A list or delete call failed while building the usage picture
    #[error("Cluster error: {message}")]
    #[diagnostic(
        code(mrdprune::cli::backend),
        help("nothing was deleted; the scan aborts on the first failed call")
    )]
    Backend { message: String },

    /// A cluster record did not decode into its typed shape
    #[error("Malformed resource: {message}")]
    #[diagnostic(code(mrdprune::cli::conversion))]
    Conversion { message: String },

    /// At least one candidate failed to delete, fully or partially
    #[error("{failed} deletion(s) failed and {partial} completed partially")]
    #[diagnostic(
        code(mrdprune::cli::deletion),
        help("see the per-candidate lines above; completed steps were not undone")
    )]
    DeletionFailed { failed: usize, partial: usize },

    /// IO error (terminal, stdout)
    #[error("IO error: {message}")]
    #[diagnostic(code(mrdprune::cli::io))]
    Io { message: String },

    /// Wrapped error for passthrough (stores the formatted message)
    #[error("{message}")]
    #[diagnostic(code(mrdprune::cli::error))]
    Other { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::USAGE_ERROR,
            CliError::Backend { .. } => exit_codes::BACKEND_ERROR,
            CliError::Conversion { .. } => exit_codes::CONVERSION_ERROR,
            CliError::DeletionFailed { .. } => exit_codes::ERROR,
            CliError::Io { .. } => exit_codes::ERROR,
            CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    /// Create a configuration error with help text
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

impl From<KubeError> for CliError {
    fn from(err: KubeError) -> Self {
        let message = err.to_string();
        if err.is_config() {
            CliError::config_with_help(
                message,
                "check --kubeconfig, --context and --in-cluster, or KUBECONFIG",
            )
        } else if err.is_conversion() {
            CliError::Conversion { message }
        } else if err.is_backend() {
            CliError::Backend { message }
        } else {
            // Client construction failures
            CliError::Other { message }
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Other {
            message: format!("failed to serialize report: {}", err),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
