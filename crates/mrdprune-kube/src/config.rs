//! Connection settings for the cluster backend
//!
//! The request-rate ceiling (QPS and burst) is a budget shared by every
//! concurrent lister; the scan concurrency only bounds how many MRDs are
//! examined at once.

use std::path::PathBuf;
use std::time::Duration;

use kube::config::{KubeConfigOptions, Kubeconfig};

use crate::error::{KubeError, Result};

/// Default sustained request rate
pub const DEFAULT_QPS: f32 = 80.0;

/// Lowest accepted sustained request rate
pub const MIN_QPS: f32 = 0.01;

/// Default request burst
pub const DEFAULT_BURST: u32 = 100;

/// Default number of MRDs scanned concurrently
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default page size for list calls
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// How to reach the cluster and how hard to push it
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Explicit kubeconfig path (otherwise `KUBECONFIG` / `~/.kube/config`)
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context (otherwise the current context)
    pub context: Option<String>,

    /// Use the pod's service account instead of a kubeconfig
    pub in_cluster: bool,

    /// Sustained requests per second
    pub qps: f32,

    /// Requests allowed above the sustained rate
    pub burst: u32,

    /// MRDs scanned concurrently
    pub concurrency: usize,

    /// Items requested per list page
    pub page_size: u32,

    /// Per-request read timeout
    pub timeout: Option<Duration>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            context: None,
            in_cluster: false,
            qps: DEFAULT_QPS,
            burst: DEFAULT_BURST,
            concurrency: DEFAULT_CONCURRENCY,
            page_size: DEFAULT_PAGE_SIZE,
            timeout: None,
        }
    }
}

impl ConnectionConfig {
    /// Use a specific kubeconfig file
    pub fn with_kubeconfig(mut self, path: impl Into<PathBuf>) -> Self {
        self.kubeconfig = Some(path.into());
        self
    }

    /// Use a specific kubeconfig context
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Set the request-rate ceiling
    pub fn with_rate_limit(mut self, qps: f32, burst: u32) -> Self {
        self.qps = qps;
        self.burst = burst;
        self
    }

    /// Reject contradictory or out-of-range settings
    ///
    /// Runs before any cluster call.
    pub fn validate(&self) -> Result<()> {
        if self.in_cluster && self.kubeconfig.is_some() {
            return Err(KubeError::InvalidConfig(
                "--in-cluster and --kubeconfig are mutually exclusive".to_string(),
            ));
        }
        if self.in_cluster && self.context.is_some() {
            return Err(KubeError::InvalidConfig(
                "--context has no meaning with --in-cluster".to_string(),
            ));
        }
        if let Some(path) = &self.kubeconfig
            && !path.is_file()
        {
            return Err(KubeError::InvalidConfig(format!(
                "kubeconfig '{}' does not exist",
                path.display()
            )));
        }
        if !self.qps.is_finite() || self.qps < MIN_QPS {
            return Err(KubeError::InvalidConfig(format!(
                "qps must be a positive number of at least {}, got {}",
                MIN_QPS, self.qps
            )));
        }
        if self.burst == 0 {
            return Err(KubeError::InvalidConfig(
                "burst must be at least 1".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(KubeError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(KubeError::InvalidConfig(
                "page size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve these settings into a kube client configuration
    pub async fn kube_config(&self) -> Result<kube::Config> {
        self.validate()?;

        let options = KubeConfigOptions {
            context: self.context.clone(),
            ..Default::default()
        };

        let mut config = if self.in_cluster {
            kube::Config::incluster()?
        } else if let Some(path) = &self.kubeconfig {
            let kubeconfig = Kubeconfig::read_from(path)?;
            kube::Config::from_custom_kubeconfig(kubeconfig, &options).await?
        } else if self.context.is_some() {
            kube::Config::from_kubeconfig(&options).await?
        } else {
            kube::Config::infer().await?
        };

        if let Some(timeout) = self.timeout {
            config.read_timeout = Some(timeout);
        }

        Ok(config)
    }
}
