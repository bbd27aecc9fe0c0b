//! Error types for mrdprune-kube

use thiserror::Error;

/// Result type for mrdprune-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors that can occur while scanning or pruning a cluster
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// Listing a resource kind failed
    #[error("failed to list {gvr}: {source}")]
    List {
        gvr: String,
        #[source]
        source: kube::Error,
    },

    /// Deleting a resource failed
    #[error("failed to delete {gvr} '{name}': {source}")]
    Delete {
        gvr: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    /// A record could not be interpreted as its typed shape
    #[error("conversion error: {0}")]
    Conversion(#[from] mrdprune_core::CoreError),

    /// Contradictory or invalid connection settings
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Kubeconfig could not be read or resolved
    #[error("kubeconfig error: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    /// No usable configuration could be inferred
    #[error("cannot infer cluster configuration: {0}")]
    InferConfig(#[from] kube::config::InferConfigError),

    /// In-cluster configuration unavailable
    #[error("in-cluster configuration error: {0}")]
    InCluster(#[from] kube::config::InClusterError),

    /// Kubernetes client construction failed
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),
}

impl KubeError {
    /// Whether this is a failed list or delete call against the API server
    pub fn is_backend(&self) -> bool {
        matches!(self, KubeError::List { .. } | KubeError::Delete { .. })
    }

    /// Whether this is a malformed record
    pub fn is_conversion(&self) -> bool {
        matches!(self, KubeError::Conversion(_))
    }

    /// Whether this is a configuration problem detected before any cluster call
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            KubeError::InvalidConfig(_)
                | KubeError::Kubeconfig(_)
                | KubeError::InferConfig(_)
                | KubeError::InCluster(_)
        )
    }

    /// Check if the underlying API response is 404 Not Found
    pub fn is_not_found(&self) -> bool {
        match self {
            KubeError::List { source, .. } | KubeError::Delete { source, .. } => {
                matches!(source, kube::Error::Api(resp) if resp.code == 404)
            }
            KubeError::Api(kube::Error::Api(resp)) => resp.code == 404,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: "boom".to_string(),
            reason: "InternalError".to_string(),
            code,
        })
    }

    #[test]
    fn test_list_error_display_names_kind() {
        let err = KubeError::List {
            gvr: "example.org/v1/widgets".to_string(),
            source: api_error(500),
        };

        assert!(err.is_backend());
        assert!(!err.is_not_found());
        assert!(err.to_string().starts_with("failed to list example.org/v1/widgets"));
    }

    #[test]
    fn test_delete_not_found() {
        let err = KubeError::Delete {
            gvr: "apiextensions.k8s.io/v1/customresourcedefinitions".to_string(),
            name: "widgets.example.org".to_string(),
            source: api_error(404),
        };

        assert!(err.is_backend());
        assert!(err.is_not_found());
        assert!(err.to_string().contains("'widgets.example.org'"));
    }

    #[test]
    fn test_config_classification() {
        let err = KubeError::InvalidConfig("qps must be positive".to_string());
        assert!(err.is_config());
        assert!(!err.is_backend());
        assert!(!err.is_conversion());
    }
}
