//! Error types for the deployer

use crate::platform::ResourceRef;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the deployer
pub type Result<T> = std::result::Result<T, DeployError>;

/// Main error type for the deployer
#[derive(Error, Debug)]
pub enum DeployError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required local file or directory is missing
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Object storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Image catalog lookup errors
    #[error("Image catalog error: {0}")]
    Catalog(String),

    /// Request signing errors
    #[error("Signing error: {0}")]
    Signing(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Error reported by a hosting platform API
    #[error("{operation} failed with HTTP {status} ({code}): {message}")]
    Api {
        operation: String,
        status: u16,
        code: String,
        message: String,
    },

    /// The endpoint reached a terminal state other than InService
    #[error("Endpoint {endpoint} failed to provision (status {status}): {reason}")]
    Provisioning {
        endpoint: String,
        status: String,
        reason: String,
    },

    /// The endpoint answered the test request with an unusable response
    #[error("Invocation of endpoint {endpoint} failed: {message}")]
    Inference { endpoint: String, message: String },

    /// A deletion failed; cleanup stopped there
    #[error(
        "Teardown stopped while deleting {failed}: {source}. Still running: {}",
        format_resources(.remaining)
    )]
    Teardown {
        failed: ResourceRef,
        remaining: Vec<ResourceRef>,
        #[source]
        source: Box<DeployError>,
    },

    /// A step failed after billable resources were created
    #[error(
        "{source}\nThe following resources were left running and keep incurring cost: {}\nRemove them with `deploy-endpoint teardown --endpoint-name <name>` or delete them manually.",
        format_resources(.resources)
    )]
    ResourcesLeftRunning {
        resources: Vec<ResourceRef>,
        #[source]
        source: Box<DeployError>,
    },
}

fn format_resources(resources: &[ResourceRef]) -> String {
    if resources.is_empty() {
        return "none".to_string();
    }
    resources
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
