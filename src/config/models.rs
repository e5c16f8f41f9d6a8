//! Configuration models
//!
//! Defaults describe the standard Prophet CPI deployment on the PyTorch 2.1.0
//! serving image with one `ml.m5.large` instance.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::PathBuf;

/// Top-level deployment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DeployConfig {
    pub artifact: ArtifactConfig,
    pub inference_code: InferenceCodeConfig,
    pub image: ImageConfig,
    pub endpoint: EndpointSettings,
    pub validation: ValidationConfig,
    pub aws: AwsConfig,
}

/// Packaged model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Local path of the packaged model
    pub path: PathBuf,
    /// Object key prefix the artifact is uploaded under
    pub key_prefix: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("prophet-model.tar.gz"),
            key_prefix: "prophet-cpi/model".to_string(),
        }
    }
}

/// Inference entry-point code shipped with the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceCodeConfig {
    pub source_dir: PathBuf,
    /// Script inside `source_dir` the serving container runs
    pub entry_point: String,
}

impl Default for InferenceCodeConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("sagemaker_prophet_inference"),
            entry_point: "inference.py".to_string(),
        }
    }
}

/// Serving image lookup key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub framework: String,
    pub version: String,
    pub py_version: String,
    pub image_scope: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            framework: "pytorch".to_string(),
            version: "2.1.0".to_string(),
            py_version: "py310".to_string(),
            image_scope: "inference".to_string(),
        }
    }
}

/// Hosted endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    /// Endpoint names are `<name_prefix>-<unix seconds>`
    pub name_prefix: String,
    pub instance_type: String,
    pub initial_instance_count: u32,
    /// Seconds between `DescribeEndpoint` polls while provisioning
    pub poll_interval_secs: u64,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            name_prefix: "prophet-cpi".to_string(),
            instance_type: "ml.m5.large".to_string(),
            initial_instance_count: 1,
            poll_interval_secs: 30,
        }
    }
}

/// The one test request sent to the live endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub payload: Value,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            payload: json!({"ds": ["2024-01-01", "2024-02-01", "2024-03-01"]}),
        }
    }
}

/// AWS account settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    /// Falls back to `AWS_REGION` / `AWS_DEFAULT_REGION`
    pub region: Option<String>,
    /// Execution role assumed by the hosted model
    pub role_arn: Option<String>,
    /// Defaults to `sagemaker-<region>-<account id>`
    pub bucket: Option<String>,
    pub s3_endpoint: Option<String>,
    pub control_endpoint: Option<String>,
    pub runtime_endpoint: Option<String>,
    /// Per-request HTTP timeout
    pub timeout_seconds: u64,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: None,
            role_arn: None,
            bucket: None,
            s3_endpoint: None,
            control_endpoint: None,
            runtime_endpoint: None,
            timeout_seconds: 60,
        }
    }
}
