//! Platform request and response types
//!
//! Field names follow the SageMaker JSON API so the same structs serialize
//! straight into request bodies.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Location of an object in S3
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageUri {
    pub bucket: String,
    pub key: String,
}

impl StorageUri {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse an `s3://bucket/key` URI
    pub fn parse(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix("s3://")?;
        let (bucket, key) = rest.split_once('/')?;
        if bucket.is_empty() || key.is_empty() {
            return None;
        }
        Some(Self::new(bucket, key))
    }
}

impl fmt::Display for StorageUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Key used to look up a serving image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageQuery {
    pub framework: String,
    pub region: String,
    pub version: String,
    pub py_version: String,
    pub image_scope: String,
    pub instance_type: String,
}

/// Container entry of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerDefinition {
    pub image: String,
    pub model_data_url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

/// `CreateModel` request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateModelRequest {
    pub model_name: String,
    pub execution_role_arn: String,
    pub primary_container: ContainerDefinition,
}

/// One production variant of an endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductionVariant {
    pub variant_name: String,
    pub model_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_instance_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_variant_weight: Option<f32>,
}

/// `CreateEndpointConfig` request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateEndpointConfigRequest {
    pub endpoint_config_name: String,
    pub production_variants: Vec<ProductionVariant>,
}

/// Endpoint lifecycle status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointStatus {
    OutOfService,
    Creating,
    Updating,
    SystemUpdating,
    RollingBack,
    InService,
    Deleting,
    Failed,
    UpdateRollbackFailed,
    #[serde(other)]
    Unknown,
}

impl EndpointStatus {
    /// Still converging towards InService
    pub fn is_transitional(&self) -> bool {
        matches!(
            self,
            Self::Creating | Self::Updating | Self::SystemUpdating | Self::RollingBack
        )
    }
}

impl fmt::Display for EndpointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OutOfService => "OutOfService",
            Self::Creating => "Creating",
            Self::Updating => "Updating",
            Self::SystemUpdating => "SystemUpdating",
            Self::RollingBack => "RollingBack",
            Self::InService => "InService",
            Self::Deleting => "Deleting",
            Self::Failed => "Failed",
            Self::UpdateRollbackFailed => "UpdateRollbackFailed",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// `DescribeEndpoint` response (fields the deployer reads)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EndpointDescription {
    pub endpoint_name: String,
    #[serde(default)]
    pub endpoint_arn: Option<String>,
    pub endpoint_config_name: String,
    pub endpoint_status: EndpointStatus,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

/// `DescribeEndpointConfig` response (fields the deployer reads)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EndpointConfigDescription {
    pub endpoint_config_name: String,
    #[serde(default)]
    pub production_variants: Vec<ProductionVariant>,
}

/// A single `InvokeEndpoint` call
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    pub endpoint_name: String,
    pub content_type: String,
    pub accept: String,
    pub body: Bytes,
}

/// Kind of billable resource created by a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Endpoint,
    EndpointConfig,
    Model,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Endpoint => f.write_str("endpoint"),
            Self::EndpointConfig => f.write_str("endpoint configuration"),
            Self::Model => f.write_str("model"),
        }
    }
}

/// A named platform resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub name: String,
}

impl ResourceRef {
    pub fn endpoint(name: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Endpoint,
            name: name.into(),
        }
    }

    pub fn endpoint_config(name: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::EndpointConfig,
            name: name.into(),
        }
    }

    pub fn model(name: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Model,
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}
