//! Platform seam traits

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;
use std::path::Path;

use super::types::{
    CreateEndpointConfigRequest, CreateModelRequest, EndpointConfigDescription,
    EndpointDescription, ImageQuery, InvocationRequest, StorageUri,
};
use crate::utils::error::Result;

/// Object storage used for the model artifact and the inference code bundle
#[async_trait]
pub trait ArtifactStore: Send + Sync + Debug {
    /// Upload a local file to `<key_prefix>/<file name>`
    ///
    /// Fails before any network call when `path` does not exist.
    async fn upload_file(&self, path: &Path, key_prefix: &str) -> Result<StorageUri>;

    /// Upload an in-memory object under `key`
    async fn upload_bytes(&self, data: Bytes, key: &str) -> Result<StorageUri>;
}

/// Published serving image lookup
pub trait ImageCatalog: Send + Sync + Debug {
    /// Resolve the container image for `query`
    fn retrieve(&self, query: &ImageQuery) -> Result<String>;
}

/// Model hosting control API
#[async_trait]
pub trait ControlPlane: Send + Sync + Debug {
    /// Register a model, returning its ARN
    async fn create_model(&self, request: &CreateModelRequest) -> Result<String>;

    /// Create an endpoint configuration, returning its ARN
    async fn create_endpoint_config(
        &self,
        request: &CreateEndpointConfigRequest,
    ) -> Result<String>;

    /// Start provisioning an endpoint, returning its ARN
    async fn create_endpoint(&self, endpoint_name: &str, config_name: &str) -> Result<String>;

    async fn describe_endpoint(&self, endpoint_name: &str) -> Result<EndpointDescription>;

    async fn describe_endpoint_config(
        &self,
        config_name: &str,
    ) -> Result<EndpointConfigDescription>;

    async fn delete_endpoint(&self, endpoint_name: &str) -> Result<()>;

    async fn delete_endpoint_config(&self, config_name: &str) -> Result<()>;

    async fn delete_model(&self, model_name: &str) -> Result<()>;
}

/// Inference data plane
#[async_trait]
pub trait InferenceRuntime: Send + Sync + Debug {
    /// Send one synchronous request to a live endpoint and return the raw body
    async fn invoke_endpoint(&self, request: InvocationRequest) -> Result<Bytes>;
}
