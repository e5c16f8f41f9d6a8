//! Platform session
//!
//! Bundles the four platform seams with the region they operate in.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::traits::{ArtifactStore, ControlPlane, ImageCatalog, InferenceRuntime};
use super::types::{EndpointDescription, EndpointStatus};
use super::{S3ArtifactStore, SageMakerClient, SageMakerRuntimeClient};
use crate::aws::{AwsAuth, validate_region};
use crate::catalog::StaticImageCatalog;
use crate::config::DeployConfig;
use crate::utils::error::{DeployError, Result};

/// Live handles to the hosting platform for one region
#[derive(Debug, Clone)]
pub struct Session {
    region: String,
    pub store: Arc<dyn ArtifactStore>,
    pub catalog: Arc<dyn ImageCatalog>,
    pub control: Arc<dyn ControlPlane>,
    pub runtime: Arc<dyn InferenceRuntime>,
}

impl Session {
    pub fn new(
        region: impl Into<String>,
        store: Arc<dyn ArtifactStore>,
        catalog: Arc<dyn ImageCatalog>,
        control: Arc<dyn ControlPlane>,
        runtime: Arc<dyn InferenceRuntime>,
    ) -> Self {
        Self {
            region: region.into(),
            store,
            catalog,
            control,
            runtime,
        }
    }

    /// Connect to AWS through the default credential chain
    ///
    /// Creates the default `sagemaker-<region>-<account>` bucket when no bucket
    /// is configured and it does not exist yet.
    pub async fn aws(config: &DeployConfig) -> Result<Self> {
        let auth = Self::auth(config).await?;
        let region = auth.region().to_string();

        let bucket = config.bucket_name(&region)?;
        let store = S3ArtifactStore::new(&auth, bucket, config.aws.s3_endpoint.as_deref())?;
        if config.aws.bucket.is_none() {
            store.ensure_bucket().await?;
        }

        let timeout = Duration::from_secs(config.aws.timeout_seconds);
        let runtime =
            SageMakerRuntimeClient::new(&auth, config.aws.runtime_endpoint.as_deref(), timeout)?;

        Ok(Self::new(
            region,
            Arc::new(store),
            Arc::new(StaticImageCatalog::new()),
            Arc::new(Self::control_from(&auth, config)?),
            Arc::new(runtime),
        ))
    }

    /// Control plane client alone, for teardown of an existing endpoint
    pub async fn control_client(config: &DeployConfig) -> Result<SageMakerClient> {
        Self::control_from(&Self::auth(config).await?, config)
    }

    fn control_from(auth: &AwsAuth, config: &DeployConfig) -> Result<SageMakerClient> {
        let timeout = Duration::from_secs(config.aws.timeout_seconds);
        SageMakerClient::new(auth, config.aws.control_endpoint.as_deref(), timeout)
    }

    /// Resolve credentials up front so a missing profile fails before any upload
    async fn auth(config: &DeployConfig) -> Result<AwsAuth> {
        let auth = AwsAuth::load(config.aws.region.as_deref()).await?;
        validate_region(auth.region())?;

        let credentials = auth.credentials().await?;
        debug!(
            "Using AWS access key {} in {}",
            credentials.access_key_id(),
            auth.region()
        );
        Ok(auth)
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Poll until the endpoint leaves its transitional states
    ///
    /// No client-side deadline: provisioning is bounded only by the platform.
    pub async fn wait_for_endpoint(
        &self,
        endpoint_name: &str,
        poll_interval: Duration,
    ) -> Result<EndpointDescription> {
        let started = Utc::now();
        loop {
            let description = self.control.describe_endpoint(endpoint_name).await?;
            match description.endpoint_status {
                EndpointStatus::InService => {
                    info!(
                        "Endpoint {} is InService after {}s",
                        endpoint_name,
                        (Utc::now() - started).num_seconds()
                    );
                    return Ok(description);
                }
                ref status if status.is_transitional() => {
                    debug!("Endpoint {} status: {}", endpoint_name, status);
                    tokio::time::sleep(poll_interval).await;
                }
                ref status => {
                    let reason = description
                        .failure_reason
                        .clone()
                        .unwrap_or_else(|| "no failure reason reported".to_string());
                    warn!("Endpoint {} ended in {}: {}", endpoint_name, status, reason);
                    return Err(DeployError::provisioning(
                        endpoint_name,
                        status.to_string(),
                        reason,
                    ));
                }
            }
        }
    }
}
