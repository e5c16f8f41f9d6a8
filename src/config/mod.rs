//! Configuration management for the deployer
//!
//! Settings come from built-in defaults, an optional YAML file and environment
//! overrides, in that order.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::aws::account_id_from_role_arn;
use crate::platform::ImageQuery;
use crate::utils::error::{DeployError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

impl DeployConfig {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DeployError::config(format!("Failed to read config file: {}", e)))?;

        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text; missing keys keep their defaults
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| DeployError::config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Defaults, then the optional file, then process environment overrides
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path).await?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Apply overrides from an environment-like source
    ///
    /// `AWS_REGION` / `AWS_DEFAULT_REGION` only fill a region the file left
    /// unset; every other variable wins over the file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if self.aws.region.is_none() {
            self.aws.region = lookup("AWS_REGION").or_else(|| lookup("AWS_DEFAULT_REGION"));
        }
        if let Some(role_arn) = lookup("SAGEMAKER_ROLE_ARN") {
            self.aws.role_arn = Some(role_arn);
        }
        if let Some(bucket) = lookup("DEPLOY_BUCKET") {
            self.aws.bucket = Some(bucket);
        }
        if let Some(path) = lookup("DEPLOY_ARTIFACT_PATH") {
            self.artifact.path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("DEPLOY_SOURCE_DIR") {
            self.inference_code.source_dir = PathBuf::from(dir);
        }
        if let Some(instance_type) = lookup("DEPLOY_INSTANCE_TYPE") {
            self.endpoint.instance_type = instance_type;
        }
        if let Some(interval) = lookup("DEPLOY_POLL_INTERVAL") {
            self.endpoint.poll_interval_secs = interval
                .parse()
                .map_err(|e| DeployError::config(format!("Invalid poll interval: {}", e)))?;
        }
        Ok(())
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.artifact
            .validate()
            .map_err(|e| DeployError::config(format!("Artifact config error: {}", e)))?;
        self.inference_code
            .validate()
            .map_err(|e| DeployError::config(format!("Inference code config error: {}", e)))?;
        self.image
            .validate()
            .map_err(|e| DeployError::config(format!("Image config error: {}", e)))?;
        self.endpoint
            .validate()
            .map_err(|e| DeployError::config(format!("Endpoint config error: {}", e)))?;
        self.aws
            .validate()
            .map_err(|e| DeployError::config(format!("AWS config error: {}", e)))?;

        Ok(())
    }

    /// Explicitly configured region; `None` leaves it to the AWS profile
    pub fn region(&self) -> Option<&str> {
        self.aws.region.as_deref()
    }

    /// Execution role the hosted model runs as
    pub fn role_arn(&self) -> Result<&str> {
        self.aws.role_arn.as_deref().ok_or_else(|| {
            DeployError::config("Execution role not set (aws.role_arn or SAGEMAKER_ROLE_ARN)")
        })
    }

    /// Configured bucket, or `sagemaker-<region>-<account id>`
    pub fn bucket_name(&self, region: &str) -> Result<String> {
        if let Some(bucket) = &self.aws.bucket {
            return Ok(bucket.clone());
        }
        let account = account_id_from_role_arn(self.role_arn()?)?;
        Ok(format!("sagemaker-{}-{}", region, account))
    }

    /// Image lookup key for this deployment
    pub fn image_query(&self, region: &str) -> ImageQuery {
        ImageQuery {
            framework: self.image.framework.clone(),
            region: region.to_string(),
            version: self.image.version.clone(),
            py_version: self.image.py_version.clone(),
            image_scope: self.image.image_scope.clone(),
            instance_type: self.endpoint.instance_type.clone(),
        }
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
