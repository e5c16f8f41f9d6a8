//! AWS credentials
//!
//! Credentials come from the `aws-config` default provider chain: environment
//! variables, shared profiles, SSO, container and instance roles. Resolved
//! credentials are cached until shortly before they expire.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_s3::error::DisplayErrorContext;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;

use crate::utils::error::{DeployError, Result};

/// Credentials closer than this to expiry are fetched again
const EXPIRY_BUFFER: Duration = Duration::from_secs(300);

/// Region plus a source of credentials for it
#[derive(Clone)]
pub struct AwsAuth {
    region: String,
    sdk_config: SdkConfig,
    provider: SharedCredentialsProvider,
    cached: Arc<Mutex<Option<Credentials>>>,
}

impl std::fmt::Debug for AwsAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsAuth")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl AwsAuth {
    /// Fixed credentials, for S3-compatible services and tests
    pub fn new(
        access_key_id: String,
        secret_access_key: String,
        session_token: Option<String>,
        region: String,
    ) -> Self {
        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            session_token,
            None,
            "prophet-deploy",
        );
        Self::with_provider(region, credentials)
    }

    /// Credentials from any provider
    pub fn with_provider(
        region: impl Into<String>,
        provider: impl ProvideCredentials + 'static,
    ) -> Self {
        let region = region.into();
        let provider = SharedCredentialsProvider::new(provider);
        let sdk_config = SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .credentials_provider(provider.clone())
            .build();
        Self::from_parts(region, sdk_config, provider)
    }

    /// Resolve region and credentials the way the AWS CLI does
    ///
    /// An explicit `region` wins over `AWS_REGION` and the profile.
    pub async fn load(region: Option<&str>) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        let sdk_config = loader.load().await;

        let region = sdk_config
            .region()
            .map(|r| r.as_ref().to_string())
            .ok_or_else(|| {
                DeployError::config(
                    "AWS region not set (aws.region, AWS_REGION, AWS_DEFAULT_REGION or profile)",
                )
            })?;
        let provider = sdk_config
            .credentials_provider()
            .ok_or_else(|| DeployError::config("No AWS credentials provider available"))?;

        Ok(Self::from_parts(region, sdk_config, provider))
    }

    fn from_parts(region: String, sdk_config: SdkConfig, provider: SharedCredentialsProvider) -> Self {
        Self {
            region,
            sdk_config,
            provider,
            cached: Arc::new(Mutex::new(None)),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Shared SDK configuration for the S3 client
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.sdk_config
    }

    /// Current credentials, refreshed when missing or about to expire
    pub async fn credentials(&self) -> Result<Credentials> {
        let mut cached = self.cached.lock().await;
        if let Some(credentials) = cached.as_ref().filter(|c| !expires_soon(c)) {
            return Ok(credentials.clone());
        }

        let fresh = self.provider.provide_credentials().await.map_err(|e| {
            DeployError::config(format!(
                "Failed to load AWS credentials: {}",
                DisplayErrorContext(&e)
            ))
        })?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }
}

fn expires_soon(credentials: &Credentials) -> bool {
    credentials
        .expiry()
        .is_some_and(|expiry| expiry <= SystemTime::now() + EXPIRY_BUFFER)
}

/// Extract the 12-digit account id from an IAM ARN
///
/// `arn:aws:iam::123456789012:role/service-role/Example` -> `123456789012`
pub fn account_id_from_role_arn(arn: &str) -> Result<String> {
    let parts: Vec<&str> = arn.splitn(6, ':').collect();
    if parts.len() != 6 || parts[0] != "arn" || parts[2] != "iam" {
        return Err(DeployError::config(format!(
            "Invalid IAM role ARN: {}",
            arn
        )));
    }

    let account = parts[4];
    if account.len() != 12 || !account.chars().all(|c| c.is_ascii_digit()) {
        return Err(DeployError::config(format!(
            "Invalid account id in role ARN: {}",
            arn
        )));
    }

    if !parts[5].starts_with("role/") {
        return Err(DeployError::config(format!("ARN is not an IAM role: {}", arn)));
    }

    Ok(account.to_string())
}
