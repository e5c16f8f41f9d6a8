//! Amazon S3 artifact store

use async_trait::async_trait;
use aws_sdk_s3 as aws_s3;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use std::path::Path;
use tracing::{debug, info};

use super::traits::ArtifactStore;
use super::types::StorageUri;
use crate::aws::AwsAuth;
use crate::utils::error::{DeployError, Result};

/// S3-backed [`ArtifactStore`]
#[derive(Debug, Clone)]
pub struct S3ArtifactStore {
    bucket: String,
    region: String,
    client: aws_s3::Client,
}

impl S3ArtifactStore {
    /// Create a new S3 store sharing the session's SDK configuration
    ///
    /// `endpoint` points the client at an S3-compatible service instead of AWS.
    pub fn new(auth: &AwsAuth, bucket: String, endpoint: Option<&str>) -> Result<Self> {
        let mut builder = aws_s3::config::Builder::from(auth.sdk_config());
        if let Some(url) = endpoint {
            builder = builder.endpoint_url(url).force_path_style(true);
        }
        let client = aws_s3::Client::from_conf(builder.build());

        info!(
            "S3 artifact store initialized: bucket={}, region={}",
            bucket,
            auth.region()
        );

        Ok(Self {
            bucket,
            region: auth.region().to_string(),
            client,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Create the bucket if it does not exist yet
    pub async fn ensure_bucket(&self) -> Result<()> {
        use aws_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};

        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                debug!("Bucket {} exists", self.bucket);
                return Ok(());
            }
            Err(e) => {
                let missing = e
                    .as_service_error()
                    .map(|se| se.is_not_found())
                    .unwrap_or(false);
                if !missing {
                    return Err(DeployError::storage(format!(
                        "Cannot access bucket {}: {}",
                        self.bucket,
                        DisplayErrorContext(&e)
                    )));
                }
            }
        }

        info!("Creating bucket {} in {}", self.bucket, self.region);
        let mut request = self.client.create_bucket().bucket(&self.bucket);
        if self.region != "us-east-1" {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }
        request.send().await.map_err(|e| {
            DeployError::storage(format!(
                "Failed to create bucket {}: {}",
                self.bucket,
                DisplayErrorContext(&e)
            ))
        })?;

        Ok(())
    }

    async fn put(&self, body: ByteStream, key: &str) -> Result<StorageUri> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                DeployError::storage(format!("S3 upload failed: {}", DisplayErrorContext(&e)))
            })?;

        let uri = StorageUri::new(&self.bucket, key);
        debug!("Object uploaded to {}", uri);
        Ok(uri)
    }
}

/// `<prefix>/<file name>` with redundant slashes removed
pub fn object_key(key_prefix: &str, file_name: &str) -> String {
    let prefix = key_prefix.trim_matches('/');
    if prefix.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", prefix, file_name)
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn upload_file(&self, path: &Path, key_prefix: &str) -> Result<StorageUri> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|_| DeployError::FileNotFound(path.to_path_buf()))?;
        if !metadata.is_file() {
            return Err(DeployError::FileNotFound(path.to_path_buf()));
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DeployError::storage(format!("Invalid file name: {}", path.display())))?;
        let key = object_key(key_prefix, file_name);

        let body = ByteStream::from_path(path).await.map_err(|e| {
            DeployError::storage(format!("Failed to read {}: {}", path.display(), e))
        })?;

        info!(
            "Uploading {} ({} bytes) to s3://{}/{}",
            path.display(),
            metadata.len(),
            self.bucket,
            key
        );
        self.put(body, &key).await
    }

    async fn upload_bytes(&self, data: Bytes, key: &str) -> Result<StorageUri> {
        info!(
            "Uploading {} bytes to s3://{}/{}",
            data.len(),
            self.bucket,
            key
        );
        self.put(ByteStream::from(data), key).await
    }
}
