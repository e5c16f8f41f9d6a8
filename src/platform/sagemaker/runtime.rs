//! SageMaker runtime client

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error};

use super::signer_for;
use super::client::to_header_map;
use super::error::SageMakerErrorMapper;
use crate::aws::{AwsAuth, dns_suffix};
use crate::platform::traits::InferenceRuntime;
use crate::platform::types::InvocationRequest;
use crate::utils::error::{DeployError, Result};

const OPERATION: &str = "InvokeEndpoint";

/// Client for `POST /endpoints/<name>/invocations`
#[derive(Debug, Clone)]
pub struct SageMakerRuntimeClient {
    http: Client,
    auth: AwsAuth,
    endpoint: String,
    error_mapper: SageMakerErrorMapper,
}

impl SageMakerRuntimeClient {
    pub fn new(auth: &AwsAuth, endpoint: Option<&str>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeployError::config(format!("Failed to build HTTP client: {}", e)))?;

        let endpoint = endpoint
            .map(|e| e.trim_end_matches('/').to_string())
            .unwrap_or_else(|| Self::regional_endpoint(auth.region()));

        Ok(Self {
            http,
            auth: auth.clone(),
            endpoint,
            error_mapper: SageMakerErrorMapper,
        })
    }

    /// Default runtime URL for a region
    pub fn regional_endpoint(region: &str) -> String {
        format!("https://runtime.sagemaker.{}.{}", region, dns_suffix(region))
    }

    pub fn invocation_url(&self, endpoint_name: &str) -> String {
        format!("{}/endpoints/{}/invocations", self.endpoint, endpoint_name)
    }
}

#[async_trait]
impl InferenceRuntime for SageMakerRuntimeClient {
    async fn invoke_endpoint(&self, request: InvocationRequest) -> Result<Bytes> {
        let url = self.invocation_url(&request.endpoint_name);

        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), request.content_type.clone());
        headers.insert("accept".to_string(), request.accept.clone());

        let signed = signer_for(&self.auth).await?.sign_request(
            "POST",
            &url,
            &headers,
            &request.body,
            chrono::Utc::now(),
        )?;

        debug!(
            "Invoking endpoint {} ({} bytes)",
            request.endpoint_name,
            request.body.len()
        );

        let response = self
            .http
            .post(&url)
            .headers(to_header_map(signed))
            .body(request.body)
            .send()
            .await
            .map_err(|e| self.error_mapper.map_network_error(OPERATION, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_type = response
                .headers()
                .get("x-amzn-errortype")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                "Endpoint {} returned {} - {}",
                request.endpoint_name,
                status.as_u16(),
                error_body
            );
            return Err(self.error_mapper.map_http_error(
                OPERATION,
                status.as_u16(),
                error_type.as_deref(),
                &error_body,
            ));
        }

        Ok(response.bytes().await?)
    }
}
