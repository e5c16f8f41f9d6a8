//! SageMaker control plane client
//!
//! Speaks the `application/x-amz-json-1.1` protocol: every operation is a
//! signed `POST /` with an `X-Amz-Target: SageMaker.<Operation>` header.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error};

use super::signer_for;
use super::error::SageMakerErrorMapper;
use crate::aws::{AwsAuth, dns_suffix};
use crate::platform::traits::ControlPlane;
use crate::platform::types::{
    CreateEndpointConfigRequest, CreateModelRequest, EndpointConfigDescription,
    EndpointDescription,
};
use crate::utils::error::{DeployError, Result};

const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "SageMaker";

/// SageMaker control plane client
#[derive(Debug, Clone)]
pub struct SageMakerClient {
    http: Client,
    auth: AwsAuth,
    endpoint: String,
    error_mapper: SageMakerErrorMapper,
}

impl SageMakerClient {
    /// Create a new client
    ///
    /// `endpoint` overrides the regional `https://api.sagemaker.<region>.<suffix>` URL.
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

    /// Default control plane URL for a region
    pub fn regional_endpoint(region: &str) -> String {
        format!("https://api.sagemaker.{}.{}", region, dns_suffix(region))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Call one operation and decode its JSON response
    async fn call<B, R>(&self, operation: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let bytes = self.send(operation, body).await?;
        let payload: &[u8] = if bytes.is_empty() { b"{}" } else { &bytes };
        Ok(serde_json::from_slice(payload)?)
    }

    async fn send<B>(&self, operation: &str, body: &B) -> Result<bytes::Bytes>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}/", self.endpoint);
        let body = serde_json::to_vec(body)?;

        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), CONTENT_TYPE.to_string());
        headers.insert(
            "x-amz-target".to_string(),
            format!("{}.{}", TARGET_PREFIX, operation),
        );

        let signed = signer_for(&self.auth).await?.sign_request(
            "POST",
            &url,
            &headers,
            &body,
            chrono::Utc::now(),
        )?;

        debug!("SageMaker request: {} to {}", operation, url);

        let response = self
            .http
            .post(&url)
            .headers(to_header_map(signed))
            .body(body)
            .send()
            .await
            .map_err(|e| self.error_mapper.map_network_error(operation, e))?;

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
                "SageMaker {} error: {} - {}",
                operation,
                status.as_u16(),
                error_body
            );
            return Err(self.error_mapper.map_http_error(
                operation,
                status.as_u16(),
                error_type.as_deref(),
                &error_body,
            ));
        }

        Ok(response.bytes().await?)
    }
}

/// Convert signed headers into a reqwest header map
///
/// `host` is left to reqwest, which derives the same value from the URL.
pub(crate) fn to_header_map(signed: HashMap<String, String>) -> reqwest::header::HeaderMap {
    let mut header_map = reqwest::header::HeaderMap::new();
    for (key, value) in signed {
        if key.eq_ignore_ascii_case("host") {
            continue;
        }
        if let (Ok(header_name), Ok(header_value)) = (
            reqwest::header::HeaderName::from_bytes(key.as_bytes()),
            reqwest::header::HeaderValue::from_str(&value),
        ) {
            header_map.insert(header_name, header_value);
        }
    }
    header_map
}

fn arn_field(response: &Value, field: &str) -> String {
    response
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl ControlPlane for SageMakerClient {
    async fn create_model(&self, request: &CreateModelRequest) -> Result<String> {
        let response: Value = self.call("CreateModel", request).await?;
        Ok(arn_field(&response, "ModelArn"))
    }

    async fn create_endpoint_config(
        &self,
        request: &CreateEndpointConfigRequest,
    ) -> Result<String> {
        let response: Value = self.call("CreateEndpointConfig", request).await?;
        Ok(arn_field(&response, "EndpointConfigArn"))
    }

    async fn create_endpoint(&self, endpoint_name: &str, config_name: &str) -> Result<String> {
        let body = json!({
            "EndpointName": endpoint_name,
            "EndpointConfigName": config_name,
        });
        let response: Value = self.call("CreateEndpoint", &body).await?;
        Ok(arn_field(&response, "EndpointArn"))
    }

    async fn describe_endpoint(&self, endpoint_name: &str) -> Result<EndpointDescription> {
        self.call("DescribeEndpoint", &json!({ "EndpointName": endpoint_name }))
            .await
    }

    async fn describe_endpoint_config(
        &self,
        config_name: &str,
    ) -> Result<EndpointConfigDescription> {
        self.call(
            "DescribeEndpointConfig",
            &json!({ "EndpointConfigName": config_name }),
        )
        .await
    }

    async fn delete_endpoint(&self, endpoint_name: &str) -> Result<()> {
        self.send("DeleteEndpoint", &json!({ "EndpointName": endpoint_name }))
            .await?;
        Ok(())
    }

    async fn delete_endpoint_config(&self, config_name: &str) -> Result<()> {
        self.send(
            "DeleteEndpointConfig",
            &json!({ "EndpointConfigName": config_name }),
        )
        .await?;
        Ok(())
    }

    async fn delete_model(&self, model_name: &str) -> Result<()> {
        self.send("DeleteModel", &json!({ "ModelName": model_name }))
            .await?;
        Ok(())
    }
}
