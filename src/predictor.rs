//! Client-side handle to a deployed endpoint

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::deploy::teardown::{TeardownReport, teardown_endpoint};
use crate::platform::{ControlPlane, InferenceRuntime, InvocationRequest};
use crate::utils::error::{DeployError, Result};

/// JSON in, JSON out
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Sends requests to one live endpoint and removes it afterwards
#[derive(Debug, Clone)]
pub struct Predictor {
    endpoint_name: String,
    runtime: Arc<dyn InferenceRuntime>,
    control: Arc<dyn ControlPlane>,
}

impl Predictor {
    pub fn new(
        endpoint_name: impl Into<String>,
        runtime: Arc<dyn InferenceRuntime>,
        control: Arc<dyn ControlPlane>,
    ) -> Self {
        Self {
            endpoint_name: endpoint_name.into(),
            runtime,
            control,
        }
    }

    pub fn endpoint_name(&self) -> &str {
        &self.endpoint_name
    }

    /// Serialize `data` as JSON, invoke the endpoint once and decode the JSON reply
    pub async fn predict<T: Serialize + ?Sized>(&self, data: &T) -> Result<Value> {
        let body = serde_json::to_vec(data)?;
        debug!("Predict request to {}: {} bytes", self.endpoint_name, body.len());

        let response = self
            .runtime
            .invoke_endpoint(InvocationRequest {
                endpoint_name: self.endpoint_name.clone(),
                content_type: JSON_CONTENT_TYPE.to_string(),
                accept: JSON_CONTENT_TYPE.to_string(),
                body: Bytes::from(body),
            })
            .await?;

        serde_json::from_slice(&response).map_err(|e| {
            DeployError::inference(
                &self.endpoint_name,
                format!("response is not valid JSON: {}", e),
            )
        })
    }

    /// Delete the endpoint, its configuration and its model
    pub async fn delete(&self) -> Result<TeardownReport> {
        teardown_endpoint(self.control.as_ref(), &self.endpoint_name).await
    }
}

/// First element of an array response, the whole value otherwise
pub fn sample_of(response: &Value) -> Value {
    match response {
        Value::Array(items) => Value::Array(items.iter().take(1).cloned().collect()),
        other => other.clone(),
    }
}
