//! SageMaker error mapping

use serde_json::Value;

use crate::utils::error::DeployError;

/// Maps failed SageMaker responses onto [`DeployError::Api`]
#[derive(Debug, Clone, Default)]
pub struct SageMakerErrorMapper;

impl SageMakerErrorMapper {
    /// Build an error from a non-2xx response
    ///
    /// `error_type` is the `x-amzn-ErrorType` header when present; the body's
    /// `__type` wins over it.
    pub fn map_http_error(
        &self,
        operation: &str,
        status: u16,
        error_type: Option<&str>,
        body: &str,
    ) -> DeployError {
        let parsed: Option<Value> = serde_json::from_str(body).ok();

        let code = parsed
            .as_ref()
            .and_then(|v| v.get("__type"))
            .and_then(Value::as_str)
            .or(error_type)
            .map(strip_error_namespace)
            .unwrap_or_else(|| default_code(status).to_string());

        let message = parsed
            .as_ref()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("Message"))
                    .or_else(|| v.get("OriginalMessage"))
            })
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body.trim().to_string()
                }
            });

        DeployError::api(operation, status, code, message)
    }

    pub fn map_network_error(&self, operation: &str, error: reqwest::Error) -> DeployError {
        if error.is_timeout() {
            DeployError::api(operation, 0, "RequestTimeout", error.to_string())
        } else {
            DeployError::HttpClient(error)
        }
    }
}

/// `com.amazon.coral.validate#ValidationException` -> `ValidationException`
fn strip_error_namespace(code: &str) -> String {
    let code = code.rsplit('#').next().unwrap_or(code);
    code.split(':').next().unwrap_or(code).to_string()
}

fn default_code(status: u16) -> &'static str {
    match status {
        400 => "BadRequest",
        403 => "AccessDenied",
        404 => "NotFound",
        424 => "ModelError",
        429 => "ThrottlingException",
        500..=599 => "InternalFailure",
        _ => "Unknown",
    }
}
