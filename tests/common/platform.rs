//! Recording mock of the hosting platform

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use prophet_deploy::platform::{
    ArtifactStore, ControlPlane, CreateEndpointConfigRequest, CreateModelRequest,
    EndpointConfigDescription, EndpointDescription, EndpointStatus, ImageCatalog, ImageQuery,
    InferenceRuntime, InvocationRequest, Session, StorageUri,
};
use prophet_deploy::{DeployError, Result};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const MOCK_BUCKET: &str = "mock-bucket";
pub const MOCK_IMAGE: &str =
    "763104351884.dkr.ecr.us-east-1.amazonaws.com/pytorch-inference:2.1.0-cpu-py310";

/// One call observed by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    UploadFile { path: PathBuf, key_prefix: String },
    UploadBytes { key: String },
    CreateModel(CreateModelRequest),
    CreateEndpointConfig(CreateEndpointConfigRequest),
    CreateEndpoint { endpoint: String, config: String },
    DescribeEndpoint(String),
    DescribeEndpointConfig(String),
    DeleteEndpoint(String),
    DeleteEndpointConfig(String),
    DeleteModel(String),
    Invoke { endpoint: String, body: Value },
}

impl Call {
    pub fn is_deletion(&self) -> bool {
        matches!(
            self,
            Call::DeleteEndpoint(_) | Call::DeleteEndpointConfig(_) | Call::DeleteModel(_)
        )
    }
}

#[derive(Debug, Default)]
struct State {
    models: HashMap<String, CreateModelRequest>,
    configs: HashMap<String, CreateEndpointConfigRequest>,
    endpoints: HashMap<String, String>,
}

/// In-memory S3 + SageMaker stand-in that records every call
#[derive(Debug)]
pub struct MockPlatform {
    calls: Mutex<Vec<Call>>,
    state: Mutex<State>,
    failures: Mutex<HashSet<&'static str>>,
    statuses: Mutex<VecDeque<(EndpointStatus, Option<String>)>>,
    prediction: Mutex<Bytes>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            state: Mutex::new(State::default()),
            failures: Mutex::new(HashSet::new()),
            statuses: Mutex::new(VecDeque::new()),
            prediction: Mutex::new(Bytes::from(
                json!([{"ds": "2024-01-01", "yhat": 3.1}, {"ds": "2024-02-01", "yhat": 3.2}])
                    .to_string(),
            )),
        }
    }
}

impl MockPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Session wiring this mock into every seam except the catalog
    pub fn session(self: &Arc<Self>, catalog: Arc<FixedImageCatalog>) -> Session {
        Session::new("us-east-1", self.clone(), catalog, self.clone(), self.clone())
    }

    /// Make `operation` fail with a `MockFailure` API error
    pub fn fail_on(&self, operation: &'static str) {
        self.failures.lock().insert(operation);
    }

    /// Statuses returned by successive `DescribeEndpoint` calls; InService once drained
    pub fn push_status(&self, status: EndpointStatus, failure_reason: Option<&str>) {
        self.statuses
            .lock()
            .push_back((status, failure_reason.map(str::to_string)));
    }

    pub fn set_prediction(&self, body: &str) {
        *self.prediction.lock() = Bytes::from(body.to_string());
    }

    /// Register a live endpoint directly, bypassing the create calls
    pub fn seed_endpoint(&self, endpoint: &str, config: &str, model: &str) {
        let mut state = self.state.lock();
        state.endpoints.insert(endpoint.to_string(), config.to_string());
        state.configs.insert(
            config.to_string(),
            CreateEndpointConfigRequest {
                endpoint_config_name: config.to_string(),
                production_variants: vec![prophet_deploy::platform::ProductionVariant {
                    variant_name: "AllTraffic".to_string(),
                    model_name: model.to_string(),
                    initial_instance_count: Some(1),
                    instance_type: Some("ml.m5.large".to_string()),
                    initial_variant_weight: Some(1.0),
                }],
            },
        );
        state.models.insert(
            model.to_string(),
            CreateModelRequest {
                model_name: model.to_string(),
                execution_role_arn: String::new(),
                primary_container: prophet_deploy::platform::ContainerDefinition {
                    image: MOCK_IMAGE.to_string(),
                    model_data_url: "s3://seed/model.tar.gz".to_string(),
                    environment: Default::default(),
                },
            },
        );
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn deletions(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_deletion).collect()
    }

    pub fn created_models(&self) -> Vec<CreateModelRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateModel(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn live_resource_count(&self) -> usize {
        let state = self.state.lock();
        state.models.len() + state.configs.len() + state.endpoints.len()
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<()> {
        self.calls.lock().push(call);
        if self.failures.lock().contains(operation) {
            return Err(DeployError::api(operation, 400, "MockFailure", "injected failure"));
        }
        Ok(())
    }
}

fn not_found(operation: &str, what: &str, name: &str) -> DeployError {
    DeployError::api(
        operation,
        400,
        "ValidationException",
        format!("Could not find {} \"{}\".", what, name),
    )
}

#[async_trait]
impl ArtifactStore for MockPlatform {
    async fn upload_file(&self, path: &Path, key_prefix: &str) -> Result<StorageUri> {
        self.record(
            "UploadFile",
            Call::UploadFile {
                path: path.to_path_buf(),
                key_prefix: key_prefix.to_string(),
            },
        )?;
        if !path.is_file() {
            return Err(DeployError::FileNotFound(path.to_path_buf()));
        }
        let file_name = path.file_name().unwrap().to_string_lossy();
        Ok(StorageUri::new(MOCK_BUCKET, format!("{}/{}", key_prefix, file_name)))
    }

    async fn upload_bytes(&self, _data: Bytes, key: &str) -> Result<StorageUri> {
        self.record("UploadBytes", Call::UploadBytes { key: key.to_string() })?;
        Ok(StorageUri::new(MOCK_BUCKET, key))
    }
}

#[async_trait]
impl ControlPlane for MockPlatform {
    async fn create_model(&self, request: &CreateModelRequest) -> Result<String> {
        self.record("CreateModel", Call::CreateModel(request.clone()))?;
        self.state
            .lock()
            .models
            .insert(request.model_name.clone(), request.clone());
        Ok(format!("arn:aws:sagemaker:us-east-1:123456789012:model/{}", request.model_name))
    }

    async fn create_endpoint_config(
        &self,
        request: &CreateEndpointConfigRequest,
    ) -> Result<String> {
        self.record(
            "CreateEndpointConfig",
            Call::CreateEndpointConfig(request.clone()),
        )?;
        self.state
            .lock()
            .configs
            .insert(request.endpoint_config_name.clone(), request.clone());
        Ok(format!(
            "arn:aws:sagemaker:us-east-1:123456789012:endpoint-config/{}",
            request.endpoint_config_name
        ))
    }

    async fn create_endpoint(&self, endpoint_name: &str, config_name: &str) -> Result<String> {
        self.record(
            "CreateEndpoint",
            Call::CreateEndpoint {
                endpoint: endpoint_name.to_string(),
                config: config_name.to_string(),
            },
        )?;
        self.state
            .lock()
            .endpoints
            .insert(endpoint_name.to_string(), config_name.to_string());
        Ok(format!(
            "arn:aws:sagemaker:us-east-1:123456789012:endpoint/{}",
            endpoint_name
        ))
    }

    async fn describe_endpoint(&self, endpoint_name: &str) -> Result<EndpointDescription> {
        self.record(
            "DescribeEndpoint",
            Call::DescribeEndpoint(endpoint_name.to_string()),
        )?;
        let config_name = self
            .state
            .lock()
            .endpoints
            .get(endpoint_name)
            .cloned()
            .ok_or_else(|| not_found("DescribeEndpoint", "endpoint", endpoint_name))?;
        let (status, failure_reason) = self
            .statuses
            .lock()
            .pop_front()
            .unwrap_or((EndpointStatus::InService, None));

        Ok(EndpointDescription {
            endpoint_name: endpoint_name.to_string(),
            endpoint_arn: None,
            endpoint_config_name: config_name,
            endpoint_status: status,
            failure_reason,
        })
    }

    async fn describe_endpoint_config(
        &self,
        config_name: &str,
    ) -> Result<EndpointConfigDescription> {
        self.record(
            "DescribeEndpointConfig",
            Call::DescribeEndpointConfig(config_name.to_string()),
        )?;
        let config = self
            .state
            .lock()
            .configs
            .get(config_name)
            .cloned()
            .ok_or_else(|| {
                not_found("DescribeEndpointConfig", "endpoint configuration", config_name)
            })?;

        Ok(EndpointConfigDescription {
            endpoint_config_name: config.endpoint_config_name,
            production_variants: config.production_variants,
        })
    }

    async fn delete_endpoint(&self, endpoint_name: &str) -> Result<()> {
        self.record("DeleteEndpoint", Call::DeleteEndpoint(endpoint_name.to_string()))?;
        self.state
            .lock()
            .endpoints
            .remove(endpoint_name)
            .map(|_| ())
            .ok_or_else(|| not_found("DeleteEndpoint", "endpoint", endpoint_name))
    }

    async fn delete_endpoint_config(&self, config_name: &str) -> Result<()> {
        self.record(
            "DeleteEndpointConfig",
            Call::DeleteEndpointConfig(config_name.to_string()),
        )?;
        self.state
            .lock()
            .configs
            .remove(config_name)
            .map(|_| ())
            .ok_or_else(|| {
                not_found("DeleteEndpointConfig", "endpoint configuration", config_name)
            })
    }

    async fn delete_model(&self, model_name: &str) -> Result<()> {
        self.record("DeleteModel", Call::DeleteModel(model_name.to_string()))?;
        self.state
            .lock()
            .models
            .remove(model_name)
            .map(|_| ())
            .ok_or_else(|| not_found("DeleteModel", "model", model_name))
    }
}

#[async_trait]
impl InferenceRuntime for MockPlatform {
    async fn invoke_endpoint(&self, request: InvocationRequest) -> Result<Bytes> {
        let body: Value = serde_json::from_slice(&request.body)?;
        self.record(
            "InvokeEndpoint",
            Call::Invoke {
                endpoint: request.endpoint_name.clone(),
                body,
            },
        )?;
        if !self.state.lock().endpoints.contains_key(&request.endpoint_name) {
            return Err(not_found("InvokeEndpoint", "endpoint", &request.endpoint_name));
        }
        Ok(self.prediction.lock().clone())
    }
}

/// Catalog returning one fixed image and remembering every query
#[derive(Debug)]
pub struct FixedImageCatalog {
    image: Option<String>,
    queries: Mutex<Vec<ImageQuery>>,
}

impl FixedImageCatalog {
    pub fn new(image: &str) -> Arc<Self> {
        Arc::new(Self {
            image: Some(image.to_string()),
            queries: Mutex::new(Vec::new()),
        })
    }

    /// Catalog with no matching image for any query
    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            image: None,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn queries(&self) -> Vec<ImageQuery> {
        self.queries.lock().clone()
    }
}

impl ImageCatalog for FixedImageCatalog {
    fn retrieve(&self, query: &ImageQuery) -> Result<String> {
        self.queries.lock().push(query.clone());
        self.image
            .clone()
            .ok_or_else(|| DeployError::catalog(format!("No image for {:?}", query)))
    }
}
