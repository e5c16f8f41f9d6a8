//! Model descriptor
//!
//! A [`Model`] is a local description of what to host. Nothing is sent to the
//! platform until [`Model::deploy`].

pub mod bundle;
pub mod naming;

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::platform::{
    ContainerDefinition, CreateEndpointConfigRequest, CreateModelRequest, ProductionVariant,
    ResourceRef, Session, StorageUri,
};
use crate::predictor::Predictor;
use crate::utils::error::Result;
use bundle::{BUNDLE_FILE_NAME, pack_source_dir};
use naming::{base_name_from_image, name_from_base};

/// Container log level passed to the serving toolkit (logging.INFO)
const CONTAINER_LOG_LEVEL: &str = "20";

/// Name of the single production variant
pub const VARIANT_NAME: &str = "AllTraffic";

/// Everything needed to register a model
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    image_uri: String,
    model_data: StorageUri,
    role: String,
    entry_point: String,
    source_dir: PathBuf,
    name: Option<String>,
    env: BTreeMap<String, String>,
}

/// How to host a [`Model`]
#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub endpoint_name: String,
    pub instance_type: String,
    pub initial_instance_count: u32,
    pub poll_interval: Duration,
    /// Used to derive the model name when none was set
    pub now: DateTime<Utc>,
}

/// A live endpoint and the resources behind it
#[derive(Debug, Clone)]
pub struct Deployment {
    pub predictor: Predictor,
    pub model_name: String,
    pub endpoint_config_name: String,
}

impl Deployment {
    /// Billable resources in creation order
    pub fn resources(&self) -> Vec<ResourceRef> {
        vec![
            ResourceRef::model(&self.model_name),
            ResourceRef::endpoint_config(&self.endpoint_config_name),
            ResourceRef::endpoint(self.predictor.endpoint_name()),
        ]
    }
}

impl Model {
    pub fn new(
        image_uri: impl Into<String>,
        model_data: StorageUri,
        role: impl Into<String>,
        entry_point: impl Into<String>,
        source_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            image_uri: image_uri.into(),
            model_data,
            role: role.into(),
            entry_point: entry_point.into(),
            source_dir: source_dir.into(),
            name: None,
            env: BTreeMap::new(),
        }
    }

    /// Use a fixed model name instead of one derived from the image
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Extra container environment; the serving variables take precedence
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn image_uri(&self) -> &str {
        &self.image_uri
    }

    pub fn model_data(&self) -> &StorageUri {
        &self.model_data
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Model name used at deploy time
    pub fn resolved_name(&self, now: DateTime<Utc>) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| name_from_base(&base_name_from_image(&self.image_uri), now))
    }

    /// Container definition pointing at the artifact and the uploaded code
    pub fn container_definition(&self, code_uri: &StorageUri, region: &str) -> ContainerDefinition {
        let mut environment = self.env.clone();
        environment.insert("SAGEMAKER_PROGRAM".to_string(), self.entry_point.clone());
        environment.insert(
            "SAGEMAKER_SUBMIT_DIRECTORY".to_string(),
            code_uri.to_string(),
        );
        environment.insert(
            "SAGEMAKER_CONTAINER_LOG_LEVEL".to_string(),
            CONTAINER_LOG_LEVEL.to_string(),
        );
        environment.insert("SAGEMAKER_REGION".to_string(), region.to_string());

        ContainerDefinition {
            image: self.image_uri.clone(),
            model_data_url: self.model_data.to_string(),
            environment,
        }
    }

    /// Upload the code, register the model and bring up an endpoint
    ///
    /// Blocks until the endpoint is InService. On failure nothing is deleted;
    /// the error lists every resource created so far.
    pub async fn deploy(&self, session: &Session, options: &DeployOptions) -> Result<Deployment> {
        let model_name = self.resolved_name(options.now);

        let bundle = pack_source_dir(&self.source_dir, &self.entry_point).await?;
        let code_uri = session
            .store
            .upload_bytes(bundle, &format!("{}/{}", model_name, BUNDLE_FILE_NAME))
            .await?;
        info!("Uploaded inference code to {}", code_uri);

        let mut created = Vec::new();
        let result = self
            .create_resources(session, options, &model_name, &code_uri, &mut created)
            .await;

        match result {
            Ok(()) => Ok(Deployment {
                predictor: Predictor::new(
                    &options.endpoint_name,
                    session.runtime.clone(),
                    session.control.clone(),
                ),
                model_name,
                endpoint_config_name: options.endpoint_name.clone(),
            }),
            Err(e) => Err(e.left_running(created)),
        }
    }

    async fn create_resources(
        &self,
        session: &Session,
        options: &DeployOptions,
        model_name: &str,
        code_uri: &StorageUri,
        created: &mut Vec<ResourceRef>,
    ) -> Result<()> {
        let control = &session.control;

        info!("Creating model {}", model_name);
        control
            .create_model(&CreateModelRequest {
                model_name: model_name.to_string(),
                execution_role_arn: self.role.clone(),
                primary_container: self.container_definition(code_uri, session.region()),
            })
            .await?;
        created.push(ResourceRef::model(model_name));

        let config_name = options.endpoint_name.clone();
        info!("Creating endpoint configuration {}", config_name);
        control
            .create_endpoint_config(&CreateEndpointConfigRequest {
                endpoint_config_name: config_name.clone(),
                production_variants: vec![ProductionVariant {
                    variant_name: VARIANT_NAME.to_string(),
                    model_name: model_name.to_string(),
                    initial_instance_count: Some(options.initial_instance_count),
                    instance_type: Some(options.instance_type.clone()),
                    initial_variant_weight: Some(1.0),
                }],
            })
            .await?;
        created.push(ResourceRef::endpoint_config(&config_name));

        info!("Creating endpoint {}", options.endpoint_name);
        control
            .create_endpoint(&options.endpoint_name, &config_name)
            .await?;
        created.push(ResourceRef::endpoint(&options.endpoint_name));

        session
            .wait_for_endpoint(&options.endpoint_name, options.poll_interval)
            .await?;
        Ok(())
    }
}
