//! Deployment orchestrator
//!
//! Runs the fixed sequence: upload the artifact, resolve the serving image,
//! describe the model, deploy it to a fresh endpoint, send one test request,
//! and delete everything again. Each step waits for the previous one. A
//! failure ends the run without cleanup; teardown only runs after a successful
//! test request.

pub mod teardown;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt::Display;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::DeployConfig;
use crate::model::naming::endpoint_name;
use crate::model::{DeployOptions, Model};
use crate::platform::{ResourceRef, Session, StorageUri};
use crate::predictor::sample_of;
use crate::utils::error::Result;
pub use teardown::{TeardownReport, teardown_endpoint};

/// Source of the current time
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Destination of the progress lines, stdout unless replaced
pub type Output = Arc<Mutex<dyn Write + Send>>;

/// What one successful run did
#[derive(Debug, Clone)]
pub struct DeploymentReport {
    pub artifact: StorageUri,
    pub image_uri: String,
    pub endpoint_name: String,
    pub model_name: String,
    pub prediction: Value,
    pub deleted: Vec<ResourceRef>,
}

/// Drives one deployment run against a [`Session`]
pub struct Deployer {
    config: DeployConfig,
    session: Session,
    clock: Clock,
    output: Output,
}

impl std::fmt::Debug for Deployer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deployer")
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Deployer {
    pub fn new(config: DeployConfig, session: Session) -> Self {
        Self {
            config,
            session,
            clock: Arc::new(Utc::now),
            output: Arc::new(Mutex::new(std::io::stdout())),
        }
    }

    /// Replace the wall clock, e.g. to pin generated names
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Send progress lines somewhere other than stdout
    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// Run the whole sequence once
    pub async fn run(&self) -> Result<DeploymentReport> {
        let role = self.config.role_arn()?;

        let artifact = self.upload_artifact().await?;
        self.progress(format_args!("Uploaded model to: {}", artifact))?;

        let image_uri = self.resolve_image()?;
        self.progress(format_args!("Using image: {}", image_uri))?;

        let model = Model::new(
            &image_uri,
            artifact.clone(),
            role,
            &self.config.inference_code.entry_point,
            &self.config.inference_code.source_dir,
        );

        let now = (self.clock)();
        let endpoint_name = endpoint_name(&self.config.endpoint.name_prefix, now);
        self.progress(format_args!("Deploying endpoint: {}", endpoint_name))?;

        let options = DeployOptions {
            endpoint_name: endpoint_name.clone(),
            instance_type: self.config.endpoint.instance_type.clone(),
            initial_instance_count: self.config.endpoint.initial_instance_count,
            poll_interval: Duration::from_secs(self.config.endpoint.poll_interval_secs),
            now,
        };
        let deployment = model.deploy(&self.session, &options).await?;

        let prediction = deployment
            .predictor
            .predict(&self.config.validation.payload)
            .await
            .map_err(|e| e.left_running(deployment.resources()))?;
        self.progress(format_args!("Sample prediction: {}", sample_of(&prediction)))
            .map_err(|e| e.left_running(deployment.resources()))?;

        let report = deployment.predictor.delete().await?;
        self.progress("Deleted endpoint, config, and model")?;

        Ok(DeploymentReport {
            artifact,
            image_uri,
            endpoint_name,
            model_name: deployment.model_name,
            prediction,
            deleted: report.deleted,
        })
    }

    fn progress(&self, line: impl Display) -> Result<()> {
        let mut output = self.output.lock();
        writeln!(output, "{}", line)?;
        output.flush()?;
        Ok(())
    }

    /// Step 1: push the local artifact to object storage
    pub async fn upload_artifact(&self) -> Result<StorageUri> {
        let artifact = &self.config.artifact;
        info!("Uploading artifact {}", artifact.path.display());
        self.session
            .store
            .upload_file(&artifact.path, &artifact.key_prefix)
            .await
    }

    /// Step 2: look up the serving image for the configured framework
    pub fn resolve_image(&self) -> Result<String> {
        let query = self.config.image_query(self.session.region());
        self.session.catalog.retrieve(&query)
    }
}
