//! Filesystem fixtures

use chrono::{DateTime, TimeZone, Utc};
use prophet_deploy::DeployConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub const ROLE_ARN: &str = "arn:aws:iam::123456789012:role/SageMakerRole";

/// Temporary directory holding a packaged artifact and inference code
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    /// Artifact file plus a source dir with `inference.py`
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("prophet-model.tar.gz"), b"fake model bytes").unwrap();

        let code = dir.path().join("sagemaker_prophet_inference");
        std::fs::create_dir(&code).unwrap();
        std::fs::write(code.join("inference.py"), "def predict_fn(data, model): pass\n").unwrap();
        std::fs::write(code.join("requirements.txt"), "prophet\n").unwrap();

        Self { dir }
    }

    /// Source dir only, no artifact file
    pub fn without_artifact() -> Self {
        let workspace = Self::new();
        std::fs::remove_file(workspace.artifact_path()).unwrap();
        workspace
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.dir.path().join("prophet-model.tar.gz")
    }

    pub fn source_dir(&self) -> PathBuf {
        self.dir.path().join("sagemaker_prophet_inference")
    }

    /// Default configuration pointed at this workspace
    pub fn config(&self) -> DeployConfig {
        let mut config = DeployConfig::default();
        config.artifact.path = self.artifact_path();
        config.inference_code.source_dir = self.source_dir();
        config.endpoint.poll_interval_secs = 1;
        config.aws.region = Some("us-east-1".to_string());
        config.aws.role_arn = Some(ROLE_ARN.to_string());
        config
    }
}

/// Clock pinned to `seconds` after the Unix epoch
pub fn fixed_clock(seconds: i64) -> Arc<dyn Fn() -> DateTime<Utc> + Send + Sync> {
    let instant = Utc.timestamp_opt(seconds, 0).unwrap();
    Arc::new(move || instant)
}
