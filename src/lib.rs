//! # prophet-deploy
//!
//! Deploys the Prophet CPI forecasting model to a hosted SageMaker endpoint,
//! sends one test prediction and deletes the endpoint again.
//!
//! The run is a fixed, strictly sequential procedure:
//!
//! 1. upload the packaged model artifact to S3,
//! 2. resolve the PyTorch serving image for the region,
//! 3. describe the model (artifact, image, role, inference code),
//! 4. create the model, endpoint configuration and endpoint, and wait for it,
//! 5. send one JSON request,
//! 6. delete endpoint, endpoint configuration and model.
//!
//! Running the endpoint costs money. A run that fails after step 4 started
//! leaves resources behind; the error names them, and
//! [`deploy::teardown_endpoint`] removes them.
//!
//! ```rust,no_run
//! use prophet_deploy::{DeployConfig, Deployer, Session};
//!
//! # async fn example() -> prophet_deploy::Result<()> {
//! let config = DeployConfig::load(None).await?;
//! let session = Session::aws(&config).await?;
//! let report = Deployer::new(config, session).run().await?;
//! println!("{}", report.endpoint_name);
//! # Ok(())
//! # }
//! ```

pub mod aws;
pub mod catalog;
pub mod config;
pub mod deploy;
pub mod model;
pub mod platform;
pub mod predictor;
pub mod utils;

pub use config::DeployConfig;
pub use deploy::{Deployer, DeploymentReport};
pub use model::Model;
pub use platform::Session;
pub use predictor::Predictor;
pub use utils::error::{DeployError, Result};
