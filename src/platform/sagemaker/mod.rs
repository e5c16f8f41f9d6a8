//! SageMaker clients
//!
//! Hand-rolled clients for the SageMaker control plane (JSON 1.1 protocol) and
//! the runtime `InvokeEndpoint` API, signed with SigV4 over `reqwest`.

use crate::aws::{AwsAuth, SigV4Signer};
use crate::utils::error::Result;

mod client;
mod error;
mod runtime;

pub use client::SageMakerClient;
pub use error::SageMakerErrorMapper;
pub use runtime::SageMakerRuntimeClient;

/// SigV4 service name for both the control and runtime APIs
pub const SIGNING_SERVICE: &str = "sagemaker";

/// Signer over the current credentials of `auth`
async fn signer_for(auth: &AwsAuth) -> Result<SigV4Signer> {
    let credentials = auth.credentials().await?;
    Ok(SigV4Signer::from_credentials(
        &credentials,
        auth.region(),
        SIGNING_SERVICE,
    ))
}
