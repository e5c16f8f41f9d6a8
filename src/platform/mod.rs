//! Hosting platform abstraction
//!
//! The deployer only talks to the cloud through the traits in this module, so a
//! simulated platform can replace AWS in tests.

pub mod s3;
pub mod sagemaker;
mod session;
mod traits;
mod types;

pub use s3::S3ArtifactStore;
pub use sagemaker::{SageMakerClient, SageMakerRuntimeClient};
pub use session::Session;
pub use traits::{ArtifactStore, ControlPlane, ImageCatalog, InferenceRuntime};
pub use types::{
    ContainerDefinition, CreateEndpointConfigRequest, CreateModelRequest, EndpointConfigDescription,
    EndpointDescription, EndpointStatus, ImageQuery, InvocationRequest, ProductionVariant,
    ResourceKind, ResourceRef, StorageUri,
};
