//! Endpoint teardown
//!
//! Resource names are discovered from the live endpoint rather than recomputed,
//! then deleted endpoint first, model last.

use tracing::{info, warn};

use crate::platform::{ControlPlane, ResourceKind, ResourceRef};
use crate::utils::error::{DeployError, Result};

/// Resources removed by a completed teardown, in deletion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownReport {
    pub deleted: Vec<ResourceRef>,
}

/// Describe the endpoint and its configuration to find what to delete
pub async fn discover_resources(
    control: &dyn ControlPlane,
    endpoint_name: &str,
) -> Result<Vec<ResourceRef>> {
    let endpoint = control.describe_endpoint(endpoint_name).await?;
    let config_name = endpoint.endpoint_config_name;

    let config = control.describe_endpoint_config(&config_name).await?;
    let model_name = config
        .production_variants
        .first()
        .map(|variant| variant.model_name.clone())
        .ok_or_else(|| {
            DeployError::api(
                "DescribeEndpointConfig",
                200,
                "MissingProductionVariant",
                format!("Endpoint configuration {} has no production variants", config_name),
            )
        })?;

    Ok(vec![
        ResourceRef::endpoint(endpoint_name),
        ResourceRef::endpoint_config(config_name),
        ResourceRef::model(model_name),
    ])
}

/// Delete resources in order, stopping at the first failure
pub async fn delete_resources(
    control: &dyn ControlPlane,
    resources: &[ResourceRef],
) -> Result<TeardownReport> {
    let mut deleted = Vec::with_capacity(resources.len());

    for (index, resource) in resources.iter().enumerate() {
        let result = match resource.kind {
            ResourceKind::Endpoint => control.delete_endpoint(&resource.name).await,
            ResourceKind::EndpointConfig => control.delete_endpoint_config(&resource.name).await,
            ResourceKind::Model => control.delete_model(&resource.name).await,
        };

        if let Err(e) = result {
            warn!("Failed to delete {}: {}", resource, e);
            return Err(DeployError::Teardown {
                failed: resource.clone(),
                remaining: resources[index..].to_vec(),
                source: Box::new(e),
            });
        }

        info!("Deleted {}", resource);
        deleted.push(resource.clone());
    }

    Ok(TeardownReport { deleted })
}

/// Remove an endpoint, its configuration and its model
pub async fn teardown_endpoint(
    control: &dyn ControlPlane,
    endpoint_name: &str,
) -> Result<TeardownReport> {
    let resources = discover_resources(control, endpoint_name).await?;
    delete_resources(control, &resources).await
}
