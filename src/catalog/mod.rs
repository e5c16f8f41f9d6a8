//! Serving image catalog
//!
//! Resolves `(framework, version, python version, scope, region, instance type)`
//! to a container image in the regional ECR registry. The tables are compiled
//! in; no network call is made.

mod tables;

use tracing::debug;

use crate::aws::dns_suffix;
use crate::platform::{ImageCatalog, ImageQuery};
use crate::utils::error::{DeployError, Result};
use tables::{KNOWN_FRAMEWORKS, framework_images};

/// Catalog backed by the compiled-in image tables
#[derive(Debug, Clone, Default)]
pub struct StaticImageCatalog;

impl StaticImageCatalog {
    pub fn new() -> Self {
        Self
    }
}

/// Processor family an instance type runs on
///
/// `ml.p3.2xlarge` -> gpu, `ml.inf2.xlarge` -> inf, `ml.m5.large` -> cpu.
pub fn processor_for_instance(instance_type: &str) -> Result<&'static str> {
    match instance_type {
        "local" => return Ok("cpu"),
        "local_gpu" => return Ok("gpu"),
        _ => {}
    }

    let family = instance_type
        .strip_prefix("ml.")
        .and_then(|rest| rest.split('.').next())
        .filter(|family| !family.is_empty())
        .ok_or_else(|| {
            DeployError::catalog(format!(
                "Invalid instance type: {}. Expected ml.<family>.<size>, local or local_gpu",
                instance_type
            ))
        })?;

    if family.starts_with("inf") {
        Ok("inf")
    } else if family.starts_with("trn") {
        Ok("trn")
    } else if family.starts_with('p') || family.starts_with('g') {
        Ok("gpu")
    } else {
        Ok("cpu")
    }
}

impl ImageCatalog for StaticImageCatalog {
    fn retrieve(&self, query: &ImageQuery) -> Result<String> {
        let images = framework_images(&query.framework, &query.image_scope).ok_or_else(|| {
            DeployError::catalog(format!(
                "No {} images for framework {}. Known frameworks: {:?}",
                query.image_scope, query.framework, KNOWN_FRAMEWORKS
            ))
        })?;

        let version = images
            .version_aliases
            .iter()
            .find(|(alias, _)| *alias == query.version)
            .map(|(_, full)| *full)
            .unwrap_or(query.version.as_str());

        let py_versions = images
            .versions
            .iter()
            .find(|(v, _)| *v == version)
            .map(|(_, py)| *py)
            .ok_or_else(|| {
                let supported: Vec<&str> = images.versions.iter().map(|(v, _)| *v).collect();
                DeployError::catalog(format!(
                    "Unsupported {} version: {}. Supported versions: {:?}",
                    query.framework, query.version, supported
                ))
            })?;

        if !py_versions.contains(&query.py_version.as_str()) {
            return Err(DeployError::catalog(format!(
                "Unsupported python version {} for {} {}. Supported: {:?}",
                query.py_version, query.framework, version, py_versions
            )));
        }

        let processor = processor_for_instance(&query.instance_type)?;
        if !images.processors.contains(&processor) {
            return Err(DeployError::catalog(format!(
                "No {} {} image for processor {} (instance type {})",
                query.framework, query.image_scope, processor, query.instance_type
            )));
        }

        let registry = images.registries.get(query.region.as_str()).ok_or_else(|| {
            DeployError::catalog(format!(
                "No {} image registry in region {}",
                images.repository, query.region
            ))
        })?;

        let image = format!(
            "{}.dkr.ecr.{}.{}/{}:{}-{}-{}",
            registry,
            query.region,
            dns_suffix(&query.region),
            images.repository,
            version,
            processor,
            query.py_version
        );
        debug!("Resolved image for {:?}: {}", query, image);
        Ok(image)
    }
}
