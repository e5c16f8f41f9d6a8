//! Configuration validation

use super::models::*;
use crate::aws::{account_id_from_role_arn, validate_region};
use tracing::debug;

/// Validation hook for configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl Validate for ArtifactConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("Artifact path cannot be empty".to_string());
        }
        if self.path.file_name().is_none() {
            return Err(format!("Artifact path has no file name: {}", self.path.display()));
        }
        if self.key_prefix.trim_matches('/').is_empty() {
            return Err("Artifact key prefix cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Validate for InferenceCodeConfig {
    fn validate(&self) -> Result<(), String> {
        if self.entry_point.is_empty() {
            return Err("Entry point cannot be empty".to_string());
        }
        if self.entry_point.contains('/') || self.entry_point.contains('\\') {
            return Err(format!(
                "Entry point must be a file name inside the source dir, got {}",
                self.entry_point
            ));
        }
        if self.source_dir.as_os_str().is_empty() {
            return Err("Source dir cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Validate for ImageConfig {
    fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("framework", &self.framework),
            ("version", &self.version),
            ("py_version", &self.py_version),
            ("image_scope", &self.image_scope),
        ] {
            if value.is_empty() {
                return Err(format!("Image {} cannot be empty", field));
            }
        }
        Ok(())
    }
}

impl Validate for EndpointSettings {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating endpoint settings");

        // Names are limited to 63 characters; leave room for "-<unix seconds>"
        if self.name_prefix.is_empty() || self.name_prefix.len() > 52 {
            return Err("Endpoint name prefix must be 1 to 52 characters".to_string());
        }
        if !self
            .name_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
            || self.name_prefix.starts_with('-')
        {
            return Err(format!(
                "Endpoint name prefix may only contain letters, digits and inner hyphens: {}",
                self.name_prefix
            ));
        }
        if self.instance_type.is_empty() {
            return Err("Instance type cannot be empty".to_string());
        }
        if self.initial_instance_count == 0 {
            return Err("Initial instance count must be greater than 0".to_string());
        }
        if self.poll_interval_secs == 0 {
            return Err("Poll interval must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for AwsConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(region) = &self.region {
            validate_region(region).map_err(|e| e.to_string())?;
        }
        if let Some(role_arn) = &self.role_arn {
            account_id_from_role_arn(role_arn).map_err(|e| e.to_string())?;
        }
        if let Some(bucket) = &self.bucket {
            if bucket.len() < 3 || bucket.len() > 63 {
                return Err(format!("Bucket name must be 3 to 63 characters: {}", bucket));
            }
        }
        for (field, value) in [
            ("s3_endpoint", &self.s3_endpoint),
            ("control_endpoint", &self.control_endpoint),
            ("runtime_endpoint", &self.runtime_endpoint),
        ] {
            if let Some(value) = value {
                let url = url::Url::parse(value)
                    .map_err(|e| format!("{} has invalid URL format: {}", field, e))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(format!("{} must use http:// or https://", field));
                }
            }
        }
        if self.timeout_seconds == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}
