//! Resource naming
//!
//! SageMaker resource names are limited to 63 characters of letters, digits
//! and hyphens.

use chrono::{DateTime, Utc};

/// Maximum length of a model, endpoint or endpoint configuration name
pub const MAX_NAME_LENGTH: usize = 63;

/// Endpoint name for one run: `<prefix>-<unix seconds>`
pub fn endpoint_name(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}", prefix, now.timestamp())
}

/// `<base>-<YYYY-MM-DD-HH-MM-SS-mmm>`, truncating `base` to fit the limit
pub fn name_from_base(base: &str, now: DateTime<Utc>) -> String {
    let timestamp = now.format("%Y-%m-%d-%H-%M-%S-%3f").to_string();
    let max_base = MAX_NAME_LENGTH - timestamp.len() - 1;
    let base: String = base.chars().take(max_base).collect();
    format!("{}-{}", base.trim_end_matches('-'), timestamp)
}

/// Repository part of an image reference
///
/// `763104351884.dkr.ecr.us-east-1.amazonaws.com/pytorch-inference:2.1.0-cpu-py310`
/// -> `pytorch-inference`
pub fn base_name_from_image(image: &str) -> String {
    let repository = image.rsplit('/').next().unwrap_or(image);
    let repository = repository.split(['@', ':']).next().unwrap_or(repository);
    let sanitized: String = repository
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let sanitized = sanitized.trim_matches('-');
    if sanitized.is_empty() {
        "model".to_string()
    } else {
        sanitized.to_string()
    }
}
