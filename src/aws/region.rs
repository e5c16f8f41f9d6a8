//! AWS region handling
//!
//! Region code checks and partition DNS suffixes for building service URLs.

use crate::utils::error::{DeployError, Result};

/// Check that `region` is shaped like an AWS region code
///
/// `us-east-1`, `ap-southeast-5`, `us-gov-west-1`. Whether a service is
/// actually offered there is left to the catalog and the service itself.
pub fn validate_region(region: &str) -> Result<()> {
    let is_code = |part: &&str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    };
    let parts: Vec<&str> = region.split('-').collect();
    let well_formed = parts.len() >= 3
        && parts.iter().all(is_code)
        && parts[0].chars().all(|c| c.is_ascii_lowercase())
        && parts
            .last()
            .is_some_and(|number| number.chars().all(|c| c.is_ascii_digit()));

    if well_formed {
        Ok(())
    } else {
        Err(DeployError::config(format!(
            "Invalid AWS region: {}. Expected a region code such as us-east-1",
            region
        )))
    }
}

/// DNS suffix of the partition the region belongs to
pub fn dns_suffix(region: &str) -> &'static str {
    if region.starts_with("cn-") {
        "amazonaws.com.cn"
    } else {
        "amazonaws.com"
    }
}
