//! AWS plumbing shared by the SageMaker clients
//!
//! Credentials, region handling and Signature Version 4 request signing.

pub mod auth;
pub mod region;
pub mod sigv4;

pub use auth::{AwsAuth, account_id_from_role_arn};
pub use region::{dns_suffix, validate_region};
pub use sigv4::SigV4Signer;
