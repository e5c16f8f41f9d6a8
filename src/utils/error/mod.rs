//! Error handling utilities
//!
//! Every failure in a deployment run is a [`DeployError`]; nothing is retried or
//! recovered locally.

mod helpers;
mod types;

pub use types::{DeployError, Result};
