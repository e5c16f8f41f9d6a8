//! Helper functions for creating specific error types

use super::types::DeployError;
use crate::platform::ResourceRef;

impl DeployError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage(message.into())
    }

    pub fn catalog<S: Into<String>>(message: S) -> Self {
        Self::Catalog(message.into())
    }

    pub fn signing<S: Into<String>>(message: S) -> Self {
        Self::Signing(message.into())
    }

    pub fn api<O, C, M>(operation: O, status: u16, code: C, message: M) -> Self
    where
        O: Into<String>,
        C: Into<String>,
        M: Into<String>,
    {
        Self::Api {
            operation: operation.into(),
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn provisioning<E, S, R>(endpoint: E, status: S, reason: R) -> Self
    where
        E: Into<String>,
        S: Into<String>,
        R: Into<String>,
    {
        Self::Provisioning {
            endpoint: endpoint.into(),
            status: status.into(),
            reason: reason.into(),
        }
    }

    pub fn inference<E: Into<String>, M: Into<String>>(endpoint: E, message: M) -> Self {
        Self::Inference {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Wrap a failure with the resources that are still billing.
    ///
    /// Returns the error unchanged when nothing was created yet.
    pub fn left_running(self, resources: Vec<ResourceRef>) -> Self {
        if resources.is_empty() {
            return self;
        }
        Self::ResourcesLeftRunning {
            resources,
            source: Box::new(self),
        }
    }

    /// Platform error code, if this error came from a platform API
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            Self::Teardown { source, .. } | Self::ResourcesLeftRunning { source, .. } => {
                source.api_code()
            }
            _ => None,
        }
    }

    /// Resources reported as still running by this error
    pub fn orphaned_resources(&self) -> &[ResourceRef] {
        match self {
            Self::Teardown { remaining, .. } => remaining,
            Self::ResourcesLeftRunning { resources, .. } => resources,
            _ => &[],
        }
    }
}
