//! Apply-time error types

use convoy_core::ConfigError;
use thiserror::Error;

/// Errors raised while validating, provisioning or destroying.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Platform not found: {0}")]
    PlatformNotFound(String),

    #[error("{kind} not found: {name}")]
    ReferenceNotFound { kind: &'static str, name: String },

    #[error("Conflicting configuration: {0}")]
    ConfigurationConflict(String),

    #[error("Remote call failed: {0}")]
    RemoteCallFailure(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CloudError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        CloudError::ReferenceNotFound {
            kind,
            name: name.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
