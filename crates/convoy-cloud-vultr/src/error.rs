//! Vultr API error types

use convoy_cloud::CloudError;
use thiserror::Error;

/// Vultr client errors
#[derive(Error, Debug)]
pub enum VultrError {
    #[error("VULTR_API_KEY is not set")]
    MissingApiKey,

    #[error("vultr api request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("vultr api {endpoint} returned {status}: {body}")]
    Api {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("unexpected vultr api payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("script content is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl From<VultrError> for CloudError {
    fn from(err: VultrError) -> Self {
        match err {
            VultrError::MissingApiKey => CloudError::InvalidConfig(err.to_string()),
            other => CloudError::RemoteCallFailure(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, VultrError>;
