//! Provider error types

use thiserror::Error;

/// Errors that can occur during backend operations
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No API key configured
    #[error("API key is required for {provider}")]
    MissingApiKey { provider: String },

    /// The backend rejected the configured credentials
    #[error("{provider} rejected the API key: {message}")]
    Unauthorized { provider: String, message: String },

    /// API request failed
    #[error("{provider} API error ({status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    /// Network/HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid response from provider
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Create a missing API key error
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Classify a non-success HTTP status
    ///
    /// 401/403 (and key-invalid bodies some backends return as 400) mean
    /// the credential was rejected; everything else is a generic API error.
    pub fn from_status(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        let provider = provider.into();
        let message = message.into();
        if status == 401 || status == 403 || message.contains("API_KEY_INVALID") {
            Self::Unauthorized { provider, message }
        } else {
            Self::ApiError {
                provider,
                status,
                message,
            }
        }
    }

    /// Whether this error means "credentials missing or rejected"
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            Self::MissingApiKey { .. } | Self::Unauthorized { .. }
        )
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
