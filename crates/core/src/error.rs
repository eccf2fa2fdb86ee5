//! # Errors
//!
//! One error type for every vendor boundary. Components use it internally
//! and decide at their public edge whether a failure degrades (empty list,
//! absent token, sentinel briefing) or propagates (session validation).

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum CatalystError {
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    #[error("Invalid configuration for {name}: {reason}")]
    InvalidConfig { name: &'static str, reason: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} API error ({status}): {body}")]
    Api {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Malformed {service} response: {reason}")]
    InvalidPayload {
        service: &'static str,
        reason: String,
    },

    #[error("{service} rejected the request: {error}")]
    Vendor {
        service: &'static str,
        error: String,
    },

    #[error("Invalid session: {0}")]
    InvalidSession(String),
}

impl CatalystError {
    /// Read the body of a non-2xx response into an `Api` error
    pub(crate) async fn from_response(service: &'static str, response: reqwest::Response) -> Self {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        CatalystError::Api {
            service,
            status,
            body,
        }
    }

    pub(crate) fn payload(service: &'static str, reason: impl std::fmt::Display) -> Self {
        CatalystError::InvalidPayload {
            service,
            reason: reason.to_string(),
        }
    }
}

/// Return the response if it is 2xx, otherwise an `Api` error carrying its body
pub(crate) async fn ensure_success(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, CatalystError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(CatalystError::from_response(service, response).await)
    }
}

/// Parse a JSON body, reporting decode failures as a malformed payload
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    service: &'static str,
    response: reqwest::Response,
) -> Result<T, CatalystError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| CatalystError::payload(service, e))
}
