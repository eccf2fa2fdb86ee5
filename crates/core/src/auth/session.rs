//! # Session Validator
//!
//! Verifies a caller-supplied session token with the identity provider and
//! extracts the stable user id. Single attempt, fail-fast.

use serde_json::{Map, Value};

use super::SERVICE;
use crate::config::CatalystConfig;
use crate::error::{ensure_success, read_json, CatalystError};
use crate::models::UserIdentity;

/// Validates opaque session tokens against the identity provider
#[derive(Clone)]
pub struct SessionValidator {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
}

impl SessionValidator {
    pub fn new(config: &CatalystConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: config.endpoints.descope.clone(),
            project_id: config.project_id.clone(),
        }
    }

    /// Validate a session token, returning the user it belongs to.
    ///
    /// Any failure (empty token, non-2xx, network error, missing `sub`) is an
    /// error; callers should surface it as a generic "invalid session".
    #[tracing::instrument(skip_all)]
    pub async fn validate(&self, session_token: &str) -> Result<UserIdentity, CatalystError> {
        let session_token = session_token.trim();
        if session_token.is_empty() {
            return Err(CatalystError::InvalidSession("empty token".to_string()));
        }

        let url = format!("{}/v1/auth/validate", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(format!("{}:{}", self.project_id, session_token))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Session validation request failed");
                CatalystError::Http(e)
            })?;

        let response = ensure_success(SERVICE, response).await.map_err(|e| {
            tracing::warn!(error = %e, "Session validation rejected");
            e
        })?;
        let body: Value = read_json(SERVICE, response).await?;
        let identity = identity_from_claims(body)?;

        tracing::info!(user_id = %identity.user_id, "Session is valid");
        Ok(identity)
    }
}

/// Pull the subject out of a validation response.
///
/// Claims may be returned at the top level or wrapped in a `token` object.
fn identity_from_claims(body: Value) -> Result<UserIdentity, CatalystError> {
    let mut claims: Map<String, Value> = match body {
        Value::Object(mut map) => match map.remove("token") {
            Some(Value::Object(inner)) => inner,
            Some(other) => {
                map.insert("token".to_string(), other);
                map
            }
            None => map,
        },
        _ => return Err(CatalystError::payload(SERVICE, "expected a JSON object")),
    };

    let user_id = match claims.remove("sub") {
        Some(Value::String(sub)) if !sub.trim().is_empty() => sub,
        _ => {
            return Err(CatalystError::InvalidSession(
                "could not extract user id".to_string(),
            ))
        }
    };

    Ok(UserIdentity { user_id, claims })
}
