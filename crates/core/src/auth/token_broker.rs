//! # Token Broker
//!
//! Resolves per-provider OAuth tokens for a user from the identity
//! provider's token vault. One vault call per provider; anything short of a
//! well-formed 2xx record means "not connected" for that provider.

use super::SERVICE;
use crate::config::CatalystConfig;
use crate::error::{ensure_success, read_json, CatalystError};
use crate::models::{Provider, ProviderTokenRecord, ProviderTokenSet};

/// Fetches provider tokens from the vault
#[derive(Clone)]
pub struct TokenBroker {
    client: reqwest::Client,
    base_url: String,
    credentials: String,
}

impl TokenBroker {
    pub fn new(config: &CatalystConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: config.endpoints.descope.clone(),
            credentials: config.identity_credentials(),
        }
    }

    /// Resolve every known provider for `login_id`.
    ///
    /// Never fails: providers that could not be resolved are simply absent
    /// from the returned set.
    pub async fn fetch(&self, login_id: &str) -> ProviderTokenSet {
        self.fetch_providers(login_id, &Provider::all()).await
    }

    /// Resolve a chosen subset of providers, in the given order
    pub async fn fetch_providers(&self, login_id: &str, providers: &[Provider]) -> ProviderTokenSet {
        let mut set = ProviderTokenSet::new(login_id);
        for &provider in providers {
            match self.fetch_one(login_id, provider).await {
                Ok(record) => {
                    tracing::debug!(login_id, %provider, "Provider token resolved");
                    set.insert(provider, record);
                }
                Err(e) => {
                    tracing::warn!(login_id, %provider, error = %e, "Error fetching provider token");
                }
            }
        }
        set
    }

    async fn fetch_one(
        &self,
        login_id: &str,
        provider: Provider,
    ) -> Result<ProviderTokenRecord, CatalystError> {
        let url = format!("{}/v1/mgmt/user/provider/token", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.credentials)
            .query(&[("loginId", login_id), ("provider", provider.as_str())])
            .send()
            .await?;

        let response = ensure_success(SERVICE, response).await?;
        let record: ProviderTokenRecord = read_json(SERVICE, response).await?;
        if record.access_token.is_empty() {
            return Err(CatalystError::payload(SERVICE, "empty access token"));
        }
        Ok(record)
    }
}
