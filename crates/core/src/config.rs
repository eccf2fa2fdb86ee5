//! # Catalyst Config
//!
//! Process-wide configuration, read once at startup and shared read-only
//! with every component. Vendor credentials come from the environment
//! (optionally seeded from a `.env` file); endpoint base URLs default to the
//! public vendor APIs and can be overridden for staging or mock servers.

use std::time::Duration;

use crate::error::CatalystError;

/// Default summarization model on the hosted inference API
pub const DEFAULT_HF_MODEL: &str = "sshleifer/distilbart-cnn-12-6";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("catalyst-agent/", env!("CARGO_PKG_VERSION"));

/// Base URLs for every upstream vendor API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Identity provider (session validation + token vault)
    pub descope: String,
    /// Calendar API, including the version segment
    pub calendar: String,
    /// Drive API, including the version segment
    pub drive: String,
    /// Wiki API root (the `/v1` segment is added per call)
    pub notion: String,
    /// Chat API root (methods are appended directly)
    pub slack: String,
    /// Hosted inference API root
    pub huggingface: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            descope: "https://api.descope.com".to_string(),
            calendar: "https://www.googleapis.com/calendar/v3".to_string(),
            drive: "https://www.googleapis.com/drive/v3".to_string(),
            notion: "https://api.notion.com".to_string(),
            slack: "https://slack.com/api".to_string(),
            huggingface: "https://api-inference.huggingface.co".to_string(),
        }
    }
}

impl Endpoints {
    /// Point every vendor at one base URL, each under its own path prefix.
    ///
    /// Used to route the whole pipeline at a single mock server.
    pub fn all_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            descope: base.to_string(),
            calendar: format!("{}/calendar/v3", base),
            drive: format!("{}/drive/v3", base),
            notion: base.to_string(),
            slack: format!("{}/slack", base),
            huggingface: base.to_string(),
        }
    }
}

/// Configuration for the whole agent
#[derive(Clone)]
pub struct CatalystConfig {
    /// Identity provider project id
    pub project_id: String,
    /// Identity provider management key (token vault access)
    pub management_key: String,
    /// Inference API key for the summarization model
    pub hf_api_key: String,
    /// Summarization model id
    pub hf_model: String,
    /// HTTP port for the server
    pub port: u16,
    /// Per-request timeout for upstream calls
    pub http_timeout: Duration,
    /// Vendor base URLs
    pub endpoints: Endpoints,
}

impl std::fmt::Debug for CatalystConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalystConfig")
            .field("project_id", &self.project_id)
            .field("management_key", &"<redacted>")
            .field("hf_api_key", &"<redacted>")
            .field("hf_model", &self.hf_model)
            .field("port", &self.port)
            .field("http_timeout", &self.http_timeout)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl CatalystConfig {
    /// Create a config with explicit credentials and default everything else
    pub fn new(
        project_id: impl Into<String>,
        management_key: impl Into<String>,
        hf_api_key: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            management_key: management_key.into(),
            hf_api_key: hf_api_key.into(),
            hf_model: DEFAULT_HF_MODEL.to_string(),
            port: DEFAULT_PORT,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            endpoints: Endpoints::default(),
        }
    }

    /// Override vendor endpoints
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Load from the process environment, after seeding it from `.env` if present.
    pub fn from_env() -> Result<Self, CatalystError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CatalystError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, CatalystError> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(CatalystError::MissingConfig(name))
        };
        let optional = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = Self::new(
            required("DESCOPE_PROJECT_ID")?,
            required("DESCOPE_MANAGEMENT_KEY")?,
            required("HUGGINGFACE_API_KEY")?,
        );

        if let Some(model) = optional("CATALYST_HF_MODEL") {
            config.hf_model = model;
        }
        if let Some(port) = optional("PORT") {
            config.port = port.parse().map_err(|_| CatalystError::InvalidConfig {
                name: "PORT",
                reason: format!("'{}' is not a valid port", port),
            })?;
        }
        if let Some(secs) = optional("CATALYST_HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| CatalystError::InvalidConfig {
                name: "CATALYST_HTTP_TIMEOUT_SECS",
                reason: format!("'{}' is not a whole number of seconds", secs),
            })?;
            if secs == 0 {
                return Err(CatalystError::InvalidConfig {
                    name: "CATALYST_HTTP_TIMEOUT_SECS",
                    reason: "timeout must be at least one second".to_string(),
                });
            }
            config.http_timeout = Duration::from_secs(secs);
        }

        let endpoints = &mut config.endpoints;
        for (name, slot) in [
            ("CATALYST_DESCOPE_URL", &mut endpoints.descope),
            ("CATALYST_CALENDAR_URL", &mut endpoints.calendar),
            ("CATALYST_DRIVE_URL", &mut endpoints.drive),
            ("CATALYST_NOTION_URL", &mut endpoints.notion),
            ("CATALYST_SLACK_URL", &mut endpoints.slack),
            ("CATALYST_HF_URL", &mut endpoints.huggingface),
        ] {
            if let Some(url) = optional(name) {
                *slot = url.trim_end_matches('/').to_string();
            }
        }

        Ok(config)
    }

    /// Bearer credential for identity-provider management calls
    pub fn identity_credentials(&self) -> String {
        format!("{}:{}", self.project_id, self.management_key)
    }

    /// Build the shared HTTP client used by every vendor component
    pub fn http_client(&self) -> Result<reqwest::Client, CatalystError> {
        reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.http_timeout)
            .build()
            .map_err(CatalystError::Http)
    }
}
