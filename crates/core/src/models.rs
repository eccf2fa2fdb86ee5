//! # Catalyst Models
//!
//! Typed records for everything that crosses a vendor boundary. Each client
//! decodes the vendor payload into one of these types in a single place, so
//! the orchestrator never deals with missing keys or loosely shaped JSON.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Fixed text delivered in place of a briefing when summarization fails
pub const BRIEFING_ERROR: &str = "Error: Could not generate briefing.";

/// Third-party integrations a user may have connected through the token vault
///
/// - Google - calendar and drive share one OAuth grant
/// - Notion - workspace wiki
/// - Slack - direct-message delivery
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Notion,
    Slack,
}

impl Provider {
    /// All providers, in the order the token broker resolves them
    pub fn all() -> [Provider; 3] {
        [Provider::Google, Provider::Notion, Provider::Slack]
    }

    /// Provider name as known to the token vault
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Notion => "notion",
            Provider::Slack => "slack",
        }
    }

    /// Display name for logs and UI
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Google => "Google",
            Provider::Notion => "Notion",
            Provider::Slack => "Slack",
        }
    }

}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token expiry as reported by the vault (epoch seconds or a timestamp string)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Expiration {
    Epoch(i64),
    Text(String),
}

/// One OAuth token held by the vault on behalf of a user
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderTokenRecord {
    pub provider: String,
    /// The user's id inside the provider (Slack member id, Google subject, ...)
    #[serde(default)]
    pub provider_user_id: Option<String>,
    pub access_token: String,
    #[serde(default)]
    pub expiration: Option<Expiration>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// The vault sends `null` for fields it has no value for; treat that like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl fmt::Debug for ProviderTokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderTokenRecord")
            .field("provider", &self.provider)
            .field("provider_user_id", &self.provider_user_id)
            .field("access_token", &"<redacted>")
            .field("expiration", &self.expiration)
            .field("scopes", &self.scopes)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Tokens resolved for one user during one run. Never persisted.
///
/// A provider missing from the set is not connected; that is an expected
/// state for optional providers.
#[derive(Debug, Clone, Default)]
pub struct ProviderTokenSet {
    pub login_id: String,
    records: HashMap<Provider, ProviderTokenRecord>,
}

impl ProviderTokenSet {
    pub fn new(login_id: impl Into<String>) -> Self {
        Self {
            login_id: login_id.into(),
            records: HashMap::new(),
        }
    }

    pub fn insert(&mut self, provider: Provider, record: ProviderTokenRecord) {
        self.records.insert(provider, record);
    }

    pub fn get(&self, provider: Provider) -> Option<&ProviderTokenRecord> {
        self.records.get(&provider)
    }

    pub fn is_connected(&self, provider: Provider) -> bool {
        self.records.contains_key(&provider)
    }

    /// Connected providers in broker order
    pub fn connected(&self) -> Vec<Provider> {
        Provider::all()
            .into_iter()
            .filter(|p| self.is_connected(*p))
            .collect()
    }
}

/// Identity extracted from a validated session
#[derive(Debug, Clone, PartialEq)]
pub struct UserIdentity {
    /// Stable subject identifier (`sub` claim)
    pub user_id: String,
    /// Remaining claims, kept for callers that need more than the subject
    pub claims: serde_json::Map<String, serde_json::Value>,
}

/// Snapshot of one upcoming calendar event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Meeting {
    pub title: String,
    pub attendees: Vec<String>,
    pub start: Option<DateTime<Utc>>,
}

impl Meeting {
    /// Keyword used to search document stores: the title up to its first space
    pub fn search_query(&self) -> &str {
        self.title.split(' ').next().unwrap_or_default()
    }
}

/// Where a context document came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Drive,
    Notion,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Drive => f.write_str("drive"),
            DocumentKind::Notion => f.write_str("notion"),
        }
    }
}

/// Plain text gathered from a document store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextDocument {
    pub kind: DocumentKind,
    pub text: String,
}

impl ContextDocument {
    pub fn new(kind: DocumentKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Result of summarization
///
/// `Unavailable` renders as [`BRIEFING_ERROR`], which is what gets delivered
/// when the model call fails; use [`Briefing::is_available`] to tell the two
/// apart instead of comparing strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Briefing {
    Summary(String),
    Unavailable,
}

impl Briefing {
    pub fn as_text(&self) -> &str {
        match self {
            Briefing::Summary(text) => text,
            Briefing::Unavailable => BRIEFING_ERROR,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Briefing::Summary(_))
    }
}

impl fmt::Display for Briefing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text())
    }
}
