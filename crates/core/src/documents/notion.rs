//! Workspace wiki full-text search. Only page titles are returned.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::DocumentSource;
use crate::config::CatalystConfig;
use crate::error::{ensure_success, read_json, CatalystError};
use crate::models::{ContextDocument, DocumentKind};

const SERVICE: &str = "Notion";
const NOTION_VERSION: &str = "2022-06-28";
const UNTITLED: &str = "Untitled";

#[derive(Clone)]
pub struct NotionSearcher {
    client: reqwest::Client,
    base_url: String,
}

impl NotionSearcher {
    pub fn new(config: &CatalystConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: config.endpoints.notion.clone(),
        }
    }

    async fn search_pages(
        &self,
        access_token: &str,
        query: &str,
    ) -> Result<Vec<ContextDocument>, CatalystError> {
        let url = format!("{}/v1/search", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&json!({ "query": query }))
            .send()
            .await?;

        let response = ensure_success(SERVICE, response).await?;
        let results: SearchResponse = read_json(SERVICE, response).await?;
        Ok(results
            .results
            .iter()
            .map(|page| ContextDocument::new(DocumentKind::Notion, page_title(page)))
            .collect())
    }
}

#[async_trait]
impl DocumentSource for NotionSearcher {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Notion
    }

    async fn search(&self, access_token: &str, query: &str) -> Vec<ContextDocument> {
        self.search_pages(access_token, query)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Error searching Notion");
                Vec::new()
            })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

/// `properties.title.title[0].plain_text`, or "Untitled" when any piece is missing.
///
/// Results are kept as raw JSON because pages and databases differ in shape.
fn page_title(page: &serde_json::Value) -> String {
    page.pointer("/properties/title/title/0/plain_text")
        .and_then(|v| v.as_str())
        .unwrap_or(UNTITLED)
        .to_string()
}
