//! Drive file search: name-contains match, folders excluded, at most three
//! files. Native documents are exported as plain text, everything else is
//! downloaded as-is and decoded as lossy UTF-8.

use async_trait::async_trait;
use serde::Deserialize;

use super::DocumentSource;
use crate::config::CatalystConfig;
use crate::error::{ensure_success, read_json, CatalystError};
use crate::models::{ContextDocument, DocumentKind};

const SERVICE: &str = "Google Drive";
/// Maximum files fetched per search
pub const MAX_FILES: u32 = 3;
const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
const NATIVE_MIME_MARKER: &str = "google-apps";

#[derive(Clone)]
pub struct DriveSearcher {
    client: reqwest::Client,
    base_url: String,
}

impl DriveSearcher {
    pub fn new(config: &CatalystConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: config.endpoints.drive.clone(),
        }
    }

    async fn search_files(
        &self,
        access_token: &str,
        query: &str,
    ) -> Result<Vec<ContextDocument>, CatalystError> {
        let url = format!("{}/files", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("q", name_query(query)),
                ("pageSize", MAX_FILES.to_string()),
                ("fields", "files(id, name, mimeType)".to_string()),
            ])
            .send()
            .await?;

        let response = ensure_success(SERVICE, response).await?;
        let listing: FileList = read_json(SERVICE, response).await?;
        if listing.files.is_empty() {
            tracing::info!(query, "No files found in Drive");
            return Ok(Vec::new());
        }

        let mut documents = Vec::with_capacity(listing.files.len());
        for file in listing.files.iter().take(MAX_FILES as usize) {
            let bytes = self.fetch_content(access_token, file).await?;
            tracing::debug!(file = %file.name, bytes = bytes.len(), "Fetched Drive file");
            documents.push(ContextDocument::new(
                DocumentKind::Drive,
                String::from_utf8_lossy(&bytes).into_owned(),
            ));
        }
        Ok(documents)
    }

    async fn fetch_content(
        &self,
        access_token: &str,
        file: &DriveFile,
    ) -> Result<Vec<u8>, CatalystError> {
        let file_url = format!("{}/files/{}", self.base_url, urlencoding::encode(&file.id));
        let request = if file.is_native() {
            self.client
                .get(format!("{}/export", file_url))
                .query(&[("mimeType", "text/plain")])
        } else {
            self.client.get(&file_url).query(&[("alt", "media")])
        };

        let response = request.bearer_auth(access_token).send().await?;
        let response = ensure_success(SERVICE, response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl DocumentSource for DriveSearcher {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Drive
    }

    async fn search(&self, access_token: &str, query: &str) -> Vec<ContextDocument> {
        self.search_files(access_token, query)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "An error occurred with Google Drive API");
                Vec::new()
            })
    }
}

/// Drive `q` expression: file name contains `query`, folders excluded
fn name_query(query: &str) -> String {
    let escaped = query.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "name contains '{}' and mimeType != '{}'",
        escaped, FOLDER_MIME
    )
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    mime_type: String,
}

impl DriveFile {
    fn is_native(&self) -> bool {
        self.mime_type.contains(NATIVE_MIME_MARKER)
    }
}
