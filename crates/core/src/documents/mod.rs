//! # Document Search
//!
//! Pulls meeting context out of connected document stores. Every source is
//! best-effort: an unreachable or failing store contributes nothing and the
//! pipeline carries on with whatever the others returned.
//!
//! ## Sources
//!
//! - `drive` - file name search, then plain-text export or raw download
//! - `notion` - workspace full-text search, page titles only

pub mod drive;
pub mod notion;

use async_trait::async_trait;

use crate::models::{ContextDocument, DocumentKind};

pub use drive::DriveSearcher;
pub use notion::NotionSearcher;

/// A document store that can be searched with a provider access token
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Which store this is
    fn kind(&self) -> DocumentKind;

    /// Search for `query`, returning plain-text content.
    ///
    /// Implementations swallow their own failures and return an empty list.
    async fn search(&self, access_token: &str, query: &str) -> Vec<ContextDocument>;
}

/// Run several sources in order and concatenate their results.
///
/// Order is preserved: all documents of the first source come before those
/// of the second, and so on. Sources without a token are skipped.
pub async fn gather(
    sources: &[(&dyn DocumentSource, Option<&str>)],
    query: &str,
) -> Vec<ContextDocument> {
    let mut documents = Vec::new();
    for (source, token) in sources {
        match token {
            Some(token) => {
                let found = source.search(token, query).await;
                tracing::info!(
                    source = %source.kind(),
                    count = found.len(),
                    query,
                    "Document search finished"
                );
                documents.extend(found);
            }
            None => {
                tracing::info!(source = %source.kind(), "Document source not connected, skipping");
            }
        }
    }
    documents
}
