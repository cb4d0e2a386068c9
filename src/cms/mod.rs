//! Headless CMS access
//!
//! The rest of the crate talks to the backend only through [`ContentSource`].
//! [`PrismicClient`] implements it over the Prismic REST API v2.

mod document;
mod link;
#[cfg(test)]
pub(crate) mod memory;
mod prismic;
mod query;

use async_trait::async_trait;

pub use document::{ApiInfo, ApiRef, Document, SearchResponse};
pub use link::{post_path, resolve_link, DocumentLink};
pub use prismic::PrismicClient;
pub use query::{ContentRef, Predicate, Query};

use crate::error::Result;

/// Read access to the content backend
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Run a structured query and return its first page
    async fn query(&self, query: &Query) -> Result<SearchResponse>;

    /// Fetch a page by the opaque `next_page` URL of a previous response
    async fn fetch_page(&self, url: &str) -> Result<SearchResponse>;

    /// Look up one document by type and uid; `None` when nothing matches
    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        reference: &ContentRef,
    ) -> Result<Option<Document>>;

    /// Validate a preview token for a document and return the path to
    /// redirect to. Fails with `InvalidPreviewToken` when the backend
    /// rejects the pair.
    async fn resolve_preview(&self, token: &str, document_id: &str) -> Result<String>;
}
