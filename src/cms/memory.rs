//! In-memory content source for tests

use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::{resolve_link, ContentRef, ContentSource, Document, Query, SearchResponse};
use crate::error::{BlogError, Result};

/// Serves canned pages and documents, recording every fetch
#[derive(Default)]
pub struct MemorySource {
    first_page: SearchResponse,
    pages: HashMap<String, SearchResponse>,
    documents: Vec<Document>,
    drafts: HashMap<String, Vec<Document>>,
    failing: Mutex<HashSet<String>>,
    fetches: Mutex<Vec<String>>,
}

impl MemorySource {
    pub fn new(first_page: SearchResponse) -> Self {
        Self {
            first_page,
            ..Self::default()
        }
    }

    pub fn with_page(mut self, url: &str, page: SearchResponse) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn with_document(mut self, doc: Document) -> Self {
        self.documents.push(doc);
        self
    }

    pub fn with_draft(mut self, token: &str, doc: Document) -> Self {
        self.drafts.entry(token.to_string()).or_default().push(doc);
        self
    }

    /// Make requests for `url` fail until `recover` is called
    pub fn fail(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    pub fn recover(&self, url: &str) {
        self.failing.lock().unwrap().remove(url);
    }

    /// Every URL or query served so far, in order
    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }

    fn record(&self, what: &str) -> Result<()> {
        self.fetches.lock().unwrap().push(what.to_string());
        if self.failing.lock().unwrap().contains(what) {
            return Err(BlogError::Status {
                status: 503,
                url: what.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn query(&self, query: &Query) -> Result<SearchResponse> {
        self.record(&query.q())?;
        Ok(self.first_page.clone())
    }

    async fn fetch_page(&self, url: &str) -> Result<SearchResponse> {
        self.record(url)?;
        self.pages.get(url).cloned().ok_or_else(|| BlogError::Status {
            status: 404,
            url: url.to_string(),
        })
    }

    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        reference: &ContentRef,
    ) -> Result<Option<Document>> {
        self.record(&format!("{}:{}", doc_type, uid))?;
        let matches = |d: &&Document| d.doc_type == doc_type && d.uid.as_deref() == Some(uid);

        if let ContentRef::Preview(token) = reference {
            if let Some(doc) = self.drafts.get(token).and_then(|d| d.iter().find(matches)) {
                return Ok(Some(doc.clone()));
            }
        }
        Ok(self.documents.iter().find(matches).cloned())
    }

    async fn resolve_preview(&self, token: &str, document_id: &str) -> Result<String> {
        self.record(&format!("preview:{}", token))?;
        let drafts = self.drafts.get(token).ok_or(BlogError::InvalidPreviewToken)?;
        Ok(drafts
            .iter()
            .find(|d| d.id == document_id)
            .map(resolve_link)
            .unwrap_or_else(|| "/".to_string()))
    }
}

/// A listing result with the three display fields
pub fn summary_doc(uid: &str, title: &str) -> Document {
    let value = json!({
        "id": format!("id-{}", uid),
        "uid": uid,
        "type": "post",
        "first_publication_date": "2021-03-25T19:25:28+0000",
        "last_publication_date": "2021-03-25T19:25:28+0000",
        "data": {
            "title": title,
            "subtitle": format!("About {}", title),
            "author": "Joseph Oliveira"
        }
    });
    serde_json::from_value(value).unwrap()
}

/// A complete post document
pub fn full_doc(uid: &str, title: &str, last_modified: &str) -> Document {
    let value = json!({
        "id": format!("id-{}", uid),
        "uid": uid,
        "type": "post",
        "first_publication_date": "2021-03-25T19:25:28+0000",
        "last_publication_date": last_modified,
        "data": {
            "title": title,
            "subtitle": format!("About {}", title),
            "author": "Joseph Oliveira",
            "banner": { "url": "https://images.prismic.io/banner.png" },
            "content": [
                {
                    "heading": "Proin et varius",
                    "body": [
                        { "type": "paragraph", "text": "Lorem ipsum dolor sit amet", "spans": [] },
                        { "type": "paragraph", "text": "Nullam dolor sapien", "spans": [] }
                    ]
                },
                {
                    "heading": "Cras laoreet",
                    "body": [
                        { "type": "paragraph", "text": "Ut varius tempus <b>nunc</b>", "spans": [] }
                    ]
                }
            ]
        }
    });
    serde_json::from_value(value).unwrap()
}

pub fn page(results: Vec<Document>, next_page: Option<&str>) -> SearchResponse {
    SearchResponse {
        page: 1,
        total_results_size: results.len(),
        total_pages: 1,
        next_page: next_page.map(str::to_string),
        results,
    }
}
