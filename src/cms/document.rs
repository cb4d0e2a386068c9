//! Raw document shapes as returned by the CMS REST API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single CMS document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,

    /// Unique, human readable identifier (used as the slug)
    #[serde(default)]
    pub uid: Option<String>,

    /// Custom type tag, e.g. `post`
    #[serde(rename = "type", default)]
    pub doc_type: String,

    #[serde(default)]
    pub first_publication_date: Option<String>,

    #[serde(default)]
    pub last_publication_date: Option<String>,

    /// Custom type fields
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Document {
    /// Read a plain string field from `data`
    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(Value::as_str)
    }
}

/// One page of query results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub page: usize,

    #[serde(default)]
    pub total_results_size: usize,

    #[serde(default)]
    pub total_pages: usize,

    /// Absolute URL of the next page, `null` on the last page
    #[serde(default)]
    pub next_page: Option<String>,

    #[serde(default)]
    pub results: Vec<Document>,
}

/// API root document, listing the available content references
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRef {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master: bool,
}

impl ApiInfo {
    /// Reference of the currently published content
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master)
            .map(|r| r.reference.as_str())
    }
}
