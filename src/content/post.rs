//! Post models in display shape

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// A post as shown in the listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    /// CMS document id
    pub id: String,

    /// URL-friendly unique name (the document uid)
    pub slug: String,

    /// First publication, `None` for never-published drafts
    pub publication_date: Option<DateTime<FixedOffset>>,

    /// `publication_date` as `dd MMM yyyy`, empty when unpublished
    pub formatted_date: String,

    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A complete post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub summary: PostSummary,

    /// Banner image, absent when the editor left it empty
    pub banner_url: Option<String>,

    /// Last publication of any revision
    pub last_modified: Option<DateTime<FixedOffset>>,

    pub content: Vec<ContentBlock>,
}

/// A section of a post: a heading followed by paragraphs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentBlock {
    pub heading: String,
    pub body: Vec<TextSpan>,
}

/// One paragraph of plain text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextSpan {
    pub text: String,
}

impl ContentBlock {
    pub fn new(heading: impl Into<String>, body: &[&str]) -> Self {
        Self {
            heading: heading.into(),
            body: body
                .iter()
                .map(|text| TextSpan {
                    text: text.to_string(),
                })
                .collect(),
        }
    }
}
