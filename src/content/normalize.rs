//! Raw CMS document -> display shape

use chrono_tz::Tz;
use serde_json::Value;

use super::{ContentBlock, PostDetail, PostSummary, TextSpan};
use crate::cms::Document;
use crate::error::{BlogError, Result};
use crate::helpers::{format_date, parse_cms_date};

/// Type tag of post documents
pub const POST_TYPE: &str = "post";

/// Build the listing shape of a post.
///
/// The document must be a `post` with a uid and string `title`,
/// `subtitle` and `author` fields. A missing or unparsable publication date
/// is not an error; it formats as an empty string.
pub fn normalize(doc: &Document, tz: &Tz) -> Result<PostSummary> {
    if doc.doc_type.is_empty() {
        return Err(BlogError::malformed(&doc.id, "missing type tag"));
    }
    if doc.doc_type != POST_TYPE {
        return Err(BlogError::malformed(
            &doc.id,
            format!("expected type '{}', got '{}'", POST_TYPE, doc.doc_type),
        ));
    }

    let slug = doc
        .uid
        .as_deref()
        .filter(|uid| !uid.is_empty())
        .ok_or_else(|| BlogError::malformed(&doc.id, "missing uid"))?;

    let publication_date = doc.first_publication_date.as_deref().and_then(parse_cms_date);

    Ok(PostSummary {
        id: doc.id.clone(),
        slug: slug.to_string(),
        formatted_date: format_date(publication_date.as_ref(), tz),
        publication_date,
        title: required_text(doc, "title")?,
        subtitle: required_text(doc, "subtitle")?,
        author: required_text(doc, "author")?,
    })
}

/// Build the full shape of a post
pub fn normalize_detail(doc: &Document, tz: &Tz) -> Result<PostDetail> {
    let summary = normalize(doc, tz)?;

    let banner_url = doc
        .data
        .get("banner")
        .and_then(|b| b.get("url"))
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string);

    let content = match doc.data.get("content") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(blocks)) => blocks
            .iter()
            .map(|b| content_block(&doc.id, b))
            .collect::<Result<Vec<_>>>()?,
        Some(_) => return Err(BlogError::malformed(&doc.id, "content is not a list")),
    };

    Ok(PostDetail {
        summary,
        banner_url,
        last_modified: doc.last_publication_date.as_deref().and_then(parse_cms_date),
        content,
    })
}

fn required_text(doc: &Document, field: &str) -> Result<String> {
    doc.text_field(field)
        .map(str::to_string)
        .ok_or_else(|| BlogError::malformed(&doc.id, format!("missing field '{}'", field)))
}

fn content_block(id: &str, value: &Value) -> Result<ContentBlock> {
    let heading = match value.get("heading") {
        Some(Value::String(s)) => s.clone(),
        None | Some(Value::Null) => String::new(),
        Some(_) => return Err(BlogError::malformed(id, "content heading is not text")),
    };

    let body = match value.get("body") {
        Some(Value::Array(spans)) => spans
            .iter()
            .filter_map(|span| span.get("text").and_then(Value::as_str))
            .map(|text| TextSpan {
                text: text.to_string(),
            })
            .collect(),
        None | Some(Value::Null) => Vec::new(),
        Some(_) => return Err(BlogError::malformed(id, "content body is not a list")),
    };

    Ok(ContentBlock { heading, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::memory::{full_doc, summary_doc};
    use chrono_tz::UTC;

    #[test]
    fn test_normalize_summary() {
        let post = normalize(&summary_doc("como-utilizar-hooks", "Como utilizar Hooks"), &UTC)
            .unwrap();
        assert_eq!(post.slug, "como-utilizar-hooks");
        assert_eq!(post.title, "Como utilizar Hooks");
        assert_eq!(post.subtitle, "About Como utilizar Hooks");
        assert_eq!(post.author, "Joseph Oliveira");
        assert_eq!(post.formatted_date, "25 mar 2021");
    }

    #[test]
    fn test_missing_publication_date_formats_empty() {
        let mut doc = summary_doc("draft", "Draft");
        doc.first_publication_date = None;
        let post = normalize(&doc, &UTC).unwrap();
        assert!(post.publication_date.is_none());
        assert_eq!(post.formatted_date, "");
    }

    #[test]
    fn test_missing_display_field_is_malformed() {
        let mut doc = summary_doc("no-author", "No author");
        doc.data.remove("author");
        match normalize(&doc, &UTC) {
            Err(BlogError::MalformedDocument { id, reason }) => {
                assert_eq!(id, "id-no-author");
                assert!(reason.contains("author"));
            }
            other => panic!("expected malformed document, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_type_or_uid_is_malformed() {
        let mut doc = summary_doc("typeless", "Typeless");
        doc.doc_type.clear();
        assert!(normalize(&doc, &UTC).is_err());

        let mut doc = summary_doc("page", "Page");
        doc.doc_type = "page".to_string();
        assert!(normalize(&doc, &UTC).is_err());

        let mut doc = summary_doc("uidless", "Uidless");
        doc.uid = None;
        assert!(normalize(&doc, &UTC).is_err());
    }

    #[test]
    fn test_normalize_detail() {
        let doc = full_doc("hooks", "Hooks", "2021-03-26T10:00:00+0000");
        let post = normalize_detail(&doc, &UTC).unwrap();
        assert_eq!(
            post.banner_url.as_deref(),
            Some("https://images.prismic.io/banner.png")
        );
        assert!(post.last_modified.is_some());
        assert_eq!(post.content.len(), 2);
        assert_eq!(post.content[0].heading, "Proin et varius");
        assert_eq!(post.content[0].body.len(), 2);
        assert_eq!(post.content[1].body[0].text, "Ut varius tempus <b>nunc</b>");
    }

    #[test]
    fn test_detail_without_banner_or_content() {
        let mut doc = full_doc("bare", "Bare", "2021-03-25T19:25:28+0000");
        doc.data.remove("banner");
        doc.data.remove("content");
        let post = normalize_detail(&doc, &UTC).unwrap();
        assert!(post.banner_url.is_none());
        assert!(post.content.is_empty());
    }

    #[test]
    fn test_detail_with_bad_content_is_malformed() {
        let mut doc = full_doc("bad", "Bad", "2021-03-25T19:25:28+0000");
        doc.data
            .insert("content".to_string(), Value::String("oops".to_string()));
        assert!(matches!(
            normalize_detail(&doc, &UTC),
            Err(BlogError::MalformedDocument { .. })
        ));
    }
}
