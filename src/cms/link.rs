//! Mapping documents to site paths

use super::Document;

/// The routable shape of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentLink {
    Post { uid: String },
    Other,
}

impl DocumentLink {
    pub fn of(doc: &Document) -> Self {
        match (doc.doc_type.as_str(), doc.uid.as_deref()) {
            ("post", Some(uid)) if !uid.is_empty() => Self::Post {
                uid: uid.to_string(),
            },
            _ => Self::Other,
        }
    }

    /// Site-relative path for this link
    pub fn path(&self) -> String {
        match self {
            Self::Post { uid } => post_path(uid),
            Self::Other => "/".to_string(),
        }
    }
}

/// Path of a post page
pub fn post_path(slug: &str) -> String {
    format!("/post/{}", slug)
}

/// Resolve a document to its site path
pub fn resolve_link(doc: &Document) -> String {
    DocumentLink::of(doc).path()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(doc_type: &str, uid: Option<&str>) -> Document {
        Document {
            id: "X1".to_string(),
            uid: uid.map(str::to_string),
            doc_type: doc_type.to_string(),
            ..Document::default()
        }
    }

    #[test]
    fn test_post_resolves_to_post_path() {
        assert_eq!(resolve_link(&doc("post", Some("hello"))), "/post/hello");
    }

    #[test]
    fn test_other_types_resolve_to_root() {
        assert_eq!(resolve_link(&doc("home", Some("home"))), "/");
        assert_eq!(resolve_link(&doc("post", None)), "/");
        assert_eq!(DocumentLink::of(&doc("post", Some(""))), DocumentLink::Other);
    }
}
