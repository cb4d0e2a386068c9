//! Preview mode
//!
//! While a preview flag is set, every fetch reads the draft reference it
//! carries instead of the published content.

use std::sync::Arc;

use crate::cms::{ContentRef, ContentSource};
use crate::error::Result;

/// Where `exit_preview` sends the visitor
pub const EXIT_REDIRECT: &str = "/";

/// An active preview session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewFlag {
    /// Draft reference issued by the CMS
    pub reference: String,
}

/// Per-visitor preview state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewState {
    flag: Option<PreviewFlag>,
}

impl PreviewState {
    /// Rebuild the state from a stored reference (e.g. a cookie value)
    pub fn from_reference(reference: Option<String>) -> Self {
        Self {
            flag: reference
                .filter(|r| !r.is_empty())
                .map(|reference| PreviewFlag { reference }),
        }
    }

    pub fn is_active(&self) -> bool {
        self.flag.is_some()
    }

    pub fn flag(&self) -> Option<&PreviewFlag> {
        self.flag.as_ref()
    }

    /// Content reference that fetches must use
    pub fn content_ref(&self) -> ContentRef {
        ContentRef::from_preview(self.flag.as_ref().map(|f| f.reference.as_str()))
    }
}

/// Validates preview requests against the CMS
pub struct PreviewGate {
    source: Arc<dyn ContentSource>,
}

impl PreviewGate {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    /// Validate `token` for `document_id`, set the flag and return the path
    /// of the previewed document. A rejected token leaves `state` untouched.
    pub async fn enter_preview(
        &self,
        state: &mut PreviewState,
        token: &str,
        document_id: &str,
    ) -> Result<String> {
        let redirect = self.source.resolve_preview(token, document_id).await?;
        tracing::info!("Preview started for document {} -> {}", document_id, redirect);
        state.flag = Some(PreviewFlag {
            reference: token.to_string(),
        });
        Ok(redirect)
    }

    /// Clear the flag, whether or not it was set
    pub fn exit_preview(&self, state: &mut PreviewState) -> &'static str {
        if state.flag.take().is_some() {
            tracing::info!("Preview ended");
        }
        EXIT_REDIRECT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::memory::{full_doc, page, MemorySource};
    use crate::error::BlogError;

    fn gate() -> PreviewGate {
        let source = MemorySource::new(page(vec![], None)).with_draft(
            "draft-ref",
            full_doc("new-post", "New post", "2021-03-25T19:25:28+0000"),
        );
        PreviewGate::new(Arc::new(source))
    }

    #[tokio::test]
    async fn test_enter_preview_sets_flag_and_resolves_post() {
        let gate = gate();
        let mut state = PreviewState::default();
        let redirect = gate
            .enter_preview(&mut state, "draft-ref", "id-new-post")
            .await
            .unwrap();
        assert_eq!(redirect, "/post/new-post");
        assert!(state.is_active());
        assert_eq!(
            state.content_ref(),
            ContentRef::Preview("draft-ref".to_string())
        );
    }

    #[tokio::test]
    async fn test_unknown_document_resolves_to_root() {
        let gate = gate();
        let mut state = PreviewState::default();
        let redirect = gate
            .enter_preview(&mut state, "draft-ref", "missing")
            .await
            .unwrap();
        assert_eq!(redirect, "/");
        assert!(state.is_active());
    }

    #[tokio::test]
    async fn test_rejected_token_sets_nothing() {
        let gate = gate();
        let mut state = PreviewState::default();
        let result = gate.enter_preview(&mut state, "bogus", "id-new-post").await;
        assert!(matches!(result, Err(BlogError::InvalidPreviewToken)));
        assert!(!state.is_active());
        assert_eq!(state.content_ref(), ContentRef::Master);
    }

    #[test]
    fn test_exit_preview_is_idempotent() {
        let gate = gate();
        let mut state = PreviewState::from_reference(Some("draft-ref".to_string()));
        assert!(state.is_active());

        assert_eq!(gate.exit_preview(&mut state), "/");
        assert!(!state.is_active());
        assert_eq!(gate.exit_preview(&mut state), "/");
        assert!(!state.is_active());
    }

    #[test]
    fn test_empty_stored_reference_is_inactive() {
        assert!(!PreviewState::from_reference(Some(String::new())).is_active());
        assert!(!PreviewState::from_reference(None).is_active());
    }
}
