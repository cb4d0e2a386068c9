//! Paginated post listing
//!
//! A [`ListingController`] owns the posts loaded so far and the cursor of the
//! next page. It is created per generation run or per request and never
//! shared. `load_more` takes `&mut self`, so two loads on the same listing
//! cannot overlap and a page can never be appended twice.

use chrono_tz::Tz;
use std::collections::HashSet;
use std::sync::Arc;

use crate::cms::{ContentSource, Query, SearchResponse};
use crate::content::{normalize, PostSummary};
use crate::error::Result;

pub struct ListingController {
    source: Arc<dyn ContentSource>,
    tz: Tz,
    posts: Vec<PostSummary>,
    slugs: HashSet<String>,
    cursor: Option<String>,
}

impl ListingController {
    /// Create an empty listing
    pub fn new(source: Arc<dyn ContentSource>, tz: Tz) -> Self {
        Self {
            source,
            tz,
            posts: Vec::new(),
            slugs: HashSet::new(),
            cursor: None,
        }
    }

    /// Fetch the first page of `query` and initialize from it
    pub async fn load_first_page(&mut self, query: &Query) -> Result<()> {
        let first_page = self.source.query(query).await?;
        self.initialize(first_page);
        Ok(())
    }

    /// Replace the listing with an already fetched first page
    pub fn initialize(&mut self, first_page: SearchResponse) {
        self.posts.clear();
        self.slugs.clear();
        self.append(first_page);
        tracing::debug!(
            "Listing initialized with {} posts (more: {})",
            self.posts.len(),
            self.has_more()
        );
    }

    /// Fetch the page behind the cursor and append its posts.
    ///
    /// Returns the number of posts appended; 0 without any request when
    /// there is no next page. On failure the listing is left untouched.
    pub async fn load_more(&mut self) -> Result<usize> {
        let Some(cursor) = self.cursor.clone() else {
            return Ok(0);
        };

        let page = match self.source.fetch_page(&cursor).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Failed to load more posts: {}", e);
                return Err(e);
            }
        };

        let before = self.posts.len();
        self.append(page);
        Ok(self.posts.len() - before)
    }

    /// Normalize and append one page, then move the cursor
    fn append(&mut self, page: SearchResponse) {
        for doc in &page.results {
            match normalize(doc, &self.tz) {
                Ok(post) => {
                    if self.slugs.insert(post.slug.clone()) {
                        self.posts.push(post);
                    } else {
                        tracing::warn!("Skipping duplicate post '{}'", post.slug);
                    }
                }
                Err(e) => tracing::warn!("Skipping post: {}", e),
            }
        }
        self.cursor = page.next_page.filter(|url| !url.is_empty());
    }

    /// Posts loaded so far, first page first
    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    /// URL of the next page, if any
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Whether a "load more" control should be shown
    pub fn has_more(&self) -> bool {
        self.cursor.is_some()
    }
}
