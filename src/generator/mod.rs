//! Generator module - fetches posts and writes the static site

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono_tz::Tz;

use crate::cms::{ContentSource, Query};
use crate::config::SiteConfig;
use crate::content::{normalize_detail, POST_TYPE};
use crate::error::{BlogError, Result};
use crate::helpers::listing_path;
use crate::listing::ListingController;
use crate::preview::PreviewState;
use crate::templates::{TemplateRenderer, LOGO_SVG, STYLE_CSS};
use crate::Blog;

/// Renders pages from live CMS data; shared by the generator and the server
pub struct Pages {
    config: SiteConfig,
    tz: Tz,
    source: Arc<dyn ContentSource>,
    renderer: TemplateRenderer,
}

impl Pages {
    pub fn new(blog: &Blog, source: Arc<dyn ContentSource>) -> Result<Self> {
        Ok(Self {
            config: blog.config.clone(),
            tz: blog.tz,
            source,
            renderer: TemplateRenderer::new()?,
        })
    }

    /// A fresh, empty listing
    pub fn listing(&self) -> ListingController {
        ListingController::new(self.source.clone(), self.tz)
    }

    /// The listing query, reading drafts while previewing
    pub fn listing_query(&self, preview: &PreviewState) -> Query {
        Query::posts(self.config.cms.page_size).reference(preview.content_ref())
    }

    /// Render the state of `listing` as listing page number `page`
    pub fn listing_html(
        &self,
        listing: &ListingController,
        page: usize,
        preview: bool,
    ) -> Result<String> {
        let next_link = listing.has_more().then(|| listing_path(page + 1));
        self.renderer
            .render_listing(&self.config, listing.posts(), next_link.as_deref(), preview)
    }

    /// Render listing page `page` (1-based) from scratch; `None` when the
    /// listing has fewer pages
    pub async fn listing_page(&self, page: usize, preview: &PreviewState) -> Result<Option<String>> {
        let mut listing = self.listing();
        listing.load_first_page(&self.listing_query(preview)).await?;

        for _ in 1..page {
            if !listing.has_more() {
                return Ok(None);
            }
            listing.load_more().await?;
        }

        self.listing_html(&listing, page.max(1), preview.is_active()).map(Some)
    }

    /// Render the page of post `slug`; `NotFound` when no such post exists
    pub async fn post_page(&self, slug: &str, preview: &PreviewState) -> Result<String> {
        let not_found = || BlogError::NotFound {
            doc_type: POST_TYPE.to_string(),
            uid: slug.to_string(),
        };
        if !is_safe_slug(slug) {
            return Err(not_found());
        }

        let reference = preview.content_ref();
        let doc = self
            .source
            .get_by_uid(POST_TYPE, slug, &reference)
            .await?
            .ok_or_else(not_found)?;

        let post = normalize_detail(&doc, &self.tz)?;
        self.renderer
            .render_post(&self.config, &post, &self.tz, preview.is_active())
    }

    pub fn not_found_page(&self, preview: bool) -> Result<String> {
        self.renderer.render_not_found(&self.config, preview)
    }
}

/// What a generation run produced
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateSummary {
    pub listing_pages: usize,
    pub posts: usize,
    pub skipped: usize,
}

/// Static site generator
pub struct Generator {
    public_dir: PathBuf,
    pages: Pages,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog, source: Arc<dyn ContentSource>) -> Result<Self> {
        Ok(Self {
            public_dir: blog.public_dir.clone(),
            pages: Pages::new(blog, source)?,
        })
    }

    /// Generate the entire site.
    ///
    /// Any failure to fetch the listing aborts the run. Post pages that
    /// are missing or malformed are skipped.
    pub async fn generate(&self) -> Result<GenerateSummary> {
        fs::create_dir_all(&self.public_dir)?;
        self.write_assets()?;

        let mut summary = GenerateSummary::default();
        let published = PreviewState::default();

        // Listing: page n holds every post loaded up to the n-th cursor
        let mut listing = self.pages.listing();
        listing
            .load_first_page(&self.pages.listing_query(&published))
            .await?;

        loop {
            summary.listing_pages += 1;
            let html = self
                .pages
                .listing_html(&listing, summary.listing_pages, false)?;
            self.write_page(&listing_path(summary.listing_pages), &html)?;

            if !listing.has_more() {
                break;
            }
            listing.load_more().await?;
        }

        // Post pages
        for post in listing.posts() {
            match self.pages.post_page(&post.slug, &published).await {
                Ok(html) => {
                    self.write_page(&crate::cms::post_path(&post.slug), &html)?;
                    summary.posts += 1;
                }
                Err(e @ (BlogError::NotFound { .. } | BlogError::MalformedDocument { .. })) => {
                    tracing::warn!("Skipping post '{}': {}", post.slug, e);
                    summary.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        let not_found = self.pages.not_found_page(false)?;
        fs::write(self.public_dir.join("404.html"), not_found)?;

        tracing::info!(
            "Generated {} listing pages and {} posts ({} skipped)",
            summary.listing_pages,
            summary.posts,
            summary.skipped
        );
        Ok(summary)
    }

    fn write_assets(&self) -> Result<()> {
        fs::write(self.public_dir.join("style.css"), STYLE_CSS)?;
        let images = self.public_dir.join("images");
        fs::create_dir_all(&images)?;
        fs::write(images.join("logo.svg"), LOGO_SVG)?;
        Ok(())
    }

    /// Write `html` as the index file of a site path
    fn write_page(&self, site_path: &str, html: &str) -> Result<()> {
        let output_path = page_file(&self.public_dir, site_path);
        write_file(&output_path, html)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }
}

/// File that holds the page for `site_path` (`/post/x` -> `post/x/index.html`)
pub fn page_file(public_dir: &Path, site_path: &str) -> PathBuf {
    let clean_path = site_path.trim_matches('/');
    if clean_path.is_empty() {
        public_dir.join("index.html")
    } else {
        public_dir.join(clean_path).join("index.html")
    }
}

/// Write a file, creating parent directories
pub fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

/// Replace a file from async code: the contents go to a temporary sibling
/// first and are renamed into place, so readers never see a partial file.
pub async fn store_file(path: &Path, contents: &str) -> Result<()> {
    static NEXT_TMP: AtomicU64 = AtomicU64::new(0);

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(
        ".{}.{}.{}.tmp",
        file_name,
        std::process::id(),
        NEXT_TMP.fetch_add(1, Ordering::Relaxed)
    ));

    if let Err(e) = tokio::fs::write(&tmp, contents).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

/// Slugs become directory names; refuse anything that could escape
pub fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\'])
        && !slug.starts_with('.')
}
