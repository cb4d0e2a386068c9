//! Built-in theme rendered with the Tera template engine
//!
//! Templates and assets are embedded in the binary. HTML escaping stays on:
//! every value comes from the CMS as plain text.

use chrono_tz::Tz;
use serde::Serialize;
use std::collections::HashSet;
use tera::{Context, Tera};

use crate::cms::post_path;
use crate::config::SiteConfig;
use crate::content::{estimate_reading_minutes, is_edited, PostDetail, PostSummary};
use crate::error::Result;
use crate::helpers::{date_xml, format_date_time, url_for};

/// Stylesheet served at `/style.css`
pub const STYLE_CSS: &str = include_str!("theme/assets/style.css");
/// Logo served at `/images/logo.svg`
pub const LOGO_SVG: &str = include_str!("theme/assets/logo.svg");

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all theme templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("not_found.html", include_str!("theme/not_found.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("theme/partials/header.html"),
            ),
            (
                "partials/exit_preview.html",
                include_str!("theme/partials/exit_preview.html"),
            ),
            (
                "partials/comments.html",
                include_str!("theme/partials/comments.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Render a listing page
    pub fn render_listing(
        &self,
        config: &SiteConfig,
        posts: &[PostSummary],
        next_link: Option<&str>,
        preview: bool,
    ) -> Result<String> {
        let cards: Vec<PostCard> = posts.iter().map(|p| PostCard::new(p, config)).collect();

        let mut context = base_context(config, preview);
        context.insert("posts", &cards);
        context.insert("next_link", &next_link.map(|link| url_for(config, link)));
        self.render("index.html", &context)
    }

    /// Render a post page
    pub fn render_post(
        &self,
        config: &SiteConfig,
        post: &PostDetail,
        tz: &Tz,
        preview: bool,
    ) -> Result<String> {
        let mut context = base_context(config, preview);
        context.insert("post", &PostView::new(post, tz));
        let comments = (!config.comments.repo.is_empty()).then_some(&config.comments);
        context.insert("comments", &comments);
        self.render("post.html", &context)
    }

    /// Render the not-found page
    pub fn render_not_found(&self, config: &SiteConfig, preview: bool) -> Result<String> {
        self.render("not_found.html", &base_context(config, preview))
    }
}

fn base_context(config: &SiteConfig, preview: bool) -> Context {
    let mut context = Context::new();
    context.insert(
        "site",
        &SiteData {
            title: config.title.clone(),
            root: url_for(config, "/"),
        },
    );
    context.insert("preview", &preview);
    context
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub root: String,
}

/// A post in the listing
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: String,
    pub datetime: Option<String>,
    pub path: String,
}

impl PostCard {
    fn new(post: &PostSummary, config: &SiteConfig) -> Self {
        Self {
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date: post.formatted_date.clone(),
            datetime: post.publication_date.as_ref().map(date_xml),
            path: url_for(config, &post_path(&post.slug)),
        }
    }
}

/// A post page with its derived display fields
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub title: String,
    pub author: String,
    pub banner_url: Option<String>,
    pub date: String,
    pub datetime: Option<String>,
    pub reading_minutes: usize,
    /// Set only when the post changed after publication
    pub edited_at: Option<String>,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    /// Anchor id derived from the heading, unique within the post
    pub id: String,
    pub heading: String,
    pub paragraphs: Vec<String>,
}

impl PostView {
    pub fn new(post: &PostDetail, tz: &Tz) -> Self {
        let summary = &post.summary;

        let edited_at = if is_edited(summary.publication_date.as_ref(), post.last_modified.as_ref())
        {
            post.last_modified.as_ref().map(|d| format_date_time(d, tz))
        } else {
            None
        };

        let mut ids = SectionIds::default();
        let sections = post
            .content
            .iter()
            .map(|block| SectionView {
                id: ids.next(&block.heading),
                heading: block.heading.clone(),
                paragraphs: block.body.iter().map(|span| span.text.clone()).collect(),
            })
            .collect();

        Self {
            title: summary.title.clone(),
            author: summary.author.clone(),
            banner_url: post.banner_url.clone(),
            date: summary.formatted_date.clone(),
            datetime: summary.publication_date.as_ref().map(date_xml),
            reading_minutes: estimate_reading_minutes(&post.content),
            edited_at,
            sections,
        }
    }
}

/// Hands out heading anchors, suffixing repeats (`intro`, `intro-2`).
/// Every id handed out is unique within the post, including against
/// headings that already end in a number.
#[derive(Default)]
struct SectionIds {
    taken: HashSet<String>,
}

impl SectionIds {
    fn next(&mut self, heading: &str) -> String {
        let mut base = slug::slugify(heading);
        if base.is_empty() {
            base = "section".to_string();
        }

        let mut candidate = base.clone();
        let mut n = 1;
        while self.taken.contains(&candidate) {
            n += 1;
            candidate = format!("{}-{}", base, n);
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::memory::{full_doc, summary_doc};
    use crate::content::{normalize, normalize_detail, ContentBlock};
    use chrono_tz::UTC;

    fn config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.comments.repo = "someone/blog-comments".to_string();
        config
    }

    #[test]
    fn test_render_listing_with_more() {
        let renderer = TemplateRenderer::new().unwrap();
        let posts = vec![normalize(&summary_doc("hooks", "Como utilizar Hooks"), &UTC).unwrap()];
        let html = renderer
            .render_listing(&config(), &posts, Some("/page/2/"), false)
            .unwrap();
        assert!(html.contains("Como utilizar Hooks"));
        assert!(html.contains("25 mar 2021"));
        assert!(html.contains("Joseph Oliveira"));
        assert!(html.contains(r#"href="/page/2/""#));
        assert!(html.contains("Carregar mais posts"));
        assert!(!html.contains("Sair do modo Preview"));
    }

    #[test]
    fn test_render_last_listing_page() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer.render_listing(&config(), &[], None, true).unwrap();
        assert!(!html.contains("Carregar mais posts"));
        assert!(html.contains("Sair do modo Preview"));
    }

    #[test]
    fn test_render_post() {
        let renderer = TemplateRenderer::new().unwrap();
        let doc = full_doc("hooks", "Hooks", "2021-03-26T10:07:00+0000");
        let post = normalize_detail(&doc, &UTC).unwrap();
        let html = renderer.render_post(&config(), &post, &UTC, false).unwrap();

        assert!(html.contains("<h1>Hooks</h1>"));
        assert!(html.contains("1 min"));
        assert!(html.contains("* editado em 26 mar 2021, às 10:7"));
        assert!(html.contains(r#"id="proin-et-varius""#));
        assert!(html.contains("Ut varius tempus &lt;b&gt;nunc&lt;&#x2F;b&gt;"));
        assert!(html.contains("utteranc.es/client.js"));
    }

    #[test]
    fn test_unedited_post_without_comments() {
        let renderer = TemplateRenderer::new().unwrap();
        let doc = full_doc("hooks", "Hooks", "2021-03-25T19:25:28+0000");
        let post = normalize_detail(&doc, &UTC).unwrap();
        let html = renderer
            .render_post(&SiteConfig::default(), &post, &UTC, false)
            .unwrap();
        assert!(!html.contains("editado em"));
        assert!(!html.contains("utteranc.es"));
    }

    #[test]
    fn test_empty_post_reads_in_zero_minutes() {
        let mut doc = full_doc("empty", "Empty", "2021-03-25T19:25:28+0000");
        doc.data.remove("content");
        let post = normalize_detail(&doc, &UTC).unwrap();
        let view = PostView::new(&post, &UTC);
        assert_eq!(view.reading_minutes, 0);
        assert!(view.sections.is_empty());
    }

    #[test]
    fn test_duplicate_headings_get_unique_ids() {
        let mut post = normalize_detail(
            &full_doc("dup", "Dup", "2021-03-25T19:25:28+0000"),
            &UTC,
        )
        .unwrap();
        post.content = vec![
            ContentBlock::new("Intro", &["a"]),
            ContentBlock::new("Intro", &["b"]),
            ContentBlock::new("", &["c"]),
            ContentBlock::new("Intro", &["d"]),
        ];
        let ids: Vec<String> = PostView::new(&post, &UTC)
            .sections
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, ["intro", "intro-2", "section", "intro-3"]);
    }

    #[test]
    fn test_suffixed_heading_does_not_collide() {
        let mut post = normalize_detail(
            &full_doc("dup", "Dup", "2021-03-25T19:25:28+0000"),
            &UTC,
        )
        .unwrap();
        post.content = vec![
            ContentBlock::new("Intro", &["a"]),
            ContentBlock::new("Intro", &["b"]),
            ContentBlock::new("Intro 2", &["c"]),
            ContentBlock::new("Intro 2", &["d"]),
        ];
        let ids: Vec<String> = PostView::new(&post, &UTC)
            .sections
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, ["intro", "intro-2", "intro-2-2", "intro-2-3"]);

        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_render_not_found() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer.render_not_found(&config(), false).unwrap();
        assert!(html.contains("Post não encontrado"));
    }
}
