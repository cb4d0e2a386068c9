//! List posts

use anyhow::Result;
use chrono_tz::Tz;
use std::sync::Arc;

use crate::cms::{ContentSource, Query};
use crate::content::PostSummary;
use crate::listing::ListingController;
use crate::Blog;

/// Print every published post, most recently modified first
pub async fn run(blog: &Blog) -> Result<()> {
    let source = blog.content_source()?;
    let posts = collect_posts(source, blog.tz, blog.config.cms.page_size).await?;

    println!("Posts ({}):", posts.len());
    for post in posts {
        println!(
            "  {:>11} - {} [{}] by {}",
            post.formatted_date, post.title, post.slug, post.author
        );
    }

    Ok(())
}

/// Follow the listing cursor to the end
pub async fn collect_posts(
    source: Arc<dyn ContentSource>,
    tz: Tz,
    page_size: usize,
) -> crate::error::Result<Vec<PostSummary>> {
    let mut listing = ListingController::new(source, tz);
    listing.load_first_page(&Query::posts(page_size)).await?;
    while listing.has_more() {
        listing.load_more().await?;
    }
    Ok(listing.posts().to_vec())
}
