//! List published posts

use anyhow::Result;

use crate::content::ContentSource;
use crate::listing::{ListingState, LoadOutcome};
use crate::SpaceTraveling;

/// Print the listing as the home page shows it
pub async fn run(site: &SpaceTraveling, all: bool) -> Result<()> {
    let source = site.content_source()?;
    let listing = collect(source.as_ref(), site.config.index.page_size, all).await?;

    println!("Posts ({}):", listing.posts().len());
    for post in listing.summaries(&site.config) {
        let date = if post.date.is_empty() {
            "-".to_string()
        } else {
            post.date
        };
        println!("  {} - {} [{}]", date, post.title, post.uid);
    }
    if let Some(next_page) = listing.next_page() {
        println!("More posts available (use --all): {}", next_page);
    }

    Ok(())
}

/// The first page, followed by every further page when `all` is set
async fn collect(source: &dyn ContentSource, page_size: usize, all: bool) -> Result<ListingState> {
    let mut listing = ListingState::new(source.first_page(page_size).await?);

    if all {
        while let LoadOutcome::Appended(count) = listing.load_more(source).await? {
            tracing::debug!("Loaded {} more posts", count);
        }
    }

    Ok(listing)
}
