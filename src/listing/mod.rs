//! Listing view state
//!
//! The home page shows the first page of posts and grows by whole pages when
//! the reader asks for more. A load is split in two explicit steps so the
//! state is never half-updated:
//!
//! 1. [`ListingState::begin_load`] enters the loading state and hands out a
//!    [`LoadTicket`]; while it is outstanding no second load can start.
//! 2. [`ListingState::finish_load`] applies the fetch result in one go:
//!    append and move the pointer on success, or leave everything as it was
//!    on failure. Either way the state is idle again afterwards.

use crate::config::SiteConfig;
use crate::content::{ContentSource, PostPage, PostSummary};
use crate::error::ContentError;
use crate::helpers::full_url_for;
use crate::templates::{SummaryData, TemplateRenderer};

/// Permission to run one load, tied to the state that issued it
#[derive(Debug)]
pub struct LoadTicket {
    cursor: String,
    generation: u64,
}

impl LoadTicket {
    /// Pointer of the page to fetch
    pub fn cursor(&self) -> &str {
        &self.cursor
    }
}

/// What a load did to the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was appended with this many posts
    Appended(usize),
    /// Nothing to load, or a load is already running
    Unavailable,
    /// The listing was cancelled while the fetch was in flight
    Discarded,
}

/// Posts displayed on the listing page
#[derive(Debug, Clone, Default)]
pub struct ListingState {
    posts: Vec<PostSummary>,
    next_page: Option<String>,
    loading: bool,
    generation: u64,
}

impl ListingState {
    /// Start from the first page fetched at build time
    pub fn new(page: PostPage) -> Self {
        Self {
            posts: page.results,
            next_page: page.next_page,
            loading: false,
            generation: 0,
        }
    }

    /// A listing with nothing displayed yet, positioned at `cursor`
    pub fn resume(cursor: impl Into<String>) -> Self {
        Self::new(PostPage::new(Vec::new(), Some(cursor.into())))
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the "load more" action is available right now
    pub fn can_load_more(&self) -> bool {
        !self.loading && self.next_page.is_some()
    }

    /// Enter the loading state; `None` when there is nothing to load or a load is running
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if !self.can_load_more() {
            return None;
        }
        let cursor = self.next_page.clone()?;
        self.loading = true;
        Some(LoadTicket {
            cursor,
            generation: self.generation,
        })
    }

    /// Apply the result of the fetch started with `ticket`
    ///
    /// On failure the displayed posts and the pointer are untouched and the
    /// error is returned for the caller to report; the action can be retried.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<PostPage, ContentError>,
    ) -> Result<LoadOutcome, ContentError> {
        if ticket.generation != self.generation {
            tracing::debug!(cursor = %ticket.cursor, "discarding stale page");
            return Ok(LoadOutcome::Discarded);
        }
        self.loading = false;

        let page = result?;
        let count = page.results.len();
        self.posts.extend(page.results);
        self.next_page = page.next_page;
        Ok(LoadOutcome::Appended(count))
    }

    /// Abandon any load in flight; its result will be discarded
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.loading = false;
    }

    /// Fetch the next page from `source` and append it
    pub async fn load_more(
        &mut self,
        source: &dyn ContentSource,
    ) -> Result<LoadOutcome, ContentError> {
        let Some(ticket) = self.begin_load() else {
            return Ok(LoadOutcome::Unavailable);
        };
        let result = source.next_page(ticket.cursor()).await;
        if let Err(ref e) = result {
            tracing::warn!(cursor = %ticket.cursor(), "failed to load more posts: {}", e);
        }
        self.finish_load(ticket, result)
    }

    /// Take the displayed posts and the pointer
    pub fn into_page(self) -> PostPage {
        PostPage::new(self.posts, self.next_page)
    }

    /// Displayed posts, formatted for templates and JSON
    pub fn summaries(&self, config: &SiteConfig) -> Vec<SummaryData> {
        self.posts
            .iter()
            .map(|post| SummaryData::new(post, config))
            .collect()
    }

    /// Render the home page
    pub fn render(
        &self,
        renderer: &TemplateRenderer,
        config: &SiteConfig,
    ) -> anyhow::Result<String> {
        let mut context = TemplateRenderer::base_context(config);
        context.insert("canonical", &full_url_for(config, "/"));
        context.insert("posts", &self.summaries(config));
        context.insert("next_page", &self.next_page);
        renderer.render("home.html", &context)
    }
}
