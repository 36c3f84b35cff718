//! Generator module - fetches posts and renders pages with the built-in templates

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::Rendered;
use crate::config::SiteConfig;
use crate::content::ContentSource;
use crate::detail::DetailView;
use crate::helpers::{post_path, route_file};
use crate::listing::ListingState;
use crate::templates::{TemplateRenderer, ASSETS};
use crate::SpaceTraveling;

/// A page produced by a build
#[derive(Debug, Clone)]
pub struct BuiltPage {
    /// Route the page is served under, e.g. `/post/my-post`
    pub route: String,
    pub rendered: Rendered,
    /// How long the page stays fresh before it is regenerated
    pub revalidate: Duration,
}

/// Renders site pages from a content source
#[derive(Clone)]
pub struct Generator {
    config: Arc<SiteConfig>,
    public_dir: PathBuf,
    source: Arc<dyn ContentSource>,
    renderer: Arc<TemplateRenderer>,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &SpaceTraveling, source: Arc<dyn ContentSource>) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;

        Ok(Self {
            config: Arc::new(site.config.clone()),
            public_dir: site.public_dir.clone(),
            source,
            renderer: Arc::new(renderer),
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn source(&self) -> &dyn ContentSource {
        self.source.as_ref()
    }

    pub fn listing_revalidate(&self) -> Duration {
        Duration::from_secs(self.config.index.revalidate_secs)
    }

    pub fn post_revalidate(&self) -> Duration {
        Duration::from_secs(self.config.post.revalidate_secs)
    }

    /// Fetch and render the listing page and the pre-rendered posts
    ///
    /// Any backend failure aborts the build.
    pub async fn build(&self) -> Result<Vec<BuiltPage>> {
        let mut pages = vec![BuiltPage {
            route: "/".to_string(),
            rendered: Rendered::Page(self.render_home().await?),
            revalidate: self.listing_revalidate(),
        }];

        for uid in self.prerendered_uids().await? {
            match self.render_post(&uid).await? {
                Rendered::Page(html) => pages.push(BuiltPage {
                    route: post_path(&uid),
                    rendered: Rendered::Page(html),
                    revalidate: self.post_revalidate(),
                }),
                Rendered::NotFound | Rendered::Failed => {
                    tracing::warn!("Post {} disappeared during the build, skipping", uid);
                }
            }
        }

        tracing::info!("Built {} pages", pages.len());
        Ok(pages)
    }

    /// Identifiers of the posts rendered at build time
    async fn prerendered_uids(&self) -> Result<Vec<String>> {
        let count = self.config.post.prerender_count;
        if count == 0 {
            return Ok(Vec::new());
        }
        let page = self.source.first_page(count).await?;
        Ok(page.results.into_iter().map(|post| post.uid).collect())
    }

    /// Render the listing page from the first page of posts
    pub async fn render_home(&self) -> Result<String> {
        let page = self.source.first_page(self.config.index.page_size).await?;
        tracing::debug!(
            posts = page.results.len(),
            has_next = page.has_next(),
            "rendering home"
        );
        ListingState::new(page).render(&self.renderer, &self.config)
    }

    /// Render the page of one post
    pub async fn render_post(&self, uid: &str) -> Result<Rendered> {
        match DetailView::resolve(self.source.as_ref(), uid).await {
            Ok(view) => Ok(Rendered::Page(view.render(&self.renderer, &self.config)?)),
            Err(e) if e.is_not_found() => Ok(Rendered::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// The loading page shown for posts not generated yet
    pub fn render_fallback(&self) -> Result<String> {
        DetailView::Fallback.render(&self.renderer, &self.config)
    }

    /// A simple error page
    pub fn render_error(&self, heading: &str, message: &str) -> Result<String> {
        let mut context = TemplateRenderer::base_context(&self.config);
        context.insert("heading", heading);
        context.insert("message", message);
        self.renderer.render("error.html", &context)
    }

    /// Write built pages and static assets to the public directory
    pub fn write(&self, pages: &[BuiltPage]) -> Result<()> {
        fs::create_dir_all(&self.public_dir)?;

        for (path, content) in ASSETS {
            let output_path = self.public_dir.join(path);
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output_path, content)?;
        }

        for page in pages {
            let Rendered::Page(ref html) = page.rendered else {
                continue;
            };
            let output_path = self.public_dir.join(route_file(&page.route));
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
            }
            fs::write(&output_path, html)
                .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
            tracing::debug!("Generated: {:?}", output_path);
        }

        Ok(())
    }
}
