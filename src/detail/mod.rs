//! Detail view: a single post page

use anyhow::Result;

use crate::config::SiteConfig;
use crate::content::{ContentSource, PostDetail};
use crate::error::ContentError;
use crate::helpers::{full_url_for, post_path};
use crate::templates::{PostData, TemplateRenderer};

/// Seconds before the fallback page reloads itself to pick up the generated post
pub const FALLBACK_REFRESH_SECS: u64 = 2;

/// What a post page shows
#[derive(Debug, Clone)]
pub enum DetailView {
    /// The post has not been generated yet; only a loading indicator is shown
    Fallback,
    /// The post is available
    Resolved(PostDetail),
}

impl DetailView {
    /// Fetch the post for `uid`; a missing post is `ContentError::NotFound`
    pub async fn resolve(source: &dyn ContentSource, uid: &str) -> Result<Self, ContentError> {
        let post = source.post(uid).await?;
        Ok(Self::Resolved(post))
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }

    /// Render the page
    pub fn render(&self, renderer: &TemplateRenderer, config: &SiteConfig) -> Result<String> {
        let mut context = TemplateRenderer::base_context(config);

        match self {
            Self::Fallback => {
                context.insert("refresh_secs", &FALLBACK_REFRESH_SECS);
                renderer.render("loading.html", &context)
            }
            Self::Resolved(post) => {
                let data = PostData::new(post, config);
                context.insert("canonical", &full_url_for(config, &post_path(&post.uid)));
                context.insert("post", &data);
                renderer.render("post.html", &context)
            }
        }
    }
}
