//! Built-in spacetraveling templates using the Tera template engine
//!
//! Templates and static assets are embedded directly in the binary.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{richtext, PostDetail, PostLinkResolver, PostSummary};
use crate::helpers::{format_date, html_escape, post_path, reading_time};

/// Static files copied to the public directory, keyed by their path under it
pub const ASSETS: &[(&str, &str)] = &[
    (
        "styles/global.css",
        include_str!("spacetraveling/static/styles/global.css"),
    ),
    (
        "scripts/load-more.js",
        include_str!("spacetraveling/static/scripts/load-more.js"),
    ),
    (
        "images/calendar.svg",
        include_str!("spacetraveling/static/images/calendar.svg"),
    ),
    (
        "images/user.svg",
        include_str!("spacetraveling/static/images/user.svg"),
    ),
    (
        "images/clock.svg",
        include_str!("spacetraveling/static/images/clock.svg"),
    ),
    (
        "images/logo.svg",
        include_str!("spacetraveling/static/images/logo.svg"),
    ),
];

/// Template renderer with the embedded spacetraveling theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Everything is escaped except rich text, which is marked `safe` in post.html
        tera.autoescape_on(vec![".html"]);
        tera.set_escape_fn(html_escape);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("spacetraveling/layout.html")),
            ("home.html", include_str!("spacetraveling/home.html")),
            ("post.html", include_str!("spacetraveling/post.html")),
            ("loading.html", include_str!("spacetraveling/loading.html")),
            ("error.html", include_str!("spacetraveling/error.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("spacetraveling/partials/header.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// A context holding the site-wide `config` variable
    pub fn base_context(config: &SiteConfig) -> Context {
        let mut context = Context::new();
        context.insert("config", &ConfigData::new(config));
        context
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub language: String,
    pub url: String,
    pub version: String,
}

impl ConfigData {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// A post summary ready for display; also the JSON shape of the load-more endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryData {
    pub uid: String,
    pub href: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    /// Formatted publication date, empty when unknown
    pub date: String,
}

impl SummaryData {
    pub fn new(post: &PostSummary, config: &SiteConfig) -> Self {
        Self {
            uid: post.uid.clone(),
            href: post_path(&post.uid),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date: format_date(
                post.first_publication_date.as_ref(),
                config.tz(),
                &config.language,
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub uid: String,
    pub title: String,
    pub banner: Option<BannerData>,
    pub author: String,
    pub date: String,
    /// Reading time label, e.g. `4 min`
    pub reading_time: String,
    pub content: Vec<BlockData>,
}

impl PostData {
    pub fn new(post: &PostDetail, config: &SiteConfig) -> Self {
        let minutes = reading_time(&post.content, config.words_per_minute());
        let resolver = PostLinkResolver::new(&config.prismic.document_type);

        Self {
            uid: post.uid.clone(),
            title: post.title.clone(),
            banner: post.banner.as_ref().map(|banner| BannerData {
                url: banner.url.clone(),
                alt: banner
                    .alt
                    .clone()
                    .unwrap_or_else(|| "post banner".to_string()),
            }),
            author: post.author.clone(),
            date: format_date(
                post.first_publication_date.as_ref(),
                config.tz(),
                &config.language,
            ),
            reading_time: format!("{} min", minutes),
            content: post
                .content
                .iter()
                .map(|block| BlockData {
                    heading: block.heading.clone(),
                    html: richtext::as_html(&block.body, &resolver),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BannerData {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockData {
    pub heading: String,
    /// Rendered rich text, inserted without escaping
    pub html: String,
}
