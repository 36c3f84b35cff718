//! spacetraveling: a blog rendered from posts stored in Prismic
//!
//! Posts are fetched from the Prismic REST API and rendered with Tera
//! templates embedded in the binary. The home page lists post summaries and
//! loads further pages on demand; each post has its own page with an
//! estimated reading time. Pages can be written out once (`generate`) or
//! served with periodic regeneration (`server`).

pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod detail;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod listing;
pub mod prismic;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use content::{ContentSource, PrismicSource};
use prismic::PrismicClient;

/// The main spacetraveling application
#[derive(Debug, Clone)]
pub struct SpaceTraveling {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl SpaceTraveling {
    /// Create a new instance from a directory
    ///
    /// Reads `_config.yml` when present, then applies environment overrides.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            public_dir,
        }
    }

    /// The Prismic repository configured for this site
    pub fn content_source(&self) -> Result<Arc<dyn ContentSource>> {
        let client = PrismicClient::new(&self.config.prismic)?;
        tracing::debug!("Using Prismic endpoint {}", self.config.prismic.endpoint);
        Ok(Arc::new(PrismicSource::new(
            client,
            self.config.prismic.document_type.clone(),
        )))
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
