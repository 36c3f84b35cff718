//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Words per minute used for reading time when nothing valid is configured
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: String,
    pub timezone: String,

    // URL
    pub url: String,

    // Directory
    pub public_dir: String,

    // Content backend
    #[serde(default)]
    pub prismic: PrismicConfig,

    // Home page
    #[serde(default)]
    pub index: IndexConfig,

    // Post pages
    #[serde(default)]
    pub post: PostConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            language: "pt-BR".to_string(),
            timezone: String::new(),

            url: "http://localhost:3000".to_string(),

            public_dir: "public".to_string(),

            prismic: PrismicConfig::default(),
            index: IndexConfig::default(),
            post: PostConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    ///
    /// - `PRISMIC_API_ENDPOINT`: CMS API root
    /// - `PRISMIC_ACCESS_TOKEN`: CMS access token
    /// - `AVERAGE_WORDS_PER_MINUTE`: reading speed used for reading time
    pub fn apply_env(&mut self) {
        if let Ok(endpoint) = std::env::var("PRISMIC_API_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                self.prismic.endpoint = endpoint.trim().to_string();
            }
        }

        if let Ok(token) = std::env::var("PRISMIC_ACCESS_TOKEN") {
            if !token.trim().is_empty() {
                self.prismic.access_token = Some(token.trim().to_string());
            }
        }

        if let Ok(raw) = std::env::var("AVERAGE_WORDS_PER_MINUTE") {
            self.post.words_per_minute = parse_words_per_minute(&raw);
        }

        tracing::debug!(
            endpoint = %self.prismic.endpoint,
            words_per_minute = self.post.words_per_minute,
            "configuration resolved"
        );
    }

    /// Words per minute, falling back to the default for a zero value from the file
    pub fn words_per_minute(&self) -> u32 {
        if self.post.words_per_minute == 0 {
            DEFAULT_WORDS_PER_MINUTE
        } else {
            self.post.words_per_minute
        }
    }

    /// Timezone used to display dates (UTC when unset or unknown)
    pub fn tz(&self) -> chrono_tz::Tz {
        if self.timezone.is_empty() {
            return chrono_tz::UTC;
        }
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown timezone {:?}, using UTC", self.timezone);
            chrono_tz::UTC
        })
    }
}

/// Parse a words-per-minute setting, defaulting on anything that is not a positive number
pub fn parse_words_per_minute(raw: &str) -> u32 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 1.0 => value.round() as u32,
        _ => {
            tracing::warn!(
                "Ignoring invalid AVERAGE_WORDS_PER_MINUTE={:?}, using {}",
                raw,
                DEFAULT_WORDS_PER_MINUTE
            );
            DEFAULT_WORDS_PER_MINUTE
        }
    }
}

/// Prismic repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrismicConfig {
    /// API root, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    pub document_type: String,
    pub timeout_secs: u64,
}

impl Default for PrismicConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: None,
            document_type: "posts".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Listing page configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub page_size: usize,
    pub revalidate_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            page_size: 3,
            revalidate_secs: 60,
        }
    }
}

/// Post page configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    /// How many posts are rendered at build time; the rest go through the fallback page
    pub prerender_count: usize,
    pub revalidate_secs: u64,
    pub words_per_minute: u32,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            prerender_count: 1,
            revalidate_secs: 60 * 60 * 6,
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
        }
    }
}
