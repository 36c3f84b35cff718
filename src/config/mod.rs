//! Configuration module

mod site;

pub use site::parse_words_per_minute;
pub use site::IndexConfig;
pub use site::PostConfig;
pub use site::PrismicConfig;
pub use site::SiteConfig;
pub use site::DEFAULT_WORDS_PER_MINUTE;
