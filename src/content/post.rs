//! Post models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::richtext::RichTextNode;

/// A post as shown on the listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    /// Unique identifier, used in the post URL
    pub uid: String,

    /// First publication date, absent for documents never published
    pub first_publication_date: Option<DateTime<Utc>>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A full post as shown on its own page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub uid: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub title: String,
    pub banner: Option<Banner>,
    pub author: String,

    /// Ordered content blocks
    pub content: Vec<ContentBlock>,
}

/// Post banner image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub url: String,
    pub alt: Option<String>,
}

/// A section of a post: a heading and its rich text body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub heading: String,
    pub body: Vec<RichTextNode>,
}

/// One page of a paginated post query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPage {
    pub results: Vec<PostSummary>,

    /// Opaque pointer to the following page; `None` ends the collection
    pub next_page: Option<String>,
}

impl PostPage {
    pub fn new(results: Vec<PostSummary>, next_page: Option<String>) -> Self {
        Self { results, next_page }
    }

    pub fn has_next(&self) -> bool {
        self.next_page.is_some()
    }
}
