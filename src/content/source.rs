//! Where posts come from
//!
//! Views and the generator depend on [`ContentSource`] rather than on the
//! HTTP client, so a single client can be built at startup and handed to
//! everything that needs it.

use async_trait::async_trait;

use super::post::{PostDetail, PostPage};
use crate::error::ContentError;
use crate::prismic::{Predicate, PrismicClient, Query};

/// Read access to published posts
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// First page of post summaries
    async fn first_page(&self, page_size: usize) -> Result<PostPage, ContentError>;

    /// The page behind a next-page pointer
    async fn next_page(&self, cursor: &str) -> Result<PostPage, ContentError>;

    /// One post by uid; `ContentError::NotFound` when it does not exist
    async fn post(&self, uid: &str) -> Result<PostDetail, ContentError>;
}

/// Posts stored as a Prismic custom type
pub struct PrismicSource {
    client: PrismicClient,
    doc_type: String,
}

impl PrismicSource {
    pub fn new(client: PrismicClient, doc_type: impl Into<String>) -> Self {
        Self {
            client,
            doc_type: doc_type.into(),
        }
    }

    /// Query for post summaries, projecting only the fields the listing shows
    fn summary_query(&self, page_size: usize) -> Query {
        let field = |name: &str| format!("{}.{}", self.doc_type, name);
        Query::new(Predicate::document_type(&self.doc_type))
            .page_size(page_size)
            .fetch([field("title"), field("subtitle"), field("author")])
    }
}

#[async_trait]
impl ContentSource for PrismicSource {
    async fn first_page(&self, page_size: usize) -> Result<PostPage, ContentError> {
        let response = self.client.query(&self.summary_query(page_size)).await?;
        tracing::debug!(
            results = response.results.len(),
            total = response.total_results_size,
            "fetched first page"
        );
        Ok(PostPage::from(response))
    }

    async fn next_page(&self, cursor: &str) -> Result<PostPage, ContentError> {
        let response = self.client.fetch_next(cursor).await?;
        tracing::debug!(
            page = response.page,
            results = response.results.len(),
            "fetched next page"
        );
        Ok(PostPage::from(response))
    }

    async fn post(&self, uid: &str) -> Result<PostDetail, ContentError> {
        let doc = self
            .client
            .get_by_uid(&self.doc_type, uid)
            .await?
            .ok_or_else(|| ContentError::NotFound(uid.to_string()))?;
        PostDetail::try_from(doc)
    }
}
