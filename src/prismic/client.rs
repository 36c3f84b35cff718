//! HTTP client for the Prismic REST API (v2)

use std::time::{Duration, Instant};

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::RwLock;

use super::predicate::{Predicate, Query};
use crate::config::PrismicConfig;
use crate::error::ContentError;

/// How long the master ref is reused before asking the API root again
const MASTER_REF_TTL: Duration = Duration::from_secs(5);

/// A document as returned by the search endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    /// Custom-type fields; shape depends on the document type and the fetch projection
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Response of `documents/search`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub results_per_page: usize,
    #[serde(default)]
    pub total_results_size: usize,
    #[serde(default)]
    pub total_pages: usize,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub results: Vec<Document>,
}

#[derive(Debug, Deserialize)]
struct ApiRoot {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

/// Client bound to one Prismic repository
///
/// Built once per process and shared by reference; it holds a connection pool.
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: Url,
    access_token: Option<String>,
    master_ref: RwLock<Option<(String, Instant)>>,
}

impl PrismicClient {
    /// Create a client for the configured repository
    pub fn new(config: &PrismicConfig) -> Result<Self, ContentError> {
        let endpoint = config.endpoint.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(ContentError::Config(
                "no Prismic endpoint configured (set PRISMIC_API_ENDPOINT)".to_string(),
            ));
        }
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ContentError::Config(format!("bad endpoint {:?}: {}", endpoint, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            access_token: config.access_token.clone(),
            master_ref: RwLock::new(None),
        })
    }

    /// The ref of the currently published content
    pub async fn master_ref(&self) -> Result<String, ContentError> {
        if let Some((reference, fetched_at)) = self.master_ref.read().await.as_ref() {
            if fetched_at.elapsed() < MASTER_REF_TTL {
                return Ok(reference.clone());
            }
        }

        let mut url = self.endpoint.clone();
        self.append_token(&mut url);
        let root: ApiRoot = self.get_json(url).await?;
        let reference = root
            .refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or(ContentError::NoMasterRef)?;

        *self.master_ref.write().await = Some((reference.clone(), Instant::now()));
        tracing::debug!(reference = %reference, "fetched master ref");
        Ok(reference)
    }

    /// Run a predicate query against the master ref
    pub async fn query(&self, query: &Query) -> Result<SearchResponse, ContentError> {
        let reference = self.master_ref().await?;
        let url = self.search_url(&reference, query);
        tracing::debug!(q = %query.q(), "querying documents");
        self.get_json(url).await
    }

    /// Fetch one document of `doc_type` by uid; `Ok(None)` when nothing matches
    pub async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
    ) -> Result<Option<Document>, ContentError> {
        let response = self.query(&uid_query(doc_type, uid)).await?;
        Ok(response.results.into_iter().next())
    }

    /// Follow a `next_page` URL handed out by a previous search
    pub async fn fetch_next(&self, next_page: &str) -> Result<SearchResponse, ContentError> {
        let url = self.validate_cursor(next_page)?;
        self.get_json(url).await
    }

    /// Search URL for a query at `reference`
    pub fn search_url(&self, reference: &str, query: &Query) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("documents").push("search");
        }
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ref", reference);
            for (key, value) in query.params() {
                pairs.append_pair(key, &value);
            }
        }
        self.append_token(&mut url);
        url
    }

    /// Accept only page pointers that lead back to the configured repository
    pub fn validate_cursor(&self, cursor: &str) -> Result<Url, ContentError> {
        let mut url =
            Url::parse(cursor).map_err(|_| ContentError::InvalidCursor(cursor.to_string()))?;

        let same_origin = url.scheme() == self.endpoint.scheme()
            && url.host_str() == self.endpoint.host_str()
            && url.port_or_known_default() == self.endpoint.port_or_known_default();
        if !same_origin || !under_path(url.path(), self.endpoint.path()) {
            return Err(ContentError::InvalidCursor(cursor.to_string()));
        }

        self.append_token(&mut url);
        Ok(url)
    }

    fn append_token(&self, url: &mut Url) {
        let Some(ref token) = self.access_token else {
            return;
        };
        if url.query_pairs().any(|(key, _)| key == "access_token") {
            return;
        }
        url.query_pairs_mut().append_pair("access_token", token);
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ContentError> {
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status {
                status,
                url: redact(&url),
            });
        }
        Ok(response.json::<T>().await?)
    }
}

/// Query for the single document of `doc_type` with `uid`
fn uid_query(doc_type: &str, uid: &str) -> Query {
    Query::new(Predicate::document_type(doc_type))
        .and(Predicate::at(format!("my.{}.uid", doc_type), uid))
        .page_size(1)
}

/// Whether `path` is `base` or lies below it, segment-wise
fn under_path(path: &str, base: &str) -> bool {
    let base = base.trim_end_matches('/');
    match path.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// URL without its query string, safe to log
fn redact(url: &Url) -> String {
    format!("{}{}", url.origin().ascii_serialization(), url.path())
}
