//! HTTP server with page revalidation
//!
//! Pages are rendered at startup and served from the [`PageCache`]. A page
//! past its revalidation interval is still served while one background task
//! renders its replacement. Posts that were not rendered at startup get the
//! loading page until their first render lands in the cache; if that render
//! fails they get an error page until the failure marker expires.

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path as FsPath;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cache::{Lookup, PageCache, Rendered};
use crate::error::ContentError;
use crate::generator::Generator;
use crate::helpers::post_path;
use crate::listing::ListingState;
use crate::templates::SummaryData;
use crate::SpaceTraveling;

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    generator: Generator,
    cache: PageCache,
}

impl AppState {
    pub fn new(generator: Generator) -> Self {
        Self::with_cache(generator, PageCache::new())
    }

    pub fn with_cache(generator: Generator, cache: PageCache) -> Self {
        Self { generator, cache }
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    /// Build the site, write it out and fill the cache with the result
    pub async fn prepare(&self) -> Result<()> {
        let pages = self.generator.build().await?;
        self.generator.write(&pages)?;
        for page in pages {
            self.cache
                .store(&page.route, page.rendered, page.revalidate)
                .await;
        }
        Ok(())
    }
}

/// A route rendered by the server
#[derive(Debug, Clone, PartialEq, Eq)]
enum PageRoute {
    Home,
    Post(String),
}

impl PageRoute {
    fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Post(uid) => post_path(uid),
        }
    }

    fn revalidate(&self, generator: &Generator) -> std::time::Duration {
        match self {
            Self::Home => generator.listing_revalidate(),
            Self::Post(_) => generator.post_revalidate(),
        }
    }
}

/// Start the server
pub async fn start(site: &SpaceTraveling, ip: &str, port: u16) -> Result<()> {
    let generator = Generator::new(site, site.content_source()?)?;
    let state = AppState::new(generator);

    tracing::info!("Generating pages...");
    state.prepare().await?;

    let app = router(state, &site.public_dir);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Routes of the site; anything else is served from `public_dir`
pub fn router(state: AppState, public_dir: &FsPath) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/post/:slug", get(post_handler))
        .route("/api/posts", get(posts_handler))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home_handler(State(state): State<AppState>) -> Response {
    serve_page(&state, PageRoute::Home).await
}

async fn post_handler(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    serve_page(&state, PageRoute::Post(slug)).await
}

async fn serve_page(state: &AppState, route: PageRoute) -> Response {
    let path = route.path();

    match state.cache.lookup(&path).await {
        Lookup::Fresh(rendered) => page_response(state, &route, rendered),
        Lookup::Stale(rendered) => {
            regenerate(state, route.clone());
            page_response(state, &route, rendered)
        }
        Lookup::Missing => match route {
            PageRoute::Home => match render(&state.generator, &route).await {
                Ok(rendered) => {
                    let revalidate = route.revalidate(&state.generator);
                    state.cache.store(&path, rendered.clone(), revalidate).await;
                    page_response(state, &route, rendered)
                }
                Err(e) => {
                    tracing::error!("Failed to render {}: {}", path, e);
                    error_response(
                        state,
                        StatusCode::BAD_GATEWAY,
                        "Erro",
                        "Não foi possível carregar os posts.",
                    )
                }
            },
            PageRoute::Post(_) => {
                regenerate(state, route);
                match state.generator.render_fallback() {
                    Ok(html) => ([(header::CACHE_CONTROL, "no-store")], Html(html)).into_response(),
                    Err(e) => {
                        tracing::error!("Failed to render fallback page: {}", e);
                        (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
                    }
                }
            }
        },
    }
}

async fn render(generator: &Generator, route: &PageRoute) -> Result<Rendered> {
    match route {
        PageRoute::Home => Ok(Rendered::Page(generator.render_home().await?)),
        PageRoute::Post(uid) => generator.render_post(uid).await,
    }
}

/// Render `route` in the background unless a render of it is already running
///
/// On failure the cached page, if any, stays in place. A route with nothing
/// cached gets a failure marker, so visitors see an error page instead of the
/// loading page until the next attempt.
fn regenerate(state: &AppState, route: PageRoute) {
    let path = route.path();
    if !state.cache.try_begin(&path) {
        return;
    }

    let state = state.clone();
    tokio::spawn(async move {
        tracing::debug!("Regenerating {}", path);
        match render(&state.generator, &route).await {
            Ok(rendered) => {
                // Unknown posts are checked again sooner than published ones
                let revalidate = match rendered {
                    Rendered::Page(_) => route.revalidate(&state.generator),
                    Rendered::NotFound | Rendered::Failed => state.generator.listing_revalidate(),
                };
                state.cache.store(&path, rendered, revalidate).await;
            }
            Err(e) => {
                tracing::error!("Failed to regenerate {}: {}", path, e);
                state
                    .cache
                    .store_failure(&path, state.generator.listing_revalidate())
                    .await;
            }
        }
        state.cache.finish(&path);
    });
}

fn page_response(state: &AppState, route: &PageRoute, rendered: Rendered) -> Response {
    match rendered {
        Rendered::Page(html) => {
            let cache_control = format!(
                "s-maxage={}, stale-while-revalidate",
                route.revalidate(&state.generator).as_secs()
            );
            ([(header::CACHE_CONTROL, cache_control)], Html(html)).into_response()
        }
        Rendered::NotFound => error_response(
            state,
            StatusCode::NOT_FOUND,
            "Post não encontrado",
            "O post que você procura não existe.",
        ),
        Rendered::Failed => error_response(
            state,
            StatusCode::BAD_GATEWAY,
            "Erro",
            "Não foi possível carregar o post. Tente novamente mais tarde.",
        ),
    }
}

fn error_response(state: &AppState, status: StatusCode, heading: &str, message: &str) -> Response {
    match state.generator.render_error(heading, message) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct PostsParams {
    cursor: Option<String>,
}

/// Body of `/api/posts`
#[derive(Debug, Serialize)]
struct PostsResponse {
    results: Vec<SummaryData>,
    next_page: Option<String>,
}

/// A failed `/api/posts` request
struct ApiError(ContentError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ContentError::InvalidCursor(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        };
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Next page of post summaries for the "load more" button
async fn posts_handler(
    State(state): State<AppState>,
    Query(params): Query<PostsParams>,
) -> Result<Json<PostsResponse>, ApiError> {
    let source = state.generator.source();
    let config = state.generator.config();

    let listing = match params.cursor {
        Some(cursor) => {
            let mut listing = ListingState::resume(cursor);
            listing.load_more(source).await.map_err(ApiError)?;
            listing
        }
        None => ListingState::new(
            source
                .first_page(config.index.page_size)
                .await
                .map_err(ApiError)?,
        ),
    };

    Ok(Json(PostsResponse {
        results: listing.summaries(config),
        next_page: listing.next_page().map(str::to_string),
    }))
}
