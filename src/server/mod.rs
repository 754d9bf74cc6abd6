//! HTTP server for generated pages
//!
//! Post routes are served from the page cache. A route that was never
//! generated is rendered while the request waits (blocking fallback); a
//! stale route is served as-is while it is regenerated in the background.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cache::{Lookup, PageCache};
use crate::generator::{Generator, PathParams, RenderedPage};
use crate::helpers::post_route;
use crate::store::ContentStore;
use crate::Blog;

/// Server state
pub struct ServerState {
    blog: Blog,
    generator: Generator,
    store: Arc<dyn ContentStore>,
    cache: PageCache,
    not_found_html: String,
}

impl ServerState {
    pub fn new(blog: &Blog, store: Arc<dyn ContentStore>) -> Result<Self> {
        let generator = Generator::new(blog)?;
        let not_found_html = generator.render_not_found()?;

        Ok(Self {
            blog: blog.clone(),
            generator,
            store,
            cache: PageCache::new(),
            not_found_html,
        })
    }

    /// Generate the site to disk and seed the cache with every pre-rendered page
    pub async fn prerender(&self) -> Result<usize> {
        let report = self.generator.generate(self.store.as_ref()).await?;
        let count = report.pages.len();
        for page in report.pages {
            self.cache.insert(&page.route, page.html, page.revalidate).await;
        }
        Ok(count)
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }
}

/// A route the server can (re)generate
#[derive(Debug, Clone)]
enum PageKey {
    Index,
    Post(String),
}

impl PageKey {
    fn route(&self) -> String {
        match self {
            PageKey::Index => "/".to_string(),
            PageKey::Post(slug) => post_route(slug),
        }
    }
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16, open: bool) -> Result<()> {
    let store = blog.store()?;
    let state = Arc::new(ServerState::new(blog, store)?);

    tracing::info!("Pre-rendering pages...");
    let count = state.prerender().await?;
    tracing::info!(
        "Pre-rendered {} pages, {} routes cached",
        count,
        state.cache().len().await
    );

    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/post/:slug", get(post_handler))
        .route("/post/:slug/", get(post_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index_handler(State(state): State<Arc<ServerState>>) -> Response {
    serve_page(state, PageKey::Index).await
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    serve_page(state, PageKey::Post(slug)).await
}

async fn serve_page(state: Arc<ServerState>, key: PageKey) -> Response {
    let route = key.route();

    match state.cache.lookup(&route).await {
        Lookup::Fresh(html) => Html(html).into_response(),
        Lookup::Stale(html) => {
            if state.cache.begin_regeneration(&route).await {
                tracing::debug!("Revalidating {}", route);
                tokio::spawn(regenerate(state.clone(), key));
            }
            Html(html).into_response()
        }
        Lookup::Miss => match render(&state, &key).await {
            Ok(Some(page)) => {
                state
                    .cache
                    .insert(&route, page.html.clone(), page.revalidate)
                    .await;
                tracing::debug!("Generated {} on demand", route);
                Html(page.html).into_response()
            }
            Ok(None) => not_found(&state),
            Err(e) => {
                tracing::error!("Failed to generate {}: {:#}", route, e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        },
    }
}

async fn render(state: &ServerState, key: &PageKey) -> Result<Option<RenderedPage>> {
    match key {
        PageKey::Index => Ok(Some(
            state
                .generator
                .render_index_page(state.store.as_ref())
                .await?,
        )),
        PageKey::Post(slug) => {
            let params = PathParams { slug: slug.clone() };
            state
                .generator
                .render_route(state.store.as_ref(), &params)
                .await
        }
    }
}

/// Background regeneration of a stale page
async fn regenerate(state: Arc<ServerState>, key: PageKey) {
    let route = key.route();
    match render(&state, &key).await {
        Ok(Some(page)) => {
            state.cache.insert(&route, page.html, page.revalidate).await;
            tracing::debug!("Regenerated {}", route);
        }
        Ok(None) => {
            state.cache.remove(&route).await;
            tracing::info!("{} no longer exists, evicted", route);
        }
        Err(e) => {
            state.cache.end_regeneration(&route).await;
            tracing::error!("Regeneration of {} failed, keeping stale page: {:#}", route, e);
        }
    }
}

/// Serve generated assets, or the 404 page
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let mut service = ServeDir::new(&state.blog.public_dir);
    match service.try_call(request).await {
        Ok(response) if response.status() != StatusCode::NOT_FOUND => response.into_response(),
        Ok(_) => not_found(&state),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

fn not_found(state: &ServerState) -> Response {
    (StatusCode::NOT_FOUND, Html(state.not_found_html.clone())).into_response()
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_helpers::{sample_documents, temp_blog};
    use std::time::Duration;
    use tower::ServiceExt;

    fn state_for(blog: &Blog) -> Arc<ServerState> {
        let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::from_documents(sample_documents()));
        Arc::new(ServerState::new(blog, store).unwrap())
    }

    async fn get_page(state: &Arc<ServerState>, uri: &str) -> (StatusCode, String) {
        let response = router(state.clone())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_blocking_fallback_generates_on_demand() {
        let (_tmp, blog) = temp_blog();
        let state = state_for(&blog);
        assert!(state.cache().is_empty().await);

        let (status, body) = get_page(&state, "/post/hello-world").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Hello World"));
        assert!(matches!(
            state.cache().lookup("/post/hello-world/").await,
            Lookup::Fresh(_)
        ));
    }

    #[tokio::test]
    async fn test_unknown_slug_is_404() {
        let (_tmp, blog) = temp_blog();
        let state = state_for(&blog);

        let (status, body) = get_page(&state, "/post/nope/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("This page could not be found."));
        assert!(state.cache().is_empty().await);

        let (status, _) = get_page(&state, "/no/such/file.css").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stale_page_is_served_then_regenerated() {
        let (_tmp, mut blog) = temp_blog();
        blog.config.revalidate = 0;
        let state = state_for(&blog);
        state
            .cache()
            .insert("/post/hello-world/", "old page".to_string(), Duration::ZERO)
            .await;

        let (status, body) = get_page(&state, "/post/hello-world/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "old page");

        let mut regenerated = false;
        for _ in 0..50 {
            match state.cache().lookup("/post/hello-world/").await {
                Lookup::Stale(html) | Lookup::Fresh(html) if html.contains("Hello World") => {
                    regenerated = true;
                    break;
                }
                _ => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }
        assert!(regenerated, "background regeneration did not replace the page");
    }

    #[tokio::test]
    async fn test_prerender_seeds_cache() {
        let (_tmp, blog) = temp_blog();
        let state = state_for(&blog);

        assert_eq!(state.prerender().await.unwrap(), 2);
        assert_eq!(state.cache().len().await, 2);
        assert!(matches!(state.cache().lookup("/").await, Lookup::Fresh(_)));

        let (status, body) = get_page(&state, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/post/hello-world/"));

        let (status, _) = get_page(&state, "/404.html").await;
        assert_eq!(status, StatusCode::OK);
    }
}
