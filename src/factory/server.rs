//! HTTP server wiring: CORS policy, the embedded search page, and startup.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    body::Body,
    http::{HeaderName, HeaderValue, Method, Request, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use tower_http::cors::{Any, CorsLayer};

use super::api::{self, AppState, SharedState};
use super::embedded::Assets;
use super::pg::PgStore;
use super::store::{BoxStore, MemoryStore};
use crate::config::{DEFAULT_API_PORT, PgParams};

/// Configuration for the inventory server.
pub struct ServerConfig {
    pub port: u16,
    pub in_memory: bool,
    pub allowed_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_API_PORT,
            in_memory: false,
            allowed_origin: None,
        }
    }
}

/// CORS policy for browser clients served from a different origin.
///
/// `None` answers every origin with `*`; `Some` pins the allow-origin
/// header to exactly that site.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-requested-with"),
        ]);
    Ok(match origin {
        Some(origin) => {
            let value: HeaderValue = origin
                .parse()
                .with_context(|| format!("Invalid origin {origin:?}"))?;
            layer.allow_origin(value)
        }
        None => layer.allow_origin(Any),
    })
}

/// Build the full application router: API routes plus the embedded search
/// page for everything else.
pub fn build_router(state: SharedState, cors: CorsLayer) -> Router {
    api::api_router()
        .fallback(static_handler)
        .with_state(state)
        .layer(cors)
}

/// Serve embedded files, falling back to the search page so `/boxes` and
/// any other bookmarked path land on the UI.
async fn static_handler(req: Request<Body>) -> impl IntoResponse {
    let path = req.uri().path().trim_start_matches('/');

    // Exact asset match first
    if !path.is_empty() {
        if let Some(content) = Assets::get(path) {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            return Response::builder()
                .header(header::CONTENT_TYPE, mime.as_ref())
                .body(Body::from(content.data.to_vec()))
                .unwrap()
                .into_response();
        }
    }

    match Assets::get("index.html") {
        Some(content) => Html(String::from_utf8_lossy(&content.data).to_string()).into_response(),
        None => (StatusCode::NOT_FOUND, "Search page not embedded").into_response(),
    }
}

/// Open the store, bind the listener, and serve until Ctrl+C.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let store: Arc<dyn BoxStore> = if config.in_memory {
        tracing::info!("Serving from a transient in-memory inventory");
        Arc::new(MemoryStore::new())
    } else {
        let params = PgParams::from_env()?;
        tracing::info!(host = %params.host, db = %params.dbname, "Connecting to Postgres");
        Arc::new(
            PgStore::connect(&params)
                .await
                .context("Failed to connect to Postgres")?,
        )
    };

    let state = Arc::new(AppState { store });
    let cors = cors_layer(config.allowed_origin.as_deref())?;
    let app = build_router(state, cors);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    println!("Box factory running at http://{}", local_addr);
    println!("Search page: http://{}/boxes", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    println!("Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    println!("\nShutting down...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn memory_state() -> SharedState {
        Arc::new(AppState {
            store: Arc::new(MemoryStore::new()),
        })
    }

    fn test_router() -> Router {
        build_router(memory_state(), cors_layer(None).unwrap())
    }

    #[tokio::test]
    async fn test_health_via_full_router() {
        let app = test_router();
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_routes_mounted() {
        let app = test_router();
        let req = Request::builder()
            .uri("/api/boxes")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_search_page_served_at_boxes() {
        let app = test_router();
        let req = Request::builder()
            .uri("/boxes")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("text/html"));

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("search text"));
    }

    #[tokio::test]
    async fn test_index_html_served_directly() {
        let app = test_router();
        let req = Request::builder()
            .uri("/index.html")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("text/html"));
    }

    #[tokio::test]
    async fn test_unknown_path_falls_back_to_search_page() {
        let app = test_router();
        let req = Request::builder()
            .uri("/some/client/route")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("Box Factory"));
    }

    #[tokio::test]
    async fn test_preflight_allows_browser_clients() {
        let app = test_router();
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/boxes")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "PUT")
            .header("access-control-request-headers", "content-type,x-requested-with")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let headers = resp.headers();
        assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");

        let methods = headers
            .get("access-control-allow-methods")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(methods.contains("GET"));
        assert!(methods.contains("PUT"));

        let allowed = headers
            .get("access-control-allow-headers")
            .unwrap()
            .to_str()
            .unwrap()
            .to_lowercase();
        assert!(allowed.contains("x-requested-with"));
    }

    #[tokio::test]
    async fn test_pinned_origin_is_echoed() {
        let app = build_router(
            memory_state(),
            cors_layer(Some("http://example.com")).unwrap(),
        );
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/boxes")
            .header("origin", "http://example.com")
            .header("access-control-request-method", "GET")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(
            resp.headers().get("access-control-allow-origin").unwrap(),
            "http://example.com"
        );
    }

    #[tokio::test]
    async fn test_unlisted_origin_is_not_allowed() {
        let app = build_router(
            memory_state(),
            cors_layer(Some("http://example.com")).unwrap(),
        );
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/boxes")
            .header("origin", "http://other.example")
            .header("access-control-request-method", "GET")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert!(
            resp.headers()
                .get("access-control-allow-origin")
                .is_none()
        );
    }

    #[test]
    fn test_cors_layer_rejects_malformed_origin() {
        assert!(cors_layer(Some("not a header value")).is_err());
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5000);
        assert!(!config.in_memory);
        assert!(config.allowed_origin.is_none());
    }
}
