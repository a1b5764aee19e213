use crate::catalog::RecipeService;
use crate::config::Config;
use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod error;
pub mod openapi;
pub mod routes_categories;
pub mod routes_recipes;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub service: Arc<RecipeService>,
    pub config: Arc<Config>,
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let uploads = &ctx.config.uploads;
    let public_prefix = uploads.public_prefix.trim_end_matches('/').to_string();
    let serve_uploads = ServeDir::new(&uploads.dir);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes(&ctx))
        // Uploaded files, one-to-one with the upload directory
        .nest_service(&public_prefix, serve_uploads)
        .layer(cors_layer(&ctx.config.server.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

fn api_routes(ctx: &AppContext) -> Router<AppContext> {
    routes_recipes::recipe_routes(ctx.config.uploads.max_bytes)
        .merge(routes_categories::category_routes())
        .merge(openapi::openapi_routes())
}

/// CORS for the configured origins. `"*"` allows any origin; entries that
/// are not valid header values are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "recipebox API is healthy",
    }))
}

/// Start the HTTP server and run until a shutdown signal arrives
pub async fn start_server(config: Config, service: Arc<RecipeService>) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let ctx = AppContext {
        service,
        config: Arc::new(config),
    };
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SqliteRecipeRepository;
    use crate::config::DocumentBackend;
    use crate::images::{LocalBlobStore, MemoryImageRepository};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(dir: &std::path::Path) -> Router {
        let mut config = Config::default();
        config.documents.backend = DocumentBackend::Memory;
        config.uploads.dir = dir.to_path_buf();

        let service = RecipeService::new(
            Arc::new(SqliteRecipeRepository::new(
                recipebox_db::pool::init_memory_pool().unwrap(),
            )),
            Arc::new(MemoryImageRepository::new()),
            Arc::new(LocalBlobStore::new(dir, "/uploads", 1024).unwrap()),
            Duration::from_secs(5),
        );
        create_router(AppContext {
            service: Arc::new(service),
            config: Arc::new(config),
        })
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(app(dir.path()), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        for uri in ["/api/v1/recipes/abc", "/api/v1/recipes/0", "/api/v1/recipes/-3"] {
            let (status, body) = send(app(dir.path()), get(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["code"], "validation_error");
        }
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_shape() {
        let dir = tempfile::tempdir().unwrap();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/recipes")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"title\": "))
            .unwrap();

        let (status, body) = send(app(dir.path()), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_error");
    }

    #[tokio::test]
    async fn test_openapi_served() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(app(dir.path()), get("/api/v1/openapi.json")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/v1/recipes"].is_object());
    }

    #[test]
    fn test_cors_skips_invalid_origins() {
        // Must not panic on a value that cannot be a header.
        let _ = cors_layer(&["http://localhost:3000".to_string(), "bad\norigin".to_string()]);
        let _ = cors_layer(&["*".to_string()]);
    }
}
