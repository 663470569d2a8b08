//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, timeout, body limit, auth)
//! - Bind server to listener
//! - Persist the store once the server has drained

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath, State},
    http::{HeaderValue, Method, Request},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{AppConfig, CorsConfig};
use crate::http::{analytics, auth, employers, jobs, ApiError};
use crate::observability::metrics;
use crate::store::Store;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Run a store mutation on the blocking pool; it may write the snapshot file.
    pub async fn mutate<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&Store) -> R + Send + 'static,
        R: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| ApiError::Internal(format!("store task failed: {}", e)))
    }
}

/// HTTP server for the tracker API.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    store: Store,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and store.
    pub fn new(config: AppConfig, store: Store) -> Self {
        let state = AppState {
            store: store.clone(),
            config: Arc::new(config.clone()),
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            store,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let api = Router::new()
            .route(
                "/api/jobs",
                get(jobs::list_jobs).post(jobs::create_job),
            )
            .route(
                "/api/jobs/{id}",
                get(jobs::get_job)
                    .put(jobs::update_job)
                    .delete(jobs::delete_job),
            )
            .route(
                "/api/employers",
                get(employers::list_employers).post(employers::create_employer),
            )
            .route(
                "/api/employers/{id}",
                get(employers::get_employer)
                    .put(employers::update_employer)
                    .delete(employers::delete_employer),
            )
            .route("/api/analytics", get(analytics::get_salary_pivot))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::require_token,
            ));

        Router::new()
            .route("/", get(root))
            .route("/health", get(health))
            .merge(api)
            .route_layer(middleware::from_fn(track_metrics))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.listener.max_body_bytes))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(cors_layer(&config.cors))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// A clone of the fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then save the store.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        if let Err(e) = self.store.save_to_file() {
            tracing::error!(error = %e, "Failed to save store on shutdown");
        }
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = if config.allowed_origin == "*" {
        AllowOrigin::any()
    } else {
        match config.allowed_origin.parse::<HeaderValue>() {
            Ok(origin) => AllowOrigin::exact(origin),
            Err(_) => {
                tracing::warn!(origin = %config.allowed_origin, "Invalid CORS origin, cross-origin requests disabled");
                AllowOrigin::list(Vec::<HeaderValue>::new())
            }
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

async fn root() -> &'static str {
    "Jobzan Backend API is running!"
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let (employers, jobs) = state.store.counts();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "employers": employers,
        "jobs": jobs,
    }))
}

async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_request(&method, &route, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use tower::ServiceExt;

    fn server(config: AppConfig) -> HttpServer {
        HttpServer::new(config, Store::new(None))
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_root() {
        let response = server(AppConfig::default())
            .router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(body_string(response).await, "Jobzan Backend API is running!");
    }

    #[tokio::test]
    async fn test_missing_job_is_404_text() {
        let response = server(AppConfig::default())
            .router()
            .oneshot(Request::get("/api/jobs/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "Job not found");
    }

    #[tokio::test]
    async fn test_auth_guard() {
        let mut config = AppConfig::default();
        config.auth.enabled = true;
        config.auth.api_token = "s3cret".into();
        let router = server(config).router();

        let denied = router
            .clone()
            .oneshot(Request::get("/api/employers").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);

        let allowed = router
            .clone()
            .oneshot(
                Request::get("/api/employers")
                    .header(header::AUTHORIZATION, "Bearer s3cret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(allowed.status(), StatusCode::OK);

        // Health stays public
        let health = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_job_with_unknown_employer() {
        let body = serde_json::json!({
            "employerId": "ghost",
            "title": "Engineer",
            "salary": 1,
            "status": "lead",
            "commute": "remote"
        });
        let response = server(AppConfig::default())
            .router()
            .oneshot(
                Request::post("/api/jobs")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response).await.contains("Unknown employer 'ghost'"));
    }
}
