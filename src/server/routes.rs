//! Router configuration for the file host.
//!
//! # Route Structure
//!
//! ```text
//! POST   /api/{team}/file                          - Upload file (token)
//! POST   /api/{team}/model                         - Upload model zip (token)
//! DELETE /api/{team}/model/{modelname}             - Delete model (token)
//! DELETE /api/{team}                               - Delete team (token)
//! GET    /api/{team}/file/{filename}               - Download file
//! GET    /api/{team}/model/{modelname}/{*filename} - Download model file
//! POST   /api/report/image                         - Heatmap PNG
//! GET    /health                                   - Health check
//! ```
//!
//! Layer order, outermost first: tracing, host allow-list, panic catcher,
//! body limit, CORS, then the per-route token gate.

use std::any::Any;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use http::header::{HeaderName, CONTENT_TYPE};
use http::Method;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::{token_middleware, TokenGate, TOKEN_HEADER};
use super::handlers::{
    delete_model_handler, delete_team_handler, get_file_handler, get_model_file_handler,
    health_handler, heatmap_handler, upload_file_handler, upload_model_handler, ApiError,
    AppState,
};
use super::host::{host_filter, HostAllowList};

/// Host names accepted when none are configured explicitly.
pub const DEFAULT_ALLOWED_HOSTS: [&str; 4] =
    ["ryulrudaga.com", "fs.hyunfit.life", "localhost", "127.0.0.1"];

/// Default request body limit for uploads (256 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Gate for upload and delete routes
    pub token_gate: TokenGate,

    /// Host names requests may target
    pub allowed_hosts: Vec<String>,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Maximum request body size in bytes
    pub max_upload_bytes: usize,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a configuration with the default host allow-list, any CORS
    /// origin, a 256 MiB body limit and tracing enabled.
    pub fn new(token_gate: TokenGate) -> Self {
        Self {
            token_gate,
            allowed_hosts: DEFAULT_ALLOWED_HOSTS.iter().map(|h| h.to_string()).collect(),
            cors_origins: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            enable_tracing: true,
        }
    }

    /// Replace the host allow-list.
    pub fn with_allowed_hosts(mut self, hosts: Vec<String>) -> Self {
        self.allowed_hosts = hosts;
        self
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Set the maximum request body size.
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
pub fn create_router(state: AppState, config: RouterConfig) -> Router {
    let protected_routes = Router::new()
        .route("/api/{team}/file", post(upload_file_handler))
        .route("/api/{team}/model", post(upload_model_handler))
        .route("/api/{team}/model/{modelname}", delete(delete_model_handler))
        .route("/api/{team}", delete(delete_team_handler))
        .route_layer(middleware::from_fn_with_state(
            config.token_gate.clone(),
            token_middleware,
        ));

    let public_routes = Router::new()
        .route("/api/{team}/file/{filename}", get(get_file_handler))
        .route(
            "/api/{team}/model/{modelname}/{*filename}",
            get(get_model_file_handler),
        )
        .route("/api/report/image", post(heatmap_handler))
        .route("/health", get(health_handler));

    let allowed_hosts = HostAllowList::new(&config.allowed_hosts);

    let router = Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .with_state(state)
        .layer(build_cors_layer(&config))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(allowed_hosts, host_filter));

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(TOKEN_HEADER)])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(AnyOrigin),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

/// Turn a handler panic into the generic 500 JSON body.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::server_fault(detail).into_response()
}

// =============================================================================
// Tests
// =============================================================================
