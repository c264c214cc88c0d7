//! HTTP server layer for the file host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌────────────┐  ┌──────────┐ │
//! │  │    host     │  │    auth     │  │  handlers  │  │  routes  │ │
//! │  │ (allow-list)│  │ (token gate)│  │ (requests) │  │ (router) │ │
//! │  └─────────────┘  └─────────────┘  └────────────┘  └──────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod handlers;
pub mod host;
pub mod routes;

pub use auth::{hash_token, token_middleware, AuthError, CredentialError, TokenGate, TOKEN_HEADER};
pub use handlers::{
    delete_model_handler, delete_team_handler, get_file_handler, get_model_file_handler,
    health_handler, heatmap_handler, upload_file_handler, upload_model_handler, ApiError,
    AppState, ErrorResponse, HealthResponse, ModelUploadQuery, SuccessResponse, ZIP_MEDIA_TYPES,
};
pub use host::{host_filter, HostAllowList};
pub use routes::{create_router, RouterConfig, DEFAULT_ALLOWED_HOSTS, DEFAULT_MAX_UPLOAD_BYTES};
