//! # Team File Host
//!
//! A small HTTP service that stores files and unpacked model archives per
//! team on the local filesystem, and renders muscle-group heatmap images.
//!
//! ## Features
//!
//! - **Team storage**: single files and zip-packaged models under `{root}/{team}`
//! - **Exclusive creation**: uploads never overwrite an existing file or model
//! - **Per-entry extraction report**: unsafe or broken zip entries are skipped and listed
//! - **Token gate**: uploads and deletes require a token verified against an Argon2 hash
//! - **Host allow-list**: requests for unknown hosts are refused before routing
//! - **Heatmaps**: a weight vector becomes a composited PNG
//!
//! ## Architecture
//!
//! - [`store`] - Filesystem storage, path validation and zip extraction
//! - [`heatmap`] - Weight bucketing and image compositing
//! - [`server`] - Axum-based HTTP server, middleware and routes
//! - [`config`] - CLI and configuration types
//! - [`error`] - Error types shared by the layers
//!
//! ## Example
//!
//! ```rust,no_run
//! use team_file_host::{create_router, hash_token, AppState, HeatmapCompositor, RouterConfig, TeamFileStore, TokenGate};
//!
//! #[tokio::main]
//! async fn main() {
//!     let gate = TokenGate::new(&hash_token("s3cret").unwrap()).unwrap();
//!     let heatmap = HeatmapCompositor::load("visualizer/sources").unwrap();
//!     let state = AppState::new(TeamFileStore::new("files"), heatmap);
//!
//!     let router = create_router(state, RouterConfig::new(gate));
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod heatmap;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use config::{CheckConfig, Cli, Command, HashTokenConfig, ServeConfig};
pub use error::{ArchiveError, HeatmapError, StoreError};
pub use heatmap::{bucket, HeatmapCompositor, MuscleGroup, WeightVector};
pub use server::{
    create_router, hash_token, AppState, ApiError, AuthError, CredentialError, ErrorResponse,
    HealthResponse, HostAllowList, RouterConfig, SuccessResponse, TokenGate,
};
pub use store::{ExtractReport, FailedEntry, ModelArchive, ModelUpload, StoredFile, TeamFileStore};
