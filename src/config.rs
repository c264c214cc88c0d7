//! Configuration management for the file host.
//!
//! Configuration comes from command-line arguments via clap, with every
//! option also readable from an environment variable with the `FILEHOST_`
//! prefix.
//!
//! # Environment Variables
//!
//! - `FILEHOST_HOST` - Server bind address (default: 0.0.0.0)
//! - `FILEHOST_PORT` - Server port (default: 8000)
//! - `FILEHOST_FILES_ROOT` - Root directory of the team file tree (default: files)
//! - `FILEHOST_ASSETS_DIR` - Heatmap image assets (default: visualizer/sources)
//! - `FILEHOST_TOKEN_HASH` - Argon2 PHC hash of the upload/delete token (required)
//! - `FILEHOST_ALLOWED_HOSTS` - Comma-separated host allow-list
//! - `FILEHOST_CORS_ORIGINS` - Comma-separated CORS origins (default: any)
//! - `FILEHOST_MAX_UPLOAD_BYTES` - Request body limit (default: 256 MiB)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::server::{TokenGate, DEFAULT_ALLOWED_HOSTS, DEFAULT_MAX_UPLOAD_BYTES};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default root of the stored file tree.
pub const DEFAULT_FILES_ROOT: &str = "files";

/// Default heatmap asset directory.
pub const DEFAULT_ASSETS_DIR: &str = "visualizer/sources";

// =============================================================================
// CLI
// =============================================================================

/// Team file host - team-scoped file and model storage with a heatmap renderer.
#[derive(Parser, Debug, Clone)]
#[command(name = "team-file-host")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server.
    Serve(ServeConfig),

    /// Print an Argon2 hash of a token for use as --token-hash.
    HashToken(HashTokenConfig),

    /// Check the heatmap assets and the files root without starting the server.
    Check(CheckConfig),
}

// =============================================================================
// Serve
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "FILEHOST_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "FILEHOST_PORT")]
    pub port: u16,

    /// Root directory of the team file tree.
    #[arg(long, default_value = DEFAULT_FILES_ROOT, env = "FILEHOST_FILES_ROOT")]
    pub files_root: PathBuf,

    /// Directory holding the heatmap base image and overlays.
    #[arg(long, default_value = DEFAULT_ASSETS_DIR, env = "FILEHOST_ASSETS_DIR")]
    pub assets_dir: PathBuf,

    /// Argon2 PHC hash of the token required for uploads and deletes.
    ///
    /// Generate one with `team-file-host hash-token --token <token>`.
    #[arg(long, env = "FILEHOST_TOKEN_HASH", hide_env_values = true)]
    pub token_hash: String,

    /// Host names requests may target (comma-separated).
    #[arg(
        long,
        env = "FILEHOST_ALLOWED_HOSTS",
        value_delimiter = ',',
        default_values = DEFAULT_ALLOWED_HOSTS
    )]
    pub allowed_hosts: Vec<String>,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "FILEHOST_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Maximum request body size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "FILEHOST_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: usize,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.token_hash.trim().is_empty() {
            return Err(
                "A token hash is required. Set --token-hash or FILEHOST_TOKEN_HASH \
                 (generate one with `hash-token`)"
                    .to_string(),
            );
        }
        TokenGate::new(&self.token_hash).map_err(|e| e.to_string())?;

        if self.allowed_hosts.iter().all(|h| h.trim().is_empty()) {
            return Err("allowed_hosts must name at least one host".to_string());
        }

        if self.max_upload_bytes == 0 {
            return Err("max_upload_bytes must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Hash Token
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct HashTokenConfig {
    /// Token to hash.
    #[arg(long, env = "FILEHOST_TOKEN", hide_env_values = true)]
    pub token: String,
}

impl HashTokenConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.token.is_empty() {
            return Err("token must not be empty".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Check
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    /// Root directory of the team file tree.
    #[arg(long, default_value = DEFAULT_FILES_ROOT, env = "FILEHOST_FILES_ROOT")]
    pub files_root: PathBuf,

    /// Directory holding the heatmap base image and overlays.
    #[arg(long, default_value = DEFAULT_ASSETS_DIR, env = "FILEHOST_ASSETS_DIR")]
    pub assets_dir: PathBuf,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

// =============================================================================
// Tests
// =============================================================================
