//! Shared-token authorization for mutating routes.
//!
//! Clients present a plain token in the `token` header. The server holds only
//! a salted Argon2 hash of that token (PHC string format), injected at
//! construction, and verifies with the password-hash verifier rather than a
//! string comparison.
//!
//! # Example
//!
//! ```rust
//! use team_file_host::server::auth::{hash_token, TokenGate};
//!
//! let hash = hash_token("s3cret").unwrap();
//! let gate = TokenGate::new(&hash).unwrap();
//!
//! assert!(gate.is_authorized(Some("s3cret")));
//! assert!(!gate.is_authorized(Some("guess")));
//! assert!(!gate.is_authorized(None));
//! ```

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{debug, warn};

use super::handlers::ApiError;

/// Request header carrying the client token.
pub const TOKEN_HEADER: &str = "token";

// =============================================================================
// Errors
// =============================================================================

/// Why a request was refused by the token gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `token` header (or one that is not valid text)
    #[error("Missing token")]
    MissingToken,

    /// Token does not match the configured hash
    #[error("Invalid token")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::InvalidToken => warn!("Authentication failed: {}", self),
            AuthError::MissingToken => debug!("Authentication failed: {}", self),
        }
        ApiError::unauthorized().into_response()
    }
}

/// Problems with the configured credential itself.
#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    /// The configured hash is not a parseable PHC string
    #[error("Token hash is not a valid PHC string: {0}")]
    InvalidHash(String),

    /// Hashing a new token failed
    #[error("Failed to hash token: {0}")]
    Hashing(String),
}

// =============================================================================
// Token Gate
// =============================================================================

/// Verifies client tokens against a single stored hash.
#[derive(Clone)]
pub struct TokenGate {
    hash: Arc<str>,
}

impl std::fmt::Debug for TokenGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGate").finish_non_exhaustive()
    }
}

impl TokenGate {
    /// Create a gate for a PHC-formatted hash such as the output of
    /// [`hash_token`]. The hash is parsed once here so a bad configuration
    /// fails at startup.
    pub fn new(hash: &str) -> Result<Self, CredentialError> {
        PasswordHash::new(hash).map_err(|e| CredentialError::InvalidHash(e.to_string()))?;
        Ok(Self {
            hash: Arc::from(hash),
        })
    }

    /// Fail-closed check: a missing token is never authorized.
    pub fn is_authorized(&self, token: Option<&str>) -> bool {
        self.check(token).is_ok()
    }

    /// Like [`TokenGate::is_authorized`], but says why a token was refused.
    pub fn check(&self, token: Option<&str>) -> Result<(), AuthError> {
        let token = token.ok_or(AuthError::MissingToken)?;
        let parsed = PasswordHash::new(&self.hash).map_err(|_| AuthError::InvalidToken)?;

        Argon2::default()
            .verify_password(token.as_bytes(), &parsed)
            .map_err(|_| AuthError::InvalidToken)
    }
}

/// Produce a salted Argon2 PHC hash for `token`.
pub fn hash_token(token: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(token.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hashing(e.to_string()))
}

// =============================================================================
// Axum Middleware
// =============================================================================

/// Reject the request with 401 unless its `token` header passes the gate.
///
/// Applied as a route layer so storage is never touched for refused requests.
pub async fn token_middleware(
    State(gate): State<TokenGate>,
    request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    // Argon2 verification is CPU-bound.
    let verdict = tokio::task::spawn_blocking(move || gate.check(token.as_deref())).await;

    match refusal(verdict) {
        Some(response) => response,
        None => next.run(request).await,
    }
}

/// The response for a refused request, or `None` when it may proceed.
///
/// A verifier task that failed to complete is a server fault, not a bad token.
fn refusal(verdict: Result<Result<(), AuthError>, JoinError>) -> Option<Response> {
    match verdict {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e.into_response()),
        Err(e) => Some(
            ApiError::server_fault(format!("token verification failed: {}", e)).into_response(),
        ),
    }
}

// =============================================================================
// Tests
// =============================================================================
