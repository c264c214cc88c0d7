//! Host allow-list filter.
//!
//! Every request, on every route, must target one of the configured host
//! names. Anything else is answered with 403 before routing, auth or any
//! handler runs.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::handlers::ApiError;

/// Host names the service answers for.
#[derive(Debug, Clone)]
pub struct HostAllowList {
    hosts: Arc<HashSet<String>>,
}

impl HostAllowList {
    /// Build an allow-list. Names are compared case-insensitively and
    /// without a port.
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts = hosts
            .into_iter()
            .map(|h| h.as_ref().trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        Self {
            hosts: Arc::new(hosts),
        }
    }

    /// Check a `host[:port]` value.
    pub fn is_allowed(&self, authority: &str) -> bool {
        let hostname = strip_port(authority.trim()).to_ascii_lowercase();
        self.hosts.contains(&hostname)
    }

    /// Number of configured host names.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// True if no host is allowed at all.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

/// Remove a trailing `:port`, and the brackets around an IPv6 literal.
fn strip_port(authority: &str) -> &str {
    if let Some(rest) = authority.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    match authority.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => authority,
    }
}

/// The host a request targets: the `Host` header, else the URI authority.
fn request_host(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
}

/// Axum middleware enforcing the allow-list.
pub async fn host_filter(
    State(allowed): State<HostAllowList>,
    request: Request,
    next: Next,
) -> Response {
    match request_host(&request) {
        Some(host) if allowed.is_allowed(&host) => next.run(request).await,
        host => {
            warn!(host = host.as_deref().unwrap_or("<none>"), "Rejected request for unknown host");
            ApiError::forbidden().into_response()
        }
    }
}
