//! Test utilities for integration tests.
//!
//! Helpers for building routers over temporary storage, multipart upload
//! bodies, zip archives and small in-memory heatmap layers.

use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use image::{Rgba, RgbaImage};
use tower::ServiceExt;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use team_file_host::{
    create_router, hash_token, AppState, HeatmapCompositor, RouterConfig, TeamFileStore, TokenGate,
};

/// Token accepted by routers built with [`test_router`].
pub const TEST_TOKEN: &str = "integration-test-token";

/// Host header value inside the default allow-list.
pub const TEST_HOST: &str = "localhost";

/// Multipart boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "----team-file-host-boundary";

/// Overlay colors per intensity tier.
pub const TIER_COLORS: [[u8; 4]; 4] = [
    [0, 0, 255, 255],
    [0, 255, 0, 255],
    [255, 255, 0, 255],
    [255, 0, 0, 255],
];

// =============================================================================
// Router
// =============================================================================

/// Argon2 hashing is slow in debug builds, so the hash is computed once.
pub fn test_token_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_token(TEST_TOKEN).unwrap())
}

/// A 1000x800 white base with 4x4 solid overlays colored by tier.
pub fn test_compositor() -> HeatmapCompositor {
    let base = RgbaImage::from_pixel(1000, 800, Rgba([255, 255, 255, 255]));
    HeatmapCompositor::from_layers(base, |_, tier| {
        Ok(RgbaImage::from_pixel(4, 4, Rgba(TIER_COLORS[tier as usize])))
    })
    .unwrap()
}

/// Router storing files under `root` with the default host allow-list.
pub fn test_router(root: &Path) -> Router {
    let gate = TokenGate::new(test_token_hash()).unwrap();
    let state = AppState::new(TeamFileStore::new(root), test_compositor());
    create_router(state, RouterConfig::new(gate).with_tracing(false))
}

/// Send one request through a fresh clone of `router`.
pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

/// Collect a response body.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// =============================================================================
// Requests
// =============================================================================

/// A `multipart/form-data` body with a single `file` field.
pub fn multipart_body(filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    write!(
        body,
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    )
    .unwrap();
    body.extend_from_slice(data);
    write!(body, "\r\n--{BOUNDARY}--\r\n").unwrap();
    body
}

/// A multipart upload request, optionally carrying the `token` header.
pub fn upload_request(
    uri: &str,
    token: Option<&str>,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("host", TEST_HOST)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header("token", token);
    }
    builder
        .body(Body::from(multipart_body(filename, content_type, data)))
        .unwrap()
}

/// A bodiless request to an allowed host.
pub fn simple_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("host", TEST_HOST);
    if let Some(token) = token {
        builder = builder.header("token", token);
    }
    builder.body(Body::empty()).unwrap()
}

// =============================================================================
// Archives
// =============================================================================

/// Build a zip archive from `(name, content)` pairs. Names ending in `/`
/// become directory entries.
pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(*name, SimpleFileOptions::default())
                .unwrap();
        } else {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Write `image` as a PNG file at `path`.
pub fn write_png(path: &Path, image: &RgbaImage) {
    image.save_with_format(path, image::ImageFormat::Png).unwrap();
}
