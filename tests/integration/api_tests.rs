//! API integration tests for file upload, retrieval and deletion.
//!
//! Tests verify:
//! - Upload then download returns identical bytes and media types
//! - Uploading over an existing name is refused and preserves the original
//! - Unsafe names never reach the filesystem
//! - Host allow-list and health endpoint

use axum::http::{Request, StatusCode};
use axum::body::Body;
use tempfile::TempDir;

use super::test_utils::{
    body_bytes, body_json, send, simple_request, test_router, upload_request, TEST_TOKEN,
};

// =============================================================================
// Upload and Download
// =============================================================================

#[tokio::test]
async fn test_upload_then_download_file() {
    let root = TempDir::new().unwrap();
    let router = test_router(root.path());

    let response = send(
        &router,
        upload_request(
            "/api/alpha/file",
            Some(TEST_TOKEN),
            "notes.txt",
            "text/plain",
            b"hello team",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["result"], "successful");
    assert_eq!(json["filename"], "notes.txt");

    let response = send(&router, simple_request("GET", "/api/alpha/file/notes.txt", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/octet-stream"
    );
    assert_eq!(body_bytes(response).await, b"hello team");

    assert_eq!(
        std::fs::read(root.path().join("alpha/notes.txt")).unwrap(),
        b"hello team"
    );
}

#[tokio::test]
async fn test_image_download_media_type() {
    let root = TempDir::new().unwrap();
    let router = test_router(root.path());

    let response = send(
        &router,
        upload_request(
            "/api/alpha/file",
            Some(TEST_TOKEN),
            "photo.png",
            "image/png",
            b"\x89PNG fake",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&router, simple_request("GET", "/api/alpha/file/photo.png", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/png");
}

#[tokio::test]
async fn test_upload_conflict_preserves_original() {
    let root = TempDir::new().unwrap();
    let router = test_router(root.path());

    let first = upload_request(
        "/api/alpha/file",
        Some(TEST_TOKEN),
        "a.bin",
        "application/octet-stream",
        b"original",
    );
    assert_eq!(send(&router, first).await.status(), StatusCode::OK);

    let second = upload_request(
        "/api/alpha/file",
        Some(TEST_TOKEN),
        "a.bin",
        "application/octet-stream",
        b"replacement",
    );
    let response = send(&router, second).await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);

    let json = body_json(response).await;
    assert_eq!(json["result"], "failed");
    assert_eq!(json["error"], "conflict");
    assert!(json["filename"].as_str().unwrap().ends_with("a.bin"));

    assert_eq!(
        std::fs::read(root.path().join("alpha/a.bin")).unwrap(),
        b"original"
    );
}

#[tokio::test]
async fn test_concurrent_uploads_single_winner() {
    let root = TempDir::new().unwrap();
    let router = test_router(root.path());

    let mut tasks = Vec::new();
    for i in 0..6 {
        let router = router.clone();
        tasks.push(tokio::spawn(async move {
            let body = format!("writer-{i}");
            let request = upload_request(
                "/api/alpha/file",
                Some(TEST_TOKEN),
                "race.txt",
                "text/plain",
                body.as_bytes(),
            );
            send(&router, request).await.status()
        }));
    }

    let mut statuses = Vec::new();
    for task in tasks {
        statuses.push(task.await.unwrap());
    }

    let ok = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let conflicts = statuses
        .iter()
        .filter(|s| **s == StatusCode::NOT_ACCEPTABLE)
        .count();
    assert_eq!(ok, 1);
    assert_eq!(conflicts, 5);

    let stored = std::fs::read_to_string(root.path().join("alpha/race.txt")).unwrap();
    assert!(stored.starts_with("writer-"));
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let root = TempDir::new().unwrap();
    let router = test_router(root.path());

    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{b}--\r\n",
        b = super::test_utils::BOUNDARY
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/alpha/file")
        .header("host", "localhost")
        .header("token", TEST_TOKEN)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", super::test_utils::BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    assert_eq!(body_json(response).await["error"], "invalid_input");
}

// =============================================================================
// Error Cases
// =============================================================================

#[tokio::test]
async fn test_download_missing_file() {
    let root = TempDir::new().unwrap();
    let router = test_router(root.path());

    let response = send(&router, simple_request("GET", "/api/alpha/file/none.txt", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["result"], "failed");
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn test_traversal_in_download_rejected() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("secret.txt"), b"top secret").unwrap();
    let router = test_router(root.path());

    let response = send(
        &router,
        simple_request("GET", "/api/alpha/file/..%2F..%2Fsecret.txt", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);

    let response = send(
        &router,
        simple_request("GET", "/api/..%2F/file/secret.txt", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn test_traversal_in_upload_name_rejected() {
    let root = TempDir::new().unwrap();
    let router = test_router(root.path());

    let request = upload_request(
        "/api/alpha/file",
        Some(TEST_TOKEN),
        "../escape.txt",
        "text/plain",
        b"x",
    );
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);

    assert!(!root.path().join("escape.txt").exists());
    assert!(!root.path().parent().unwrap().join("escape.txt").exists());
}

// =============================================================================
// Team Deletion
// =============================================================================

#[tokio::test]
async fn test_delete_team() {
    let root = TempDir::new().unwrap();
    let router = test_router(root.path());

    let upload = upload_request(
        "/api/alpha/file",
        Some(TEST_TOKEN),
        "a.txt",
        "text/plain",
        b"a",
    );
    assert_eq!(send(&router, upload).await.status(), StatusCode::OK);

    let response = send(&router, simple_request("DELETE", "/api/alpha", Some(TEST_TOKEN))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["result"], "successful");
    assert!(!root.path().join("alpha").exists());

    let response = send(&router, simple_request("DELETE", "/api/alpha", Some(TEST_TOKEN))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Host Filter and Health
// =============================================================================

#[tokio::test]
async fn test_unknown_host_forbidden() {
    let root = TempDir::new().unwrap();
    let router = test_router(root.path());

    let request = Request::builder()
        .uri("/health")
        .header("host", "evil.example.com")
        .body(Body::empty())
        .unwrap();
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["result"], "failed");
}

#[tokio::test]
async fn test_unknown_host_cannot_delete() {
    let root = TempDir::new().unwrap();
    std::fs::create_dir_all(root.path().join("alpha")).unwrap();
    let router = test_router(root.path());

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/alpha")
        .header("host", "evil.example.com")
        .header("token", TEST_TOKEN)
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&router, request).await.status(), StatusCode::FORBIDDEN);
    assert!(root.path().join("alpha").exists());
}

#[tokio::test]
async fn test_allowed_host_with_port() {
    let root = TempDir::new().unwrap();
    let router = test_router(root.path());

    let request = Request::builder()
        .uri("/health")
        .header("host", "127.0.0.1:8000")
        .body(Body::empty())
        .unwrap();
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
}
