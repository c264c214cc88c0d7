//! Model archive integration tests.
//!
//! Tests verify:
//! - Zip uploads are extracted under the model directory
//! - Model names come from the query or the archive name
//! - Unsafe entries are skipped and reported, safe ones still land
//! - Non-zip and unreadable uploads leave nothing on disk

use axum::http::StatusCode;
use tempfile::TempDir;

use super::test_utils::{
    body_bytes, body_json, build_zip, send, simple_request, test_router, upload_request,
    TEST_TOKEN,
};

#[tokio::test]
async fn test_upload_model_and_fetch_nested_file() {
    let root = TempDir::new().unwrap();
    let router = test_router(root.path());

    let archive = build_zip(&[
        ("weights/", b""),
        ("weights/layer0.bin", b"\x00\x01\x02"),
        ("preview.jpg", b"jpeg-bytes"),
    ]);
    let request = upload_request(
        "/api/alpha/model?modelname=resnet",
        Some(TEST_TOKEN),
        "bundle.zip",
        "application/zip",
        &archive,
    );
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["result"], "successful");
    assert_eq!(json["failed"].as_array().unwrap().len(), 0);
    assert!(json["extracted"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e == "weights/layer0.bin"));

    let response = send(
        &router,
        simple_request("GET", "/api/alpha/model/resnet/weights/layer0.bin", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"\x00\x01\x02");

    let response = send(
        &router,
        simple_request("GET", "/api/alpha/model/resnet/preview.jpg", None),
    )
    .await;
    assert_eq!(response.headers().get("content-type").unwrap(), "image/jpg");
}

#[tokio::test]
async fn test_model_name_defaults_to_archive_stem() {
    let root = TempDir::new().unwrap();
    let router = test_router(root.path());

    let archive = build_zip(&[("config.json", b"{}")]);
    let request = upload_request(
        "/api/alpha/model",
        Some(TEST_TOKEN),
        "detector.zip",
        "application/x-zip-compressed",
        &archive,
    );
    assert_eq!(send(&router, request).await.status(), StatusCode::OK);
    assert!(root.path().join("alpha/detector/config.json").is_file());
}

#[tokio::test]
async fn test_model_conflict() {
    let root = TempDir::new().unwrap();
    let router = test_router(root.path());
    let archive = build_zip(&[("a.txt", b"first")]);

    let first = upload_request(
        "/api/alpha/model?modelname=m",
        Some(TEST_TOKEN),
        "m.zip",
        "application/zip",
        &archive,
    );
    assert_eq!(send(&router, first).await.status(), StatusCode::OK);

    let other = build_zip(&[("a.txt", b"second")]);
    let second = upload_request(
        "/api/alpha/model?modelname=m",
        Some(TEST_TOKEN),
        "m.zip",
        "application/zip",
        &other,
    );
    let response = send(&router, second).await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    assert_eq!(body_json(response).await["error"], "conflict");

    assert_eq!(
        std::fs::read(root.path().join("alpha/m/a.txt")).unwrap(),
        b"first"
    );
}

#[tokio::test]
async fn test_unsafe_entries_reported() {
    let root = TempDir::new().unwrap();
    let router = test_router(root.path());

    let archive = build_zip(&[("../escape.txt", b"evil"), ("ok.txt", b"fine")]);
    let request = upload_request(
        "/api/alpha/model?modelname=m",
        Some(TEST_TOKEN),
        "m.zip",
        "application/zip",
        &archive,
    );
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let failed = json["failed"].as_array().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["name"], "../escape.txt");

    assert!(root.path().join("alpha/m/ok.txt").is_file());
    assert!(!root.path().join("alpha/escape.txt").exists());
}

#[tokio::test]
async fn test_non_zip_content_type_rejected() {
    let root = TempDir::new().unwrap();
    let router = test_router(root.path());

    let archive = build_zip(&[("a.txt", b"x")]);
    let request = upload_request(
        "/api/alpha/model?modelname=m",
        Some(TEST_TOKEN),
        "m.tar",
        "application/x-tar",
        &archive,
    );
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);

    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid_input");
    assert_eq!(json["filename"], "m.tar");
    assert_eq!(json["filetype"], "application/x-tar");
    assert!(!root.path().join("alpha/m").exists());
}

#[tokio::test]
async fn test_malformed_archive_leaves_no_directory() {
    let root = TempDir::new().unwrap();
    let router = test_router(root.path());

    let request = upload_request(
        "/api/alpha/model?modelname=broken",
        Some(TEST_TOKEN),
        "broken.zip",
        "application/zip",
        b"definitely not a zip file",
    );
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    assert_eq!(body_json(response).await["error"], "invalid_archive");
    assert!(!root.path().join("alpha/broken").exists());
}

#[tokio::test]
async fn test_delete_model() {
    let root = TempDir::new().unwrap();
    let router = test_router(root.path());

    let archive = build_zip(&[("a.txt", b"x")]);
    let request = upload_request(
        "/api/alpha/model?modelname=m",
        Some(TEST_TOKEN),
        "m.zip",
        "application/zip",
        &archive,
    );
    assert_eq!(send(&router, request).await.status(), StatusCode::OK);

    let response = send(
        &router,
        simple_request("DELETE", "/api/alpha/model/m", Some(TEST_TOKEN)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!root.path().join("alpha/m").exists());
    assert!(root.path().join("alpha").exists());

    let response = send(
        &router,
        simple_request("DELETE", "/api/alpha/model/m", Some(TEST_TOKEN)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_model_file_traversal_rejected() {
    let root = TempDir::new().unwrap();
    std::fs::create_dir_all(root.path().join("alpha/m")).unwrap();
    std::fs::write(root.path().join("alpha/secret.txt"), b"s").unwrap();
    let router = test_router(root.path());

    let response = send(
        &router,
        simple_request("GET", "/api/alpha/model/m/..%2Fsecret.txt", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
}
