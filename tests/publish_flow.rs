//! End-to-end pipeline tests against an in-memory store and a loopback HTTP
//! server that plays both the sign endpoint and the storage bucket.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{post, put};
use image::{ImageFormat, RgbImage};
use pressroom::article::{Category, resolve_author};
use pressroom::auth::Principal;
use pressroom::publish::{PublishError, PublishPhase, PublishRequest, publish};
use pressroom::registry::{self, PriceUpdate};
use pressroom::storage::AssetUploader;
use pressroom::store::{ArticleStore, MemoryStore};
use serde_json::{Value, json};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

/// One PUT received by the fake bucket.
#[derive(Debug, Clone)]
struct ReceivedObject {
    filename: String,
    content_type: String,
    bytes: usize,
}

/// Which half of the exchange the fake server fails, if any.
#[derive(Clone, Copy, PartialEq)]
enum StorageMode {
    Healthy,
    RejectSign,
    RejectPut,
}

#[derive(Clone)]
struct FakeStorage {
    base_url: Arc<Mutex<String>>,
    objects: Arc<Mutex<Vec<ReceivedObject>>>,
    mode: StorageMode,
}

/// Spawn a loopback server that signs uploads against itself: the returned
/// upload URL points back at this server's PUT route.
async fn spawn_fake_storage(mode: StorageMode) -> (String, Arc<Mutex<Vec<ReceivedObject>>>) {
    let state = FakeStorage {
        base_url: Arc::new(Mutex::new(String::new())),
        objects: Arc::new(Mutex::new(Vec::new())),
        mode,
    };
    let objects = state.objects.clone();
    let base_url = state.base_url.clone();

    let app = axum::Router::new()
        .route("/api/sign-upload", post(sign))
        .route("/bucket/{filename}", put(store_object))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    *base_url.lock().unwrap() = format!("http://{addr}");
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/api/sign-upload"), objects)
}

async fn sign(
    State(state): State<FakeStorage>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if state.mode == StorageMode::RejectSign {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to generate upload URL" })),
        );
    }
    let filename = body["filename"].as_str().unwrap_or_default().to_string();
    let base = state.base_url.lock().unwrap().clone();
    (
        StatusCode::OK,
        Json(json!({
            "uploadUrl": format!("{base}/bucket/{filename}"),
            "publicUrl": format!("https://pub.example.com/{filename}"),
        })),
    )
}

async fn store_object(
    State(state): State<FakeStorage>,
    Path(filename): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if state.mode == StorageMode::RejectPut {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    state.objects.lock().unwrap().push(ReceivedObject {
        filename,
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string(),
        bytes: body.len(),
    });
    StatusCode::OK
}

fn principal() -> Principal {
    Principal {
        author: resolve_author("@skulkarni"),
    }
}

fn png_bytes() -> Vec<u8> {
    let img = RgbImage::from_fn(8, 8, |x, y| image::Rgb([x as u8 * 30, y as u8 * 30, 120]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn request_with_image(title: &str) -> PublishRequest {
    PublishRequest {
        title: title.to_string(),
        body: "Full market report for the day.".to_string(),
        category: Category::MarketAnalysis,
        summary: Some("Rates moved.".to_string()),
        image: Some(png_bytes()),
        ..PublishRequest::default()
    }
}

#[tokio::test]
async fn full_pipeline_uploads_and_persists() {
    let (sign_endpoint, objects) = spawn_fake_storage(StorageMode::Healthy).await;
    let store = MemoryStore::new();
    let uploader = AssetUploader::new(sign_endpoint);

    let article = publish(&store, &uploader, &principal(), request_with_image("Gold Rates Today"))
        .await
        .unwrap();

    assert_eq!(article.slug, "gold-rates-today");
    let image_url = article.featured_image.as_deref().unwrap();
    assert!(image_url.starts_with("https://pub.example.com/gold-rates-today-"));
    assert!(image_url.ends_with(".avif"));

    let received = objects.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].content_type, "image/avif");
    assert!(received[0].bytes > 0);
    assert!(received[0].filename.starts_with("gold-rates-today-"));
    drop(received);

    let stored = store.fetch_articles().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].featured_image.as_deref(), Some(image_url));
}

#[tokio::test]
async fn sign_failure_is_recoverable_and_skip_retry_lands_without_image() {
    let (sign_endpoint, objects) = spawn_fake_storage(StorageMode::RejectSign).await;
    let store = MemoryStore::new();
    let uploader = AssetUploader::new(sign_endpoint);

    let err = publish(&store, &uploader, &principal(), request_with_image("Silver Update"))
        .await
        .unwrap_err();
    match err {
        PublishError::Recoverable { phase, .. } => assert_eq!(phase, PublishPhase::Uploading),
        other => panic!("expected recoverable upload error, got {other:?}"),
    }
    assert!(store.fetch_articles().await.unwrap().is_empty());
    assert!(objects.lock().unwrap().is_empty());

    // The documented recovery: same request, skip flag set.
    let mut retry = request_with_image("Silver Update");
    retry.skip_asset_upload = true;
    let article = publish(&store, &uploader, &principal(), retry).await.unwrap();

    assert_eq!(article.slug, "silver-update");
    assert!(article.featured_image.is_none());
    assert_eq!(store.fetch_articles().await.unwrap().len(), 1);
    // Still no bytes ever reached storage.
    assert!(objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn put_failure_is_a_transport_error_with_the_same_skip_recovery() {
    let (sign_endpoint, objects) = spawn_fake_storage(StorageMode::RejectPut).await;
    let store = MemoryStore::new();
    let uploader = AssetUploader::new(sign_endpoint);

    // Signing succeeds; the binary transfer is what breaks.
    let err = publish(&store, &uploader, &principal(), request_with_image("Bullion Recap"))
        .await
        .unwrap_err();
    match err {
        PublishError::Recoverable { phase, message } => {
            assert_eq!(phase, PublishPhase::Uploading);
            assert!(message.contains("storage upload failed"), "got {message:?}");
            assert!(message.contains("storage returned 500"), "got {message:?}");
        }
        other => panic!("expected recoverable transport error, got {other:?}"),
    }
    assert!(store.fetch_articles().await.unwrap().is_empty());
    assert!(objects.lock().unwrap().is_empty());

    let mut retry = request_with_image("Bullion Recap");
    retry.skip_asset_upload = true;
    let article = publish(&store, &uploader, &principal(), retry).await.unwrap();

    assert_eq!(article.slug, "bullion-recap");
    assert!(article.featured_image.is_none());
    assert_eq!(store.fetch_articles().await.unwrap().len(), 1);
}

#[tokio::test]
async fn articles_and_prices_share_one_store() {
    let (sign_endpoint, _objects) = spawn_fake_storage(StorageMode::Healthy).await;
    let store = MemoryStore::new();
    let uploader = AssetUploader::new(sign_endpoint);

    publish(&store, &uploader, &principal(), request_with_image("Morning Brief"))
        .await
        .unwrap();
    registry::append(
        &store,
        PriceUpdate {
            gold_24k: 72450.6,
            gold_22k: 66410.4,
            silver: 925.5,
        },
    )
    .await
    .unwrap();

    assert_eq!(store.fetch_articles().await.unwrap().len(), 1);
    let snapshot = registry::latest(&store).await.unwrap().unwrap();
    assert_eq!(snapshot.gold_24k, 72451);
}
