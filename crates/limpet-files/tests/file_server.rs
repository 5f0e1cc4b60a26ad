//! End-to-end tests for the caching file server

use http::header::{ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Empty};
use limpet_cache::{CacheKey, CachedResponse, SweeperConfig};
use limpet_compress::{compress, decompress};
use limpet_core::{Body, Bytes, Encoding};
use limpet_files::FileServer;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

const APP_JS: &[u8] = b"function app() { return 'app app app application'; }\n";

fn fixture_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("app.js"), APP_JS).unwrap();
    dir
}

fn request(path: &str, encoding: Option<&str>) -> Request<Empty<Bytes>> {
    let mut builder = Request::builder().uri(path);
    if let Some(encoding) = encoding {
        builder = builder.header(ACCEPT_ENCODING, encoding);
    }
    builder.body(Empty::new()).unwrap()
}

async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

#[tokio::test]
async fn test_first_request_populates_raw_cache() {
    let dir = fixture_dir();
    let server = FileServer::new("/assets", dir.path()).unwrap();

    let response = server.serve(request("/assets/app.js", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, APP_JS);

    // cached under the stripped path, with original bytes and headers
    let entry = server.cache().get(&CacheKey::raw("/app.js")).unwrap();
    assert_eq!(entry.body, APP_JS);
    assert!(entry.headers.contains_key(CONTENT_TYPE));
    assert_eq!(server.cache().len(), 1);
}

#[tokio::test]
async fn test_repeat_request_serves_from_cache() {
    let dir = fixture_dir();
    let server = FileServer::new("", dir.path()).unwrap();

    let first = body_bytes(server.serve(request("/app.js", None)).await.unwrap()).await;

    // remove the file; only the cache can answer now
    std::fs::remove_file(dir.path().join("app.js")).unwrap();
    let second = server.serve(request("/app.js", None)).await.unwrap();

    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(body_bytes(second).await, first);
}

#[tokio::test]
async fn test_non_matching_prefix_passes_path_unchanged() {
    let dir = fixture_dir();
    let server = FileServer::new("/assets", dir.path()).unwrap();

    let response = server.serve(request("/app.js", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_bytes(response).await;

    assert!(server.cache().get(&CacheKey::raw("/app.js")).is_some());
}

#[tokio::test]
async fn test_lazy_gzip_variant_scenario() {
    let dir = fixture_dir();
    let server = FileServer::new("/assets", dir.path()).unwrap();

    // seed the raw entry; the store runs once the body has streamed
    body_bytes(server.serve(request("/assets/app.js", None)).await.unwrap()).await;

    // first gzip request compresses the cached raw bytes on demand
    let response = server
        .serve(request("/assets/app.js", Some("gzip")))
        .await
        .unwrap();
    assert_eq!(response.headers().get(CONTENT_ENCODING).unwrap(), "gzip");
    let compressed = body_bytes(response).await;
    assert_eq!(compressed, compress(Encoding::Gzip, APP_JS).await.unwrap());

    let variant_key = CacheKey::encoded("/app.js", Encoding::Gzip);
    assert_eq!(
        server.cache().get(&variant_key).unwrap().body,
        compressed
    );

    // prove the follow-up is served from the variant entry, not recompressed
    server.cache().insert(
        variant_key.clone(),
        CachedResponse::new(Bytes::from_static(b"sentinel"), HeaderMap::new()),
    );
    let replay = server
        .serve(request("/assets/app.js", Some("gzip")))
        .await
        .unwrap();
    assert_eq!(replay.headers().get(CONTENT_ENCODING).unwrap(), "gzip");
    assert_eq!(body_bytes(replay).await, Bytes::from_static(b"sentinel"));

    // the raw entry is untouched by variant derivation
    assert_eq!(
        server.cache().get(&CacheKey::raw("/app.js")).unwrap().body,
        APP_JS
    );
}

#[tokio::test]
async fn test_all_encodings_round_trip() {
    for encoding in Encoding::ALL {
        let dir = fixture_dir();
        let server = FileServer::new("", dir.path()).unwrap();
        body_bytes(server.serve(request("/app.js", None)).await.unwrap()).await;

        let response = server
            .serve(request("/app.js", Some(encoding.as_str())))
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(CONTENT_ENCODING).unwrap(),
            encoding.as_str()
        );

        let restored = decompress(encoding, &body_bytes(response).await)
            .await
            .unwrap();
        assert_eq!(restored, APP_JS, "{encoding}");
    }
}

#[tokio::test]
async fn test_compressed_first_request_seeds_raw_cache() {
    let dir = fixture_dir();
    let server = FileServer::new("", dir.path()).unwrap();

    let response = server.serve(request("/app.js", Some("br"))).await.unwrap();
    assert_eq!(response.headers().get(CONTENT_ENCODING).unwrap(), "br");
    assert!(!response.headers().contains_key(CONTENT_LENGTH));

    let restored = decompress(Encoding::Brotli, &body_bytes(response).await)
        .await
        .unwrap();
    assert_eq!(restored, APP_JS);

    // the capture ran before the compressor: the raw cache was seeded, no
    // encoded entry exists yet
    let raw = server.cache().get(&CacheKey::raw("/app.js")).unwrap();
    assert_eq!(raw.body, APP_JS);
    assert!(server
        .cache()
        .get(&CacheKey::encoded("/app.js", Encoding::Brotli))
        .is_none());

    // an uncompressed replay must not leak the seeding request's encoding
    let plain = server.serve(request("/app.js", None)).await.unwrap();
    assert!(!plain.headers().contains_key(CONTENT_ENCODING));
    assert_eq!(body_bytes(plain).await, APP_JS);
}

#[tokio::test]
async fn test_browser_style_accept_encoding_means_uncompressed() {
    let dir = fixture_dir();
    let server = FileServer::new("", dir.path()).unwrap();

    let response = server
        .serve(request("/app.js", Some("gzip, deflate, br")))
        .await
        .unwrap();

    assert!(!response.headers().contains_key(CONTENT_ENCODING));
    assert_eq!(body_bytes(response).await, APP_JS);
}

#[tokio::test]
async fn test_not_found_is_served_but_never_cached() {
    let dir = tempfile::tempdir().unwrap();
    let server = FileServer::new("", dir.path()).unwrap();

    let response = server.serve(request("/missing.js", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    body_bytes(response).await;

    assert!(server.cache().is_empty());
}

#[tokio::test]
async fn test_oversized_response_is_delivered_but_never_cached() {
    let dir = fixture_dir();
    let server = FileServer::builder("", dir.path())
        .max_bytes_per_entry(8)
        .build()
        .unwrap();

    let response = server.serve(request("/app.js", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, APP_JS);

    assert!(server.cache().is_empty());
}

#[tokio::test]
async fn test_entry_at_exactly_the_ceiling_is_cached() {
    let dir = fixture_dir();
    let server = FileServer::builder("", dir.path())
        .max_bytes_per_entry(APP_JS.len())
        .build()
        .unwrap();

    let response = server.serve(request("/app.js", None)).await.unwrap();
    body_bytes(response).await;

    assert_eq!(server.cache().len(), 1);
}

#[tokio::test]
async fn test_disabled_cache_always_passes_through() {
    let dir = fixture_dir();
    let server = FileServer::builder("", dir.path())
        .disable_cache(true)
        .build()
        .unwrap();

    let plain = server.serve(request("/app.js", None)).await.unwrap();
    assert_eq!(body_bytes(plain).await, APP_JS);

    // compression still works without the cache
    let gzipped = server.serve(request("/app.js", Some("gzip"))).await.unwrap();
    assert_eq!(gzipped.headers().get(CONTENT_ENCODING).unwrap(), "gzip");
    let restored = decompress(Encoding::Gzip, &body_bytes(gzipped).await)
        .await
        .unwrap();
    assert_eq!(restored, APP_JS);

    assert!(server.cache().is_empty());
}

#[tokio::test]
async fn test_head_requests_do_not_poison_the_cache() {
    let dir = fixture_dir();
    let server = FileServer::new("", dir.path()).unwrap();

    let req = Request::builder()
        .method(Method::HEAD)
        .uri("/app.js")
        .body(Empty::<Bytes>::new())
        .unwrap();
    let response = server.serve(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_bytes(response).await;

    assert!(server.cache().is_empty());
}

#[tokio::test]
async fn test_flush_and_invalidate_are_idempotent() {
    let dir = fixture_dir();
    let server = FileServer::new("", dir.path()).unwrap();
    body_bytes(server.serve(request("/app.js", None)).await.unwrap()).await;
    server.serve(request("/app.js", Some("gzip"))).await.unwrap();
    assert_eq!(server.cache().len(), 2);

    server.flush().unwrap();
    server.flush().unwrap();
    server.invalidate("/app.js").unwrap();

    assert!(server.cache().is_empty());
}

#[tokio::test]
async fn test_invalidate_removes_every_variant_of_one_path() {
    let dir = fixture_dir();
    std::fs::write(dir.path().join("keep.js"), b"kept").unwrap();
    let server = FileServer::new("", dir.path()).unwrap();

    body_bytes(server.serve(request("/app.js", None)).await.unwrap()).await;
    server.serve(request("/app.js", Some("gzip"))).await.unwrap();
    server.serve(request("/app.js", Some("zstd"))).await.unwrap();
    body_bytes(server.serve(request("/keep.js", None)).await.unwrap()).await;

    server.invalidate("/app.js").unwrap();

    assert_eq!(server.cache().len(), 1);
    assert!(server.cache().get(&CacheKey::raw("/keep.js")).is_some());
}

#[tokio::test]
async fn test_sweeper_evicts_stale_entries_without_requests() {
    let dir = fixture_dir();
    let server = FileServer::builder("", dir.path())
        .sweeper(SweeperConfig {
            interval: Duration::from_millis(20),
            max_age: Duration::from_millis(50),
        })
        .build()
        .unwrap();

    body_bytes(server.serve(request("/app.js", None)).await.unwrap()).await;
    assert_eq!(server.cache().len(), 1);

    sleep(Duration::from_millis(150)).await;

    assert!(server.cache().is_empty());
}

#[tokio::test]
async fn test_concurrent_first_requests_leave_one_entry() {
    let dir = fixture_dir();
    let server = FileServer::new("", dir.path()).unwrap();

    let (a, b) = tokio::join!(
        server.serve(request("/app.js", None)),
        server.serve(request("/app.js", None)),
    );

    assert_eq!(body_bytes(a.unwrap()).await, APP_JS);
    assert_eq!(body_bytes(b.unwrap()).await, APP_JS);
    assert_eq!(server.cache().len(), 1);
    assert_eq!(
        server.cache().get(&CacheKey::raw("/app.js")).unwrap().body,
        APP_JS
    );
}
