//! Full mirror flow against a stub HTTP origin.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use camrelay_cache::ImageCache;
use camrelay_fetch::HttpFetcher;
use camrelay_registry::{GroupConfig, SourceConfig, SourceRegistry};

fn make_registry(label: &str, url: String) -> SourceRegistry {
    SourceRegistry::build(vec![GroupConfig {
        name: "harbor".into(),
        status_url: None,
        sources: vec![SourceConfig::image(label, url)],
    }])
    .unwrap()
}

#[tokio::test]
async fn unchanged_origin_transfers_once() {
    let server = MockServer::start().await;

    // Two passes probe twice, but the stable ETag allows only one transfer
    Mock::given(method("HEAD"))
        .and(path("/a.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "image/jpeg")
                .insert_header("ETag", "\"t1\""),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "image/jpeg")
                .insert_header("ETag", "\"t1\"")
                .set_body_bytes(&b"123456789"[..]),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cache = Arc::new(ImageCache::new(make_registry(
        "Harbor Cam",
        format!("{}/a.jpg", server.uri()),
    )));
    let fetcher = Arc::new(HttpFetcher::new());

    let first = cache
        .refresh_pass(fetcher.clone(), CancellationToken::new())
        .await;
    assert_eq!(first.changed, 1);
    assert_eq!(first.errors, 0);

    let snapshot = cache.lookup("harbor-cam").await.unwrap();
    let image = snapshot.image.unwrap();
    assert_eq!(image.len(), 9);
    assert_eq!(
        snapshot.headers.unwrap().validation_token.as_deref(),
        Some("\"t1\"")
    );
    let fingerprint = image.fingerprint;

    let second = cache
        .refresh_pass(fetcher, CancellationToken::new())
        .await;
    assert_eq!(second.unchanged, 1);

    let snapshot = cache.lookup("harbor-cam").await.unwrap();
    assert_eq!(snapshot.image.unwrap().fingerprint, fingerprint);

    // MockServer verifies the HEAD/GET expectations on drop
}

#[tokio::test]
async fn origin_without_token_transfers_every_pass() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/a.jpg"))
        .respond_with(ResponseTemplate::new(200).insert_header("Content-Type", "image/jpeg"))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "image/jpeg")
                .set_body_bytes(&b"frame"[..]),
        )
        .expect(2)
        .mount(&server)
        .await;

    let cache = Arc::new(ImageCache::new(make_registry(
        "Harbor Cam",
        format!("{}/a.jpg", server.uri()),
    )));
    let fetcher = Arc::new(HttpFetcher::new());

    let first = cache
        .refresh_pass(fetcher.clone(), CancellationToken::new())
        .await;
    let second = cache
        .refresh_pass(fetcher, CancellationToken::new())
        .await;

    // No token means no cheap way to rule out change
    assert_eq!(first.changed, 1);
    assert_eq!(second.changed, 1);
}

#[tokio::test]
async fn failing_origin_counts_error_and_keeps_nothing_stale() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/gone.jpg"))
        .respond_with(ResponseTemplate::new(200).insert_header("Content-Type", "image/jpeg"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone.jpg"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let cache = Arc::new(ImageCache::new(make_registry(
        "Gone Cam",
        format!("{}/gone.jpg", server.uri()),
    )));
    let fetcher = Arc::new(HttpFetcher::new());

    let stats = cache
        .refresh_pass(fetcher, CancellationToken::new())
        .await;

    assert_eq!(stats.errors, 1);
    assert_eq!(stats.changed, 0);

    let snapshot = cache.lookup("gone-cam").await.unwrap();
    assert!(snapshot.image.is_none());
}
