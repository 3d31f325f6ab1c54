mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;
use std::sync::Arc;

use common::{FailingCache, MockConnectInfoLayer, TestContext};
use linkforge::application::services::link_cache::cache_key;
use linkforge::domain::entities::CachedLink;
use linkforge::infrastructure::cache::CacheService;
use linkforge::routes::router;

fn server(ctx: &TestContext) -> TestServer {
    let app = router(ctx.state.clone()).layer(MockConnectInfoLayer::default());
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_redirect_success() {
    let ctx = common::create_test_state();
    ctx.repo
        .seed(common::link("redirect1", "https://example.com/target"));
    let server = server(&ctx);

    let response = server.get("/redirect1").await;

    assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
    let location = response.header("location");
    assert_eq!(location, "https://example.com/target");
}

#[tokio::test]
async fn test_create_then_resolve_round_trip() {
    let mut ctx = common::create_test_state();
    let server = server(&ctx);

    let created = server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com/a/long/path?x=1" }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let code = created.json::<serde_json::Value>()["code"]
        .as_str()
        .unwrap()
        .to_string();

    let response = server.get(&format!("/{}", code)).await;

    assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.header("location"),
        "https://example.com/a/long/path?x=1"
    );

    let event = ctx.clicks.try_recv().unwrap();
    assert_eq!(event.code, code);
}

#[tokio::test]
async fn test_redirect_not_found() {
    let ctx = common::create_test_state();
    let server = server(&ctx);

    let response = server.get("/notfound").await;

    response.assert_status_not_found();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_redirect_expired_is_gone() {
    let mut ctx = common::create_test_state();
    ctx.repo
        .seed(common::expired_link("oldlink", "https://example.com"));
    let server = server(&ctx);

    let response = server.get("/oldlink").await;

    response.assert_status(StatusCode::GONE);
    assert_eq!(
        response.json::<serde_json::Value>()["error"]["code"],
        "expired"
    );
    assert!(ctx.clicks.try_recv().is_err());
}

#[tokio::test]
async fn test_stale_cache_entry_for_expired_link_is_gone() {
    let ctx = common::create_test_state();
    let link = common::expired_link("stale1", "https://example.com/stale");
    ctx.repo.seed(link.clone());

    // Entry written while the link was live, still within its cache TTL.
    let cached = serde_json::to_string(&CachedLink {
        target_url: link.target_url.clone(),
        expires_at: link.expires_at,
    })
    .unwrap();
    ctx.cache
        .set_with_ttl(&cache_key("stale1"), &cached, 3600)
        .await
        .unwrap();

    let server = server(&ctx);
    let response = server.get("/stale1").await;

    response.assert_status(StatusCode::GONE);
    assert_eq!(ctx.cache.get(&cache_key("stale1")).await.unwrap(), None);
}

#[tokio::test]
async fn test_redirect_served_from_cache_after_first_hit() {
    let ctx = common::create_test_state();
    ctx.repo.seed(common::link("cached1", "https://example.com/c"));
    let server = server(&ctx);

    server.get("/cached1").await;
    assert!(ctx.cache.get(&cache_key("cached1")).await.unwrap().is_some());

    // With the store down, the cached projection still answers.
    ctx.repo.set_unavailable(true);
    let response = server.get("/cached1").await;

    assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://example.com/c");
}

#[tokio::test]
async fn test_redirect_with_failing_cache() {
    let mut ctx =
        common::create_test_state_with(Arc::new(FailingCache), common::test_settings());
    let server = server(&ctx);

    let created = server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com/nocache" }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let code = created.json::<serde_json::Value>()["code"]
        .as_str()
        .unwrap()
        .to_string();

    let response = server.get(&format!("/{}", code)).await;

    assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://example.com/nocache");
    assert!(ctx.clicks.try_recv().is_ok());
}

#[tokio::test]
async fn test_repeated_resolve_is_idempotent() {
    let mut ctx = common::create_test_state();
    ctx.repo.seed(common::link("again", "https://example.com/again"));
    let server = server(&ctx);

    let first = server.get("/again").await;
    let second = server.get("/again").await;

    assert_eq!(first.header("location"), second.header("location"));
    assert_eq!(ctx.repo.click_count("again"), Some(0));
    assert!(ctx.clicks.try_recv().is_ok());
    assert!(ctx.clicks.try_recv().is_ok());
}

#[tokio::test]
async fn test_store_unavailable_is_internal_error() {
    let ctx = common::create_test_state();
    ctx.repo.set_unavailable(true);
    let server = server(&ctx);

    let response = server.get("/whatever").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}
