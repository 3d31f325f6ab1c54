mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use std::sync::Arc;

use common::FailingCache;
use linkforge::infrastructure::cache::ReconnectingRedisCache;
use linkforge::routes::router;

#[tokio::test]
async fn test_health_endpoint_success() {
    let ctx = common::create_test_state();
    let server = TestServer::new(router(ctx.state.clone())).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["click_queue"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["message"], "Backend: memory");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = common::create_test_state();
    let server = TestServer::new(router(ctx.state.clone())).unwrap();

    let json = server.get("/health").await.json::<serde_json::Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json["checks"].get("database").is_some());
    assert!(json["checks"].get("click_queue").is_some());
    assert!(json["checks"].get("cache").is_some());
}

#[tokio::test]
async fn test_health_degraded_when_store_down() {
    let ctx = common::create_test_state();
    ctx.repo.set_unavailable(true);
    let server = TestServer::new(router(ctx.state.clone())).unwrap();

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["database"]["status"], "error");
}

#[tokio::test]
async fn test_health_degraded_when_cache_down() {
    let ctx = common::create_test_state_with(Arc::new(FailingCache), common::test_settings());
    let server = TestServer::new(router(ctx.state.clone())).unwrap();

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.json::<serde_json::Value>()["checks"]["cache"]["status"],
        "error"
    );
}

#[tokio::test]
async fn test_health_degraded_when_click_queue_closed() {
    let ctx = common::create_test_state();
    let common::TestContext { state, clicks, .. } = ctx;
    drop(clicks);
    let server = TestServer::new(router(state)).unwrap();

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.json::<serde_json::Value>()["checks"]["click_queue"]["status"],
        "error"
    );
}

#[tokio::test]
async fn test_health_degraded_while_redis_unreachable() {
    let cache = Arc::new(ReconnectingRedisCache::new(
        "redis://127.0.0.1:1",
        "linkforge:",
        std::time::Duration::from_millis(100),
    ));
    let ctx = common::create_test_state_with(cache, common::test_settings());
    let server = TestServer::new(router(ctx.state.clone())).unwrap();

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["cache"]["status"], "error");
    assert_eq!(json["checks"]["database"]["status"], "ok");
}
