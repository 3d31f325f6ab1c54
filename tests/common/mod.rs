#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::ConnectInfo;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tower::Layer;

use linkforge::domain::click_event::ClickEvent;
use linkforge::domain::entities::{NewShortLink, ShortLink};
use linkforge::domain::repositories::LinkRepository;
use linkforge::error::AppError;
use linkforge::infrastructure::cache::{CacheError, CacheResult, CacheService, MemoryCache};
use linkforge::state::{AppState, ServiceSettings};

pub const BASE_URL: &str = "https://sho.rt";

/// Store kept in a concurrent map. `insert_unique` goes through the entry API, so
/// it is atomic like the SQL `ON CONFLICT DO NOTHING` insert.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    links: DashMap<String, ShortLink>,
    unavailable: AtomicBool,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail like a lost database connection.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn seed(&self, link: ShortLink) {
        self.links.insert(link.code.clone(), link);
    }

    pub fn click_count(&self, code: &str) -> Option<i64> {
        self.links.get(code).map(|l| l.click_count)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::internal(
                "Database error",
                json!({ "reason": "store unavailable" }),
            ));
        }
        Ok(())
    }

    fn sorted(mut links: Vec<ShortLink>) -> Vec<ShortLink> {
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        links
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn get(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        self.check_available()?;
        Ok(self.links.get(code).map(|l| l.clone()))
    }

    async fn insert_unique(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        self.check_available()?;

        match self.links.entry(new_link.code.clone()) {
            Entry::Occupied(_) => Err(AppError::already_taken(
                "Short code already exists",
                json!({ "code": new_link.code }),
            )),
            Entry::Vacant(slot) => {
                let link = ShortLink {
                    code: new_link.code,
                    target_url: new_link.target_url,
                    created_at: Utc::now(),
                    expires_at: new_link.expires_at,
                    click_count: 0,
                    last_accessed_at: None,
                    is_custom: new_link.is_custom,
                    created_by: new_link.created_by,
                };
                slot.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn increment_clicks(&self, code: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        self.check_available()?;

        if let Some(mut link) = self.links.get_mut(code) {
            link.click_count += 1;
            link.last_accessed_at = Some(link.last_accessed_at.map_or(at, |prev| prev.max(at)));
        }
        Ok(())
    }

    async fn find_by_target(&self, target_url: &str) -> Result<Vec<ShortLink>, AppError> {
        self.check_available()?;
        Ok(Self::sorted(
            self.links
                .iter()
                .filter(|l| l.target_url == target_url)
                .map(|l| l.clone())
                .collect(),
        ))
    }

    async fn find_by_client(&self, client_key: &str) -> Result<Vec<ShortLink>, AppError> {
        self.check_available()?;
        Ok(Self::sorted(
            self.links
                .iter()
                .filter(|l| l.created_by.as_deref() == Some(client_key))
                .map(|l| l.clone())
                .collect(),
        ))
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check_available()
    }
}

/// Cache whose every operation fails, like an unreachable Redis.
pub struct FailingCache;

#[async_trait]
impl CacheService for FailingCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn set_with_ttl(&self, _key: &str, _value: &str, _ttl: u64) -> CacheResult<()> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn incr_with_expiry(&self, _key: &str, _ttl: u64) -> CacheResult<u64> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

/// Everything a test needs to drive the router and inspect side effects.
pub struct TestContext {
    pub state: AppState,
    pub repo: Arc<InMemoryLinkRepository>,
    pub cache: Arc<dyn CacheService>,
    pub clicks: mpsc::Receiver<ClickEvent>,
}

pub fn test_settings() -> ServiceSettings {
    ServiceSettings {
        base_url: BASE_URL.to_string(),
        ..ServiceSettings::default()
    }
}

pub fn create_test_state() -> TestContext {
    create_test_state_with(Arc::new(MemoryCache::new()), test_settings())
}

pub fn create_test_state_with(
    cache: Arc<dyn CacheService>,
    settings: ServiceSettings,
) -> TestContext {
    let repo = Arc::new(InMemoryLinkRepository::new());
    let (tx, rx) = mpsc::channel(100);

    let state = AppState::new(repo.clone(), cache.clone(), tx, settings);

    TestContext {
        state,
        repo,
        cache,
        clicks: rx,
    }
}

pub fn link(code: &str, target_url: &str) -> ShortLink {
    ShortLink {
        code: code.to_string(),
        target_url: target_url.to_string(),
        created_at: Utc::now(),
        expires_at: None,
        click_count: 0,
        last_accessed_at: None,
        is_custom: true,
        created_by: None,
    }
}

pub fn expired_link(code: &str, target_url: &str) -> ShortLink {
    ShortLink {
        created_at: Utc::now() - Duration::days(2),
        expires_at: Some(Utc::now() - Duration::seconds(1)),
        ..link(code, target_url)
    }
}

/// Inserts `ConnectInfo` so handlers see a peer address, as `axum::serve` would.
#[derive(Clone)]
pub struct MockConnectInfoLayer(pub SocketAddr);

impl Default for MockConnectInfoLayer {
    fn default() -> Self {
        Self("127.0.0.1:12345".parse().unwrap())
    }
}

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService {
            inner,
            addr: self.0,
        }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
    addr: SocketAddr,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(ConnectInfo(self.addr));
        self.inner.call(req)
    }
}
