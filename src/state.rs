//! Shared application state injected into every handler.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::services::link_cache::DEFAULT_CACHE_TTL_SECONDS;
use crate::application::services::{
    CodeAllocator, LinkService, RateGovernor, RateLimitPolicies, Resolver, StatsService,
    code_allocator::DEFAULT_MAX_ATTEMPTS,
};
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::DEFAULT_CODE_LENGTH;

/// Tunables for the services built into [`AppState`].
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub base_url: String,
    pub code_length: usize,
    pub code_max_attempts: usize,
    pub cache_ttl_seconds: u64,
    pub rate_limits: RateLimitPolicies,
    pub behind_proxy: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            code_length: DEFAULT_CODE_LENGTH,
            code_max_attempts: DEFAULT_MAX_ATTEMPTS,
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            rate_limits: RateLimitPolicies::default(),
            behind_proxy: false,
        }
    }
}

/// Services and handles shared across requests.
///
/// Cloning is cheap: every field is reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub resolver: Arc<Resolver>,
    pub rate_governor: Arc<RateGovernor>,
    pub stats_service: Arc<StatsService>,
    pub repository: Arc<dyn LinkRepository>,
    pub cache: Arc<dyn CacheService>,
    pub click_sender: mpsc::Sender<ClickEvent>,
    /// Read client identity from `X-Forwarded-For` / `X-Real-IP`.
    pub behind_proxy: bool,
}

impl AppState {
    /// Wires every service around one store, one cache and one click queue.
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        click_sender: mpsc::Sender<ClickEvent>,
        settings: ServiceSettings,
    ) -> Self {
        let allocator = CodeAllocator::new(
            repository.clone(),
            settings.code_length,
            settings.code_max_attempts,
        );

        let link_service = LinkService::new(
            repository.clone(),
            cache.clone(),
            allocator,
            settings.cache_ttl_seconds,
            settings.base_url,
        );

        let resolver = Resolver::new(
            repository.clone(),
            cache.clone(),
            click_sender.clone(),
            settings.cache_ttl_seconds,
        );

        let rate_governor = RateGovernor::new(cache.clone(), settings.rate_limits);
        let stats_service = StatsService::new(repository.clone());

        Self {
            link_service: Arc::new(link_service),
            resolver: Arc::new(resolver),
            rate_governor: Arc::new(rate_governor),
            stats_service: Arc::new(stats_service),
            repository,
            cache,
            click_sender,
            behind_proxy: settings.behind_proxy,
        }
    }
}
