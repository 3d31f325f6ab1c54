//! Fixed-window request rate limiting over the shared cache.
//!
//! Counters live in the fast cache so every service instance sees the same count.
//! The window is fixed, not sliding: a client can get up to `2 × limit` requests
//! through around a window boundary. That imprecision is accepted.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Logical operations with their own limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Resolve,
    Analytics,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Resolve => "resolve",
            Operation::Analytics => "analytics",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(limit, window)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u64,
    pub window_secs: u64,
}

impl RateLimit {
    pub const fn new(limit: u64, window_secs: u64) -> Self {
        Self { limit, window_secs }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid rate limit '{0}', expected '<limit>/<window_secs>' with both values > 0")]
pub struct ParseRateLimitError(String);

/// Parses `"<limit>/<window_secs>"`, e.g. `"10/60"`.
impl FromStr for RateLimit {
    type Err = ParseRateLimitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRateLimitError(s.to_string());
        let (limit, window) = s.split_once('/').ok_or_else(err)?;
        let limit: u64 = limit.trim().parse().map_err(|_| err())?;
        let window_secs: u64 = window.trim().parse().map_err(|_| err())?;

        if limit == 0 || window_secs == 0 {
            return Err(err());
        }

        Ok(Self::new(limit, window_secs))
    }
}

/// Named limits per operation.
///
/// Link creation is the tightest, resolution the loosest, analytics in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicies {
    pub create: RateLimit,
    pub resolve: RateLimit,
    pub analytics: RateLimit,
}

impl Default for RateLimitPolicies {
    fn default() -> Self {
        Self {
            create: RateLimit::new(10, 60),
            resolve: RateLimit::new(300, 60),
            analytics: RateLimit::new(60, 60),
        }
    }
}

impl RateLimitPolicies {
    pub fn for_operation(&self, operation: Operation) -> RateLimit {
        match operation {
            Operation::Create => self.create,
            Operation::Resolve => self.resolve,
            Operation::Analytics => self.analytics,
        }
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    /// Admitted without counting because the cache could not be reached.
    FailedOpen,
    Denied { retry_after_secs: u64 },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, RateDecision::Denied { .. })
    }

    /// Converts a denial into [`AppError::RateLimited`].
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            RateDecision::Allowed | RateDecision::FailedOpen => Ok(()),
            RateDecision::Denied { retry_after_secs } => {
                Err(AppError::RateLimited { retry_after_secs })
            }
        }
    }
}

/// Admission control per client identity and operation.
///
/// Fails open: if the cache cannot count, the request is admitted and the condition
/// is logged. Redirect availability matters more than strict enforcement.
pub struct RateGovernor {
    cache: Arc<dyn CacheService>,
    policies: RateLimitPolicies,
}

impl RateGovernor {
    pub fn new(cache: Arc<dyn CacheService>, policies: RateLimitPolicies) -> Self {
        Self { cache, policies }
    }

    pub fn policies(&self) -> &RateLimitPolicies {
        &self.policies
    }

    /// Applies the named policy for `operation` to `client_key`.
    pub async fn check(&self, client_key: &str, operation: Operation) -> RateDecision {
        let RateLimit { limit, window_secs } = self.policies.for_operation(operation);
        self.admit(client_key, operation.as_str(), limit, window_secs)
            .await
    }

    /// Counts one request for `(client_key, operation_key)` and decides admission.
    ///
    /// The counter's expiry is armed by the increment that creates it, so the window
    /// starts at the first request. Requests past `limit` within the window are denied
    /// with `retry_after_secs = window_secs`.
    pub async fn admit(
        &self,
        client_key: &str,
        operation_key: &str,
        limit: u64,
        window_secs: u64,
    ) -> RateDecision {
        let key = counter_key(client_key, operation_key);

        let count = match self.cache.incr_with_expiry(&key, window_secs).await {
            Ok(count) => count,
            Err(e) => {
                warn!(
                    "Rate limiter unavailable for {} ({}), admitting: {}",
                    client_key, operation_key, e
                );
                metrics::counter!("rate_limit_fail_open_total", "operation" => operation_key.to_string())
                    .increment(1);
                return RateDecision::FailedOpen;
            }
        };

        if count > limit {
            debug!(
                "Rate limit exceeded for {} ({}): {}/{}",
                client_key, operation_key, count, limit
            );
            metrics::counter!("rate_limit_denied_total", "operation" => operation_key.to_string())
                .increment(1);
            return RateDecision::Denied {
                retry_after_secs: window_secs,
            };
        }

        RateDecision::Allowed
    }
}

fn counter_key(client_key: &str, operation_key: &str) -> String {
    format!("rate:{operation_key}:{client_key}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::{
        CacheError, MemoryCache, MockCacheService, ReconnectingRedisCache,
    };
    use std::time::Duration;

    fn governor_with(cache: Arc<dyn CacheService>) -> RateGovernor {
        RateGovernor::new(cache, RateLimitPolicies::default())
    }

    #[test]
    fn test_parse_rate_limit() {
        assert_eq!("10/60".parse::<RateLimit>(), Ok(RateLimit::new(10, 60)));
        assert_eq!(" 5 / 1 ".parse::<RateLimit>(), Ok(RateLimit::new(5, 1)));
    }

    #[test]
    fn test_parse_rate_limit_rejects_garbage() {
        for bad in ["", "10", "10/", "/60", "0/60", "10/0", "a/b", "-1/60"] {
            assert!(bad.parse::<RateLimit>().is_err(), "{bad}");
        }
    }

    #[test]
    fn test_default_policies_order() {
        let p = RateLimitPolicies::default();
        assert!(p.create.limit < p.analytics.limit);
        assert!(p.analytics.limit < p.resolve.limit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_eleventh_request_denied_then_window_resets() {
        let governor = governor_with(Arc::new(MemoryCache::new()));

        for i in 1..=10 {
            assert_eq!(
                governor.admit("1.2.3.4", "create", 10, 60).await,
                RateDecision::Allowed,
                "request {i}"
            );
        }

        assert_eq!(
            governor.admit("1.2.3.4", "create", 10, 60).await,
            RateDecision::Denied {
                retry_after_secs: 60
            }
        );

        tokio::time::advance(Duration::from_secs(60)).await;

        assert_eq!(
            governor.admit("1.2.3.4", "create", 10, 60).await,
            RateDecision::Allowed
        );
    }

    #[tokio::test]
    async fn test_counters_are_independent_per_client_and_operation() {
        let governor = governor_with(Arc::new(MemoryCache::new()));

        assert!(governor.admit("a", "create", 1, 60).await.is_allowed());
        assert!(!governor.admit("a", "create", 1, 60).await.is_allowed());

        assert!(governor.admit("b", "create", 1, 60).await.is_allowed());
        assert!(governor.admit("a", "resolve", 1, 60).await.is_allowed());
    }

    #[tokio::test]
    async fn test_check_uses_named_policy() {
        let mut cache = MockCacheService::new();
        cache
            .expect_incr_with_expiry()
            .withf(|key, ttl| key == "rate:create:1.2.3.4" && *ttl == 60)
            .times(1)
            .returning(|_, _| Ok(11));

        let decision = governor_with(Arc::new(cache))
            .check("1.2.3.4", Operation::Create)
            .await;

        assert_eq!(
            decision,
            RateDecision::Denied {
                retry_after_secs: 60
            }
        );
    }

    #[tokio::test]
    async fn test_fails_open_when_cache_unavailable() {
        let mut cache = MockCacheService::new();
        cache
            .expect_incr_with_expiry()
            .returning(|_, _| Err(CacheError::Timeout(Duration::from_millis(250))));

        let governor = governor_with(Arc::new(cache));

        for _ in 0..100 {
            assert_eq!(
                governor.check("1.2.3.4", Operation::Create).await,
                RateDecision::FailedOpen
            );
        }
    }

    #[tokio::test]
    async fn test_fails_open_while_redis_unreachable() {
        let cache = Arc::new(ReconnectingRedisCache::new(
            "redis://127.0.0.1:1",
            "linkforge:",
            Duration::from_millis(100),
        ));
        let governor = governor_with(cache.clone());

        for _ in 0..50 {
            let decision = governor.check("1.2.3.4", Operation::Create).await;
            assert_eq!(decision, RateDecision::FailedOpen);
            assert!(decision.into_result().is_ok());
        }
        assert!(!cache.health_check().await);
    }

    #[test]
    fn test_denied_maps_to_rate_limited_error() {
        let err = RateDecision::Denied {
            retry_after_secs: 30,
        }
        .into_result()
        .unwrap_err();

        assert!(matches!(
            err,
            AppError::RateLimited {
                retry_after_secs: 30
            }
        ));
        assert!(RateDecision::Allowed.into_result().is_ok());
        assert!(RateDecision::FailedOpen.into_result().is_ok());
    }
}
