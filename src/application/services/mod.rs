//! Business logic services for the application layer.

pub mod code_allocator;
pub mod link_cache;
pub mod link_service;
pub mod rate_governor;
pub mod resolver;
pub mod stats_service;

pub use code_allocator::CodeAllocator;
pub use link_service::LinkService;
pub use rate_governor::{
    Operation, RateDecision, RateGovernor, RateLimit, RateLimitPolicies,
};
pub use resolver::Resolver;
pub use stats_service::StatsService;
