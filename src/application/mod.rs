//! Application layer services implementing business logic.
//!
//! Services consume repository and cache traits and expose the entry points the
//! HTTP layer calls.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link creation
//! - [`services::code_allocator::CodeAllocator`] - Unique code allocation
//! - [`services::resolver::Resolver`] - Cache-aside code resolution
//! - [`services::rate_governor::RateGovernor`] - Fixed-window admission control
//! - [`services::stats_service::StatsService`] - Reporting queries

pub mod services;
