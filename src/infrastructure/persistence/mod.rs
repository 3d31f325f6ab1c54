//! PostgreSQL repository implementations.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Short link storage, click accounting and reporting queries

pub mod pg_link_repository;

pub use pg_link_repository::PgLinkRepository;
