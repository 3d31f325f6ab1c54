//! Core domain entities.
//!
//! - [`ShortLink`] - The authoritative short link record
//! - [`NewShortLink`] - Input for creating a record
//! - [`CachedLink`] - The cache projection of a record

pub mod short_link;

pub use short_link::{CachedLink, MAX_TARGET_URL_LEN, NewShortLink, ShortLink};
