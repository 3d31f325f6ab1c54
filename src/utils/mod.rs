//! Utility functions for code generation and request handling.
//!
//! - [`code_generator`] - Short code generation and custom code validation
//! - [`client_key`] - Client identity extraction for rate limiting

pub mod client_key;
pub mod code_generator;
