//! Short code generation and custom code validation.
//!
//! Generated codes are drawn uniformly from a 62-symbol alphabet. At the default
//! length of 7 this yields about 3.5e12 combinations, so blind collisions are rare
//! but possible; uniqueness is enforced by [`crate::application::services::CodeAllocator`].

use std::collections::HashSet;

use rand::Rng;
use serde_json::json;

use crate::error::AppError;

/// Digits, uppercase, lowercase.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Default length of generated codes.
pub const DEFAULT_CODE_LENGTH: usize = 7;

const CUSTOM_CODE_MIN_LEN: usize = 3;
const CUSTOM_CODE_MAX_LEN: usize = 32;

/// Codes that collide with service routes and cannot be used as short links.
const RESERVED_CODES: &[&str] = &["api", "health", "stats", "links", "admin", "static"];

/// Generates a random code of `length` symbols from [`ALPHABET`].
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(7);
/// assert_eq!(code.len(), 7);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();

    (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Generates `n` distinct codes of the given length.
///
/// Loops until enough distinct values are collected, so it never returns fewer than
/// `n` codes. Meant for offline pre-generation, not for the request path. `n` must
/// not exceed the code space for `length`, or this never terminates.
pub fn generate_batch(n: usize, length: usize) -> HashSet<String> {
    let mut codes = HashSet::with_capacity(n);

    while codes.len() < n {
        codes.insert(generate_code(length));
    }

    codes
}

/// Returns true if `code` names a service route, compared case-insensitively.
pub fn is_reserved(code: &str) -> bool {
    RESERVED_CODES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(code))
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 3-32 characters
/// - Allowed characters: ASCII letters, digits, `-` and `_`
/// - Cannot be a reserved route word
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.len() < CUSTOM_CODE_MIN_LEN || code.len() > CUSTOM_CODE_MAX_LEN {
        return Err(AppError::bad_request(
            format!(
                "Custom code must be {}-{} characters",
                CUSTOM_CODE_MIN_LEN, CUSTOM_CODE_MAX_LEN
            ),
            json!({ "provided_length": code.len() }),
        ));
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::bad_request(
            "Custom code can only contain letters, digits, hyphens and underscores",
            json!({ "code": code }),
        ));
    }

    if is_reserved(code) {
        return Err(AppError::bad_request(
            "This code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}
