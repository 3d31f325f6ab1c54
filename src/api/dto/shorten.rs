//! DTOs for link shortening endpoint.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;
use validator::{Validate, ValidationError};

use crate::domain::entities::ShortLink;

/// Compiled regex for custom code validation.
static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("custom code regex is valid"));

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The URL to redirect to (absolute http/https).
    #[validate(length(max = 2048, message = "URL must be at most 2048 characters"))]
    #[validate(custom(function = "validate_http_url"))]
    pub url: String,

    /// Optional user-chosen code. Reserved words are rejected by the service.
    #[validate(length(min = 3, max = 32))]
    #[validate(regex(path = "*CUSTOM_CODE_REGEX"))]
    pub custom_code: Option<String>,

    /// Optional lifetime in days. Omitted means the link never expires.
    #[validate(range(min = 1, max = 3650))]
    pub ttl_days: Option<u32>,
}

fn validate_http_url(value: &str) -> Result<(), ValidationError> {
    let parsed = Url::parse(value).map_err(|_| {
        ValidationError::new("url").with_message("Invalid URL format".into())
    })?;

    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Ok(()),
        _ => Err(ValidationError::new("url")
            .with_message("URL must be an absolute http or https URL".into())),
    }
}

/// Created short link.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub code: String,
    pub short_url: String,
    pub target_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortenResponse {
    pub fn new(link: ShortLink, short_url: String) -> Self {
        Self {
            code: link.code,
            short_url,
            target_url: link.target_url,
            created_at: link.created_at,
            expires_at: link.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str) -> ShortenRequest {
        ShortenRequest {
            url: url.to_string(),
            custom_code: None,
            ttl_days: None,
        }
    }

    #[test]
    fn test_accepts_http_and_https() {
        assert!(request("https://example.com/path?q=1").validate().is_ok());
        assert!(request("http://localhost:8080").validate().is_ok());
    }

    #[test]
    fn test_rejects_other_schemes_and_garbage() {
        assert!(request("ftp://example.com").validate().is_err());
        assert!(request("mailto:someone@example.com").validate().is_err());
        assert!(request("not a url").validate().is_err());
        assert!(request("").validate().is_err());
    }

    #[test]
    fn test_rejects_overlong_url() {
        let url = format!("https://example.com/{}", "a".repeat(2048));
        assert!(request(&url).validate().is_err());
    }

    #[test]
    fn test_custom_code_rules() {
        let mut req = request("https://example.com");

        req.custom_code = Some("My_Link-1".to_string());
        assert!(req.validate().is_ok());

        req.custom_code = Some("ab".to_string());
        assert!(req.validate().is_err());

        req.custom_code = Some("has space".to_string());
        assert!(req.validate().is_err());

        req.custom_code = Some("x".repeat(33));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_ttl_days_range() {
        let mut req = request("https://example.com");

        req.ttl_days = Some(0);
        assert!(req.validate().is_err());

        req.ttl_days = Some(3651);
        assert!(req.validate().is_err());

        req.ttl_days = Some(30);
        assert!(req.validate().is_ok());
    }
}
