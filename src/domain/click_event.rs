//! Click event model for asynchronous click accounting.

use chrono::{DateTime, Utc};

/// A successful resolution waiting to be counted.
///
/// Sent from the resolver to the background worker over a bounded channel so the
/// redirect response never waits on the store write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub code: String,
    pub accessed_at: DateTime<Utc>,
}

impl ClickEvent {
    /// Creates an event stamped with the current time.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            accessed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_event_creation() {
        let before = Utc::now();
        let event = ClickEvent::new("abc1234");

        assert_eq!(event.code, "abc1234");
        assert!(event.accessed_at >= before);
    }
}
