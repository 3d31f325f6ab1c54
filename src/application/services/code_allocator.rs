//! Unique short code allocation against the durable store.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{generate_code, is_reserved};

/// Default number of candidates tried before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Turns random candidates into codes that are free in the store.
///
/// The existence check here is an optimisation, not the guarantee: two instances can
/// both see a code as free. The store's atomic [`LinkRepository::insert_unique`] is
/// what finally decides, and its conflict is reported as [`AppError::AlreadyTaken`].
pub struct CodeAllocator {
    repository: Arc<dyn LinkRepository>,
    code_length: usize,
    max_attempts: usize,
    generate: fn(usize) -> String,
}

impl CodeAllocator {
    pub fn new(repository: Arc<dyn LinkRepository>, code_length: usize, max_attempts: usize) -> Self {
        Self {
            repository,
            code_length,
            max_attempts: max_attempts.max(1),
            generate: generate_code,
        }
    }

    #[cfg(test)]
    fn with_generator(mut self, generate: fn(usize) -> String) -> Self {
        self.generate = generate;
        self
    }

    /// Finds a generated code that is absent from the store.
    ///
    /// Each attempt draws a fresh candidate and checks it independently. Candidates
    /// that spell a service route are discarded without a store lookup.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AllocationExhausted`] when every attempt collided.
    /// Store errors propagate unchanged.
    pub async fn allocate_unique(&self) -> Result<String, AppError> {
        for attempt in 1..=self.max_attempts {
            let candidate = (self.generate)(self.code_length);

            if is_reserved(&candidate) {
                debug!("Discarding reserved code on attempt {}: {}", attempt, candidate);
                continue;
            }

            if self.repository.get(&candidate).await?.is_none() {
                debug!("Allocated code {} on attempt {}", candidate, attempt);
                return Ok(candidate);
            }

            debug!("Code collision on attempt {}: {}", attempt, candidate);
        }

        warn!(
            "No free code of length {} after {} attempts",
            self.code_length, self.max_attempts
        );
        metrics::counter!("code_allocation_exhausted_total").increment(1);

        Err(AppError::allocation_exhausted(
            "Failed to allocate a unique code",
            json!({ "attempts": self.max_attempts, "code_length": self.code_length }),
        ))
    }

    /// Checks that a user-chosen code is not already in use.
    ///
    /// The caller must still insert through [`LinkRepository::insert_unique`], which
    /// rejects a concurrent duplicate atomically.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AlreadyTaken`] if the code exists.
    pub async fn reserve_custom(&self, code: &str) -> Result<(), AppError> {
        if self.repository.get(code).await?.is_some() {
            return Err(AppError::already_taken(
                "Custom code is already taken",
                json!({ "code": code }),
            ));
        }

        Ok(())
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }
}
