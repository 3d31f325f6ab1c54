//! Domain layer containing entities, repository contracts and click accounting.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Click accounting event model
//! - [`click_worker`] - Asynchronous click processing worker
//!
//! # Click Processing Flow
//!
//! 1. [`crate::application::services::Resolver`] resolves a code
//! 2. A [`click_event::ClickEvent`] is pushed onto a bounded channel without waiting
//! 3. [`click_worker::run_click_worker`] applies it to the store with retry
//! 4. Failures are logged and dropped; redirects never see them

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
