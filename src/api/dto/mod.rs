//! Data Transfer Objects for the REST API.
//!
//! Request types derive [`validator::Validate`]; response types serialize the
//! domain records into the public JSON shape.

pub mod health;
pub mod shorten;
pub mod stats;
