//! Core business logic - framework-agnostic escrow operations.
//!
//! Functions here take a database connection and the calling [`auth::Principal`]
//! and return [`crate::errors::Result`]. The HTTP layer in `crate::api` only
//! extracts inputs and shapes responses.

pub mod access;
pub mod address;
pub mod auth;
pub mod pagination;
pub mod patch;
pub mod payment;
pub mod product;
pub mod references;
pub mod transaction;
pub mod user;
pub mod withdrawal;

/// Generates a new record id: a v4 UUID as 32 lowercase hex characters.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
