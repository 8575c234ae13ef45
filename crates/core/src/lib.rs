//! `cmsadmin-core`: shared primitives for the admin console client.
//!
//! This crate holds only plain data and error types (no IO, no transport).

pub mod error;
pub mod id;
pub mod preferences;

pub use error::{DomainError, DomainResult};
pub use id::{MenuId, TenantId, UserId};
pub use preferences::{AccessMode, Preferences};
