//! `cmsadmin-client`
//!
//! **Responsibility:** the session side of the admin console.
//!
//! This crate provides:
//! - The backend boundary ([`AdminApi`]) and its HTTP implementation
//! - The auth flow controller (password → optional TOTP → session)
//! - Visibility gates for permission-bound UI elements
//!
//! The backend remains the authority: menus arrive already authorized and the
//! client only decides what to show.

pub mod api;
pub mod flow;
pub mod gate;
pub mod http;
pub mod types;

pub use api::{AdminApi, ApiError};
pub use flow::{AuthError, AuthFlow, AuthState, LoginOutcome, PendingChallenge};
pub use gate::{Displayable, PermissionGate, ReactiveGate, Visibility};
pub use http::HttpAdminApi;
