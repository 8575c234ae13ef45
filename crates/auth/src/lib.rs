//! `cmsadmin-auth`: client-side session and access-control model.
//!
//! No HTTP here. This crate holds the session
//! state, the permission evaluator, the profile types and the menu tree
//! builder that the rest of the console reads on every render/navigation
//! decision.

pub mod authorize;
pub mod menu;
pub mod permissions;
pub mod profile;
pub mod roles;
pub mod session;

pub use authorize::{
    AuthorizationExplanation, AuthzError, Requirement, authorize, explain, satisfies,
};
pub use menu::{
    BackendMenuMeta, BackendMenuNode, MenuError, RouteMeta, RouteNode, build_forest, build_route,
};
pub use permissions::{AccessCode, AccessCodes};
pub use profile::{UserInfoPayload, UserProfile};
pub use roles::Role;
pub use session::{Session, SessionStore, SessionWatch};
