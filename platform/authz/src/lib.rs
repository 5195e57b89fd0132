//! Authorization primitives for the RH Manager.
//!
//! The gate is a pure function over `(Option<&Principal>, RouteAccess)`. It never
//! touches the database or the HTTP layer; callers resolve the principal and the
//! route class, then act on the returned [`Decision`].

mod gate;
mod permission;
mod role;
mod routes;

use thiserror::Error;

pub use gate::{AccessPolicy, Decision, Principal, RouteAccess};
pub use permission::{Permission, PermissionSet};
pub use role::Role;
pub use routes::{PathMatch, RouteRule, RouteTable};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("unknown role {0}")]
    UnknownRole(String),
    #[error("unknown permission tag {0}")]
    UnknownPermission(String),
    #[error("permissions must be a JSON array of strings: {0}")]
    MalformedPermissions(String),
}
