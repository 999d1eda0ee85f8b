//! Per-project permissions granted to users and groups.
//!
//! Grants are stored per `(project, grantee, permission)`. The
//! [`PermissionService`] folds grants together with the superuser,
//! public-project and anonymous rules into a single authorization decision,
//! exposed to other services through the [`Authorizer`] seam.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

pub use domain::{Grantee, ParsePermissionError, ProjectPermission};
pub use ports::{PermissionRepository, PermissionRepositoryError, PermissionRepositoryResult};
pub use services::{Authorizer, PermissionError, PermissionResult, PermissionService};

#[cfg(test)]
mod tests;
