//! Version-control bridge.
//!
//! The smart-HTTP protocol itself is served by an external library. This
//! module provisions repositories for projects ([`ports::VcsBackend`]) and
//! decides whether a principal may pull from or push to a project
//! repository ([`access::authorize`]).

pub mod access;
pub mod adapters;
pub mod domain;
pub mod ports;

pub use access::{VcsAccessError, authorize, required_permission};
pub use domain::{ParseVcsAliasError, RepositoryRef, VcsAlias, VcsOperation};
pub use ports::{VcsBackend, VcsError, VcsResult};
