//! User and group identities consumed by the project tracker.
//!
//! Accounts are owned by an external identity provider. This module only
//! models the values the tracker needs (identifiers, activity flags, group
//! membership) and the [`ports::UserDirectory`] contract used to look them
//! up.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use domain::{GroupId, Principal, User, UserId, Username};
pub use ports::{UserDirectory, UserDirectoryError, UserDirectoryResult};
