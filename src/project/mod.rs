//! Projects: the aggregate, its setup lifecycle, fork tree and membership.
//!
//! A project is stored `Pending` and then driven through its checkpoints by
//! [`services::ProjectSetupService`], either inline or on a background task
//! ([`services::BackgroundSetup`]).

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
