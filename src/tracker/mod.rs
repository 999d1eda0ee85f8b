//! Task tracking: workflow statuses, transitions, tasks and revisions.
//!
//! Each project owns a status graph. Tasks move between statuses only along
//! existing transitions; every edit bumps the task revision by one and
//! stores an immutable snapshot used for diffs, history and notifications.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
