//! Projector: project and issue tracking core.
//!
//! This crate provides project lifecycle management with a persisted setup
//! state machine, per-project task workflows with revisioned tasks, team
//! permissions, repository provisioning and an activity log.
//!
//! # Architecture
//!
//! Projector follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, VCS, mail)
//!
//! # Modules
//!
//! - [`project`]: Projects, setup checkpoints, forks and membership
//! - [`tracker`]: Statuses, transitions, tasks and revisions
//! - [`workflow`]: Workflow definitions used to seed new projects
//! - [`permission`]: Per-project grants and authorization
//! - [`vcs`]: Repository provisioning and pull/push authorization
//! - [`activity`]: Project events, activity log and feed
//! - [`notification`]: Task change mail and administrator alerts

pub mod accounts;
pub mod activity;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod notification;
pub mod permission;
pub mod persistence;
pub mod project;
pub mod telemetry;
pub mod tracker;
pub mod vcs;
pub mod workflow;

pub use error::{ProjectorError, ProjectorResult};
