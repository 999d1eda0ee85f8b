//! Step definitions for project setup scenarios.

#[path = "../in_memory_app/helpers.rs"]
pub mod helpers;

pub mod given;
pub mod then;
pub mod when;
pub mod world;
