//! Unit tests for the project module.
//!
//! Setup and lifecycle tests share the in-memory wiring in [`support`].

mod domain_tests;
mod support;
