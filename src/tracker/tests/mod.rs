//! Unit tests for the tracker module.
//!
//! Domain rules are tested without storage; adapter and service tests run
//! against the in-memory repositories.

mod adapters_tests;
