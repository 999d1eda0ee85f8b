//! Unit tests for the permission module.

mod service_tests;
