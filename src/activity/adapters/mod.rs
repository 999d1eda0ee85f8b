//! Adapter implementations for the activity log.

pub mod memory;
pub mod postgres;
