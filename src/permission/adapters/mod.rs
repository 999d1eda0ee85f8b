//! Adapter implementations for permission grants.

pub mod memory;
pub mod postgres;
