//! Adapter implementations for tracker persistence.

pub mod memory;
pub mod postgres;
