//! Adapter implementations for the VCS backend port.

pub mod command;
pub mod memory;

pub use command::CommandVcsBackend;
pub use memory::InMemoryVcsBackend;
