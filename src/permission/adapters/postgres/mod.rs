//! `PostgreSQL` adapter for permission grants.

mod models;
mod repository;
mod schema;

pub use repository::PostgresPermissionRepository;
