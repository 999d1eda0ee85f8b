//! Shared `PostgreSQL` connection plumbing for the diesel adapters.

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};

/// `PostgreSQL` connection pool shared by every diesel adapter.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns [`PoolError`] when the initial connections cannot be opened.
pub fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(max_connections.max(1))
        .build(manager)
}

diesel::define_sql_function! {
    /// SQL `lower()` for case-insensitive name lookups.
    fn lower(value: diesel::sql_types::Text) -> diesel::sql_types::Text;
}
