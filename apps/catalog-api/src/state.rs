//! Shared application state.

use sea_orm::DatabaseConnection;

/// Cloned into the readiness handler; domain routers get their own
/// repositories built from `db` and carry their own state.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// PostgreSQL connection pool
    pub db: DatabaseConnection,
}
