//! Application state management.

use mongodb::{Client, Database};

/// Shared application state.
///
/// Cloning is cheap: the client shares one connection pool.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub mongo_client: Client,
    /// Database resolved from config, the connection string, or the fallback
    pub db: Database,
}
