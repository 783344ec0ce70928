//! MongoDB connector and helpers

mod config;
mod connector;
mod health;

pub use config::{FALLBACK_DATABASE, MongoConfig};
pub use connector::{MongoError, connect_from_config, connect_from_config_with_retry, database_for};
pub use health::check_health;

pub use mongodb::{Client, Collection, Database};
