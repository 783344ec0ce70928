use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use std::time::Duration;
use tracing::info;

use super::MongoConfig;
use super::config::FALLBACK_DATABASE;
use crate::common::{RetryConfig, retry_with_backoff};

/// Error type for MongoDB connection management
#[derive(Debug, thiserror::Error)]
pub enum MongoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Connect using a MongoConfig and verify the deployment answers a ping.
///
/// ```ignore
/// use database::mongodb::{MongoConfig, connect_from_config};
///
/// let config = MongoConfig::with_database("mongodb://localhost:27017", "catalog");
/// let client = connect_from_config(&config).await?;
/// ```
pub async fn connect_from_config(config: &MongoConfig) -> Result<Client, MongoError> {
    info!("Attempting to connect to MongoDB at {}", config.redacted_url());

    let mut options = ClientOptions::parse(&config.url).await?;

    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));

    if let Some(ref app_name) = config.app_name {
        options.app_name = Some(app_name.clone());
    }

    let client = Client::with_options(options)?;

    // Client construction is lazy; force a round-trip so bad URIs fail here.
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| MongoError::ConnectionFailed(e.to_string()))?;

    info!("Successfully connected to MongoDB");
    Ok(client)
}

/// Connect from config, retrying with exponential backoff.
///
/// Without an explicit `retry_config`, `config.connect_retries` retries are made.
///
/// ```ignore
/// let config = MongoConfig::from_env()?;
/// let client = connect_from_config_with_retry(&config, None).await?;
/// ```
pub async fn connect_from_config_with_retry(
    config: &MongoConfig,
    retry_config: Option<RetryConfig>,
) -> Result<Client, MongoError> {
    let retry_config = retry_config
        .unwrap_or_else(|| RetryConfig::new().with_max_retries(config.connect_retries));

    retry_with_backoff(|| connect_from_config(config), retry_config).await
}

/// Resolve the database to use: explicit config, then the one named in the
/// connection string, then [`FALLBACK_DATABASE`].
pub fn database_for(client: &Client, config: &MongoConfig) -> Database {
    match config.database.as_deref() {
        Some(name) => client.database(name),
        None => client
            .default_database()
            .unwrap_or_else(|| client.database(FALLBACK_DATABASE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_connect_from_config() {
        let url = std::env::var("MONGO_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let config = MongoConfig::with_database(url, "test");
        let client = connect_from_config(&config).await.unwrap();
        assert_eq!(database_for(&client, &config).name(), "test");
    }

    #[tokio::test]
    async fn test_database_for_falls_back_to_uri_then_default() {
        // Parsing does not contact the server.
        let named = Client::with_uri_str("mongodb://localhost:27017/shop")
            .await
            .unwrap();
        let config = MongoConfig::new("mongodb://localhost:27017/shop");
        assert_eq!(database_for(&named, &config).name(), "shop");

        let unnamed = Client::with_uri_str("mongodb://localhost:27017")
            .await
            .unwrap();
        let config = MongoConfig::new("mongodb://localhost:27017");
        assert_eq!(database_for(&unnamed, &config).name(), FALLBACK_DATABASE);

        let config = MongoConfig::with_database("mongodb://localhost:27017/shop", "override");
        assert_eq!(database_for(&named, &config).name(), "override");
    }
}
