//! Configuration for the Catalog API

use core_config::{AppInfo, FromEnv, app_info, env_or_default, server::ServerConfig};
use database::mongodb::MongoConfig;
use domain_catalog::mongodb::DEFAULT_COLLECTION;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// `PRODUCTS_COLLECTION`, defaults to `product_items`
    pub products_collection: String,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mut mongodb = MongoConfig::from_env()?;
        mongodb
            .app_name
            .get_or_insert_with(|| "catalog-api".to_string());
        let server = ServerConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
            products_collection: env_or_default("PRODUCTS_COLLECTION", DEFAULT_COLLECTION),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_requires_mongo_uri() {
        temp_env::with_vars(
            [
                ("MONGO_URI", None::<&str>),
                ("MONGODB_URL", None),
                ("MONGO_URL", None),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }

    #[test]
    fn test_config_defaults() {
        temp_env::with_vars(
            [
                ("MONGO_URI", Some("mongodb://db:27017/shop")),
                ("PORT", None),
                ("HOST", None),
                ("PRODUCTS_COLLECTION", None),
                ("MONGODB_DATABASE", None),
                ("MONGO_DATABASE", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.server.port, 5000);
                assert_eq!(config.products_collection, "product_items");
                assert_eq!(config.mongodb.url(), "mongodb://db:27017/shop");
                assert_eq!(config.mongodb.database, None);
                assert_eq!(config.app.name, "catalog_api");
            },
        );
    }

    #[test]
    fn test_config_overrides() {
        temp_env::with_vars(
            [
                ("MONGO_URI", Some("mongodb://db:27017")),
                ("PORT", Some("8080")),
                ("PRODUCTS_COLLECTION", Some("products_staging")),
                ("MONGODB_DATABASE", Some("staging")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.products_collection, "products_staging");
                assert_eq!(config.mongodb.database.as_deref(), Some("staging"));
            },
        );
    }

    #[test]
    fn test_config_rejects_bad_port() {
        temp_env::with_vars(
            [
                ("MONGO_URI", Some("mongodb://db:27017")),
                ("PORT", Some("not-a-port")),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}
