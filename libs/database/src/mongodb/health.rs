use mongodb::{Database, bson::doc};
use std::time::Instant;

use crate::common::DatabaseError;

/// Ping the deployment through `db`.
///
/// Returns the round-trip latency in milliseconds.
///
/// ```ignore
/// use database::mongodb::check_health;
///
/// let latency_ms = check_health(&db).await?;
/// ```
pub async fn check_health(db: &Database) -> Result<u64, DatabaseError> {
    let start = Instant::now();

    db.run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))?;

    Ok(start.elapsed().as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::Client;

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_check_health() {
        let client = Client::with_uri_str("mongodb://localhost:27017")
            .await
            .unwrap();
        assert!(check_health(&client.database("admin")).await.is_ok());
    }
}
