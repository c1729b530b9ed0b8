use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::health::ports::HealthIndicator;

/// Probes the database with a trivial round trip.
pub struct PostgresHealthIndicator {
    pool: PgPool,
}

impl PostgresHealthIndicator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthIndicator for PostgresHealthIndicator {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn check(&self) -> Result<(), String> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
