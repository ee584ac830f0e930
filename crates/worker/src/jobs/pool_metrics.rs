//! Background job to record connection pool metrics.

use sqlx::PgPool;

use super::scheduler::{Job, JobFrequency};

/// Job that periodically records database connection pool metrics.
pub struct PoolMetricsJob {
    pool: PgPool,
    interval_secs: u64,
}

impl PoolMetricsJob {
    pub fn new(pool: PgPool, interval_secs: u64) -> Self {
        Self {
            pool,
            interval_secs,
        }
    }
}

#[async_trait::async_trait]
impl Job for PoolMetricsJob {
    fn name(&self) -> &'static str {
        "pool_metrics"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(self.interval_secs)
    }

    async fn execute(&self) -> Result<(), String> {
        persistence::metrics::record_pool_metrics(&self.pool);
        Ok(())
    }
}
