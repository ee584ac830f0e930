use anyhow::{Context, Result};
use tracing::info;

use propman_worker::config::Config;
use propman_worker::jobs::{InvitationExpiryJob, JobScheduler, PoolMetricsJob};
use propman_worker::{logging, metrics};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    info!("Starting property manager worker v{}", env!("CARGO_PKG_VERSION"));

    if config.metrics.enabled {
        metrics::init_metrics(config.metrics_addr()?)
            .context("Failed to install Prometheus exporter")?;
    }

    let pool = persistence::db::create_pool(&config.database.pool_config())
        .await
        .context("Failed to connect to database")?;

    persistence::db::run_migrations(&pool).await?;

    let mut scheduler = JobScheduler::new();
    scheduler.register(InvitationExpiryJob::new(
        pool.clone(),
        config.jobs.invitation_expiry_interval_minutes,
    ));
    scheduler.register(PoolMetricsJob::new(
        pool.clone(),
        config.jobs.pool_metrics_interval_secs,
    ));
    scheduler.start();

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    scheduler.shutdown();
    scheduler
        .wait_for_shutdown(config.jobs.shutdown_timeout())
        .await;
    pool.close().await;

    Ok(())
}
