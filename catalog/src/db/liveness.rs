//! Background liveness check for the connection pool.

use sqlx::PgPool;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Round-trip a trivial query through the pool.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}

/// Ping the pool every `interval` until `shutdown` is cancelled.
///
/// A failed ping is logged and the loop carries on; the pool reconnects on its own.
#[instrument(skip_all, fields(interval = ?interval))]
pub async fn run_liveness_check(pool: PgPool, interval: Duration, shutdown: CancellationToken) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::debug!("Liveness check stopping");
                return Ok(());
            }
            _ = ticker.tick() => {
                match ping(&pool).await {
                    Ok(()) => tracing::trace!("Database ping ok"),
                    Err(e) => tracing::warn!("Database ping failed: {}", e),
                }
            }
        }
    }
}
