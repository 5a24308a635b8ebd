//! Periodic expiry sweep for the task queue.
//!
//! Tasks carry an optional deadline; once it passes they may no longer be
//! claimed or completed. This worker runs the store's bulk
//! pending/claimed → expired transition on a fixed interval, keeping the
//! sweep out of request handlers.
//!
//! Configuration comes from the environment (a `.env` file is honoured):
//!
//! - `DATABASE_URL` — `PostgreSQL` connection string (required)
//! - `SWEEP_INTERVAL_SECS` — seconds between sweeps (default 60, minimum 1)
//! - `RUST_LOG` — tracing filter (default `info`)

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use gorev::task::adapters::postgres::PostgresTaskRepository;
use gorev::task::ports::TaskRepository;
use mockable::{Clock, DefaultClock};
use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Default seconds between sweeps.
const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Errors that stop the sweeper from starting.
#[derive(Debug, Error)]
enum SweeperError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error("invalid SWEEP_INTERVAL_SECS: {0}")]
    InvalidInterval(String),
    #[error("failed to build connection pool: {0}")]
    PoolInit(String),
}

#[tokio::main]
async fn main() -> Result<(), SweeperError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let database_url = env::var("DATABASE_URL").map_err(|_| SweeperError::MissingDatabaseUrl)?;
    let interval_secs = sweep_interval_secs()?;

    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .build(manager)
        .map_err(|err| SweeperError::PoolInit(err.to_string()))?;
    let repository = PostgresTaskRepository::new(pool);
    let clock = DefaultClock;

    info!(interval_secs, "expiry sweeper started");
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match repository.expire_overdue(clock.utc()).await {
                    Ok(0) => {}
                    Ok(count) => info!(count, "expired overdue tasks"),
                    Err(err) => error!(error = %err, "expiry sweep failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("expiry sweeper stopping");
                break;
            }
        }
    }
    Ok(())
}

/// Reads the sweep interval from the environment, clamped to at least one
/// second.
fn sweep_interval_secs() -> Result<u64, SweeperError> {
    let Ok(raw) = env::var("SWEEP_INTERVAL_SECS") else {
        return Ok(DEFAULT_INTERVAL_SECS);
    };
    raw.parse::<u64>()
        .map(|secs| secs.max(1))
        .map_err(|_| SweeperError::InvalidInterval(raw))
}
