use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{info, warn};

pub mod albums;
pub mod media;

/// Number of connection attempts made before giving up at startup.
pub const MAX_CONNECT_ATTEMPTS: u32 = 5;

#[derive(Debug)]
enum BindValue<'a> {
    I64(i64),
    Str(&'a str),
}

pub async fn get_pool(options: PgConnectOptions) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .min_connections(1)
        .max_connections((num_cpus::get_physical() * 2) as u32)
        .acquire_timeout(Duration::from_secs(2))
        .connect_with(options)
        .await
}

/// Delay before the given (zero-based) retry.
pub fn retry_delay(attempt: u32) -> Duration {
    Duration::from_secs(1 + u64::from(attempt))
}

pub async fn connect_with_retry(options: PgConnectOptions) -> Result<PgPool, sqlx::Error> {
    let mut attempt = 0;
    loop {
        match get_pool(options.clone()).await {
            Ok(pool) => {
                info!("Connected to database");
                return Ok(pool);
            },
            Err(err) if attempt + 1 < MAX_CONNECT_ATTEMPTS => {
                let delay = retry_delay(attempt);
                warn!(
                    error = %err,
                    attempt = attempt + 1,
                    "Failed to connect to database. Retrying in {} seconds.",
                    delay.as_secs()
                );
                async_std::task::sleep(delay).await;
                attempt += 1;
            },
            Err(err) => return Err(err),
        }
    }
}

pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    crate::MIGRATOR.run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
