pub(crate) mod models;

use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::{ConnectOptions, MySqlPool};

use crate::core::config::Settings;

/// Builds the pool without opening a connection; the first report request
/// connects, and a database outage surfaces as an empty page rather than a
/// startup failure.
pub(crate) fn init_pool(settings: &Settings) -> Result<MySqlPool, sqlx::Error> {
    let database = settings.database();
    let mut connect_options: MySqlConnectOptions = database.database_url().parse()?;

    connect_options = connect_options
        .charset("utf8mb4")
        .log_statements(tracing::log::LevelFilter::Debug)
        .log_slow_statements(tracing::log::LevelFilter::Warn, Duration::from_secs(5));

    Ok(MySqlPoolOptions::new()
        .max_connections(database.max_connections)
        .min_connections(0)
        .acquire_timeout(Duration::from_secs(database.acquire_timeout_seconds))
        .test_before_acquire(true)
        .connect_lazy_with(connect_options))
}
