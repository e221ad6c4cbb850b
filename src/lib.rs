pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

pub use crate::db::models::RawRow;
pub use crate::services::extraction::{
    transform_activities, transform_exercise_details, FieldValue, OutputRecord,
    MAX_QUESTION_INDEX, SENTINEL,
};

use crate::core::{config::Settings, state::AppState, telemetry};
use crate::repositories::sale_exercises::MySqlExerciseSource;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let db_pool = db::init_pool(&settings)?;
    let source = MySqlExerciseSource::new(db_pool.clone());
    let state = AppState::new(settings, db_pool, source);

    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        "saex reports API listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal()).await?;

    state.db().close().await;
    tracing::info!("database pool closed");

    Ok(())
}
