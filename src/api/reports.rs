use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::pagination::exercise_filter;
use crate::core::state::AppState;
use crate::schemas::report::ReportQuery;
use crate::services::extraction::OutputRecord;
use crate::services::reports::{build_report, Report};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route(&format!("/{}", Report::Activities.route()), get(activities))
        .route(&format!("/{}", Report::ExerciseDetails.route()), get(exercise_details))
}

async fn activities(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<OutputRecord>>, ApiError> {
    let Query(pairs) = query?;
    serve_report(&state, Report::Activities, pairs).await
}

async fn exercise_details(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<OutputRecord>>, ApiError> {
    let Query(pairs) = query?;
    serve_report(&state, Report::ExerciseDetails, pairs).await
}

async fn serve_report(
    state: &AppState,
    report: Report,
    pairs: Vec<(String, String)>,
) -> Result<Json<Vec<OutputRecord>>, ApiError> {
    let query = ReportQuery::from_pairs(pairs).map_err(ApiError::BadRequest)?;
    query.validate()?;
    let filter = exercise_filter(&query, state.settings())?;

    tracing::debug!(
        report = report.name(),
        use_cases = ?filter.use_cases,
        date_range = ?filter.date_range,
        page = filter.page,
        page_size = filter.page_size,
        "Building report page"
    );

    let records = build_report(state.exercises(), report, &filter).await;
    Ok(Json(records))
}
