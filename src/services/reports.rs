use crate::core::metrics;
use crate::repositories::sale_exercises::{ExerciseFilter, ExerciseSource};
use crate::services::extraction::{
    ActivityCriteria, ExerciseDetails, OutputRecord, RowTransformer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Report {
    Activities,
    ExerciseDetails,
}

impl Report {
    fn transformer(self) -> &'static dyn RowTransformer {
        match self {
            Self::Activities => &ActivityCriteria,
            Self::ExerciseDetails => &ExerciseDetails,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        self.transformer().name()
    }

    /// Path segment under the API prefix.
    pub(crate) fn route(self) -> &'static str {
        match self {
            Self::Activities => "dim_actividades",
            Self::ExerciseDetails => "rol_play_sim_extractor",
        }
    }
}

/// Fetches one page and runs the report's transformer over it.
///
/// A failed fetch is logged and reported as an empty page; callers never see
/// the database error.
pub(crate) async fn build_report(
    source: &dyn ExerciseSource,
    report: Report,
    filter: &ExerciseFilter,
) -> Vec<OutputRecord> {
    let rows = match source.fetch_page(filter).await {
        Ok(rows) => rows,
        Err(err) => {
            tracing::error!(
                report = report.name(),
                error = %err,
                page = filter.page,
                page_size = filter.page_size,
                "Failed to fetch exercise rows; returning empty page"
            );
            metrics::record_fetch_failure(report.name());
            return Vec::new();
        }
    };

    if rows.is_empty() {
        tracing::info!(
            report = report.name(),
            "No exercise rows found for the requested use cases"
        );
        return Vec::new();
    }

    let records = report.transformer().transform(&rows);
    metrics::record_page(report.name(), rows.len(), records.len());
    records
}
