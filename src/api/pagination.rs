use crate::api::errors::ApiError;
use crate::core::config::Settings;
use crate::core::time::parse_range_bound;
use crate::repositories::sale_exercises::ExerciseFilter;
use crate::schemas::report::ReportQuery;

/// Turns a validated query into the row-source filter, applying the default
/// page size and the configured maximum.
pub(crate) fn exercise_filter(
    query: &ReportQuery,
    settings: &Settings,
) -> Result<ExerciseFilter, ApiError> {
    let date_range = match query.date_bounds() {
        Some((start, end)) => {
            Some((parse_bound("fecha_inicio", start)?, parse_bound("fecha_fin", end)?))
        }
        None => None,
    };

    Ok(ExerciseFilter {
        use_cases: query.ids.iter().copied().collect(),
        date_range,
        page: query.page,
        page_size: settings.reports().effective_page_size(query.page_size),
    })
}

fn parse_bound(field: &str, value: &str) -> Result<time::PrimitiveDateTime, ApiError> {
    parse_range_bound(value).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "{field} must look like YYYY-MM-DD or YYYY-MM-DD HH:MM:SS, got '{value}'"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use time::macros::datetime;

    fn query(page_size: Option<u32>, range: Option<(&str, &str)>) -> ReportQuery {
        ReportQuery {
            ids: vec![190, 182, 190],
            fecha_inicio: range.map(|(start, _)| start.to_string()),
            fecha_fin: range.map(|(_, end)| end.to_string()),
            page: 4,
            page_size,
        }
    }

    #[tokio::test]
    async fn clamps_page_size_and_dedups_ids() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        let settings = Settings::load().expect("settings");

        let filter = exercise_filter(&query(Some(900_000), None), &settings).expect("filter");
        assert_eq!(filter.page_size, 50_000);
        assert_eq!(filter.page, 4);
        assert_eq!(filter.use_cases.iter().copied().collect::<Vec<_>>(), vec![182, 190]);
        assert_eq!(filter.date_range, None);

        let filter = exercise_filter(&query(None, None), &settings).expect("filter");
        assert_eq!(filter.page_size, 10_000);
    }

    #[tokio::test]
    async fn parses_date_range_or_rejects_it() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        let settings = Settings::load().expect("settings");

        let filter =
            exercise_filter(&query(None, Some(("2024-01-01", "2024-01-31 23:59:59"))), &settings)
                .expect("filter");
        assert_eq!(
            filter.date_range,
            Some((datetime!(2024-01-01 00:00:00), datetime!(2024-01-31 23:59:59)))
        );

        let err = exercise_filter(&query(None, Some(("ayer", "2024-01-31"))), &settings)
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(message) if message.contains("fecha_inicio")));
    }
}
