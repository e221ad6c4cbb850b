use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::RawRow;

pub(crate) const COLUMNS: &str = "\
    CAST(saex_id AS SIGNED) AS saex_id, \
    CAST(saex_user AS SIGNED) AS saex_user, \
    CAST(saex_useCases AS SIGNED) AS saex_useCases, \
    saex_useCasesTitle, saex_username, saex_retroContents, saex_closingContents, \
    saex_DateTime, \
    CAST(saex_iterations AS SIGNED) AS saex_iterations, \
    CAST(saex_score AS DOUBLE) AS saex_score, \
    saex_scoreData, \
    CAST(saex_sold AS SIGNED) AS saex_sold, \
    CAST(saex_rp_id AS CHAR) AS saex_rp_id, \
    saex_rp_email, saex_rp_activity, saex_rp_client";

/// Which page of `sale_exercises` to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExerciseFilter {
    pub(crate) use_cases: BTreeSet<i64>,
    /// Inclusive on both ends.
    pub(crate) date_range: Option<(PrimitiveDateTime, PrimitiveDateTime)>,
    /// 1-based.
    pub(crate) page: u32,
    pub(crate) page_size: u32,
}

impl ExerciseFilter {
    pub(crate) fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// Paginated access to exercise rows. Implementations report query failures
/// as errors; callers decide how to degrade.
#[async_trait]
pub(crate) trait ExerciseSource: Send + Sync {
    async fn fetch_page(&self, filter: &ExerciseFilter) -> Result<Vec<RawRow>, sqlx::Error>;
}

#[derive(Clone)]
pub(crate) struct MySqlExerciseSource {
    pool: MySqlPool,
}

impl MySqlExerciseSource {
    pub(crate) fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExerciseSource for MySqlExerciseSource {
    async fn fetch_page(&self, filter: &ExerciseFilter) -> Result<Vec<RawRow>, sqlx::Error> {
        list_page(&self.pool, filter).await
    }
}

pub(crate) async fn list_page(
    pool: &MySqlPool,
    filter: &ExerciseFilter,
) -> Result<Vec<RawRow>, sqlx::Error> {
    if filter.use_cases.is_empty() {
        return Ok(Vec::new());
    }

    page_query(filter).build_query_as::<RawRow>().fetch_all(pool).await
}

fn page_query(filter: &ExerciseFilter) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::<MySql>::new(format!(
        "SELECT {COLUMNS} FROM sale_exercises WHERE saex_useCases IN ("
    ));

    let mut ids = builder.separated(", ");
    for use_case in &filter.use_cases {
        ids.push_bind(*use_case);
    }
    ids.push_unseparated(")");

    if let Some((start, end)) = filter.date_range {
        builder.push(" AND saex_DateTime BETWEEN ");
        builder.push_bind(start);
        builder.push(" AND ");
        builder.push_bind(end);
    }

    builder.push(" LIMIT ");
    builder.push_bind(filter.page_size);
    builder.push(" OFFSET ");
    builder.push_bind(filter.offset());

    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn filter(date_range: Option<(PrimitiveDateTime, PrimitiveDateTime)>) -> ExerciseFilter {
        ExerciseFilter {
            use_cases: BTreeSet::from([190, 182]),
            date_range,
            page: 3,
            page_size: 100,
        }
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(filter(None).offset(), 200);
        let first = ExerciseFilter { page: 1, ..filter(None) };
        assert_eq!(first.offset(), 0);
    }

    #[test]
    fn page_query_without_range_binds_ids_and_paging() {
        let builder = page_query(&filter(None));
        let sql = builder.sql();
        assert!(sql.contains("WHERE saex_useCases IN (?, ?)"), "{sql}");
        assert!(sql.ends_with(" LIMIT ? OFFSET ?"), "{sql}");
        assert!(!sql.contains("BETWEEN"));
    }

    #[test]
    fn page_query_with_range_adds_between() {
        let range = (datetime!(2024-01-01 00:00:00), datetime!(2024-01-31 23:59:59));
        let builder = page_query(&filter(Some(range)));
        let sql = builder.sql();
        assert!(sql.contains("IN (?, ?) AND saex_DateTime BETWEEN ? AND ? LIMIT ?"), "{sql}");
    }
}
