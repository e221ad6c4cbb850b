use sqlx::FromRow;
use time::PrimitiveDateTime;

/// One `sale_exercises` row as returned by the report query.
///
/// Loosely-typed columns are normalised in SQL (see
/// `repositories::sale_exercises`), so every field here decodes the same way
/// regardless of how the column is stored.
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct RawRow {
    #[sqlx(rename = "saex_id")]
    pub id: i64,
    #[sqlx(rename = "saex_user")]
    pub user: Option<i64>,
    #[sqlx(rename = "saex_useCases")]
    pub use_case: Option<i64>,
    #[sqlx(rename = "saex_useCasesTitle")]
    pub use_case_title: Option<String>,
    #[sqlx(rename = "saex_username")]
    pub username: Option<String>,
    /// JSON object keyed by question position (`"1"`, `"2"`, ...).
    #[sqlx(rename = "saex_retroContents")]
    pub retro_contents: Option<String>,
    /// HTML fragment with `<p class="question">` / `<p class="answer">` pairs.
    #[sqlx(rename = "saex_closingContents")]
    pub closing_contents: Option<String>,
    #[sqlx(rename = "saex_DateTime")]
    pub date_time: Option<PrimitiveDateTime>,
    #[sqlx(rename = "saex_iterations")]
    pub iterations: Option<i64>,
    #[sqlx(rename = "saex_score")]
    pub score: Option<f64>,
    /// JSON object with `sum` / `avg` score aggregates.
    #[sqlx(rename = "saex_scoreData")]
    pub score_data: Option<String>,
    #[sqlx(rename = "saex_sold")]
    pub sold: Option<i64>,
    #[sqlx(rename = "saex_rp_id")]
    pub rp_id: Option<String>,
    #[sqlx(rename = "saex_rp_email")]
    pub rp_email: Option<String>,
    #[sqlx(rename = "saex_rp_activity")]
    pub rp_activity: Option<String>,
    #[sqlx(rename = "saex_rp_client")]
    pub rp_client: Option<String>,
}
