//! Row transformation: turns `sale_exercises` rows into flat report records.
//!
//! Both reports share the embedded-field helpers below and differ only in
//! their [`RowTransformer`] strategy. Nothing here fails: unparseable JSON,
//! missing HTML and pattern misses all degrade to [`SENTINEL`] or an empty
//! default for the affected field.

mod activities;
mod embedded_json;
mod exercise_details;
mod feedback;
mod html;
mod record;

use serde_json::{Map, Value};

use crate::db::models::RawRow;

pub(crate) use activities::ActivityCriteria;
pub(crate) use exercise_details::ExerciseDetails;
pub use record::{FieldValue, OutputRecord};

/// Value of any field that was absent or could not be extracted.
pub const SENTINEL: &str = "No aplica";

/// Upper bound on the per-row question index. Rows claiming more positional
/// keys are clamped (and logged) so one bad blob cannot blow up a page.
pub const MAX_QUESTION_INDEX: usize = 200;

/// One report's field-extraction policy.
pub(crate) trait RowTransformer {
    /// Label used in logs and metrics.
    fn name(&self) -> &'static str;

    fn transform_row(&self, row: &RawRow) -> OutputRecord;

    /// Whole-page post-processing over the per-row records, in input order.
    fn finish(&self, records: Vec<OutputRecord>) -> Vec<OutputRecord> {
        records
    }

    fn transform(&self, rows: &[RawRow]) -> Vec<OutputRecord> {
        let records = rows.iter().map(|row| self.transform_row(row)).collect();
        let records = self.finish(records);
        tracing::debug!(
            report = self.name(),
            rows = rows.len(),
            records = records.len(),
            "transformed page"
        );
        records
    }
}

/// Activity/criteria report: one record per distinct activity, deduplicated.
pub fn transform_activities(rows: &[RawRow]) -> Vec<OutputRecord> {
    ActivityCriteria.transform(rows)
}

/// Exercise detail report: one record per row, in input order.
pub fn transform_exercise_details(rows: &[RawRow]) -> Vec<OutputRecord> {
    ExerciseDetails.transform(rows)
}

fn parse_retro_contents(row: &RawRow) -> Map<String, Value> {
    embedded_json::parse_object("saex_retroContents", row.id, row.retro_contents.as_deref())
}

fn bounded_question_count(retro: &Map<String, Value>, row_id: i64) -> usize {
    let count = embedded_json::question_count(retro);
    if count > MAX_QUESTION_INDEX {
        tracing::warn!(
            row_id,
            count,
            max = MAX_QUESTION_INDEX,
            "retroContents question index exceeds bound; clamping"
        );
        return MAX_QUESTION_INDEX;
    }
    count
}

/// The positional entry for `index`, when it is an object.
fn question_entry(retro: &Map<String, Value>, index: usize) -> Option<&Map<String, Value>> {
    retro.get(&index.to_string()).and_then(Value::as_object)
}

/// The entry's `retroPrompt`, line-normalised; empty when missing.
fn feedback_template(entry: Option<&Map<String, Value>>) -> String {
    entry
        .and_then(|entry| entry.get("retroPrompt"))
        .and_then(Value::as_str)
        .map(feedback::normalize_template)
        .unwrap_or_default()
}
