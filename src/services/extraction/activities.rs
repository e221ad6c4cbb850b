use std::collections::HashMap;

use crate::db::models::RawRow;

use super::feedback::{criterion_to_evaluate, max_points};
use super::html::{collapse_whitespace, question_paragraphs};
use super::record::{FieldValue, OutputRecord};
use super::{
    bounded_question_count, feedback_template, parse_retro_contents, question_entry,
    RowTransformer,
};

const ACTIVITY_FIELD: &str = "Actividad_Nombre";
const MAX_VERDICTS: usize = 3;

/// Per-activity evaluation criteria, max points and sale verdict labels.
pub(crate) struct ActivityCriteria;

impl RowTransformer for ActivityCriteria {
    fn name(&self) -> &'static str {
        "dim_actividades"
    }

    fn transform_row(&self, row: &RawRow) -> OutputRecord {
        let mut record = OutputRecord::new();
        record.set("ID_Caso_de_Uso", FieldValue::integer_or_sentinel(row.use_case));
        record.set("Caso_de_Uso", FieldValue::text_or_sentinel(row.use_case_title.as_deref()));
        record.set(ACTIVITY_FIELD, FieldValue::text_or_sentinel(row.rp_activity.as_deref()));

        let retro = parse_retro_contents(row);
        for index in 1..=bounded_question_count(&retro, row.id) {
            let template = feedback_template(question_entry(&retro, index));

            let criterion = criterion_to_evaluate(&template);
            record.set(
                format!("Criterio_{index}"),
                criterion.map(FieldValue::from).unwrap_or_else(FieldValue::sentinel),
            );
            record.set(
                format!("Puntos_Max_{index}"),
                max_points(&template).map(FieldValue::Integer).unwrap_or_else(FieldValue::sentinel),
            );
        }

        let verdicts = row.closing_contents.as_deref().map(question_paragraphs).unwrap_or_default();
        for index in 1..=MAX_VERDICTS {
            let verdict = verdicts
                .get(index - 1)
                .filter(|verdict| !verdict.is_empty())
                .map(|verdict| FieldValue::from(verdict.as_str()));
            record.set(
                format!("Veredicto_Venta{index}"),
                verdict.unwrap_or_else(FieldValue::sentinel),
            );
        }

        record
    }

    fn finish(&self, records: Vec<OutputRecord>) -> Vec<OutputRecord> {
        let named = records.into_iter().filter(has_activity).collect();
        deduplicate(named)
    }
}

fn has_activity(record: &OutputRecord) -> bool {
    record
        .get(ACTIVITY_FIELD)
        .and_then(FieldValue::as_text)
        .is_some_and(|name| !name.trim().is_empty() && name != super::SENTINEL)
}

/// Every field except the activity name, with whitespace-normalised text.
/// Values keep their kind so `"1"` and `1` stay distinct.
fn dedup_key(record: &OutputRecord) -> Vec<(String, String)> {
    record
        .iter()
        .filter(|(name, _)| *name != ACTIVITY_FIELD)
        .map(|(name, value)| {
            let canonical = match value {
                FieldValue::Text(text) => format!("s:{}", collapse_whitespace(text)),
                FieldValue::Integer(integer) => format!("i:{integer}"),
                FieldValue::Float(float) => format!("f:{float}"),
            };
            (name.to_string(), canonical)
        })
        .collect()
}

/// Collapses records sharing a [`dedup_key`]. The first one seen keeps its
/// position; a later duplicate replaces it only when it has an activity name
/// and the kept one does not.
pub(crate) fn deduplicate(records: Vec<OutputRecord>) -> Vec<OutputRecord> {
    let mut positions: HashMap<Vec<(String, String)>, usize> = HashMap::new();
    let mut unique: Vec<OutputRecord> = Vec::with_capacity(records.len());

    for record in records {
        let key = dedup_key(&record);
        match positions.get(&key) {
            Some(&position) => {
                if has_activity(&record) && !has_activity(&unique[position]) {
                    unique[position] = record;
                }
            }
            None => {
                positions.insert(key, unique.len());
                unique.push(record);
            }
        }
    }

    unique
}
