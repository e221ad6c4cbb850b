use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::core::time::format_iso;
use crate::db::models::RawRow;

use super::embedded_json::parse_object;
use super::feedback::{classify_correctness, model_answer, points};
use super::html::{answer_fragments, clean_text, truncate_words};
use super::record::{FieldValue, OutputRecord};
use super::{
    bounded_question_count, feedback_template, parse_retro_contents, question_entry,
    RowTransformer,
};

/// Per-question families emitted for every index `1..=count`, in this order.
const QUESTION_FIELDS: &[&str] =
    &["Pregunta", "Respuesta", "Resp_Modelo", "Info_Correcta", "Puntos", "Venta"];

/// Full detail of each simulated exercise: one record per row.
pub(crate) struct ExerciseDetails;

impl RowTransformer for ExerciseDetails {
    fn name(&self) -> &'static str {
        "rol_play_sim"
    }

    fn transform_row(&self, row: &RawRow) -> OutputRecord {
        let mut record = OutputRecord::new();
        record.set("ID_Caso_de_Uso", FieldValue::integer_or_sentinel(row.use_case));
        record.set("Cliente", FieldValue::text_or_sentinel(row.rp_client.as_deref()));
        record.set("Usuario", FieldValue::text_or_sentinel(row.rp_email.as_deref()));
        record.set("Usuario Nombre", FieldValue::text_or_sentinel(row.username.as_deref()));
        let timestamp = row.date_time.map(|value| FieldValue::Text(format_iso(value)));
        record.set("Fecha_y_Hora", timestamp.unwrap_or_else(FieldValue::sentinel));
        record.set("Actividad_Nombre", FieldValue::text_or_sentinel(row.rp_activity.as_deref()));
        record.set("ID_Sim", row.id);

        let (total, grade) = score_summary(row);
        record.set("Puntos_Totales", total);
        record.set("Calificacion", grade);
        record.set(
            "Caso_de_Uso_Nombre",
            FieldValue::text_or_sentinel(row.use_case_title.as_deref()),
        );

        let retro = parse_retro_contents(row);
        let count = bounded_question_count(&retro, row.id);

        for index in 1..=count {
            for family in QUESTION_FIELDS {
                record.set(format!("{family}{index}"), FieldValue::sentinel());
            }
        }

        for index in 1..=count {
            fill_question(&mut record, index, question_entry(&retro, index));
        }

        let fragments =
            row.closing_contents.as_deref().map(answer_fragments).unwrap_or_default();
        for (position, fragment) in fragments.iter().take(count).enumerate() {
            if let Some(verdict) = sale_verdict(fragment) {
                record.set(format!("Venta{}", position + 1), verdict);
            }
        }

        record
    }
}

/// `sum` and `avg` from `saex_scoreData`; empty strings when missing.
fn score_summary(row: &RawRow) -> (FieldValue, FieldValue) {
    let summary = parse_object("saex_scoreData", row.id, row.score_data.as_deref());
    let pick = |key: &str| {
        summary.get(key).and_then(FieldValue::from_json).unwrap_or_else(|| FieldValue::from(""))
    };
    (pick("sum"), pick("avg"))
}

fn fill_question(record: &mut OutputRecord, index: usize, entry: Option<&Map<String, Value>>) {
    let Some(entry) = entry else {
        return;
    };

    if let Some(question) = entry.get("question").and_then(FieldValue::from_json) {
        record.set(format!("Pregunta{index}"), question);
    }

    let answer = entry
        .get("answer")
        .and_then(FieldValue::from_json)
        .filter(|answer| answer.as_text().map_or(true, |text| !text.is_empty()));
    if let Some(answer) = answer {
        record.set(format!("Respuesta{index}"), answer);
    }

    let template = feedback_template(Some(entry));
    if let Some(answer) = model_answer(&template) {
        record.set(format!("Resp_Modelo{index}"), answer);
    }
    record.set(format!("Info_Correcta{index}"), classify_correctness(&template).as_str());

    let awarded = entry
        .get("puntos")
        .and_then(points_value)
        .or_else(|| points(&template).map(FieldValue::Integer));
    if let Some(awarded) = awarded {
        record.set(format!("Puntos{index}"), awarded);
    }
}

/// `puntos` as stored: numbers pass through, numeric strings are parsed,
/// other non-blank text is kept verbatim.
fn points_value(value: &Value) -> Option<FieldValue> {
    match FieldValue::from_json(value)? {
        FieldValue::Text(text) if text.is_empty() => None,
        FieldValue::Text(text) => Some(
            text.parse::<i64>()
                .map(FieldValue::Integer)
                .or_else(|_| text.parse::<f64>().map(FieldValue::Float))
                .unwrap_or(FieldValue::Text(text)),
        ),
        number => Some(number),
    }
}

/// Classifies one `<p class="answer">` fragment: a yes/no literal, then an
/// `X/Y pts` score, then free text shortened to fit a cell.
fn sale_verdict(fragment: &str) -> Option<String> {
    static SCORE_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    let score_patterns = SCORE_PATTERNS.get_or_init(|| {
        [r"(\d+)\s*/\s*(\d+)\s*pts", r"(\d+)\s*pts\s*/\s*(\d+)\s*pts"]
            .iter()
            .map(|source| Regex::new(source).expect("sale score regex should compile"))
            .collect()
    });

    let cleaned = clean_text(fragment);
    if cleaned.is_empty() {
        return None;
    }

    let lowered = cleaned.to_lowercase().replace('í', "i");
    if lowered == "si" || lowered == "no" {
        return Some(lowered);
    }

    if let Some(captures) = score_patterns.iter().find_map(|pattern| pattern.captures(&cleaned)) {
        return Some(format!("{}/{} pts", &captures[1], &captures[2]));
    }

    Some(truncate_words(&cleaned))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const RETRO: &str = r#"{
        "1": {"question": " ¿Cómo saludas? ", "answer": "Buenos días",
              "retroPrompt": "<b>¿La información fue correcta?</b>: <span class=\"uppercase\">SI</span><br><b>Puntaje</b>: 8 pts / 10 pts<br><b>Respuesta modelo</b>: Buenos días, bienvenido",
              "puntos": 8},
        "3": {"question": "¿Ofreciste el seguro?", "answer": "   ",
              "retroPrompt": "<b>¿La información fue correcta?</b>: <span>NO</span>\n<b>Puntaje</b>: 2 pts / 10 pts"}
    }"#;

    fn row() -> RawRow {
        RawRow {
            id: 991,
            use_case: Some(182),
            use_case_title: Some("Apertura".to_string()),
            username: Some("Ana Pérez".to_string()),
            rp_email: Some("ana@example.com".to_string()),
            rp_client: Some("Bancoppel".to_string()),
            rp_activity: Some("Rol Play 1".to_string()),
            date_time: Some(datetime!(2024-05-02 14:30:00)),
            score_data: Some(r#"{"sum": 10, "avg": 5.0, "item": 2}"#.to_string()),
            retro_contents: Some(RETRO.to_string()),
            closing_contents: Some(
                "<p class=\"question\">¿Compró?</p><p class=\"answer\"><b>SI</b></p>\
                 <p class=\"answer\">7 / 10 pts</p>\
                 <p class=\"answer\">El cliente dudó</p>\
                 <p class=\"answer\">extra</p>"
                    .to_string(),
            ),
            ..RawRow::default()
        }
    }

    fn field<'a>(record: &'a OutputRecord, name: &str) -> &'a FieldValue {
        record.get(name).unwrap_or_else(|| panic!("missing field {name}"))
    }

    #[test]
    fn fixed_fields_and_score_summary() {
        let record = ExerciseDetails.transform_row(&row());
        assert_eq!(field(&record, "ID_Caso_de_Uso"), &FieldValue::Integer(182));
        assert_eq!(field(&record, "Cliente"), &FieldValue::from("Bancoppel"));
        assert_eq!(field(&record, "Usuario Nombre"), &FieldValue::from("Ana Pérez"));
        assert_eq!(field(&record, "Fecha_y_Hora"), &FieldValue::from("2024-05-02T14:30:00"));
        assert_eq!(field(&record, "ID_Sim"), &FieldValue::Integer(991));
        assert_eq!(field(&record, "Puntos_Totales"), &FieldValue::Integer(10));
        assert_eq!(field(&record, "Calificacion"), &FieldValue::Float(5.0));
        assert_eq!(field(&record, "Caso_de_Uso_Nombre"), &FieldValue::from("Apertura"));
    }

    #[test]
    fn populated_question_fields() {
        let record = ExerciseDetails.transform_row(&row());
        assert_eq!(field(&record, "Pregunta1"), &FieldValue::from("¿Cómo saludas?"));
        assert_eq!(field(&record, "Respuesta1"), &FieldValue::from("Buenos días"));
        assert_eq!(field(&record, "Resp_Modelo1"), &FieldValue::from("Buenos días, bienvenido"));
        assert_eq!(field(&record, "Info_Correcta1"), &FieldValue::from("si"));
        assert_eq!(field(&record, "Puntos1"), &FieldValue::Integer(8));
    }

    #[test]
    fn gaps_and_blanks_default_to_sentinel() {
        let record = ExerciseDetails.transform_row(&row());
        for family in QUESTION_FIELDS.iter().filter(|family| **family != "Venta") {
            assert!(field(&record, &format!("{family}2")).is_sentinel(), "{family}2");
        }
        assert!(field(&record, "Respuesta3").is_sentinel());
        assert!(field(&record, "Resp_Modelo3").is_sentinel());
        assert_eq!(field(&record, "Info_Correcta3"), &FieldValue::from("no"));
        assert_eq!(field(&record, "Puntos3"), &FieldValue::Integer(2));
        assert!(!record.contains("Pregunta4"));
    }

    #[test]
    fn sale_verdicts_follow_answer_paragraph_order() {
        let record = ExerciseDetails.transform_row(&row());
        assert_eq!(field(&record, "Venta1"), &FieldValue::from("si"));
        assert_eq!(field(&record, "Venta2"), &FieldValue::from("7/10 pts"));
        assert_eq!(field(&record, "Venta3"), &FieldValue::from("El cliente dudó"));
        assert!(!record.contains("Venta4"));
    }

    #[test]
    fn empty_score_data_yields_empty_strings() {
        let record = ExerciseDetails.transform_row(&RawRow { score_data: None, ..row() });
        assert_eq!(field(&record, "Puntos_Totales"), &FieldValue::from(""));

        let broken = RawRow { score_data: Some("{oops".to_string()), ..row() };
        let record = ExerciseDetails.transform_row(&broken);
        assert_eq!(field(&record, "Calificacion"), &FieldValue::from(""));
    }

    #[test]
    fn missing_columns_become_sentinels() {
        let record = ExerciseDetails.transform_row(&RawRow { id: 5, ..RawRow::default() });
        assert!(field(&record, "Cliente").is_sentinel());
        assert!(field(&record, "Fecha_y_Hora").is_sentinel());
        assert!(field(&record, "ID_Caso_de_Uso").is_sentinel());
        assert_eq!(record.len(), 10);
    }

    #[test]
    fn points_value_variants() {
        assert_eq!(points_value(&Value::from("7")), Some(FieldValue::Integer(7)));
        assert_eq!(points_value(&Value::from("7.5")), Some(FieldValue::Float(7.5)));
        assert_eq!(points_value(&Value::from("n/a")), Some(FieldValue::from("n/a")));
        assert_eq!(points_value(&Value::from(" ")), None);
        assert_eq!(points_value(&Value::Null), None);
    }

    #[test]
    fn puntos_falls_back_to_template_score() {
        let entry: Map<String, Value> = serde_json::from_str(
            r#"{"question": "Q", "answer": "A", "retroPrompt": "<b>Puntaje</b>: 4 pts / 5 pts"}"#,
        )
        .expect("json");
        let mut record = OutputRecord::new();
        fill_question(&mut record, 1, Some(&entry));
        assert_eq!(record.get("Puntos1"), Some(&FieldValue::Integer(4)));
    }

    #[test]
    fn sale_verdict_truncates_free_text() {
        let long = "respuesta ".repeat(15);
        let verdict = sale_verdict(&format!("<span>{long}</span>")).expect("verdict");
        assert!(verdict.ends_with("..."));
        assert!(verdict.chars().count() <= 101);
        assert_eq!(sale_verdict(" <b></b> "), None);
        assert_eq!(sale_verdict("Sí"), Some("si".to_string()));
    }
}
