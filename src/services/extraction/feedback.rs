//! Heuristics over feedback templates: the HTML-flavoured text stored in each
//! `retroPrompt`, carrying bold labels such as `<b>Puntaje</b>: 8 pts / 10 pts`.
//!
//! Every extractor runs an ordered list of patterns and the first match wins.
//! The templates changed wording over time, so older phrasings stay listed.

use std::sync::OnceLock;

use regex::Regex;

use super::html::{clean_text, collapse_whitespace, tags_to_spaces};
use super::SENTINEL;

/// Tri-state answer to "was the information correct" style questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Correctness {
    Yes,
    No,
    NotApplicable,
}

impl Correctness {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "si",
            Self::No => "no",
            Self::NotApplicable => SENTINEL,
        }
    }
}

const CORRECTNESS_LABELS: &[&str] = &[
    r"la informaci[oó]n fue correcta\s*\??\s*:?",
    r"cumpli(?:ste|o|ó) satisfactoriamente[^:?]*\??\s*:",
    r"criterios?[^:?]*evaluaci[oó]n[^:?]*\??\s*:",
];

/// Joins line breaks and `<br>` variants into spaces.
pub(crate) fn normalize_template(template: &str) -> String {
    template
        .replace("\r\n", " ")
        .replace('\n', " ")
        .replace("<br>", " ")
        .replace("</br>", " ")
        .trim()
        .to_string()
}

/// Text after `<b>Criterio a evaluar</b>:` up to the next paragraph boundary.
pub(crate) fn criterion_to_evaluate(template: &str) -> Option<String> {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = REGEX.get_or_init(|| {
        Regex::new(r"(?s)<b>Criterio a evaluar</b>:\s*(.*?)(?:<p>|</p>|\r|\n)")
            .expect("criterion regex should compile")
    });

    regex
        .captures(template)
        .and_then(|captures| captures.get(1))
        .map(|criterion| criterion.as_str().trim().to_string())
        .filter(|criterion| !criterion.is_empty())
}

/// `M` from `<b>Puntaje</b>: N pts / M pts`.
pub(crate) fn max_points(template: &str) -> Option<i64> {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = REGEX.get_or_init(|| {
        Regex::new(r"<b>Puntaje</b>:\s*\d+\s*pts\s*/\s*(\d+)\s*pts")
            .expect("max points regex should compile")
    });

    regex.captures(template).and_then(|captures| captures[1].parse().ok())
}

/// The model answer following a "Respuesta modelo" label, up to the next
/// bold label or the end of the template.
pub(crate) fn model_answer(template: &str) -> Option<String> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        compile_all(&[
            r"(?is)<b>\s*respuesta modelo\s*</b>\s*:?\s*(.*?)\s*(?:<b>|$)",
            r"(?is)respuesta modelo\s*:\s*(.*?)\s*(?:<b>|$)",
        ])
    });

    patterns
        .iter()
        .find_map(|pattern| pattern.captures(template))
        .and_then(|captures| captures.get(1))
        .map(|answer| clean_text(answer.as_str()))
        .filter(|answer| !answer.is_empty())
}

/// Classifies a template as `si`, `no` or not applicable. All affirmative
/// phrasings are tried before any negative one.
pub(crate) fn classify_correctness(template: &str) -> Correctness {
    static PATTERNS: OnceLock<(Vec<Regex>, Vec<Regex>)> = OnceLock::new();
    let (affirmative, negative) = PATTERNS.get_or_init(|| {
        let build = |verdict: &str| {
            let sources: Vec<String> = CORRECTNESS_LABELS
                .iter()
                .map(|label| format!(r"{label}\s*{verdict}\b"))
                .collect();
            compile_all(&sources)
        };
        (build("si"), build("no"))
    });

    let text = collapse_whitespace(&tags_to_spaces(template).to_lowercase().replace('í', "i"));

    if affirmative.iter().any(|pattern| pattern.is_match(&text)) {
        Correctness::Yes
    } else if negative.iter().any(|pattern| pattern.is_match(&text)) {
        Correctness::No
    } else {
        Correctness::NotApplicable
    }
}

/// First integer captured by the points patterns, labelled score first.
pub(crate) fn points(template: &str) -> Option<i64> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        compile_all(&[
            r"(?i)<b>\s*puntaje\s*</b>\s*:\s*(\d+)\s*pts(?:\s*/\s*\d+\s*pts)?",
            r"(?i)puntaje\s*:?\s*(\d+)\s*pts",
            r"(?i)puntaje\s*:?\s*(\d+)",
            r"(?i)(\d+)\s*pts",
        ])
    });

    patterns
        .iter()
        .filter_map(|pattern| pattern.captures(template))
        .find_map(|captures| captures[1].parse().ok())
}

fn compile_all<S: AsRef<str>>(sources: &[S]) -> Vec<Regex> {
    sources
        .iter()
        .map(|source| Regex::new(source.as_ref()).expect("feedback pattern should compile"))
        .collect()
}
