use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};

/// Cleaned values longer than this are shortened by [`truncate_words`].
pub(crate) const MAX_TEXT_CHARS: usize = 100;
const TRUNCATE_AT_CHARS: usize = 97;
const ELLIPSIS: &str = "...";

/// Removes anything that looks like a tag. No entity decoding.
pub(crate) fn strip_tags(text: &str) -> String {
    tag_regex().replace_all(text, "").into_owned()
}

/// Like [`strip_tags`] but leaves a space where each tag was, so text from
/// adjacent elements does not run together.
pub(crate) fn tags_to_spaces(text: &str) -> String {
    tag_regex().replace_all(text, " ").into_owned()
}

/// Collapses whitespace runs to single spaces and trims the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips tags, drops non-breaking spaces and normalises whitespace.
pub(crate) fn clean_text(text: &str) -> String {
    collapse_whitespace(&strip_tags(text).replace('\u{a0}', " "))
}

/// Replaces line breaks with spaces so single-line patterns see the whole
/// fragment.
pub(crate) fn flatten_lines(text: &str) -> String {
    text.replace("\r\n", " ").replace('\n', " ").trim().to_string()
}

/// Shortens text over [`MAX_TEXT_CHARS`] characters to at most 97 characters,
/// cut back to the last space so no word is split, followed by `...`.
pub(crate) fn truncate_words(text: &str) -> String {
    if text.chars().count() <= MAX_TEXT_CHARS {
        return text.to_string();
    }

    let cut = text.char_indices().nth(TRUNCATE_AT_CHARS).map_or(text.len(), |(index, _)| index);
    let head = &text[..cut];
    let head = head.rsplit_once(' ').map_or(head, |(before, _)| before);

    format!("{head}{ELLIPSIS}")
}

/// Text of every `<p class="question">` element, in document order, using a
/// tolerant HTML parse.
pub(crate) fn question_paragraphs(html: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(html);

    fragment
        .select(question_selector())
        .map(|paragraph| collapse_whitespace(&paragraph.text().collect::<String>()))
        .collect()
}

/// Raw inner markup of every `<p class="answer">...</p>` fragment, matched
/// positionally on the line-flattened source.
pub(crate) fn answer_fragments(html: &str) -> Vec<String> {
    let flattened = flatten_lines(html);

    answer_regex()
        .captures_iter(&flattened)
        .filter_map(|captures| captures.get(1))
        .map(|inner| inner.as_str().to_string())
        .collect()
}

fn tag_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag regex should compile"))
}

fn answer_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#"<p class="answer">(.*?)</p>"#).expect("answer paragraph regex should compile")
    })
}

fn question_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("p.question").expect("question selector should parse"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_strips_tags_and_nbsp() {
        assert_eq!(
            clean_text("<b>Sí,</b>\u{a0}\u{a0}el cliente   <i>aceptó</i>\n la oferta "),
            "Sí, el cliente aceptó la oferta"
        );
    }

    #[test]
    fn short_text_is_untouched() {
        let text = "a".repeat(MAX_TEXT_CHARS);
        assert_eq!(truncate_words(&text), text);
    }

    #[test]
    fn long_text_breaks_on_word_boundary() {
        let text = "palabra ".repeat(19).trim_end().to_string();
        assert_eq!(text.chars().count(), 151);

        let truncated = truncate_words(&text);
        assert!(truncated.chars().count() <= MAX_TEXT_CHARS + 1);
        assert!(truncated.ends_with("..."));

        let head = truncated.trim_end_matches("...");
        assert!(text.starts_with(head));
        assert_eq!(text[head.len()..].chars().next(), Some(' '));
        assert!(head.ends_with("palabra"));
    }

    #[test]
    fn long_text_without_spaces_is_cut_hard() {
        let text = "x".repeat(150);
        let truncated = truncate_words(&text);
        assert_eq!(truncated, format!("{}...", "x".repeat(97)));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "ñ".repeat(120);
        let truncated = truncate_words(&text);
        assert_eq!(truncated.chars().count(), 100);
    }

    #[test]
    fn question_paragraphs_use_structure() {
        let html = r#"<div><p class="question">¿El cliente <b>compró</b>?</p>
            <p class="answer">si</p>
            <p class="question other">  Puntaje mínimo  </p>
            <p>ignored</p></div>"#;
        assert_eq!(question_paragraphs(html), vec!["¿El cliente compró?", "Puntaje mínimo"]);
    }

    #[test]
    fn answer_fragments_are_positional() {
        let html = "<p class=\"question\">Q1</p><p class=\"answer\">Si</p>\r\n\
                    <p class=\"answer\">8 pts /\n 10 pts</p>";
        assert_eq!(answer_fragments(html), vec!["Si", "8 pts /  10 pts"]);
    }
}
