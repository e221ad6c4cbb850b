use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};

/// Renders a naive timestamp as `YYYY-MM-DDTHH:MM:SS`, appending `.ffffff`
/// only when the microsecond part is non-zero.
pub(crate) fn format_iso(value: PrimitiveDateTime) -> String {
    let seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let base = value.format(&seconds).unwrap_or_else(|_| value.to_string());

    match value.microsecond() {
        0 => base,
        micros => format!("{base}.{micros:06}"),
    }
}

/// Parses a report date-range bound. Accepts `YYYY-MM-DD`,
/// `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DDTHH:MM:SS`; a bare date means midnight.
pub(crate) fn parse_range_bound(value: &str) -> Option<PrimitiveDateTime> {
    let value = value.trim();

    let spaced = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    if let Ok(parsed) = PrimitiveDateTime::parse(value, &spaced) {
        return Some(parsed);
    }

    let iso = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    if let Ok(parsed) = PrimitiveDateTime::parse(value, &iso) {
        return Some(parsed);
    }

    let date_only = format_description!("[year]-[month]-[day]");
    Date::parse(value, &date_only).ok().map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT))
}
