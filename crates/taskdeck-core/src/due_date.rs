use chrono::{DateTime, NaiveDate};

/// Stored due-date format, e.g. "03/09/2026".
pub const DUE_DATE_FORMAT: &str = "%m/%d/%Y";

/// Reformat a client-supplied date value into the stored `MM/DD/YYYY` form.
///
/// Accepts ISO dates (`2026-03-09`), RFC 3339 timestamps, or a value
/// already in the stored form. Returns `None` when the input parses as
/// none of those.
pub fn normalize(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, DUE_DATE_FORMAT))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|dt| dt.date_naive())
        })?;

    Some(date.format(DUE_DATE_FORMAT).to_string())
}
