//! Date parsing and format validation built on `chrono` format strings.

use std::fmt::Display;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Raised when a string does not match the expected date format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' does not match date format '{format}'")]
pub struct DateFormatError {
    value: String,
    format: String,
}

/// Parse `text` with a strftime-style `format`.
///
/// Formats without a time component parse as midnight.
///
/// # Examples
/// ```
/// use service_utils::domain::parse_date;
///
/// let parsed = parse_date("2024-02-29", "%Y-%m-%d").expect("leap day parses");
/// assert_eq!(parsed.to_string(), "2024-02-29 00:00:00");
/// ```
pub fn parse_date(text: &str, format: &str) -> Result<NaiveDateTime, DateFormatError> {
    NaiveDateTime::parse_from_str(text, format)
        .or_else(|_| {
            NaiveDate::parse_from_str(text, format).map(|date| date.and_time(NaiveTime::default()))
        })
        .map_err(|_| DateFormatError {
            value: text.to_owned(),
            format: format.to_owned(),
        })
}

/// Returns `true` when `text` is a real calendar date in `format`.
pub fn is_valid_date(text: &str, format: &str) -> bool {
    parse_date(text, format).is_ok()
}

/// Render `date` with a strftime-style `format`.
pub fn format_date<Tz>(date: &DateTime<Tz>, format: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    date.format(format).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    #[case("2024-02-29", "%Y-%m-%d", true)]
    #[case("2023-02-29", "%Y-%m-%d", false)]
    #[case("2024-13-01", "%Y-%m-%d", false)]
    #[case("31/12/2024 23:59", "%d/%m/%Y %H:%M", true)]
    #[case("31/12/2024", "%d/%m/%Y %H:%M", false)]
    #[case("", "%Y-%m-%d", false)]
    fn validates_against_format(#[case] text: &str, #[case] format: &str, #[case] ok: bool) {
        assert_eq!(is_valid_date(text, format), ok);
    }

    #[rstest]
    fn parse_error_names_value_and_format() {
        let err = parse_date("nope", "%Y").expect_err("invalid date");
        assert_eq!(err.to_string(), "'nope' does not match date format '%Y'");
    }

    #[rstest]
    fn formats_utc_dates() {
        let date = Utc
            .with_ymd_and_hms(2022, 2, 22, 19, 22, 22)
            .single()
            .expect("valid date");
        assert_eq!(format_date(&date, "%d/%m/%Y %H:%M:%S"), "22/02/2022 19:22:22");
    }
}
