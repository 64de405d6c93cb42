//! Lenient field deserializers for report data.
//!
//! Case exports come from spreadsheets and dataframe dumps, so a missing value
//! can be an empty cell, `nan`, `None` or `NaT`, and booleans arrive as
//! `True`/`False`. Unparsable values deserialize to `None` instead of failing
//! the whole record.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use tracing::warn;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y", "%Y%m%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCell {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Returns true for the textual spellings of a missing value.
pub fn is_missing_token(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || ["nan", "nat", "none", "null", "<na>"]
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
}

/// Parses a calendar date, accepting date-only and date-time spellings.
///
/// # Examples
///
/// ```
/// use adr_model::lenient::parse_date;
///
/// assert!(parse_date("2024-03-01").is_some());
/// assert!(parse_date("2024-03-01 08:30:00").is_some());
/// assert!(parse_date("not a date").is_none());
/// assert!(parse_date("NaT").is_none());
/// ```
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if is_missing_token(value) {
        return None;
    }
    let trimmed = value.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|datetime| datetime.date_naive())
}

/// Parses a boolean flag, accepting Python and spreadsheet spellings.
pub fn parse_flag(value: &str) -> Option<bool> {
    let trimmed = value.trim();
    if ["true", "yes", "y", "1", "1.0"]
        .iter()
        .any(|token| trimmed.eq_ignore_ascii_case(token))
    {
        Some(true)
    } else if ["false", "no", "n", "0", "0.0"]
        .iter()
        .any(|token| trimmed.eq_ignore_ascii_case(token))
    {
        Some(false)
    } else {
        None
    }
}

/// Parses a number, treating missing-value tokens as absent.
pub fn parse_number(value: &str) -> Option<f64> {
    if is_missing_token(value) {
        return None;
    }
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawCell>::deserialize(deserializer)? {
        Some(RawCell::Text(text)) => lenient_date(&text),
        Some(RawCell::Int(compact)) => lenient_date(&compact.to_string()),
        _ => None,
    })
}

/// Parses a date cell; text that is neither a date nor a missing token is
/// dropped with a warning. The raw text is not logged.
fn lenient_date(text: &str) -> Option<NaiveDate> {
    let parsed = parse_date(text);
    if parsed.is_none() && !is_missing_token(text) {
        warn!(length = text.len(), "unparsable date treated as missing");
    }
    parsed
}

pub fn optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawCell>::deserialize(deserializer)? {
        Some(RawCell::Bool(flag)) => Some(flag),
        Some(RawCell::Int(number)) => match number {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        },
        Some(RawCell::Float(number)) if number == 0.0 => Some(false),
        Some(RawCell::Float(number)) if number == 1.0 => Some(true),
        Some(RawCell::Text(text)) => parse_flag(&text),
        _ => None,
    })
}

pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawCell>::deserialize(deserializer)? {
        Some(RawCell::Int(number)) => Some(number as f64),
        Some(RawCell::Float(number)) if number.is_finite() => Some(number),
        Some(RawCell::Text(text)) => parse_number(&text),
        _ => None,
    })
}

pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawCell>::deserialize(deserializer)? {
        Some(RawCell::Text(text)) if !is_missing_token(&text) => Some(text.trim().to_string()),
        Some(RawCell::Int(number)) => Some(number.to_string()),
        Some(RawCell::Float(number)) if number.is_finite() => Some(number.to_string()),
        Some(RawCell::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tokens() {
        assert!(is_missing_token(""));
        assert!(is_missing_token("  NaN "));
        assert!(is_missing_token("None"));
        assert!(!is_missing_token("0"));
    }

    #[test]
    fn dates_accept_common_exports() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert_eq!(parse_date("2024-03-01"), expected);
        assert_eq!(parse_date("2024/03/01"), expected);
        assert_eq!(parse_date("03/01/2024"), expected);
        assert_eq!(parse_date("2024-03-01T10:15:00"), expected);
        assert_eq!(parse_date("2024-03-01T10:15:00+03:00"), expected);
        assert_eq!(parse_date("2024-02-30"), None);
    }

    #[derive(Deserialize)]
    struct DateCell {
        #[serde(default, deserialize_with = "optional_date")]
        date: Option<NaiveDate>,
    }

    /// Collects formatted log output from the current thread.
    #[derive(Clone, Default)]
    struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0
                .lock()
                .map_err(|_| std::io::Error::other("log buffer poisoned"))?
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn deserialize_logged(json: &str) -> (Option<NaiveDate>, String) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let cell: DateCell = tracing::subscriber::with_default(subscriber, || {
            serde_json::from_str(json).unwrap()
        });
        let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        (cell.date, logs)
    }

    #[test]
    fn unparsable_date_warns_and_becomes_missing() {
        let (date, logs) = deserialize_logged(r#"{"date": "sometime in March"}"#);
        assert_eq!(date, None);
        assert!(logs.contains("unparsable date treated as missing"), "{logs}");
        assert!(!logs.contains("sometime in March"));
    }

    #[test]
    fn missing_date_tokens_do_not_warn() {
        let (date, logs) = deserialize_logged(r#"{"date": "NaT"}"#);
        assert_eq!(date, None);
        assert!(logs.is_empty(), "{logs}");

        let (date, logs) = deserialize_logged(r#"{"date": "2024-03-01"}"#);
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!(logs.is_empty(), "{logs}");
    }

    #[test]
    fn flags_accept_python_spellings() {
        assert_eq!(parse_flag("True"), Some(true));
        assert_eq!(parse_flag("FALSE"), Some(false));
        assert_eq!(parse_flag("1.0"), Some(true));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn numbers_reject_non_finite() {
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("nan"), None);
    }
}
