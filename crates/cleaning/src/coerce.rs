//! Error-tolerant cell coercion.
//!
//! Every function here is total: a value that cannot be converted comes back
//! as `None` (the missing-value marker) instead of an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use insight_core::{CellValue, RelatedSymbols};

/// Formats carrying an explicit UTC offset. `%#z` also takes `+00` and `Z`.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f %#z",
];

/// Date-time formats without an offset. Read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
    "%B %d, %Y %H:%M:%S",
];

/// Bare dates. Read as UTC midnight.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%Y%m%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %B %Y",
];

/// Permissive timestamp parser.
#[derive(Debug, Clone, Default)]
pub struct TimestampParser {
    /// Caller formats tried after the built-in ones.
    extra_formats: Vec<String>,
}

impl TimestampParser {
    /// Create a parser with extra `chrono` formats.
    pub fn new(extra_formats: &[String]) -> Self {
        Self {
            extra_formats: extra_formats.to_vec(),
        }
    }

    /// Coerce a cell to an instant.
    ///
    /// Existing timestamps pass through, text is parsed, everything else is
    /// missing.
    pub fn parse(&self, cell: &CellValue) -> Option<DateTime<Utc>> {
        match cell {
            CellValue::Timestamp(ts) => Some(*ts),
            CellValue::Text(s) => self.parse_str(s),
            _ => None,
        }
    }

    /// Parse a string, trying RFC 3339 first and then each known format.
    ///
    /// A trailing `UTC` zone name is dropped and the rest read as UTC.
    pub fn parse_str(&self, s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        let s = s.strip_suffix(" UTC").map(str::trim_end).unwrap_or(s);
        if s.is_empty() {
            return None;
        }

        if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
            return Some(ts.with_timezone(&Utc));
        }

        OFFSET_FORMATS
            .iter()
            .copied()
            .chain(NAIVE_DATETIME_FORMATS.iter().copied())
            .chain(DATE_FORMATS.iter().copied())
            .chain(self.extra_formats.iter().map(String::as_str))
            .find_map(|fmt| parse_with_format(s, fmt))
    }
}

fn parse_with_format(s: &str, fmt: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_str(s, fmt) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, fmt)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Coerce a cell to a number.
///
/// Ints and floats pass through, booleans become 1/0, text is trimmed and
/// parsed. NaN, infinities and everything else are missing.
pub fn parse_numeric(cell: &CellValue) -> Option<f64> {
    let value = match cell {
        CellValue::Int(i) => *i as f64,
        CellValue::Float(f) => f.into_inner(),
        CellValue::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// String form of a cell with surrounding whitespace removed.
///
/// Missing stays missing rather than turning into a literal.
pub fn normalize_text(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Null => None,
        CellValue::Text(s) => Some(s.trim().to_string()),
        other => Some(other.to_display_string().trim().to_string()),
    }
}

/// Normalized text, additionally lower-cased.
pub fn normalize_label(cell: &CellValue) -> Option<String> {
    normalize_text(cell).map(|s| s.to_lowercase())
}

/// Split a delimited symbol string into trimmed, ordered parts.
///
/// Non-text values are left exactly as they are.
pub fn split_symbols(cell: &CellValue, delimiter: &str) -> RelatedSymbols {
    match cell {
        CellValue::Text(s) => RelatedSymbols::Parsed(
            s.split(delimiter)
                .map(|symbol| symbol.trim().to_string())
                .collect(),
        ),
        other => RelatedSymbols::Untouched(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339() {
        let parser = TimestampParser::default();
        let ts = parser.parse(&CellValue::text("2023-10-26T10:00:01Z")).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2023, 10, 26, 10, 0, 1).unwrap());

        let ts = parser.parse_str("2023-10-26T12:00:01+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2023, 10, 26, 10, 0, 1).unwrap());
    }

    #[test]
    fn test_parse_naive_and_dates() {
        let parser = TimestampParser::default();
        assert_eq!(
            parser.parse_str("2023-10-26 10:00:01").unwrap(),
            Utc.with_ymd_and_hms(2023, 10, 26, 10, 0, 1).unwrap()
        );
        assert_eq!(
            parser.parse_str("2023-10-26T10:00:01.250").unwrap(),
            Utc.with_ymd_and_hms(2023, 10, 26, 10, 0, 1).unwrap()
                + chrono::Duration::milliseconds(250)
        );
        assert_eq!(
            parser.parse_str(" 2023-10-26 ").unwrap(),
            Utc.with_ymd_and_hms(2023, 10, 26, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parser.parse_str("10/26/2023").unwrap(),
            Utc.with_ymd_and_hms(2023, 10, 26, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_unparsable_timestamps_are_missing() {
        let parser = TimestampParser::default();
        for bad in [
            "invalid-date",
            "placeholder",
            "...",
            "",
            " UTC",
            "2023-13-45",
            "10:00:01",
            "20231345",
            "Smarch 26, 2023",
        ] {
            assert!(parser.parse_str(bad).is_none(), "{} should not parse", bad);
        }
        assert!(parser.parse(&CellValue::Null).is_none());
        assert!(parser.parse(&CellValue::Int(1698314401)).is_none());
        assert!(parser.parse(&CellValue::Bool(true)).is_none());
    }

    #[test]
    fn test_parse_loose_formats() {
        let parser = TimestampParser::default();
        let midnight = Utc.with_ymd_and_hms(2023, 10, 26, 0, 0, 0).unwrap();
        let morning = Utc.with_ymd_and_hms(2023, 10, 26, 10, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2023, 10, 26, 10, 0, 1).unwrap();

        assert_eq!(parser.parse_str("20231026"), Some(midnight));
        assert_eq!(parser.parse_str("Oct 26, 2023"), Some(midnight));
        assert_eq!(parser.parse_str("October 26, 2023"), Some(midnight));
        assert_eq!(parser.parse_str("26 October 2023"), Some(midnight));
        assert_eq!(parser.parse_str("26 October 2023 10:00"), Some(morning));
        assert_eq!(parser.parse_str("2023-10-26T10:00:01 UTC"), Some(second));
        assert_eq!(parser.parse_str("2023-10-26 10:00:01 UTC"), Some(second));
        assert_eq!(parser.parse_str("2023-10-26T10:00:01+00"), Some(second));
        assert_eq!(parser.parse_str("2023-10-26 12:00:01+02"), Some(second));
    }

    #[test]
    fn test_timestamp_passthrough() {
        let parser = TimestampParser::default();
        let ts = Utc.with_ymd_and_hms(2023, 10, 26, 9, 0, 0).unwrap();
        assert_eq!(parser.parse(&CellValue::Timestamp(ts)), Some(ts));
    }

    #[test]
    fn test_extra_formats() {
        let parser = TimestampParser::new(&["%d.%m.%Y %H:%M".to_string()]);
        assert_eq!(
            parser.parse_str("26.10.2023 10:00").unwrap(),
            Utc.with_ymd_and_hms(2023, 10, 26, 10, 0, 0).unwrap()
        );
        assert!(TimestampParser::default().parse_str("26.10.2023 10:00").is_none());
    }

    #[test]
    fn test_parse_numeric() {
        assert_relative_eq!(parse_numeric(&CellValue::text("34500.50")).unwrap(), 34500.5);
        assert_relative_eq!(parse_numeric(&CellValue::text(" 150.5 ")).unwrap(), 150.5);
        assert_relative_eq!(parse_numeric(&CellValue::Int(2)).unwrap(), 2.0);
        assert_relative_eq!(parse_numeric(&CellValue::float(0.5)).unwrap(), 0.5);
        assert_relative_eq!(parse_numeric(&CellValue::Bool(true)).unwrap(), 1.0);
        assert_eq!(parse_numeric(&CellValue::text("0")), Some(0.0));

        assert_eq!(parse_numeric(&CellValue::text("abc")), None);
        assert_eq!(parse_numeric(&CellValue::text("")), None);
        assert_eq!(parse_numeric(&CellValue::text("NaN")), None);
        assert_eq!(parse_numeric(&CellValue::text("inf")), None);
        assert_eq!(parse_numeric(&CellValue::text("-infinity")), None);
        assert_eq!(parse_numeric(&CellValue::float(f64::INFINITY)), None);
        assert_eq!(parse_numeric(&CellValue::Null), None);
        assert_eq!(parse_numeric(&CellValue::List(vec!["1".into()])), None);
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text(&CellValue::text(" Headline 1 ")), Some("Headline 1".into()));
        assert_eq!(normalize_text(&CellValue::text("")), Some(String::new()));
        assert_eq!(normalize_text(&CellValue::Int(7)), Some("7".into()));
        assert_eq!(normalize_text(&CellValue::Null), None);
        assert_eq!(normalize_label(&CellValue::text(" POSITIVE\n")), Some("positive".into()));
    }

    #[test]
    fn test_split_symbols() {
        assert_eq!(
            split_symbols(&CellValue::text("BTC-USD;ETH-USD"), ";"),
            RelatedSymbols::Parsed(vec!["BTC-USD".into(), "ETH-USD".into()])
        );
        assert_eq!(
            split_symbols(&CellValue::text(" SOL-USD ; ADA-USD "), ";"),
            RelatedSymbols::Parsed(vec!["SOL-USD".into(), "ADA-USD".into()])
        );
        assert_eq!(
            split_symbols(&CellValue::Null, ";"),
            RelatedSymbols::Untouched(CellValue::Null)
        );
        assert_eq!(
            split_symbols(&CellValue::Int(3), ";"),
            RelatedSymbols::Untouched(CellValue::Int(3))
        );
    }
}
