//! Parsers for the textual temporal formats accepted in payloads and rules.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Parse `YYYY-MM-DD`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
}

/// Parse an RFC 3339 instant; offset-less values are read as UTC.
pub fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2024-02-29", true)]
    #[case("2023-02-29", false)]
    #[case("29/02/2024", false)]
    fn dates(#[case] text: &str, #[case] valid: bool) {
        assert_eq!(parse_date(text).is_some(), valid);
    }

    #[rstest]
    #[case("08:30", true)]
    #[case("08:30:15", true)]
    #[case("25:00", false)]
    fn times(#[case] text: &str, #[case] valid: bool) {
        assert_eq!(parse_time(text).is_some(), valid);
    }

    #[rstest]
    fn naive_datetimes_are_utc() {
        let offset = parse_datetime("2024-05-01T10:00:00+02:00").expect("rfc3339");
        let naive = parse_datetime("2024-05-01T08:00:00").expect("naive");
        assert_eq!(offset, naive);
    }
}
