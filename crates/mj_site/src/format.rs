use chrono::{DateTime, Datelike, Timelike, Utc};
use mj_core::types::parse_date;
use std::borrow::Cow;

pub const INVALID_DATE: &str = "Невалидна дата";

const MONTHS: [&str; 12] = [
    "януари",
    "февруари",
    "март",
    "април",
    "май",
    "юни",
    "юли",
    "август",
    "септември",
    "октомври",
    "ноември",
    "декември",
];

const WEEKDAYS: [&str; 7] = [
    "понеделник",
    "вторник",
    "сряда",
    "четвъртък",
    "петък",
    "събота",
    "неделя",
];

pub fn escape(text: &str) -> Cow<'_, str> {
    html_escape::encode_text(text)
}

pub fn escape_attr(text: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(text)
}

/// `1 март 2024 г.`
pub fn long_date(dt: &DateTime<Utc>) -> String {
    format!("{} {} {} г.", dt.day(), MONTHS[dt.month0() as usize], dt.year())
}

/// Format a stored date string, or [`INVALID_DATE`] when it does not parse.
pub fn format_date(raw: &str) -> String {
    parse_date(raw)
        .map(|dt| long_date(&dt))
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

/// `вторник, 11 юни 2024 г., 15:00`
pub fn format_date_time(dt: &DateTime<Utc>) -> String {
    format!(
        "{}, {}, {:02}:{:02}",
        WEEKDAYS[dt.weekday().num_days_from_monday() as usize],
        long_date(dt),
        dt.hour(),
        dt.minute()
    )
}

pub fn format_time(dt: &DateTime<Utc>) -> String {
    format!("{:02}:{:02}", dt.hour(), dt.minute())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_bulgarian_dates() {
        assert_eq!(format_date("2024-03-01"), "1 март 2024 г.");
        assert_eq!(format_date("2023-12-24T18:30:00Z"), "24 декември 2023 г.");
        assert_eq!(format_date("скоро"), INVALID_DATE);

        let dt = Utc.with_ymd_and_hms(2024, 6, 11, 15, 0, 0).unwrap();
        assert_eq!(format_date_time(&dt), "вторник, 11 юни 2024 г., 15:00");
        assert_eq!(format_time(&dt), "15:00");
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape("<b>Том & Джери</b>"), "&lt;b&gt;Том &amp; Джери&lt;/b&gt;");
        assert_eq!(escape_attr("a\"b"), "a&quot;b");
        assert!(matches!(escape("обикновен текст"), Cow::Borrowed(_)));
    }
}
