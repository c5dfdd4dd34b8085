//! US-English date rendering matching the booking UI.
//!
//! The booking app renders dates with the browser's `en-US` locale rules, so
//! expected strings are produced here with the same field layout:
//!
//! ```text
//! weekday + text month:     "Wednesday, March 12, 2025"   "Wed, Mar 12"
//! weekday + numeric month:  "Wed, 3/12/2025"              "Wed, 03/12"
//! no weekday:               "March 12, 2025"              "3/12/25"
//! ```
//!
//! Every field is independently selectable. The year is tri-state: numeric,
//! two-digit, or explicitly omitted; leaving it unspecified means numeric.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VerifyError};

const WEEKDAYS_LONG: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const MONTHS_LONG: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekdayStyle {
    Omit,
    Narrow,
    Short,
    #[default]
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthStyle {
    Numeric,
    #[serde(rename = "2-digit")]
    TwoDigit,
    Narrow,
    Short,
    #[default]
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStyle {
    #[default]
    Numeric,
    #[serde(rename = "2-digit")]
    TwoDigit,
}

/// Year rendering. `Omit` is distinct from the default, which is `Numeric`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearStyle {
    #[default]
    Numeric,
    #[serde(rename = "2-digit")]
    TwoDigit,
    Omit,
}

/// Which components of a date to render, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DateFormat {
    #[serde(default)]
    pub weekday: WeekdayStyle,
    #[serde(default)]
    pub month: MonthStyle,
    #[serde(default)]
    pub day: DayStyle,
    #[serde(default)]
    pub year: YearStyle,
}

impl DateFormat {
    /// `"Wed, Mar 12, 2025"`
    pub const fn short() -> Self {
        Self {
            weekday: WeekdayStyle::Short,
            month: MonthStyle::Short,
            day: DayStyle::Numeric,
            year: YearStyle::Numeric,
        }
    }

    /// `"Wed, Mar 12"`, used by the checkout cart summary
    pub const fn short_without_year() -> Self {
        Self::short().with_year(YearStyle::Omit)
    }

    pub const fn with_weekday(mut self, weekday: WeekdayStyle) -> Self {
        self.weekday = weekday;
        self
    }

    pub const fn with_month(mut self, month: MonthStyle) -> Self {
        self.month = month;
        self
    }

    pub const fn with_day(mut self, day: DayStyle) -> Self {
        self.day = day;
        self
    }

    pub const fn with_year(mut self, year: YearStyle) -> Self {
        self.year = year;
        self
    }
}

/// Render `date` according to `format`.
pub fn format_date(date: NaiveDate, format: &DateFormat) -> String {
    let day = match format.day {
        DayStyle::Numeric => date.day().to_string(),
        DayStyle::TwoDigit => format!("{:02}", date.day()),
    };

    let year = match format.year {
        YearStyle::Numeric => Some(date.year().to_string()),
        YearStyle::TwoDigit => Some(format!("{:02}", date.year().rem_euclid(100))),
        YearStyle::Omit => None,
    };

    let month_index = date.month0() as usize;
    let body = match format.month {
        MonthStyle::Numeric | MonthStyle::TwoDigit => {
            let month = if format.month == MonthStyle::TwoDigit {
                format!("{:02}", date.month())
            } else {
                date.month().to_string()
            };
            match year {
                Some(year) => format!("{}/{}/{}", month, day, year),
                None => format!("{}/{}", month, day),
            }
        }
        MonthStyle::Narrow | MonthStyle::Short | MonthStyle::Long => {
            let name = MONTHS_LONG[month_index];
            let month = match format.month {
                MonthStyle::Narrow => &name[..1],
                MonthStyle::Short => &name[..3],
                _ => name,
            };
            match year {
                Some(year) => format!("{} {}, {}", month, day, year),
                None => format!("{} {}", month, day),
            }
        }
    };

    match weekday_name(date.weekday(), format.weekday) {
        Some(weekday) => format!("{}, {}", weekday, body),
        None => body,
    }
}

fn weekday_name(weekday: Weekday, style: WeekdayStyle) -> Option<&'static str> {
    let name = WEEKDAYS_LONG[weekday.num_days_from_monday() as usize];
    match style {
        WeekdayStyle::Omit => None,
        WeekdayStyle::Narrow => Some(&name[..1]),
        WeekdayStyle::Short => Some(&name[..3]),
        WeekdayStyle::Long => Some(name),
    }
}

/// Layouts the booking app uses when it prints a full date with a year.
const DISPLAY_LAYOUTS: &[&str] = &[
    "%a, %b %e %Y",
    "%a, %b %e, %Y",
    "%A, %B %e, %Y",
    "%A, %B %e %Y",
    "%b %e, %Y",
    "%B %e, %Y",
    "%a, %m/%d/%Y",
    "%m/%d/%Y",
];

/// Parse a rendered date such as `"Wed, Mar 12 2025"` back into a date.
///
/// The weekday, when present, must agree with the calendar date.
pub fn parse_display_date(text: &str) -> Result<NaiveDate> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");

    DISPLAY_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(&normalized, layout).ok())
        .ok_or_else(|| VerifyError::InvalidDate(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn march_12() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()
    }

    #[test]
    fn test_default_format_is_long_with_year() {
        assert_eq!(
            format_date(march_12(), &DateFormat::default()),
            "Wednesday, March 12, 2025"
        );
    }

    #[test_case(DateFormat::short(), "Wed, Mar 12, 2025" ; "short")]
    #[test_case(DateFormat::short_without_year(), "Wed, Mar 12" ; "short without year")]
    #[test_case(DateFormat::short().with_year(YearStyle::TwoDigit), "Wed, Mar 12, 25" ; "two digit year")]
    #[test_case(DateFormat::short().with_month(MonthStyle::Numeric), "Wed, 3/12/2025" ; "numeric month")]
    #[test_case(
        DateFormat::default().with_weekday(WeekdayStyle::Omit).with_month(MonthStyle::TwoDigit).with_year(YearStyle::Omit),
        "03/12" ; "two digit month without weekday or year"
    )]
    #[test_case(DateFormat::default().with_weekday(WeekdayStyle::Narrow).with_month(MonthStyle::Narrow), "W, M 12, 2025" ; "narrow")]
    fn test_format_variants(format: DateFormat, expected: &str) {
        assert_eq!(format_date(march_12(), &format), expected);
    }

    #[test]
    fn test_two_digit_day_pads() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        let format = DateFormat::short().with_day(DayStyle::TwoDigit);
        assert_eq!(format_date(date, &format), "Sun, Jan 05, 2025");
    }

    #[test]
    fn test_year_omit_deserializes_distinct_from_missing() {
        let omitted: DateFormat = serde_json::from_str(r#"{"year":"omit"}"#).unwrap();
        let missing: DateFormat = serde_json::from_str("{}").unwrap();
        assert_eq!(omitted.year, YearStyle::Omit);
        assert_eq!(missing.year, YearStyle::Numeric);

        let two_digit: DateFormat = serde_json::from_str(r#"{"month":"2-digit"}"#).unwrap();
        assert_eq!(two_digit.month, MonthStyle::TwoDigit);
    }

    #[test_case("Wed, Mar 12 2025" ; "no comma before year")]
    #[test_case("Wed, Mar 12, 2025" ; "comma before year")]
    #[test_case("Wednesday, March 12, 2025" ; "long names")]
    #[test_case("  Wed,  Mar 12   2025 " ; "irregular spacing")]
    #[test_case("March 12, 2025" ; "no weekday")]
    fn test_parse_display_date(text: &str) {
        assert_eq!(parse_display_date(text).unwrap(), march_12());
    }

    #[test]
    fn test_parse_rejects_wrong_weekday() {
        assert!(matches!(
            parse_display_date("Thu, Mar 12 2025"),
            Err(VerifyError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_display_date("tomorrow").is_err());
        assert!(parse_display_date("").is_err());
    }
}
