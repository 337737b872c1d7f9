use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{Result, TitheError};

pub const MONTHS: [&str; 12] = [
    "JANUARY",
    "FEBRUARY",
    "MARCH",
    "APRIL",
    "MAY",
    "JUNE",
    "JULY",
    "AUGUST",
    "SEPTEMBER",
    "OCTOBER",
    "NOVEMBER",
    "DECEMBER",
];

/// Week columns per month in the collection sheets.
pub const WEEKS_PER_MONTH: u32 = 5;

/// 1-based month number for an upper- or mixed-case English month name.
pub fn month_number(name: &str) -> Result<u32> {
    let wanted = name.trim().to_uppercase();
    MONTHS
        .iter()
        .position(|m| *m == wanted)
        .map(|i| i as u32 + 1)
        .ok_or_else(|| TitheError::UnknownMonth(name.to_string()))
}

pub fn month_name(month: u32) -> Option<&'static str> {
    MONTHS.get(month.checked_sub(1)? as usize).copied()
}

/// First label in `MONTHS` contained in `label`, e.g. "JANUARY 2025" -> "JANUARY".
pub fn find_month_in(label: &str) -> Option<&'static str> {
    let upper = label.trim().to_uppercase();
    MONTHS.iter().copied().find(|m| upper.contains(m))
}

/// The Sunday for collection week `week` of a month: the first Sunday on or after
/// the 1st, plus `week - 1` whole weeks. Week 5 can land in the next month.
/// Weeks outside `1..=WEEKS_PER_MONTH` are refused.
pub fn sunday_date(year: i32, month: u32, week: u32) -> Result<NaiveDate> {
    if !(1..=WEEKS_PER_MONTH).contains(&week) {
        return Err(TitheError::InvalidWeek(week));
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| TitheError::UnknownMonth(format!("{year}-{month:02}")))?;
    let offset = (7 - first.weekday().num_days_from_sunday()) % 7;
    first
        .checked_add_signed(Duration::days(offset as i64 + 7 * (week as i64 - 1)))
        .ok_or_else(|| TitheError::Other(format!("week {week} of {year}-{month:02} is out of range")))
}

/// ISO timestamp for `sunday_date`, at midnight UTC.
pub fn sunday_of(year: i32, month_name: &str, week: u32) -> Result<String> {
    let month = month_number(month_name)?;
    Ok(iso_timestamp(sunday_date(year, month, week)?))
}

pub fn iso_timestamp(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}

/// Parse the date part of an ISO timestamp.
pub fn date_of(timestamp: &str) -> Option<NaiveDate> {
    let day = timestamp.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Reporting bucket for a date: days 1-7 are week 1, 8-14 week 2, and so on,
/// with everything from the 29th folded into week 5.
pub fn week_of_month(date: NaiveDate) -> u32 {
    ((date.day() - 1) / 7 + 1).min(WEEKS_PER_MONTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn is_sunday(date: NaiveDate) -> bool {
        date.weekday() == Weekday::Sun
    }

    #[test]
    fn test_sunday_of_january_2025() {
        // 2025-01-01 is a Wednesday; first Sunday is the 5th.
        assert_eq!(sunday_of(2025, "JANUARY", 1).unwrap(), "2025-01-05T00:00:00.000Z");
        assert_eq!(sunday_of(2025, "January", 2).unwrap(), "2025-01-12T00:00:00.000Z");
        assert_eq!(sunday_of(2025, "january", 5).unwrap(), "2025-02-02T00:00:00.000Z");
    }

    #[test]
    fn test_month_starting_on_sunday() {
        // 2025-06-01 is a Sunday.
        assert_eq!(sunday_of(2025, "JUNE", 1).unwrap(), "2025-06-01T00:00:00.000Z");
        assert_eq!(sunday_of(2025, "JUNE", 5).unwrap(), "2025-06-29T00:00:00.000Z");
    }

    #[test]
    fn test_week_one_is_always_a_sunday_and_weeks_are_seven_days_apart() {
        for year in [2023, 2024, 2025, 2028] {
            for month in 1..=12 {
                let first = sunday_date(year, month, 1).unwrap();
                assert!(is_sunday(first), "{year}-{month}");
                assert!(first.day() <= 7);
                for week in 2..=WEEKS_PER_MONTH {
                    let d = sunday_date(year, month, week).unwrap();
                    assert_eq!((d - first).num_days(), (week as i64 - 1) * 7);
                }
            }
        }
    }

    #[test]
    fn test_unknown_month_is_an_error() {
        assert!(matches!(
            sunday_of(2025, "SMARCH", 1),
            Err(TitheError::UnknownMonth(_))
        ));
    }

    #[test]
    fn test_week_zero_is_an_error() {
        assert!(matches!(sunday_of(2025, "MAY", 0), Err(TitheError::InvalidWeek(0))));
    }

    #[test]
    fn test_weeks_past_five_are_errors() {
        assert!(matches!(sunday_of(2025, "JANUARY", 6), Err(TitheError::InvalidWeek(6))));
        assert!(matches!(sunday_of(2025, "JANUARY", 9), Err(TitheError::InvalidWeek(9))));
        assert!(matches!(
            sunday_of(2025, "JANUARY", 1_000_000_000),
            Err(TitheError::InvalidWeek(1_000_000_000))
        ));
    }

    #[test]
    fn test_week_of_month_buckets() {
        let d = |day| NaiveDate::from_ymd_opt(2025, 3, day).unwrap();
        assert_eq!(week_of_month(d(1)), 1);
        assert_eq!(week_of_month(d(7)), 1);
        assert_eq!(week_of_month(d(8)), 2);
        assert_eq!(week_of_month(d(28)), 4);
        assert_eq!(week_of_month(d(29)), 5);
        assert_eq!(week_of_month(d(31)), 5);
    }

    #[test]
    fn test_bucketing_schemes_disagree_when_week_five_spills() {
        // 2025-02-01 is a Saturday: week 1 is Feb 2, week 5 is Mar 2,
        // which reporting files under March week 1.
        let spill = sunday_date(2025, 2, 5).unwrap();
        assert_eq!(spill, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
        assert_eq!(week_of_month(spill), 1);
        // 2025-08-01 is a Friday: week 5 is Aug 31 and both schemes agree.
        assert_eq!(week_of_month(sunday_date(2025, 8, 5).unwrap()), 5);
        // 2024-09-01 is a Sunday: week 2 is Sep 8, bucket 2.
        assert_eq!(week_of_month(sunday_date(2024, 9, 2).unwrap()), 2);
    }

    #[test]
    fn test_month_lookup_helpers() {
        assert_eq!(month_number("march").unwrap(), 3);
        assert_eq!(month_name(12), Some("DECEMBER"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
        assert_eq!(find_month_in("  January 2025 "), Some("JANUARY"));
        assert_eq!(find_month_in("TOTAL"), None);
    }

    #[test]
    fn test_date_of_timestamp() {
        assert_eq!(
            date_of("2025-01-12T00:00:00.000Z"),
            NaiveDate::from_ymd_opt(2025, 1, 12)
        );
        assert_eq!(date_of("garbage"), None);
    }
}
