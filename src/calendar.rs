//! Calendar-date and time-of-day arithmetic.
//!
//! Dates are plain `NaiveDate` values (year, month, day) stored in DATE
//! columns; they never carry a clock time, so range filters and week copies
//! need no timezone anchoring. Times of day are `NaiveTime` values stored in
//! TIME columns, independent of any date.

use chrono::{NaiveDate, NaiveTime, Timelike, Utc};

use crate::AppError;

/// Parse a client-supplied calendar date, strictly `YYYY-MM-DD`.
///
/// Rejects anything that is not 4-digit-year/2-digit-month/2-digit-day
/// before chrono gets to see it, so "2024-6-1" and "24-06-01" fail.
pub fn parse_date(input: &str) -> Result<NaiveDate, AppError> {
    let bytes = input.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit());

    if !well_formed {
        return Err(AppError::Validation(format!(
            "Invalid date format: {} (expected YYYY-MM-DD)",
            input
        )));
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid calendar date: {}", input)))
}

/// Parse a time of day, `HH:MM` or `HH:MM:SS`.
pub fn parse_time(input: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .map_err(|_| {
            AppError::Validation(format!("Invalid time format: {} (expected HH:MM)", input))
        })
}

/// Whole-day offset between two calendar dates (`to` minus `from`).
///
/// Pure calendar arithmetic: immune to DST because no wall clock is
/// involved, and valid across month and year boundaries.
pub fn day_offset(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Last day of the week starting at `start` (inclusive, 7 days).
pub fn week_end(start: NaiveDate) -> NaiveDate {
    start + chrono::Days::new(6)
}

/// Scheduled duration between two times of day, in minutes.
///
/// An end strictly before the start is taken as crossing midnight, never
/// as an error: 22:00 -> 06:00 is 8 hours. Equal start and end is a
/// zero-length shift, not a full day.
pub fn shift_duration_minutes(start: NaiveTime, end: NaiveTime) -> i64 {
    let start_min = i64::from(start.num_seconds_from_midnight()) / 60;
    let end_min = i64::from(end.num_seconds_from_midnight()) / 60;

    if end_min < start_min {
        end_min + 24 * 60 - start_min
    } else {
        end_min - start_min
    }
}

/// Today as a calendar date. The day boundary is UTC.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_strict_dates() {
        assert_eq!(
            parse_date("2024-06-10").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
        );
        // Leap day
        assert!(parse_date("2024-02-29").is_ok());
    }

    #[test]
    fn rejects_loose_or_impossible_dates() {
        for bad in ["2024-6-10", "24-06-10", "2024/06/10", "2024-06-10T00:00", "2024-13-01", "2023-02-29", ""] {
            assert!(parse_date(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn parses_times_with_and_without_seconds() {
        assert_eq!(parse_time("08:30").unwrap(), NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(parse_time("22:00:00").unwrap(), NaiveTime::from_hms_opt(22, 0, 0).unwrap());
        assert!(parse_time("8:30").is_err());
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn day_offset_spans_month_and_year_boundaries() {
        let d = |s: &str| parse_date(s).unwrap();
        assert_eq!(day_offset(d("2024-06-03"), d("2024-06-10")), 7);
        assert_eq!(day_offset(d("2024-12-30"), d("2025-01-06")), 7);
        assert_eq!(day_offset(d("2024-06-10"), d("2024-06-03")), -7);
    }

    #[test]
    fn week_end_is_six_days_out() {
        let d = |s: &str| parse_date(s).unwrap();
        assert_eq!(week_end(d("2024-06-03")), d("2024-06-09"));
        assert_eq!(week_end(d("2024-12-30")), d("2025-01-05"));
    }

    #[test]
    fn duration_within_one_day() {
        let t = |s: &str| parse_time(s).unwrap();
        assert_eq!(shift_duration_minutes(t("08:00"), t("16:00")), 480);
        assert_eq!(shift_duration_minutes(t("09:00"), t("09:30")), 30);
    }

    #[test]
    fn duration_of_equal_start_and_end_is_zero() {
        let t = |s: &str| parse_time(s).unwrap();
        assert_eq!(
            shift_duration_minutes(t("09:00"), t("09:00")),
            0,
            "equal start and end is a zero-length shift, not 24 hours"
        );
    }

    #[test]
    fn duration_crossing_midnight_adds_a_day() {
        let t = |s: &str| parse_time(s).unwrap();
        assert_eq!(shift_duration_minutes(t("22:00"), t("06:00")), 480);
        assert_eq!(shift_duration_minutes(t("23:30"), t("00:15")), 45);
    }
}
