//! Calendar arithmetic used by the replication planner.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};

use crate::error::ValidationError;

/// Map a Sunday-based index (0 = Sunday .. 6 = Saturday) to a weekday.
pub fn weekday_from_index(index: i64) -> Result<Weekday, ValidationError> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(ValidationError::DayOfWeekOutOfRange(other)),
    }
}

/// Parse a 24-hour `HH:MM` (or `HH:MM:SS`) time of day.
pub fn parse_time_of_day(field: &'static str, value: &str) -> Result<NaiveTime, ValidationError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| ValidationError::InvalidTime {
            field,
            value: value.to_string(),
        })
}

/// First day of `month` and first day of the following month.
///
/// December rolls over into January of the next year.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), ValidationError> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::MonthOutOfRange(i64::from(month)));
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(ValidationError::YearOutOfRange(i64::from(year)))?;
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1), 1)
    } else {
        (Some(year), month + 1)
    };
    let next = next_year
        .and_then(|y| NaiveDate::from_ymd_opt(y, next_month, 1))
        .ok_or(ValidationError::YearOutOfRange(i64::from(year)))?;
    Ok((first, next))
}

/// Every date in the month that falls on `weekday`, in ascending order.
pub fn weekday_dates(
    year: i32,
    month: u32,
    weekday: Weekday,
) -> Result<Vec<NaiveDate>, ValidationError> {
    let (first, next) = month_bounds(year, month)?;

    let offset = (7 + weekday.num_days_from_sunday() - first.weekday().num_days_from_sunday()) % 7;
    let mut current = first + Duration::days(i64::from(offset));
    let mut dates = Vec::with_capacity(5);

    while current < next {
        dates.push(current);
        current = current + Duration::days(7);
    }

    Ok(dates)
}

/// Number of days in a month.
pub fn days_in_month(year: i32, month: u32) -> Result<i64, ValidationError> {
    let (first, next) = month_bounds(year, month)?;
    Ok((next - first).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekday_index_is_sunday_based() {
        assert_eq!(weekday_from_index(0).unwrap(), Weekday::Sun);
        assert_eq!(weekday_from_index(6).unwrap(), Weekday::Sat);
        assert_eq!(
            weekday_from_index(-1),
            Err(ValidationError::DayOfWeekOutOfRange(-1))
        );
    }

    #[test]
    fn test_leap_february_has_five_thursdays() {
        let dates = weekday_dates(2024, 2, Weekday::Thu).unwrap();
        assert_eq!(
            dates,
            vec![
                date(2024, 2, 1),
                date(2024, 2, 8),
                date(2024, 2, 15),
                date(2024, 2, 22),
                date(2024, 2, 29),
            ]
        );
    }

    #[test]
    fn test_non_leap_february_has_four_of_each_weekday() {
        for index in 0..7 {
            let weekday = weekday_from_index(index).unwrap();
            assert_eq!(weekday_dates(2025, 2, weekday).unwrap().len(), 4);
        }
    }

    #[test]
    fn test_counts_match_days_in_month() {
        for year in [2023, 2024, 2025, 2100] {
            for month in 1..=12 {
                let total: usize = (0..7)
                    .map(|i| {
                        weekday_dates(year, month, weekday_from_index(i).unwrap())
                            .unwrap()
                            .len()
                    })
                    .sum();
                assert_eq!(total as i64, days_in_month(year, month).unwrap());
            }
        }
    }

    #[test]
    fn test_every_date_matches_weekday_and_month() {
        let dates = weekday_dates(2025, 9, Weekday::Mon).unwrap();
        assert_eq!(dates.len(), 5);
        assert!(dates
            .iter()
            .all(|d| d.weekday() == Weekday::Mon && d.month() == 9 && d.year() == 2025));
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let (first, next) = month_bounds(2025, 12).unwrap();
        assert_eq!(first, date(2025, 12, 1));
        assert_eq!(next, date(2026, 1, 1));
        assert_eq!(days_in_month(2100, 2).unwrap(), 28);
        assert_eq!(days_in_month(2000, 2).unwrap(), 29);
    }

    #[test]
    fn test_month_bounds_rejects_bad_input() {
        assert_eq!(month_bounds(2025, 0), Err(ValidationError::MonthOutOfRange(0)));
        assert!(matches!(
            month_bounds(i32::MAX, 1),
            Err(ValidationError::YearOutOfRange(_))
        ));
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(
            parse_time_of_day("startTime", "07:00").unwrap(),
            NaiveTime::from_hms_opt(7, 0, 0).unwrap()
        );
        assert_eq!(
            parse_time_of_day("endTime", " 23:59:30 ").unwrap(),
            NaiveTime::from_hms_opt(23, 59, 30).unwrap()
        );
        assert!(parse_time_of_day("startTime", "24:00").is_err());
        assert!(parse_time_of_day("startTime", "7am").is_err());
    }
}
