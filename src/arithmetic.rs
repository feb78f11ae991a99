use crate::calendar::{Calendar, CalendarError, days_in_month, days_in_year, weekday_name};
use crate::consts::{FALLBACK_DAYS_IN_MONTH, FIRST_MONTH, MIN_DAY};
use crate::CalendarDate;
use std::borrow::Cow;
use tracing::{debug, trace, warn};

/// Rejects calendars that would make day arithmetic spin forever.
fn ensure_countable(calendar: &Calendar) -> Result<(), CalendarError> {
    if calendar.months.is_empty() {
        warn!("day arithmetic on a calendar without months");
        return Err(CalendarError::NoMonths);
    }
    if days_in_year(calendar) == 0 {
        warn!(months = calendar.months.len(), "day arithmetic on a calendar whose months are all empty");
        return Err(CalendarError::EmptyYear);
    }
    Ok(())
}

fn next_year(year: i32, calendar: &Calendar) -> Result<i32, CalendarError> {
    let next = year.checked_add(1).ok_or(CalendarError::Overflow)?;
    Ok(if calendar.skip_year_zero && next == 0 { 1 } else { next })
}

/// Moves `year` by whole `years`, stepping over year zero when the calendar skips it.
fn shift_years(year: i32, years: i64, calendar: &Calendar) -> Result<i32, CalendarError> {
    let mut shifted = i64::from(year).checked_add(years).ok_or(CalendarError::Overflow)?;
    if calendar.skip_year_zero {
        if year > 0 && shifted <= 0 {
            shifted -= 1;
        } else if year < 0 && shifted >= 0 {
            shifted += 1;
        }
    }
    i32::try_from(shifted).map_err(|_| CalendarError::Overflow)
}

/// Days in the months of a year before the 1-based `month`. Months past the
/// end of the calendar count as fallback-length months.
fn days_before_month(month: u32, calendar: &Calendar) -> i64 {
    let preceding = usize::try_from(month.saturating_sub(FIRST_MONTH)).unwrap_or(usize::MAX);
    let defined: i64 = calendar
        .months
        .iter()
        .take(preceding)
        .map(|m| i64::from(m.length))
        .sum();

    let excess = preceding.saturating_sub(calendar.months.len());
    if excess == 0 {
        return defined;
    }
    debug!(month, count = calendar.months.len(), "months outside calendar, using fallback lengths");
    defined + i64::try_from(excess).unwrap_or(i64::from(u32::MAX)) * i64::from(FALLBACK_DAYS_IN_MONTH)
}

/// Moves `date` by `days` (negative goes backwards), carrying overflow into
/// neighbouring months and years. The result is always normalized.
///
/// # Errors
/// Returns `CalendarError::NoMonths` or `CalendarError::EmptyYear` for a
/// calendar with no days, `CalendarError::MonthOutOfRange` when `date.month`
/// is not one of the calendar's months, and `CalendarError::Overflow` when
/// the year leaves the `i32` range.
pub fn add_days(date: CalendarDate, days: i64, calendar: &Calendar) -> Result<CalendarDate, CalendarError> {
    ensure_countable(calendar)?;

    let count = calendar.month_count();
    if !(FIRST_MONTH..=count).contains(&date.month) {
        warn!(month = date.month, count, "day arithmetic on a month outside the calendar");
        return Err(CalendarError::MonthOutOfRange {
            month: date.month,
            count: calendar.months.len(),
        });
    }

    let day = i64::from(date.day)
        .checked_add(days)
        .ok_or(CalendarError::Overflow)?;

    // Every year has the same months, so whole years move the year alone.
    // What is left fits inside one year's worth of months.
    let year_length = i64::from(days_in_year(calendar));
    let offset = day.checked_sub(i64::from(MIN_DAY)).ok_or(CalendarError::Overflow)?;
    let mut year = shift_years(date.year, offset.div_euclid(year_length), calendar)?;
    let mut month = date.month;
    let mut day = offset.rem_euclid(year_length) + i64::from(MIN_DAY);

    loop {
        let length = i64::from(days_in_month(month, calendar));
        if day <= length {
            break;
        }
        day -= length;
        month += 1;
        if month > count {
            month = FIRST_MONTH;
            year = next_year(year, calendar)?;
        }
    }

    let day = u32::try_from(day).map_err(|_| CalendarError::Overflow)?;
    Ok(CalendarDate { year, month, day })
}

/// Moves `date` back by `days`; the mirror of [`add_days`].
///
/// # Errors
/// Same as [`add_days`].
pub fn subtract_days(date: CalendarDate, days: i64, calendar: &Calendar) -> Result<CalendarDate, CalendarError> {
    add_days(date, days.checked_neg().ok_or(CalendarError::Overflow)?, calendar)
}

/// Signed day number of `date`, where year 1, month 1, day 1 is day 1.
///
/// Years are counted contiguously: with `skip_year_zero` the year before 1
/// is -1, otherwise it is 0.
pub fn date_to_day_of_calendar(date: CalendarDate, calendar: &Calendar) -> i64 {
    let year = i64::from(date.year);
    let elapsed_years = if year < 1 && calendar.skip_year_zero { year } else { year - 1 };

    elapsed_years * i64::from(days_in_year(calendar))
        + days_before_month(date.month, calendar)
        + i64::from(date.day)
}

/// Unsigned distance in days between two dates
pub fn days_between(a: CalendarDate, b: CalendarDate, calendar: &Calendar) -> u64 {
    date_to_day_of_calendar(a, calendar).abs_diff(date_to_day_of_calendar(b, calendar))
}

/// Weekday index of `date`, shifted by the calendar's start offset.
/// A calendar without weekdays always yields 0.
pub fn day_of_week(date: CalendarDate, calendar: &Calendar) -> usize {
    let Ok(week_length) = i64::try_from(calendar.weekdays.len()) else {
        return 0;
    };
    if week_length == 0 {
        debug!("calendar has no weekdays, day of week is 0");
        return 0;
    }

    let index = (date_to_day_of_calendar(date, calendar) - 1 + i64::from(calendar.start_offset)).rem_euclid(week_length);
    usize::try_from(index).unwrap_or_default()
}

/// Name of the weekday `date` falls on
pub fn weekday_of(date: CalendarDate, calendar: &Calendar) -> Cow<'_, str> {
    let index = i64::try_from(day_of_week(date, calendar)).unwrap_or_default();
    weekday_name(index, calendar)
}

/// 1-based position of `date` within its year
pub fn day_of_year(date: CalendarDate, calendar: &Calendar) -> i64 {
    days_before_month(date.month, calendar) + i64::from(date.day)
}

/// Every date from `start` to `end`, both included. Empty when `start` is after `end`.
///
/// # Errors
/// Returns the first error [`add_days`] reports while stepping.
pub fn date_range(start: CalendarDate, end: CalendarDate, calendar: &Calendar) -> Result<Vec<CalendarDate>, CalendarError> {
    let start = add_days(start, 0, calendar)?;
    let end = add_days(end, 0, calendar)?;
    if start > end {
        return Ok(Vec::new());
    }

    let span = days_between(start, end, calendar);
    trace!(%start, %end, span, "materializing date range");

    let mut dates = Vec::with_capacity(usize::try_from(span).map_or(0, |s| s.saturating_add(1)));
    let mut current = start;
    dates.push(current);
    while current < end {
        current = add_days(current, 1, calendar)?;
        dates.push(current);
    }
    Ok(dates)
}

/// Whole years from `birth` to `current`, one less if the birthday is still
/// ahead in the current year.
pub fn calculate_age(birth: CalendarDate, current: CalendarDate) -> i64 {
    let age = i64::from(current.year) - i64::from(birth.year);
    if (current.month, current.day) < (birth.month, birth.day) {
        age - 1
    } else {
        age
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{date, harptos_like_calendar, month_def, two_month_calendar};

    fn skip_zero_calendar() -> Calendar {
        Calendar {
            skip_year_zero: true,
            ..two_month_calendar()
        }
    }

    #[test]
    fn test_add_days_carries_into_next_month() {
        let cal = two_month_calendar();
        assert_eq!(add_days(date(1, 1, 30), 3, &cal), Ok(date(1, 2, 2)));
    }

    #[test]
    fn test_add_days_zero_is_identity() {
        let cal = two_month_calendar();
        assert_eq!(add_days(date(7, 2, 28), 0, &cal), Ok(date(7, 2, 28)));
    }

    #[test]
    fn test_add_days_renormalizes_out_of_range_day() {
        let cal = two_month_calendar();
        assert_eq!(add_days(date(1, 1, 0), 0, &cal), Ok(date(0, 2, 28)));
        assert_eq!(add_days(date(1, 2, 40), 0, &cal), Ok(date(2, 1, 12)));
    }

    #[test]
    fn test_add_days_cases() {
        struct TestCase {
            calendar:    Calendar,
            start:       CalendarDate,
            days:        i64,
            expected:    CalendarDate,
            description: &'static str,
        }

        let cases = [
            TestCase {
                calendar:    two_month_calendar(),
                start:       date(1, 2, 28),
                days:        1,
                expected:    date(2, 1, 1),
                description: "rolls over the year end",
            },
            TestCase {
                calendar:    two_month_calendar(),
                start:       date(1, 1, 1),
                days:        59 * 3,
                expected:    date(4, 1, 1),
                description: "whole years",
            },
            TestCase {
                calendar:    two_month_calendar(),
                start:       date(1, 1, 1),
                days:        -1,
                expected:    date(0, 2, 28),
                description: "year zero exists by default",
            },
            TestCase {
                calendar:    skip_zero_calendar(),
                start:       date(1, 1, 1),
                days:        -1,
                expected:    date(-1, 2, 28),
                description: "backwards across a skipped year zero",
            },
            TestCase {
                calendar:    skip_zero_calendar(),
                start:       date(-1, 2, 28),
                days:        1,
                expected:    date(1, 1, 1),
                description: "forwards across a skipped year zero",
            },
            TestCase {
                calendar:    skip_zero_calendar(),
                start:       date(-2, 2, 1),
                days:        59 + 28,
                expected:    date(1, 1, 1),
                description: "more than a year across a skipped year zero",
            },
            TestCase {
                calendar:    two_month_calendar(),
                start:       date(5, 2, 3),
                days:        -3,
                expected:    date(5, 1, 31),
                description: "borrows from the previous month",
            },
            TestCase {
                calendar:    harptos_like_calendar(),
                start:       date(1372, 1, 30),
                days:        2,
                expected:    date(1372, 3, 1),
                description: "steps over a one-day intercalary month",
            },
        ];

        for case in &cases {
            assert_eq!(
                add_days(case.start, case.days, &case.calendar),
                Ok(case.expected),
                "{}",
                case.description
            );
        }
    }

    #[test]
    fn test_add_days_rejects_empty_calendar() {
        assert_eq!(add_days(date(1, 1, 1), 5, &Calendar::default()), Err(CalendarError::NoMonths));

        let zero_length = Calendar {
            months: vec![month_def("Void", 0), month_def("Null", 0)],
            ..Calendar::default()
        };
        assert_eq!(add_days(date(1, 1, 1), -5, &zero_length), Err(CalendarError::EmptyYear));
    }

    #[test]
    fn test_add_days_skips_zero_length_months() {
        let cal = Calendar {
            months: vec![month_def("A", 2), month_def("Gap", 0), month_def("B", 2)],
            ..Calendar::default()
        };
        assert_eq!(add_days(date(1, 1, 2), 1, &cal), Ok(date(1, 3, 1)));
        assert_eq!(add_days(date(1, 3, 1), -1, &cal), Ok(date(1, 1, 2)));
    }

    #[test]
    fn test_add_days_rejects_month_outside_calendar() {
        let cal = two_month_calendar();
        assert_eq!(
            add_days(date(1, 3, 1), 1, &cal),
            Err(CalendarError::MonthOutOfRange { month: 3, count: 2 })
        );
        assert!(matches!(add_days(date(1, 0, 1), 0, &cal), Err(CalendarError::MonthOutOfRange { .. })));
    }

    #[test]
    fn test_add_days_overflow() {
        let cal = two_month_calendar();
        assert_eq!(add_days(date(i32::MAX, 2, 28), 1, &cal), Err(CalendarError::Overflow));
        assert_eq!(add_days(date(1, 1, 1), i64::MAX, &cal), Err(CalendarError::Overflow));
        assert_eq!(subtract_days(date(1, 1, 1), i64::MIN, &cal), Err(CalendarError::Overflow));
    }

    #[test]
    fn test_add_days_huge_counts_return_promptly() {
        let cal = two_month_calendar();
        let started = std::time::Instant::now();

        assert_eq!(add_days(date(1, 1, 1), 1_000_000_000_000, &cal), Err(CalendarError::Overflow));
        assert_eq!(add_days(date(1, 1, 1), -1_000_000_000_000, &cal), Err(CalendarError::Overflow));
        assert_eq!(add_days(date(1, 1, 1), 59 * 1_000_000_000, &cal), Ok(date(1_000_000_001, 1, 1)));
        assert_eq!(add_days(date(1, 2, 28), 59 * 2_000_000 + 1, &cal), Ok(date(2_000_002, 1, 1)));

        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_add_days_whole_years_across_skipped_year_zero() {
        let cal = skip_zero_calendar();
        assert_eq!(add_days(date(-1000, 1, 5), 59 * 2000, &cal), Ok(date(1001, 1, 5)));
        assert_eq!(add_days(date(1, 1, 1), -59 * 5, &cal), Ok(date(-5, 1, 1)));
        assert_eq!(add_days(date(2, 2, 3), -59 * 3 - 3, &cal), Ok(date(-2, 1, 31)));
    }

    #[test]
    fn test_subtract_days() {
        let cal = skip_zero_calendar();
        assert_eq!(subtract_days(date(1, 1, 1), 1, &cal), Ok(date(-1, 2, 28)));
        assert_eq!(subtract_days(date(1, 2, 2), -3, &cal), add_days(date(1, 2, 2), 3, &cal));
    }

    #[test]
    fn test_date_to_day_of_calendar() {
        let cal = two_month_calendar();
        assert_eq!(date_to_day_of_calendar(date(1, 1, 1), &cal), 1);
        assert_eq!(date_to_day_of_calendar(date(1, 2, 1), &cal), 32);
        assert_eq!(date_to_day_of_calendar(date(2, 1, 1), &cal), 60);
        assert_eq!(date_to_day_of_calendar(date(0, 2, 28), &cal), 0);
        assert_eq!(date_to_day_of_calendar(date(-1, 1, 1), &cal), -117);
    }

    #[test]
    fn test_date_to_day_of_calendar_skipping_year_zero() {
        let cal = skip_zero_calendar();
        assert_eq!(date_to_day_of_calendar(date(-1, 2, 28), &cal), 0);
        assert_eq!(date_to_day_of_calendar(date(-1, 1, 1), &cal), -58);
        assert_eq!(date_to_day_of_calendar(date(-2, 1, 1), &cal), -117);
    }

    #[test]
    fn test_days_between() {
        let cal = skip_zero_calendar();
        assert_eq!(days_between(date(1, 1, 1), date(1, 2, 2), &cal), 32);
        assert_eq!(days_between(date(1, 2, 2), date(1, 1, 1), &cal), 32);
        assert_eq!(days_between(date(-1, 2, 28), date(1, 1, 1), &cal), 1);
        assert_eq!(days_between(date(4, 1, 9), date(4, 1, 9), &cal), 0);
    }

    #[test]
    fn test_day_of_week() {
        let cal = two_month_calendar();
        assert_eq!(day_of_week(date(1, 1, 1), &cal), 0);
        assert_eq!(day_of_week(date(1, 1, 2), &cal), 1);
        assert_eq!(day_of_week(date(1, 1, 4), &cal), 0);
        assert_eq!(day_of_week(date(0, 2, 28), &cal), 2);
    }

    #[test]
    fn test_day_of_week_start_offset() {
        let cal = harptos_like_calendar();
        assert_eq!(day_of_week(date(1, 1, 1), &cal), 2);
        assert_eq!(weekday_of(date(1, 1, 1), &cal), "Zol");
        assert_eq!(weekday_of(date(1, 1, 6), &cal), "Sul");
        assert_eq!(weekday_of(date(-1, 5, 30), &cal), "Mol");
    }

    #[test]
    fn test_day_of_week_without_weekdays() {
        let cal = Calendar {
            weekdays: Vec::new(),
            start_offset: 5,
            ..two_month_calendar()
        };
        assert_eq!(day_of_week(date(3, 2, 17), &cal), 0);
        assert_eq!(weekday_of(date(3, 2, 17), &cal), "Day 0");
    }

    #[test]
    fn test_day_of_year() {
        let cal = harptos_like_calendar();
        assert_eq!(day_of_year(date(1372, 1, 1), &cal), 1);
        assert_eq!(day_of_year(date(1372, 2, 1), &cal), 31);
        assert_eq!(day_of_year(date(1372, 5, 30), &cal), 121);
    }

    #[test]
    fn test_day_of_year_for_months_past_the_calendar() {
        let cal = two_month_calendar();
        let started = std::time::Instant::now();

        assert_eq!(day_of_year(date(1, 4, 2), &cal), 59 + 30 + 2);
        assert_eq!(
            day_of_year(date(1, u32::MAX, 1), &cal),
            59 + i64::from(u32::MAX - 3) * 30 + 1
        );
        assert_eq!(
            date_to_day_of_calendar(date(2, u32::MAX, 1), &cal),
            59 + 59 + i64::from(u32::MAX - 3) * 30 + 1
        );
        assert_eq!(day_of_year(date(1, 0, 7), &cal), 7);

        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_date_range() {
        let cal = skip_zero_calendar();
        let dates = date_range(date(-1, 2, 27), date(1, 1, 2), &cal).unwrap();
        assert_eq!(
            dates,
            vec![date(-1, 2, 27), date(-1, 2, 28), date(1, 1, 1), date(1, 1, 2)]
        );
    }

    #[test]
    fn test_date_range_single_day() {
        let cal = two_month_calendar();
        assert_eq!(date_range(date(2, 2, 2), date(2, 2, 2), &cal), Ok(vec![date(2, 2, 2)]));
    }

    #[test]
    fn test_date_range_reversed_is_empty() {
        let cal = two_month_calendar();
        assert_eq!(date_range(date(2, 2, 2), date(2, 1, 1), &cal), Ok(Vec::new()));
    }

    #[test]
    fn test_date_range_length_matches_days_between() {
        let cal = harptos_like_calendar();
        let (start, end) = (date(1371, 4, 12), date(1372, 3, 3));
        let dates = date_range(start, end, &cal).unwrap();
        assert_eq!(dates.len() as u64, days_between(start, end, &cal) + 1);
        assert_eq!(dates.last(), Some(&end));
    }

    #[test]
    fn test_date_range_normalizes_endpoints() {
        let cal = two_month_calendar();
        let dates = date_range(date(1, 1, 30), date(1, 1, 40), &cal).unwrap();

        assert_eq!(dates.len(), 11);
        assert_eq!(dates.first(), Some(&date(1, 1, 30)));
        assert_eq!(dates.last(), Some(&date(1, 2, 9)));

        let dates = date_range(date(1, 2, 0), date(1, 2, 1), &cal).unwrap();
        assert_eq!(dates, vec![date(1, 1, 31), date(1, 2, 1)]);
    }

    #[test]
    fn test_date_range_rejects_month_outside_calendar() {
        let cal = two_month_calendar();
        assert!(matches!(
            date_range(date(1, 1, 1), date(1, 3, 1), &cal),
            Err(CalendarError::MonthOutOfRange { month: 3, .. })
        ));
    }

    #[test]
    fn test_date_range_rejects_empty_calendar() {
        assert_eq!(
            date_range(date(1, 1, 1), date(1, 1, 3), &Calendar::default()),
            Err(CalendarError::NoMonths)
        );
    }

    #[test]
    fn test_calculate_age() {
        struct TestCase {
            birth:       CalendarDate,
            current:     CalendarDate,
            age:         i64,
            description: &'static str,
        }

        let cases = [
            TestCase {
                birth:       date(1340, 3, 10),
                current:     date(1372, 3, 10),
                age:         32,
                description: "on the birthday",
            },
            TestCase {
                birth:       date(1340, 3, 10),
                current:     date(1372, 3, 9),
                age:         31,
                description: "day before the birthday",
            },
            TestCase {
                birth:       date(1340, 3, 10),
                current:     date(1372, 2, 30),
                age:         31,
                description: "earlier month",
            },
            TestCase {
                birth:       date(1340, 3, 10),
                current:     date(1372, 4, 1),
                age:         32,
                description: "later month",
            },
            TestCase {
                birth:       date(-20, 5, 5),
                current:     date(-3, 1, 1),
                age:         16,
                description: "negative years",
            },
        ];

        for case in &cases {
            assert_eq!(calculate_age(case.birth, case.current), case.age, "{}", case.description);
        }
    }
}
