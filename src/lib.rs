mod arithmetic;
mod calendar;
mod consts;
mod moon;
mod prelude;
mod range;

pub use arithmetic::{
    add_days, calculate_age, date_range, date_to_day_of_calendar, day_of_week, day_of_year,
    days_between, subtract_days, weekday_of,
};
pub use calendar::{
    Calendar, CalendarError, MonthDef, Moon, Season, days_in_month, days_in_year, format_date,
    is_leap_year, month_display_name, month_display_name_with_alias, season_for_month,
    weekday_name, year_display_name,
};
pub use consts::*;
pub use moon::{MoonPhase, moon_phase, moon_phases_on};
pub use range::{DateRange, RangeError};

use crate::prelude::*;
use std::str::FromStr;

/// A day in a campaign calendar.
///
/// Carries no calendar of its own: the same value means different things
/// under different calendars, so every calendar-aware operation takes the
/// [`Calendar`] explicitly. Field order gives the derived ordering its
/// `(year, month, day)` lexicographic meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{}-{:02}-{:02}", year, month, day)]
pub struct CalendarDate {
    /// Year number, negative before the reference era
    pub year:  i32,
    /// 1-based month index into the calendar's months
    pub month: u32,
    /// 1-based day of the month
    pub day:   u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ParseError {
    #[display(fmt = "Empty date string")]
    EmptyInput,
    #[display(fmt = "Invalid date format: {_0}")]
    InvalidFormat(String),
    #[display(fmt = "Invalid {} component: {:?}", _0, _1)]
    InvalidComponent(&'static str, String),
}

impl std::error::Error for ParseError {}

impl CalendarDate {
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Helper to parse one numeric component of the canonical form
    fn parse_component<T: FromStr>(part: &str, name: &'static str, max_digits: usize) -> Result<T, ParseError> {
        if part.is_empty() || part.len() > max_digits || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidComponent(name, part.to_owned()));
        }
        part.parse::<T>()
            .map_err(|_| ParseError::InvalidComponent(name, part.to_owned()))
    }
}

impl FromStr for CalendarDate {
    type Err = ParseError;

    /// Parses the canonical `[-]Y-M-D` form. Only the shape is checked here;
    /// whether the month and day exist is a question for a [`Calendar`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let (negative, unsigned) = match s.strip_prefix(NEGATIVE_YEAR_SIGN) {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let parts: Vec<&str> = unsigned.split(DATE_SEPARATOR).collect();
        let [year, month, day] = parts.as_slice() else {
            return Err(ParseError::InvalidFormat(format!(
                "expected 2 {DATE_SEPARATOR} separators, found {}: {s}",
                parts.len() - 1
            )));
        };

        let year = Self::parse_component::<i32>(year, "year", MAX_YEAR_DIGITS)?;
        let month = Self::parse_component::<u32>(month, "month", MAX_MONTH_DIGITS)?;
        let day = Self::parse_component::<u32>(day, "day", MAX_DAY_DIGITS)?;

        Ok(Self {
            year: if negative { -year } else { year },
            month,
            day,
        })
    }
}

/// Parses a canonical date string, yielding `None` for anything malformed.
///
/// Callers treat `None` as "no date": a bad stored value never aborts a
/// render.
pub fn parse_date(s: &str) -> Option<CalendarDate> {
    s.parse().ok()
}

/// Renders the storage form: signed unpadded year, month and day padded to 2 digits.
pub fn format_date_canonical(date: CalendarDate) -> String {
    date.to_string()
}

pub fn is_same_date(a: CalendarDate, b: CalendarDate) -> bool {
    a == b
}

pub fn is_date_before(a: CalendarDate, b: CalendarDate) -> bool {
    a < b
}

pub fn is_date_after(a: CalendarDate, b: CalendarDate) -> bool {
    a > b
}

impl serde::Serialize for CalendarDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for CalendarDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
