use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    CalendarDate, ParseError, RANGE_SEPARATOR,
    arithmetic::{add_days, date_range, days_between},
    calendar::{Calendar, CalendarError},
    prelude::*,
};

/// An inclusive run of days: a festival, a journey, a weather log window.
/// The first day is never after the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{first}/{last}")]
pub struct DateRange {
    first: CalendarDate,
    last:  CalendarDate,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("Range ends ({last}) before it starts ({first})")]
    Reversed { first: CalendarDate, last: CalendarDate },

    #[error("Range {0:?} has no '{sep}' between its dates", sep = RANGE_SEPARATOR)]
    MissingSeparator(String),

    #[error("Range {input:?} has {found} '{sep}' separators, expected one", sep = RANGE_SEPARATOR)]
    ExtraSeparators { input: String, found: usize },

    #[error(transparent)]
    Date(#[from] ParseError),

    /// The calendar could not place one of the endpoints.
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

impl DateRange {
    /// # Errors
    /// Returns `RangeError::Reversed` if `first` is after `last`.
    pub fn new(first: CalendarDate, last: CalendarDate) -> Result<Self, RangeError> {
        if first > last {
            return Err(RangeError::Reversed { first, last });
        }
        Ok(Self { first, last })
    }

    /// Builds a range after renormalizing both endpoints in `calendar`, so a
    /// day past the end of its month counts as the day it stands for.
    ///
    /// # Errors
    /// Returns `RangeError::Calendar` if the calendar cannot place an
    /// endpoint, `RangeError::Reversed` if the normalized ends are out of order.
    pub fn in_calendar(first: CalendarDate, last: CalendarDate, calendar: &Calendar) -> Result<Self, RangeError> {
        Self::new(add_days(first, 0, calendar)?, add_days(last, 0, calendar)?)
    }

    /// The `days` long range beginning on `first`.
    ///
    /// # Errors
    /// Returns `RangeError::Calendar` if the arithmetic fails.
    pub fn spanning(first: CalendarDate, days: NonZeroU32, calendar: &Calendar) -> Result<Self, RangeError> {
        let first = add_days(first, 0, calendar)?;
        let last = add_days(first, i64::from(days.get()) - 1, calendar)?;
        Self::new(first, last)
    }

    pub const fn first(&self) -> CalendarDate {
        self.first
    }

    pub const fn last(&self) -> CalendarDate {
        self.last
    }

    pub fn contains(&self, date: &CalendarDate) -> bool {
        (self.first..=self.last).contains(date)
    }

    /// Whether the two ranges share at least one day
    pub fn overlaps(&self, other: &Self) -> bool {
        self.intersection(other).is_some()
    }

    /// The days both ranges cover, if any
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let first = self.first.max(other.first);
        let last = self.last.min(other.last);
        (first <= last).then_some(Self { first, last })
    }

    /// Number of days covered, both ends included
    pub fn len_days(&self, calendar: &Calendar) -> u64 {
        days_between(self.first, self.last, calendar) + 1
    }

    /// Every day of the range, in order.
    ///
    /// # Errors
    /// Returns the `CalendarError` raised while stepping through `calendar`.
    pub fn dates(&self, calendar: &Calendar) -> Result<Vec<CalendarDate>, CalendarError> {
        date_range(self.first, self.last, calendar)
    }
}

impl FromStr for DateRange {
    type Err = RangeError;

    /// Parses `first/last`, each side in canonical date form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let mut sides = input.split(RANGE_SEPARATOR);

        match (sides.next(), sides.next(), sides.next()) {
            (Some(first), Some(last), None) => Self::new(first.trim().parse()?, last.trim().parse()?),
            (_, None, _) => Err(RangeError::MissingSeparator(input.to_owned())),
            _ => Err(RangeError::ExtraSeparators {
                input: input.to_owned(),
                found: input.matches(RANGE_SEPARATOR).count(),
            }),
        }
    }
}

impl Serialize for DateRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DateRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
