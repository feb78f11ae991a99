use crate::consts::{FALLBACK_DAYS_IN_MONTH, FIRST_MONTH, MAX_MOON_CYCLE, MIN_MOON_CYCLE};
use crate::CalendarDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::debug;

/// One month of a calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthDef {
    pub name:        String,
    pub length:      u32,
    /// Festival or leap-style month. Carried for display, counted like any other month.
    #[serde(default)]
    pub intercalary: bool,
}

/// A moon with its own period and phase offset, in days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moon {
    pub name:  String,
    pub cycle: u32,
    #[serde(default)]
    pub shift: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A named span of months. `month_start > month_end` wraps past the year end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub name:        String,
    pub month_start: u32,
    pub month_end:   u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color:       Option<String>,
}

impl Season {
    /// Whether the 1-based `month` falls inside this season
    pub const fn contains_month(&self, month: u32) -> bool {
        if self.month_start <= self.month_end {
            self.month_start <= month && month <= self.month_end
        } else {
            month >= self.month_start || month <= self.month_end
        }
    }
}

/// A campaign's calendar system.
///
/// Persisted field names are camelCase. Only `months` is required; every
/// other field falls back to an empty or disabled default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub months:           Vec<MonthDef>,
    /// Weekday names; the week is as long as this list. Empty disables weekdays.
    #[serde(default)]
    pub weekdays:         Vec<String>,
    /// Era names for individual years
    #[serde(default)]
    pub years:            BTreeMap<i32, String>,
    /// Alternate display names keyed by 1-based month index
    #[serde(default)]
    pub month_aliases:    BTreeMap<u32, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix:           Option<String>,
    #[serde(default)]
    pub has_leap_year:    bool,
    /// Leap years recur every this many years
    #[serde(default)]
    pub leap_year_offset: Option<u32>,
    /// First leap year; earlier years are never leap years
    #[serde(default)]
    pub leap_year_start:  Option<i32>,
    #[serde(default)]
    pub leap_year_amount: Option<u32>,
    #[serde(default)]
    pub leap_year_month:  Option<u32>,
    /// Weekday index of year 1, month 1, day 1
    #[serde(default)]
    pub start_offset:     u32,
    /// When set the year before 1 is -1
    #[serde(default)]
    pub skip_year_zero:   bool,
    #[serde(default)]
    pub moons:            Vec<Moon>,
    #[serde(default)]
    pub seasons:          Vec<Season>,
}

/// Error type for calendar definitions and date arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// Day arithmetic needs at least one month.
    #[error("Calendar defines no months")]
    NoMonths,

    /// Every month has length 0, so no day can be reached.
    #[error("Calendar year has no days")]
    EmptyYear,

    #[error("Month {month} is outside the calendar (must be 1-{count})")]
    MonthOutOfRange { month: u32, count: usize },

    #[error("Date arithmetic overflowed")]
    Overflow,

    #[error("Start offset {offset} must be below the week length {week_length}")]
    InvalidStartOffset { offset: u32, week_length: usize },

    #[error("Moon {name:?} has cycle {cycle} (must be {min}-{max})", min = MIN_MOON_CYCLE, max = MAX_MOON_CYCLE)]
    InvalidMoonCycle { name: String, cycle: u32 },

    #[error("Moon {name:?} has shift {shift} (must be below its cycle {cycle})")]
    InvalidMoonShift { name: String, shift: u32, cycle: u32 },

    #[error("Season {name:?} references month {month} (must be 1-{count})")]
    InvalidSeasonMonth { name: String, month: u32, count: usize },

    #[error("Leap years are enabled with a leap year offset of 0")]
    InvalidLeapYearOffset,

    #[error("Invalid calendar JSON: {0}")]
    Json(String),
}

impl Calendar {
    /// Loads a calendar from its persisted JSON form and validates it.
    ///
    /// # Errors
    /// Returns `CalendarError::Json` for malformed JSON, or the first
    /// structural problem reported by [`Calendar::validate`].
    pub fn from_json(json: &str) -> Result<Self, CalendarError> {
        let calendar: Self = serde_json::from_str(json).map_err(|e| CalendarError::Json(e.to_string()))?;
        calendar.validate()?;
        Ok(calendar)
    }

    /// Number of months in a year
    pub fn month_count(&self) -> u32 {
        u32::try_from(self.months.len()).unwrap_or(u32::MAX)
    }

    /// Returns the definition of the 1-based `month`, if the calendar has it
    pub fn month(&self, month: u32) -> Option<&MonthDef> {
        let index = usize::try_from(month.checked_sub(FIRST_MONTH)?).ok()?;
        self.months.get(index)
    }

    /// Whether the 1-based `month` is flagged intercalary
    pub fn is_intercalary(&self, month: u32) -> bool {
        self.month(month).is_some_and(|m| m.intercalary)
    }

    /// Checks the structural invariants date arithmetic and rendering rely on.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), CalendarError> {
        if self.months.is_empty() {
            return Err(CalendarError::NoMonths);
        }
        if days_in_year(self) == 0 {
            return Err(CalendarError::EmptyYear);
        }

        let week_length = self.weekdays.len();
        if week_length > 0 && usize::try_from(self.start_offset).map_or(true, |o| o >= week_length) {
            return Err(CalendarError::InvalidStartOffset {
                offset: self.start_offset,
                week_length,
            });
        }

        for moon in &self.moons {
            if !(MIN_MOON_CYCLE..=MAX_MOON_CYCLE).contains(&moon.cycle) {
                return Err(CalendarError::InvalidMoonCycle {
                    name:  moon.name.clone(),
                    cycle: moon.cycle,
                });
            }
            if moon.shift >= moon.cycle {
                return Err(CalendarError::InvalidMoonShift {
                    name:  moon.name.clone(),
                    shift: moon.shift,
                    cycle: moon.cycle,
                });
            }
        }

        for season in &self.seasons {
            for month in [season.month_start, season.month_end] {
                if self.month(month).is_none() {
                    return Err(CalendarError::InvalidSeasonMonth {
                        name: season.name.clone(),
                        month,
                        count: self.months.len(),
                    });
                }
            }
        }

        if self.has_leap_year && self.leap_year_offset == Some(0) {
            return Err(CalendarError::InvalidLeapYearOffset);
        }

        Ok(())
    }
}

/// Length of the 1-based `month`, or 30 for a month the calendar lacks.
///
/// Leap days are never folded in here; combine with [`is_leap_year`] if needed.
pub fn days_in_month(month: u32, calendar: &Calendar) -> u32 {
    calendar.month(month).map_or_else(
        || {
            debug!(month, count = calendar.months.len(), "month outside calendar, using fallback length");
            FALLBACK_DAYS_IN_MONTH
        },
        |m| m.length,
    )
}

/// Sum of all month lengths, without leap days
pub fn days_in_year(calendar: &Calendar) -> u32 {
    calendar.months.iter().map(|m| m.length).sum()
}

/// Weekday name for a day index, wrapping around the week.
/// Without weekdays every index renders as `Day {index}`.
pub fn weekday_name(day_index: i64, calendar: &Calendar) -> Cow<'_, str> {
    let week_length = i64::try_from(calendar.weekdays.len()).unwrap_or(i64::MAX);
    if week_length == 0 {
        debug!(day_index, "calendar has no weekdays, using fallback name");
        return Cow::Owned(format!("Day {day_index}"));
    }

    usize::try_from(day_index.rem_euclid(week_length))
        .ok()
        .and_then(|i| calendar.weekdays.get(i))
        .map_or_else(|| Cow::Owned(format!("Day {day_index}")), |name| Cow::Borrowed(name.as_str()))
}

/// The month's own name, or `Month {month}` if the calendar lacks it. Aliases are ignored.
pub fn month_display_name(month: u32, calendar: &Calendar) -> Cow<'_, str> {
    calendar
        .month(month)
        .map_or_else(|| Cow::Owned(format!("Month {month}")), |m| Cow::Borrowed(m.name.as_str()))
}

/// Like [`month_display_name`], but a configured alias wins.
pub fn month_display_name_with_alias(month: u32, calendar: &Calendar) -> Cow<'_, str> {
    match calendar.month_aliases.get(&month) {
        Some(alias) => Cow::Borrowed(alias.as_str()),
        None => month_display_name(month, calendar),
    }
}

/// The era name configured for `year`, or the number itself
pub fn year_display_name(year: i32, calendar: &Calendar) -> Cow<'_, str> {
    calendar
        .years
        .get(&year)
        .map_or_else(|| Cow::Owned(year.to_string()), |name| Cow::Borrowed(name.as_str()))
}

/// Human form: `{day} {month}, {year}` plus the calendar suffix when one is set.
pub fn format_date(date: CalendarDate, calendar: &Calendar) -> String {
    let mut out = format!(
        "{} {}, {}",
        date.day,
        month_display_name(date.month, calendar),
        year_display_name(date.year, calendar)
    );
    if let Some(suffix) = calendar.suffix.as_deref().filter(|s| !s.is_empty()) {
        out.push(' ');
        out.push_str(suffix);
    }
    out
}

/// Whether `year` is a leap year.
///
/// Requires leap years enabled with both an offset and a start year. Years
/// before the start are never leap years.
pub fn is_leap_year(year: i32, calendar: &Calendar) -> bool {
    if !calendar.has_leap_year {
        return false;
    }
    let (Some(offset), Some(start)) = (calendar.leap_year_offset, calendar.leap_year_start) else {
        return false;
    };
    if offset == 0 {
        return false;
    }

    let delta = i64::from(year) - i64::from(start);
    delta >= 0 && delta % i64::from(offset) == 0
}

/// First season whose month span contains the 1-based `month`
pub fn season_for_month(month: u32, calendar: &Calendar) -> Option<&Season> {
    calendar.seasons.iter().find(|s| s.contains_month(month))
}
