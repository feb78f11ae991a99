/// Month length reported for a month index the calendar does not define
pub const FALLBACK_DAYS_IN_MONTH: u32 = 30;

/// First month of a year, months are 1-indexed
pub const FIRST_MONTH: u32 = 1;

/// First day of month, used for lower bounds
pub const MIN_DAY: u32 = 1;

/// Most digits a canonical year may carry (sign excluded)
pub const MAX_YEAR_DIGITS: usize = 5;
/// Most digits a canonical month may carry
pub const MAX_MONTH_DIGITS: usize = 2;
/// Most digits a canonical day may carry
pub const MAX_DAY_DIGITS: usize = 2;

/// Date component separator in the canonical `[-]Y-M-D` form
pub const DATE_SEPARATOR: char = '-';
/// Leading sign marking a year before the reference era
pub const NEGATIVE_YEAR_SIGN: char = '-';
/// Range separator, as in ISO 8601 intervals
pub const RANGE_SEPARATOR: char = '/';

/// Shortest moon cycle accepted by calendar validation, in days
pub const MIN_MOON_CYCLE: u32 = 1;
/// Longest moon cycle accepted by calendar validation, in days
pub const MAX_MOON_CYCLE: u32 = 365;

/// Upper bin edges for the waxing-to-waning phases. Anything at or above the
/// last edge wraps back around to a new moon.
pub(crate) const PHASE_BOUNDARIES: [f64; 8] = [
    0.0625, // new moon
    0.1875, // waxing crescent
    0.3125, // first quarter
    0.4375, // waxing gibbous
    0.5625, // full moon
    0.6875, // waning gibbous
    0.8125, // last quarter
    0.9375, // waning crescent
];
