//! Lunar phases for the moons of a campaign calendar.

use crate::arithmetic::day_of_year;
use crate::calendar::{Calendar, Moon};
use crate::consts::PHASE_BOUNDARIES;
use crate::prelude::*;
use crate::CalendarDate;
use tracing::debug;

/// One of the eight named phases of a moon, in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum MoonPhase {
    #[display(fmt = "New Moon")]
    NewMoon,
    #[display(fmt = "Waxing Crescent")]
    WaxingCrescent,
    #[display(fmt = "First Quarter")]
    FirstQuarter,
    #[display(fmt = "Waxing Gibbous")]
    WaxingGibbous,
    #[display(fmt = "Full Moon")]
    FullMoon,
    #[display(fmt = "Waning Gibbous")]
    WaningGibbous,
    #[display(fmt = "Last Quarter")]
    LastQuarter,
    #[display(fmt = "Waning Crescent")]
    WaningCrescent,
}

impl MoonPhase {
    /// All phases, starting from new moon
    pub const ALL: [Self; 8] = [
        Self::NewMoon,
        Self::WaxingCrescent,
        Self::FirstQuarter,
        Self::WaxingGibbous,
        Self::FullMoon,
        Self::WaningGibbous,
        Self::LastQuarter,
        Self::WaningCrescent,
    ];

    /// Buckets a position in the cycle, `0.0..1.0`, into a phase.
    ///
    /// Bins are 0.125 wide and centred on multiples of 0.125, so the new moon
    /// bin straddles the wraparound: below 0.0625 or from 0.9375 up.
    pub fn from_fraction(fraction: f64) -> Self {
        PHASE_BOUNDARIES
            .iter()
            .zip(Self::ALL)
            .find(|(edge, _)| fraction < **edge)
            .map_or(Self::NewMoon, |(_, phase)| phase)
    }
}

/// Phase of `moon` on the given day of the year.
///
/// A moon with a zero cycle never leaves its new phase.
pub fn moon_phase(day_of_year: i64, moon: &Moon) -> MoonPhase {
    if moon.cycle == 0 {
        debug!(moon = %moon.name, "moon has no cycle, reporting new moon");
        return MoonPhase::NewMoon;
    }

    let cycle = i64::from(moon.cycle);
    let adjusted = (day_of_year.rem_euclid(cycle) + i64::from(moon.shift)).rem_euclid(cycle);
    let adjusted = u32::try_from(adjusted).unwrap_or_default();

    MoonPhase::from_fraction(f64::from(adjusted) / f64::from(moon.cycle))
}

/// Phase of every moon of `calendar` on `date`, in the calendar's moon order
pub fn moon_phases_on(date: CalendarDate, calendar: &Calendar) -> Vec<(&Moon, MoonPhase)> {
    let day = day_of_year(date, calendar);
    calendar.moons.iter().map(|moon| (moon, moon_phase(day, moon))).collect()
}
