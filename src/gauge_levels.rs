//! Time-of-day to drive-level translation for the three meters.
//!
//! Moving-coil meters do not deflect linearly with PWM duty, so the hour and minute meters use
//! hand-calibrated tables. The second meter sweeps continuously and uses a straight linear map.

use crate::shared_constants::{MILLIS_PER_MINUTE, MILLIS_PER_SECOND};

/// 8-bit drive intensity; 0 is no deflection, 255 is full scale.
pub type DriveLevel = u8;

/// One of the three meters (and the drive channel feeding it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gauge {
    Hour,
    Minute,
    Second,
}

impl Gauge {
    /// All gauges, in self-test order.
    pub const ALL: [Self; 3] = [Self::Hour, Self::Minute, Self::Second];
}

/// Drive level for hours 1 through 12 (index 0 is 1 o'clock).
pub const HOUR_LEVELS: [DriveLevel; 12] = [0, 22, 44, 67, 92, 117, 142, 166, 189, 212, 233, 255];

/// Drive level for minutes 0 through 59.
pub const MINUTE_LEVELS: [DriveLevel; 60] = [
    0, 4, 9, 13, 17, 20, 24, 29, 33, 37, 41, 45, 49, 53, 57, //
    62, 66, 71, 75, 79, 83, 87, 92, 96, 100, 105, 109, 114, 118, 123, //
    127, 131, 136, 140, 144, 149, 153, 157, 162, 166, 170, 175, 179, 184, 188, //
    193, 198, 202, 206, 210, 214, 219, 223, 227, 231, 235, 240, 244, 248, 251,
];

/// Target levels for one control-loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Targets {
    pub hour: DriveLevel,
    pub minute: DriveLevel,
    pub second: DriveLevel,
}

impl Targets {
    /// Target for a single gauge.
    #[must_use]
    pub const fn get(&self, gauge: Gauge) -> DriveLevel {
        match gauge {
            Gauge::Hour => self.hour,
            Gauge::Minute => self.minute,
            Gauge::Second => self.second,
        }
    }
}

/// Convert a 24-hour value to the 1..=12 dial position. Midnight and noon both map to 12.
#[must_use]
#[expect(
    clippy::integer_division_remainder_used,
    reason = "12-hour wraparound is a modulo by definition"
)]
pub fn normalize12(hour: u8) -> u8 {
    debug_assert!(hour < 24, "hour out of range");
    if hour == 0 || hour == 12 { 12 } else { hour % 12 }
}

/// Calibrated level for a dial hour (1..=12).
#[must_use]
#[expect(clippy::indexing_slicing, reason = "index clamped to table length")]
pub fn hour_level(hour12: u8) -> DriveLevel {
    debug_assert!((1..=12).contains(&hour12), "hour12 out of range");
    let index = usize::from(hour12.clamp(1, 12).saturating_sub(1));
    HOUR_LEVELS[index]
}

/// Calibrated level for a minute (0..=59).
#[must_use]
#[expect(clippy::indexing_slicing, reason = "index clamped to table length")]
pub fn minute_level(minute: u8) -> DriveLevel {
    debug_assert!(minute < 60, "minute out of range");
    MINUTE_LEVELS[usize::from(minute.min(59))]
}

/// Proportionally map `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// `value` is clamped to the input range first, so the result always lies in the output range.
/// Integer division truncates toward `out_min`.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "scaled never exceeds the u32 output span"
)]
pub const fn linear_map(value: u32, in_min: u32, in_max: u32, out_min: u32, out_max: u32) -> u32 {
    if in_max <= in_min {
        return out_min;
    }
    let value = if value < in_min {
        in_min
    } else if value > in_max {
        in_max
    } else {
        value
    };
    let span_in = in_max.saturating_sub(in_min) as u64;
    let span_out = out_max.saturating_sub(out_min) as u64;
    let offset = value.saturating_sub(in_min) as u64;
    // Both factors fit in 32 bits, so the product cannot saturate.
    match offset.saturating_mul(span_out).checked_div(span_in) {
        Some(scaled) => out_min.saturating_add(scaled as u32),
        None => out_min,
    }
}

/// Second-hand level: a continuous sweep over the minute.
///
/// `elapsed_ms` is the time since the RTC second last changed; it is clamped below one second so
/// interpolation never runs into the next second.
#[must_use]
pub fn second_level(second: u8, elapsed_ms: u32) -> DriveLevel {
    debug_assert!(second < 60, "second out of range");
    let ms_into_minute = u32::from(second.min(59))
        .saturating_mul(MILLIS_PER_SECOND)
        .saturating_add(elapsed_ms.min(MILLIS_PER_SECOND.saturating_sub(1)));
    let level = linear_map(ms_into_minute, 0, MILLIS_PER_MINUTE, 0, u32::from(DriveLevel::MAX));
    DriveLevel::try_from(level).unwrap_or(DriveLevel::MAX)
}

/// Compute all three targets for a time of day.
#[must_use]
pub fn targets_for(hour: u8, minute: u8, second: u8, elapsed_ms: u32) -> Targets {
    Targets {
        hour: hour_level(normalize12(hour)),
        minute: minute_level(minute),
        second: second_level(second, elapsed_ms),
    }
}
