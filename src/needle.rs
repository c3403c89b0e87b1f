//! Per-gauge needle state: instant rise, damped fall.
//!
//! Dropping the drive level of a moving-coil meter in one step makes the needle slam against its
//! stop. Rises are applied immediately; falls are spread over roughly
//! [`NeedleConfig::sweep_duration_ms`], one fixed decrement every
//! [`NeedleConfig::fall_interval_ms`].

use crate::DriveLevel;
use crate::shared_constants::{FALL_INTERVAL_MS, SWEEP_DURATION_MS};

/// Timing of the damped fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NeedleConfig {
    /// Approximate time for a full-scale fall (255 -> 0).
    pub sweep_duration_ms: u32,
    /// Minimum time between two fall decrements.
    pub fall_interval_ms: u32,
}

impl NeedleConfig {
    #[must_use]
    pub const fn new(sweep_duration_ms: u32, fall_interval_ms: u32) -> Self {
        Self {
            sweep_duration_ms,
            fall_interval_ms,
        }
    }

    /// Level removed per fall interval: `round(255 / (sweep / interval))`, at least 1.
    ///
    /// 750 ms over 100 ms intervals gives 34.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "step is checked against full scale before the cast"
    )]
    pub const fn fall_step(&self) -> DriveLevel {
        let full_scale = DriveLevel::MAX as u64;
        let sweep = self.sweep_duration_ms as u64;
        let Some(step) = full_scale
            .saturating_mul(self.fall_interval_ms as u64)
            .saturating_add(sweep.div_ceil(2))
            .checked_div(sweep)
        else {
            return DriveLevel::MAX;
        };
        if step == 0 {
            1
        } else if step > full_scale {
            DriveLevel::MAX
        } else {
            step as DriveLevel
        }
    }
}

impl Default for NeedleConfig {
    fn default() -> Self {
        Self::new(SWEEP_DURATION_MS, FALL_INTERVAL_MS)
    }
}

/// Drive state of one needle. Owned by the controller, never shared between gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GaugeState {
    current_level: DriveLevel,
    last_fall_update_ms: u32,
}

impl GaugeState {
    /// A needle resting at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current_level: 0,
            last_fall_update_ms: 0,
        }
    }

    /// The level most recently written to the drive.
    #[must_use]
    pub const fn current_level(&self) -> DriveLevel {
        self.current_level
    }

    /// Move one step toward `target`.
    ///
    /// Returns the new level when it changed (the caller must write it to the drive) and `None`
    /// when nothing should be written this iteration.
    pub fn advance(
        &mut self,
        target: DriveLevel,
        now_ms: u32,
        config: &NeedleConfig,
    ) -> Option<DriveLevel> {
        if target > self.current_level {
            self.current_level = target;
            return Some(target);
        }
        if target == self.current_level {
            return None;
        }

        let fall_step = config.fall_step();
        if fall_step > self.current_level {
            // Avoid wrapping below zero; also guarantees the fall ends exactly at 0.
            self.current_level = 0;
            return Some(0);
        }

        if now_ms.wrapping_sub(self.last_fall_update_ms) < config.fall_interval_ms {
            return None;
        }
        self.current_level = self.current_level.saturating_sub(fall_step);
        self.last_fall_update_ms = now_ms;
        trace!(
            "needle falling to {} (target {})",
            self.current_level, target
        );
        Some(self.current_level)
    }

    /// Force the level, as when something other than the fall policy drove the meter.
    ///
    /// Returns the new level if it changed.
    pub fn force(&mut self, level: DriveLevel) -> Option<DriveLevel> {
        if self.current_level == level {
            None
        } else {
            self.current_level = level;
            Some(level)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fall_step_is_34() {
        assert_eq!(NeedleConfig::default().fall_step(), 34);
    }

    #[test]
    fn fall_step_edge_configs() {
        assert_eq!(NeedleConfig::new(0, 100).fall_step(), 255);
        assert_eq!(NeedleConfig::new(100_000, 1).fall_step(), 1);
        assert_eq!(NeedleConfig::new(50, 100).fall_step(), 255);
        assert_eq!(NeedleConfig::new(1_000, 100).fall_step(), 26);
    }

    #[test]
    fn rise_is_immediate() {
        let config = NeedleConfig::default();
        let mut state = GaugeState::new();
        assert_eq!(state.advance(200, 0, &config), Some(200));
        assert_eq!(state.current_level(), 200);
    }

    #[test]
    fn equal_target_writes_nothing() {
        let config = NeedleConfig::default();
        let mut state = GaugeState::new();
        assert_eq!(state.advance(0, 0, &config), None);
        state.advance(90, 0, &config);
        assert_eq!(state.advance(90, 5_000, &config), None);
    }

    #[test]
    fn fall_waits_for_interval() {
        let config = NeedleConfig::default();
        let mut state = GaugeState::new();
        state.advance(255, 0, &config);
        assert_eq!(state.advance(0, 1_000, &config), Some(221));
        assert_eq!(state.advance(0, 1_050, &config), None);
        assert_eq!(state.advance(0, 1_099, &config), None);
        assert_eq!(state.advance(0, 1_100, &config), Some(187));
    }

    #[test]
    fn fall_clamps_to_zero_below_one_step() {
        let config = NeedleConfig::default();
        let mut state = GaugeState::new();
        state.advance(20, 0, &config);
        // Clamp happens without waiting for the interval.
        assert_eq!(state.advance(5, 0, &config), Some(0));
        assert_eq!(state.current_level(), 0);
    }

    #[test]
    fn fall_interval_is_wraparound_safe() {
        let config = NeedleConfig::default();
        let mut state = GaugeState::new();
        state.advance(255, 0, &config);
        assert_eq!(state.advance(0, u32::MAX - 50, &config), Some(221));
        assert_eq!(state.advance(0, 20, &config), None);
        assert_eq!(state.advance(0, 49, &config), Some(187));
    }

    #[test]
    fn force_reports_only_changes() {
        let mut state = GaugeState::new();
        assert_eq!(state.force(128), Some(128));
        assert_eq!(state.force(128), None);
    }
}
