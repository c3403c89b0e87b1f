//! The needle controller: time of day in, at most three drive writes out.
//!
//! See [`NeedleController`] for the per-iteration contract.

use crate::gauge_levels::targets_for;
use crate::needle::{GaugeState, NeedleConfig};
use crate::time_source::{ClockReading, TimeSource};
use crate::{DriveLevel, DriveSink, Gauge, Result, Targets};

/// Owns the state of all three needles and moves them toward the current time.
///
/// Each call to [`update`](Self::update) advances every gauge once and writes to the
/// [`DriveSink`] only for gauges whose level actually changed: rises land in one write, falls are
/// damped, and an unchanged level is never rewritten.
///
/// # Example
///
/// ```
/// use vu_clock::{DriveLevel, DriveSink, Gauge, NeedleConfig, NeedleController};
/// use vu_clock::time_source::ClockReading;
///
/// struct Meters([DriveLevel; 3]);
///
/// impl DriveSink for Meters {
///     fn set(&mut self, gauge: Gauge, level: DriveLevel) {
///         self.0[gauge as usize] = level;
///     }
/// }
///
/// let mut controller = NeedleController::new(NeedleConfig::default());
/// let mut meters = Meters([0; 3]);
///
/// // 12:00:00 puts the hour meter at full scale.
/// let reading = ClockReading::new(12, 0, 0, 0);
/// let targets = NeedleController::targets(&reading, 0);
/// let writes = controller.update(targets, reading.sampled_at_ms, &mut meters);
/// assert_eq!(writes, 1);
/// assert_eq!(meters.0, [255, 0, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct NeedleController {
    config: NeedleConfig,
    hour: GaugeState,
    minute: GaugeState,
    second: GaugeState,
}

impl NeedleController {
    /// All needles start at zero.
    #[must_use]
    pub const fn new(config: NeedleConfig) -> Self {
        Self {
            config,
            hour: GaugeState::new(),
            minute: GaugeState::new(),
            second: GaugeState::new(),
        }
    }

    /// The fall timing in use.
    #[must_use]
    pub const fn config(&self) -> &NeedleConfig {
        &self.config
    }

    /// The level currently driven on `gauge`.
    #[must_use]
    pub const fn level(&self, gauge: Gauge) -> DriveLevel {
        self.state(gauge).current_level()
    }

    /// Compute target levels for a reading, given the milliseconds since its second began.
    #[must_use]
    pub fn targets(reading: &ClockReading, elapsed_ms: u32) -> Targets {
        targets_for(reading.hour, reading.minute, reading.second, elapsed_ms)
    }

    /// Advance every gauge once toward `targets`. Returns the number of drive writes issued.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "at most one write per gauge"
    )]
    pub fn update<S: DriveSink + ?Sized>(
        &mut self,
        targets: Targets,
        now_ms: u32,
        sink: &mut S,
    ) -> usize {
        let config = self.config;
        let mut writes = 0;
        for gauge in Gauge::ALL {
            let state = self.state_mut(gauge);
            if let Some(level) = state.advance(targets.get(gauge), now_ms, &config) {
                sink.set(gauge, level);
                writes += 1;
            }
        }
        writes
    }

    /// One full control-loop iteration: poll, compute targets, update.
    ///
    /// # Errors
    ///
    /// Propagates the time source's error. In that case nothing is written and every gauge holds
    /// its last level.
    pub fn step<T, S>(&mut self, source: &mut T, sink: &mut S) -> Result<Targets>
    where
        T: TimeSource + ?Sized,
        S: DriveSink + ?Sized,
    {
        let reading = source.poll()?;
        let elapsed_ms = source.millis_since_last_second_change();
        let targets = Self::targets(&reading, elapsed_ms);
        let writes = self.update(targets, reading.sampled_at_ms, sink);
        if writes > 0 {
            trace!("{} -> {} writes", targets, writes);
        }
        Ok(targets)
    }

    /// Drive every gauge to `level` at once, bypassing the fall damping.
    ///
    /// Used to park the meters (for example at the fault level) or to record what a self test
    /// left on the meters. Later falls from `level` are damped as usual.
    pub fn hold_all<S: DriveSink + ?Sized>(&mut self, level: DriveLevel, sink: &mut S) {
        debug!("Holding all gauges at {}", level);
        for gauge in Gauge::ALL {
            if let Some(level) = self.state_mut(gauge).force(level) {
                sink.set(gauge, level);
            }
        }
    }

    const fn state(&self, gauge: Gauge) -> &GaugeState {
        match gauge {
            Gauge::Hour => &self.hour,
            Gauge::Minute => &self.minute,
            Gauge::Second => &self.second,
        }
    }

    const fn state_mut(&mut self, gauge: Gauge) -> &mut GaugeState {
        match gauge {
            Gauge::Hour => &mut self.hour,
            Gauge::Minute => &mut self.minute,
            Gauge::Second => &mut self.second,
        }
    }
}

impl Default for NeedleController {
    fn default() -> Self {
        Self::new(NeedleConfig::default())
    }
}
