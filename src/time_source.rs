//! Time acquisition for the needle controller.
//!
//! A [`WallClock`] (normally the DS1307) only knows whole seconds. [`SweepTimeSource`] pairs it
//! with a [`MonotonicClock`] and remembers when the second last changed, which is what lets the
//! second meter sweep smoothly between RTC ticks.

use crate::Result;

/// A free-running millisecond counter. Wraps at `u32::MAX`; callers use wrapping subtraction.
pub trait MonotonicClock {
    /// Milliseconds since an arbitrary epoch.
    fn now_ms(&self) -> u32;
}

impl<T: MonotonicClock + ?Sized> MonotonicClock for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// Source of the current time of day, to whole-second resolution.
pub trait WallClock {
    /// Read the current time of day.
    ///
    /// # Errors
    ///
    /// Returns an error if the clock cannot be read.
    fn time(&mut self) -> Result<time::Time>;
}

impl<T: WallClock + ?Sized> WallClock for &mut T {
    fn time(&mut self) -> Result<time::Time> {
        (**self).time()
    }
}

/// A time-of-day snapshot taken once per control-loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockReading {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Monotonic timestamp of the poll that produced this reading.
    pub sampled_at_ms: u32,
}

impl ClockReading {
    /// Build a reading. Values must be a valid 24-hour time of day.
    #[must_use]
    pub fn new(hour: u8, minute: u8, second: u8, sampled_at_ms: u32) -> Self {
        debug_assert!(hour < 24 && minute < 60 && second < 60, "invalid time of day");
        Self {
            hour,
            minute,
            second,
            sampled_at_ms,
        }
    }

    /// Build a reading from a [`time::Time`]. Leap seconds are folded into second 59.
    #[must_use]
    pub fn from_time(time: time::Time, sampled_at_ms: u32) -> Self {
        Self::new(
            time.hour(),
            time.minute(),
            time.second().min(59),
            sampled_at_ms,
        )
    }
}

/// What the needle controller polls each iteration.
pub trait TimeSource {
    /// Take a fresh reading.
    ///
    /// # Errors
    ///
    /// Returns an error if no reading is available this iteration. The controller then holds every
    /// gauge where it is.
    fn poll(&mut self) -> Result<ClockReading>;

    /// Milliseconds since the reading's second value last changed.
    fn millis_since_last_second_change(&self) -> u32;
}

/// A [`TimeSource`] that interpolates between the whole seconds of a [`WallClock`].
pub struct SweepTimeSource<W, M> {
    wall_clock: W,
    clock: M,
    last_second: Option<u8>,
    last_second_change_ms: u32,
}

impl<W: WallClock, M: MonotonicClock> SweepTimeSource<W, M> {
    /// Wrap a wall clock and a monotonic clock.
    #[must_use]
    pub const fn new(wall_clock: W, clock: M) -> Self {
        Self {
            wall_clock,
            clock,
            last_second: None,
            last_second_change_ms: 0,
        }
    }

    /// Borrow the wall clock.
    pub const fn wall_clock_mut(&mut self) -> &mut W {
        &mut self.wall_clock
    }

    /// Give back the wall clock and monotonic clock.
    pub fn into_inner(self) -> (W, M) {
        (self.wall_clock, self.clock)
    }
}

impl<W: WallClock, M: MonotonicClock> TimeSource for SweepTimeSource<W, M> {
    fn poll(&mut self) -> Result<ClockReading> {
        let time = self.wall_clock.time()?;
        let now_ms = self.clock.now_ms();
        let reading = ClockReading::from_time(time, now_ms);

        // Any change counts, including the 59 -> 0 rollover.
        if self.last_second != Some(reading.second) {
            if self.last_second.is_none() {
                debug!(
                    "First reading {}:{}:{}",
                    reading.hour, reading.minute, reading.second
                );
            }
            self.last_second = Some(reading.second);
            self.last_second_change_ms = now_ms;
        }

        Ok(reading)
    }

    fn millis_since_last_second_change(&self) -> u32 {
        self.clock.now_ms().wrapping_sub(self.last_second_change_ms)
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;
    use crate::Error;

    struct TestClock(Cell<u32>);

    impl MonotonicClock for TestClock {
        fn now_ms(&self) -> u32 {
            self.0.get()
        }
    }

    struct FixedWallClock(Option<time::Time>);

    impl WallClock for FixedWallClock {
        fn time(&mut self) -> Result<time::Time> {
            self.0.ok_or(Error::RtcNotFound)
        }
    }

    fn hms(hour: u8, minute: u8, second: u8) -> Option<time::Time> {
        time::Time::from_hms(hour, minute, second).ok()
    }

    #[test]
    #[should_panic(expected = "invalid time of day")]
    fn reading_rejects_hour_24() {
        let _ = ClockReading::new(24, 0, 0, 0);
    }

    #[test]
    fn elapsed_restarts_when_second_changes() {
        let clock = TestClock(Cell::new(1_000));
        let mut source = SweepTimeSource::new(FixedWallClock(hms(3, 30, 15)), &clock);

        let reading = source.poll().unwrap();
        assert_eq!(reading, ClockReading::new(3, 30, 15, 1_000));
        assert_eq!(source.millis_since_last_second_change(), 0);

        clock.0.set(1_400);
        source.poll().unwrap();
        assert_eq!(source.millis_since_last_second_change(), 400);

        source.wall_clock_mut().0 = hms(3, 30, 16);
        clock.0.set(1_950);
        source.poll().unwrap();
        assert_eq!(source.millis_since_last_second_change(), 0);
    }

    #[test]
    fn minute_rollover_resets_elapsed() {
        let clock = TestClock(Cell::new(5_000));
        let mut source = SweepTimeSource::new(FixedWallClock(hms(10, 4, 59)), &clock);
        source.poll().unwrap();
        clock.0.set(5_800);
        source.wall_clock_mut().0 = hms(10, 5, 0);
        let reading = source.poll().unwrap();
        assert_eq!(reading.second, 0);
        assert_eq!(source.millis_since_last_second_change(), 0);
    }

    #[test]
    fn elapsed_survives_counter_wraparound() {
        let clock = TestClock(Cell::new(u32::MAX - 99));
        let mut source = SweepTimeSource::new(FixedWallClock(hms(1, 2, 3)), &clock);
        source.poll().unwrap();
        clock.0.set(200);
        assert_eq!(source.millis_since_last_second_change(), 300);
    }

    #[test]
    fn failed_poll_keeps_tracker() {
        let clock = TestClock(Cell::new(0));
        let mut source = SweepTimeSource::new(FixedWallClock(hms(1, 2, 3)), &clock);
        source.poll().unwrap();
        source.wall_clock_mut().0 = None;
        clock.0.set(700);
        assert!(matches!(source.poll(), Err(Error::RtcNotFound)));
        assert_eq!(source.millis_since_last_second_change(), 700);
    }
}
