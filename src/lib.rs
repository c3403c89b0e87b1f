//! Drive three analog meters (hour, minute, second) from a real-time clock.
//!
//! The heart of the crate is [`NeedleController`]: it turns a time of day into drive levels and
//! moves each needle there without slamming it downward, writing to the [`DriveSink`] only when
//! a level changes. Everything it talks to is a trait ([`TimeSource`], [`DriveSink`],
//! [`MonotonicClock`](time_source::MonotonicClock)), so the controller runs on the host as well
//! as on the Pico.
//!
//! With the `pico1` or `pico2` feature (both enable `embassy`) the crate also provides [`VuClock`], an Embassy task that
//! owns a DS1307 on I2C0 and three PWM outputs.
#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are in scope for every other module.
mod fmt;

mod controller;
pub mod drive_sink;
pub mod ds1307;
mod error;
pub mod gauge_levels;
pub mod needle;
#[cfg(feature = "embassy")]
pub mod pwm_gauge;
mod shared_constants;
pub mod time_source;
#[cfg(feature = "embassy")]
pub mod vu_clock;

// Re-export commonly used items
pub use controller::NeedleController;
pub use drive_sink::{DriveSink, PwmDriveSink};
pub use ds1307::Ds1307;
pub use error::{Error, Result};
pub use gauge_levels::{DriveLevel, Gauge, Targets};
pub use needle::{GaugeState, NeedleConfig};
#[cfg(feature = "embassy")]
pub use pwm_gauge::{PicoDriveSink, gauge_pwm_config, pico_drive_sink};
pub use self_test::run_self_test;
pub use shared_constants::*;
pub use time_source::{ClockReading, SweepTimeSource, TimeSource};
#[cfg(feature = "embassy")]
pub use vu_clock::{EmbassyClock, VuClock, VuClockStatic, VuClockStatus};
