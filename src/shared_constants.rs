use crate::DriveLevel;

// Needle damping: a full-scale fall (255 -> 0) takes about SWEEP_DURATION_MS, advancing once
// every FALL_INTERVAL_MS.
pub const SWEEP_DURATION_MS: u32 = 750;
pub const FALL_INTERVAL_MS: u32 = 100;

/// Drive level every meter is parked at while the real-time clock is missing.
pub const FAULT_LEVEL: DriveLevel = 128;

/// Pause between control-loop iterations on hardware.
pub const LOOP_DELAY_MS: u32 = 10;

// Start-up meter sweep.
pub const SELF_TEST_STEP_US: u32 = 3_000;
pub const SELF_TEST_PEAK_PAUSE_US: u32 = 5_000;

/// Length of one second-hand sweep cycle.
pub const MILLIS_PER_MINUTE: u32 = 60_000;
pub const MILLIS_PER_SECOND: u32 = 1_000;

/// 7-bit I2C address of the DS1307.
pub const DS1307_ADDRESS: u8 = 0x68;

/// Pause between attempts to find a missing real-time clock.
pub const RTC_RETRY_DELAY_MS: u32 = 1_000;

/// PWM carrier for the meters. Moving-coil movements average it out; anything in the low kHz works.
pub const GAUGE_PWM_TARGET_HZ: u32 = 2_000;
