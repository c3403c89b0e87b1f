//! Hardware-PWM meter outputs for RP2040 / RP2350 using Embassy.
//! - 8-bit resolution (`top = 255`), so one PWM count is one drive level
//! - Clock-independent: computes the divider from `clk_sys` for a ~2 kHz carrier
//! - Two meters can share a slice (channels A and B)

use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::pwm::{Config, Pwm, PwmOutput};

use crate::drive_sink::PwmDriveSink;
use crate::shared_constants::GAUGE_PWM_TARGET_HZ;
use crate::{DriveLevel, Error, Result};

/// Counter wrap value: 256 steps per period, matching [`DriveLevel`].
pub const GAUGE_PWM_TOP: u16 = DriveLevel::MAX as u16;

/// A single meter output.
pub type GaugePwm = PwmOutput<'static>;

/// The drive sink the `VuClock` device writes to.
pub type PicoDriveSink = PwmDriveSink<GaugePwm, GaugePwm, GaugePwm>;

/// PWM slice configuration for meter outputs. Both channels start at 0% duty.
#[must_use]
pub fn gauge_pwm_config() -> Config {
    let clk = u64::from(clk_sys_freq()); // Hz
    let period_counts = u64::from(GAUGE_PWM_TOP) + 1;
    let divider = u8::try_from((clk / (period_counts * u64::from(GAUGE_PWM_TARGET_HZ))).max(1))
        .unwrap_or(u8::MAX);

    let mut cfg = Config::default();
    cfg.top = GAUGE_PWM_TOP;
    cfg.phase_correct = false;
    cfg.divider = divider.into();
    cfg.compare_a = 0;
    cfg.compare_b = 0;
    cfg.enable = true;

    info!("gauge pwm clk={}Hz div={} top={}", clk, divider, GAUGE_PWM_TOP);
    cfg
}

/// Build the drive sink from one slice driving hour (A) and minute (B), and one slice whose
/// channel A drives the second meter.
///
/// # Errors
///
/// Returns [`Error::PwmChannelMissing`] if a slice was created without the needed channel.
pub fn pico_drive_sink(hour_minute: Pwm<'static>, second: Pwm<'static>) -> Result<PicoDriveSink> {
    let (hour, minute) = hour_minute.split();
    let (second, _) = second.split();
    match (hour, minute, second) {
        (Some(hour), Some(minute), Some(second)) => Ok(PwmDriveSink::new(hour, minute, second)),
        _ => Err(Error::PwmChannelMissing),
    }
}
