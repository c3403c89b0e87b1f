//! A device abstraction that shows the DS1307 time on three analog meters.
//!
//! See [`VuClock`] for usage.

use embassy_executor::{SpawnError, Spawner};
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Delay, Instant, Timer};

use crate::ds1307::Ds1307;
use crate::pwm_gauge::PicoDriveSink;
use crate::self_test::run_self_test;
use crate::shared_constants::{FAULT_LEVEL, LOOP_DELAY_MS, RTC_RETRY_DELAY_MS};
use crate::time_source::{MonotonicClock, SweepTimeSource};
use crate::{NeedleConfig, NeedleController};

/// The I2C bus the real-time clock hangs off.
pub type VuClockI2c = I2c<'static, I2C0, Blocking>;

/// [`MonotonicClock`] over the Embassy time driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl MonotonicClock for EmbassyClock {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "wrapping millisecond counter"
    )]
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}

/// What the clock is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum VuClockStatus {
    /// Meters follow the real-time clock.
    Running,
    /// The real-time clock is missing or unreadable. At start-up the meters are parked at
    /// [`FAULT_LEVEL`]; otherwise they hold their last levels.
    RtcUnavailable,
}

type StatusSignal = Signal<CriticalSectionRawMutex, VuClockStatus>;

/// Static resources for [`VuClock`].
pub struct VuClockStatic {
    status: StatusSignal,
}

impl VuClockStatic {
    /// Create static resources for the clock device.
    #[must_use]
    pub const fn new_static() -> Self {
        Self {
            status: Signal::new(),
        }
    }
}

/// A device abstraction that drives hour, minute and second meters from a DS1307.
///
/// The device task optionally sweeps every meter once, then polls the RTC every
/// [`LOOP_DELAY_MS`] and moves the needles with a [`NeedleController`]. If the RTC cannot be
/// found the meters are parked at mid-scale and the task keeps looking for it.
///
/// # Example
///
/// ```no_run
/// # #![no_std]
/// # #![no_main]
/// use embassy_rp::i2c::{self, I2c};
/// use embassy_rp::pwm::Pwm;
/// use vu_clock::{VuClock, VuClockStatic, gauge_pwm_config, pico_drive_sink};
/// # #[panic_handler]
/// # fn panic(_info: &core::panic::PanicInfo) -> ! { loop {} }
///
/// async fn demo(p: embassy_rp::Peripherals, spawner: embassy_executor::Spawner) -> vu_clock::Result<()> {
///     static VU_CLOCK_STATIC: VuClockStatic = VuClock::new_static();
///     let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c::Config::default());
///     let sink = pico_drive_sink(
///         Pwm::new_output_ab(p.PWM_SLICE1, p.PIN_2, p.PIN_3, gauge_pwm_config()),
///         Pwm::new_output_a(p.PWM_SLICE3, p.PIN_6, gauge_pwm_config()),
///     )?;
///     let vu_clock = VuClock::new(&VU_CLOCK_STATIC, i2c, sink, true, spawner)?;
///     loop {
///         let status = vu_clock.wait().await;
///         defmt::info!("clock status: {}", status);
///     }
/// }
/// ```
pub struct VuClock {
    status: &'static StatusSignal,
}

impl VuClock {
    /// Create static resources for the clock device.
    #[must_use]
    pub const fn new_static() -> VuClockStatic {
        VuClockStatic::new_static()
    }

    /// Create the clock and spawn its task. See [`VuClock`] for a full example.
    ///
    /// # Errors
    ///
    /// Returns an error if the task cannot be spawned.
    #[must_use = "Device must be kept alive to observe its status"]
    pub fn new(
        vu_clock_static: &'static VuClockStatic,
        i2c: VuClockI2c,
        sink: PicoDriveSink,
        self_test: bool,
        spawner: Spawner,
    ) -> Result<Self, SpawnError> {
        let token = vu_clock_device_loop(vu_clock_static, i2c, sink, self_test)?;
        spawner.spawn(token);
        Ok(Self {
            status: &vu_clock_static.status,
        })
    }

    /// Wait for the next status change.
    pub async fn wait(&self) -> VuClockStatus {
        self.status.wait().await
    }
}

#[embassy_executor::task]
async fn vu_clock_device_loop(
    resources: &'static VuClockStatic,
    i2c: VuClockI2c,
    mut sink: PicoDriveSink,
    self_test: bool,
) -> ! {
    if self_test {
        run_self_test(&mut sink, &mut Delay);
    }

    let mut controller = NeedleController::new(NeedleConfig::default());
    let mut source = SweepTimeSource::new(Ds1307::new(i2c), EmbassyClock);
    let mut rtc_ready = false;
    let mut last_status = None;
    let mut publish = |status: VuClockStatus| {
        if last_status != Some(status) {
            info!("VuClock status: {}", status);
            last_status = Some(status);
            resources.status.signal(status);
        }
    };

    loop {
        if !rtc_ready {
            let rtc = source.wall_clock_mut();
            match rtc.probe().and_then(|()| rtc.ensure_running()) {
                Ok(_) => rtc_ready = true,
                Err(err) => {
                    warn!("RTC unavailable: {}", err);
                    controller.hold_all(FAULT_LEVEL, &mut sink);
                    publish(VuClockStatus::RtcUnavailable);
                    Timer::after_millis(u64::from(RTC_RETRY_DELAY_MS)).await;
                    continue;
                }
            }
        }

        match controller.step(&mut source, &mut sink) {
            Ok(_) => publish(VuClockStatus::Running),
            Err(err) => {
                // Hold every needle where it is; the next poll retries.
                warn!("RTC read failed: {}", err);
                publish(VuClockStatus::RtcUnavailable);
            }
        }
        Timer::after_millis(u64::from(LOOP_DELAY_MS)).await;
    }
}
