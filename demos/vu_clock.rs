//! Three-meter VU clock: DS1307 on I2C0 (SDA GPIO 4, SCL GPIO 5), meters on PWM.
//! - Hour meter: GPIO 2 (slice 1 A)
//! - Minute meter: GPIO 3 (slice 1 B)
//! - Second meter: GPIO 6 (slice 3 A)

#![no_std]
#![no_main]

use core::convert::Infallible;

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::pwm::Pwm;
use panic_probe as _;
use vu_clock::{Result, VuClock, VuClockStatic, gauge_pwm_config, pico_drive_sink};

// The RP2350 boot ROM only runs images that carry an image definition block.
#[cfg(feature = "pico2")]
#[expect(unsafe_code, reason = "the boot ROM looks for this block by section")]
#[unsafe(link_section = ".start_block")]
#[used]
pub static IMAGE_DEF: embassy_rp::block::ImageDef = embassy_rp::block::ImageDef::secure_exe();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) -> ! {
    // If it returns, something went wrong.
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(spawner: Spawner) -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    static VU_CLOCK_STATIC: VuClockStatic = VuClock::new_static();
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c::Config::default());
    let sink = pico_drive_sink(
        Pwm::new_output_ab(p.PWM_SLICE1, p.PIN_2, p.PIN_3, gauge_pwm_config()),
        Pwm::new_output_a(p.PWM_SLICE3, p.PIN_6, gauge_pwm_config()),
    )?;
    let vu_clock = VuClock::new(&VU_CLOCK_STATIC, i2c, sink, true, spawner)?;

    info!("VU clock started");
    loop {
        let status = vu_clock.wait().await;
        info!("VU clock status: {}", status);
    }
}
