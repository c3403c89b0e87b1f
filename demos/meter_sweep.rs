//! Meter calibration aid: sweeps the three meters forever so the trim pots can be set for
//! full-scale deflection at level 255.

#![no_std]
#![no_main]

use core::convert::Infallible;

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::pwm::Pwm;
use embassy_time::{Delay, Timer};
use panic_probe as _;
use vu_clock::{Result, gauge_pwm_config, pico_drive_sink, run_self_test};

// The RP2350 boot ROM only runs images that carry an image definition block.
#[cfg(feature = "pico2")]
#[expect(unsafe_code, reason = "the boot ROM looks for this block by section")]
#[unsafe(link_section = ".start_block")]
#[used]
pub static IMAGE_DEF: embassy_rp::block::ImageDef = embassy_rp::block::ImageDef::secure_exe();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(_spawner: Spawner) -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());
    let mut sink = pico_drive_sink(
        Pwm::new_output_ab(p.PWM_SLICE1, p.PIN_2, p.PIN_3, gauge_pwm_config()),
        Pwm::new_output_a(p.PWM_SLICE3, p.PIN_6, gauge_pwm_config()),
    )?;

    loop {
        info!("Sweeping meters");
        run_self_test(&mut sink, &mut Delay);
        Timer::after_millis(500).await;
    }
}
