//! Driver for the DS1307 battery-backed real-time clock.
//!
//! - I2C address `0x68`, registers `0x00..=0x06` hold seconds through year in BCD.
//! - Bit 7 of the seconds register is the clock-halt flag; it is set after the backup battery
//!   was missing, and then the stored time is meaningless.
//! - Works with any blocking [`embedded_hal::i2c::I2c`] bus, so it runs against a mock on the host.

use embedded_hal::i2c::{Error as _, I2c};
use time::{Date, Month, PrimitiveDateTime, Time};

use crate::shared_constants::DS1307_ADDRESS;
use crate::time_source::WallClock;
use crate::{Error, Result};

/// Time written when the RTC lost power: midnight, so the meters show 12:00.
pub const DEFAULT_DATETIME: PrimitiveDateTime = time::macros::datetime!(2020-01-01 0:00:00);

const REG_SECONDS: u8 = 0x00;
const BASE_YEAR: i32 = 2000;
const REGISTER_COUNT: usize = 7;
const CLOCK_HALT: u8 = 0b1000_0000;
const HOUR_12H_MODE: u8 = 0b0100_0000;
const HOUR_PM: u8 = 0b0010_0000;

/// A DS1307 on an I2C bus.
pub struct Ds1307<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Ds1307<I2C> {
    /// Wrap the bus. No I2C traffic happens until the first call.
    #[must_use]
    pub const fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Check the chip answers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RtcNotFound`] if the chip does not acknowledge.
    pub fn probe(&mut self) -> Result<()> {
        let mut seconds = [0u8; 1];
        if self
            .i2c
            .write_read(DS1307_ADDRESS, &[REG_SECONDS], &mut seconds)
            .is_err()
        {
            warn!("DS1307 did not respond at {=u8:#x}", DS1307_ADDRESS);
            return Err(Error::RtcNotFound);
        }
        info!("DS1307 found");
        Ok(())
    }

    /// Give back the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Whether the oscillator is running (clock-halt flag clear).
    ///
    /// # Errors
    ///
    /// Returns [`Error::RtcBus`] if the register cannot be read.
    pub fn is_running(&mut self) -> Result<bool> {
        let mut seconds = [0u8; 1];
        self.i2c
            .write_read(DS1307_ADDRESS, &[REG_SECONDS], &mut seconds)
            .map_err(|err| Error::RtcBus(err.kind()))?;
        Ok(seconds[0] & CLOCK_HALT == 0)
    }

    /// If the clock is halted, start it at [`DEFAULT_DATETIME`]. Returns `true` if it was reset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RtcBus`] on an I2C failure.
    pub fn ensure_running(&mut self) -> Result<bool> {
        if self.is_running()? {
            return Ok(false);
        }
        warn!("DS1307 lost power, setting time to default");
        self.set_datetime(DEFAULT_DATETIME)?;
        Ok(true)
    }

    /// Read the stored date and time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RtcBus`] on an I2C failure and [`Error::InvalidRtcData`] if the registers
    /// do not hold a valid date and time.
    pub fn datetime(&mut self) -> Result<PrimitiveDateTime> {
        let mut registers = [0u8; REGISTER_COUNT];
        self.i2c
            .write_read(DS1307_ADDRESS, &[REG_SECONDS], &mut registers)
            .map_err(|err| Error::RtcBus(err.kind()))?;
        decode(registers)
    }

    /// Store a date and time (24-hour mode) and clear the clock-halt flag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRtcData`] if the year is outside 2000..=2099 and [`Error::RtcBus`]
    /// on an I2C failure.
    pub fn set_datetime(&mut self, datetime: PrimitiveDateTime) -> Result<()> {
        let registers = encode(datetime)?;
        let mut frame = [0u8; REGISTER_COUNT + 1];
        frame[0] = REG_SECONDS;
        frame[1..].copy_from_slice(&registers);
        self.i2c
            .write(DS1307_ADDRESS, &frame)
            .map_err(|err| Error::RtcBus(err.kind()))?;
        info!(
            "DS1307 set to {}-{}-{} {}:{}:{}",
            datetime.year(),
            u8::from(datetime.month()),
            datetime.day(),
            datetime.hour(),
            datetime.minute(),
            datetime.second()
        );
        Ok(())
    }
}

impl<I2C: I2c> WallClock for Ds1307<I2C> {
    fn time(&mut self) -> Result<Time> {
        Ok(self.datetime()?.time())
    }
}

/// Packed BCD to binary. Rejects nibbles above 9.
#[expect(
    clippy::arithmetic_side_effects,
    reason = "both digits are checked to be at most 9"
)]
fn bcd_to_dec(bcd: u8) -> Result<u8> {
    let (tens, ones) = (bcd >> 4, bcd & 0x0F);
    if tens > 9 || ones > 9 {
        return Err(Error::InvalidRtcData);
    }
    Ok(tens * 10 + ones)
}

/// Binary (0..=99) to packed BCD.
#[expect(
    clippy::integer_division_remainder_used,
    reason = "BCD digits are a division by ten"
)]
const fn dec_to_bcd(dec: u8) -> u8 {
    ((dec / 10) << 4) | (dec % 10)
}

fn decode_hour(register: u8) -> Result<u8> {
    if register & HOUR_12H_MODE == 0 {
        return bcd_to_dec(register & 0x3F);
    }
    let hour12 = bcd_to_dec(register & 0x1F)?;
    if !(1..=12).contains(&hour12) {
        return Err(Error::InvalidRtcData);
    }
    let pm = register & HOUR_PM != 0;
    Ok(match (hour12, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (hour, false) => hour,
        (hour, true) => hour.saturating_add(12),
    })
}

fn decode(registers: [u8; REGISTER_COUNT]) -> Result<PrimitiveDateTime> {
    let [seconds, minutes, hours, _weekday, day, month, year] = registers;
    let time = Time::from_hms(
        decode_hour(hours)?,
        bcd_to_dec(minutes & 0x7F)?,
        bcd_to_dec(seconds & !CLOCK_HALT)?,
    )?;
    let date = Date::from_calendar_date(
        BASE_YEAR.saturating_add(i32::from(bcd_to_dec(year)?)),
        Month::try_from(bcd_to_dec(month & 0x1F)?)?,
        bcd_to_dec(day & 0x3F)?,
    )?;
    Ok(PrimitiveDateTime::new(date, time))
}

fn encode(datetime: PrimitiveDateTime) -> Result<[u8; REGISTER_COUNT]> {
    let year = datetime
        .year()
        .checked_sub(BASE_YEAR)
        .and_then(|year| u8::try_from(year).ok())
        .filter(|year| *year <= 99)
        .ok_or(Error::InvalidRtcData)?;
    Ok([
        dec_to_bcd(datetime.second()),
        dec_to_bcd(datetime.minute()),
        dec_to_bcd(datetime.hour()),
        datetime.weekday().number_from_sunday(),
        dec_to_bcd(datetime.day()),
        dec_to_bcd(u8::from(datetime.month())),
        dec_to_bcd(year),
    ])
}
