//! Where drive levels end up.

use embedded_hal::pwm::SetDutyCycle;

use crate::{DriveLevel, Gauge};

/// "Set drive level on channel N." Writes always succeed from the controller's point of view.
pub trait DriveSink {
    /// Drive `gauge` at `level`.
    fn set(&mut self, gauge: Gauge, level: DriveLevel);
}

impl<T: DriveSink + ?Sized> DriveSink for &mut T {
    fn set(&mut self, gauge: Gauge, level: DriveLevel) {
        (**self).set(gauge, level);
    }
}

/// A [`DriveSink`] over three PWM outputs, one per meter.
///
/// Level 255 is 100% duty. PWM errors cannot be reported upward, so they are logged and the write
/// is dropped; the next changed level retries naturally.
pub struct PwmDriveSink<H, M, S> {
    hour: H,
    minute: M,
    second: S,
}

impl<H, M, S> PwmDriveSink<H, M, S>
where
    H: SetDutyCycle,
    M: SetDutyCycle,
    S: SetDutyCycle,
{
    #[must_use]
    pub const fn new(hour: H, minute: M, second: S) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }

    /// Give back the three outputs.
    pub fn into_inner(self) -> (H, M, S) {
        (self.hour, self.minute, self.second)
    }
}

fn write_level<P: SetDutyCycle>(output: &mut P, gauge: Gauge, level: DriveLevel) {
    if output
        .set_duty_cycle_fraction(u16::from(level), u16::from(DriveLevel::MAX))
        .is_err()
    {
        warn!("PWM write failed for {} gauge", gauge);
    }
}

impl<H, M, S> DriveSink for PwmDriveSink<H, M, S>
where
    H: SetDutyCycle,
    M: SetDutyCycle,
    S: SetDutyCycle,
{
    fn set(&mut self, gauge: Gauge, level: DriveLevel) {
        match gauge {
            Gauge::Hour => write_level(&mut self.hour, gauge, level),
            Gauge::Minute => write_level(&mut self.minute, gauge, level),
            Gauge::Second => write_level(&mut self.second, gauge, level),
        }
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use embedded_hal::pwm::ErrorType;

    use super::*;

    struct DutyRecorder {
        max: u16,
        duty: u16,
    }

    impl ErrorType for DutyRecorder {
        type Error = Infallible;
    }

    impl SetDutyCycle for DutyRecorder {
        fn max_duty_cycle(&self) -> u16 {
            self.max
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            Ok(())
        }
    }

    fn recorder() -> DutyRecorder {
        DutyRecorder { max: 1_000, duty: 0 }
    }

    #[test]
    fn levels_scale_to_duty_range() {
        let mut sink = PwmDriveSink::new(recorder(), recorder(), recorder());
        sink.set(Gauge::Hour, 255);
        sink.set(Gauge::Minute, 0);
        sink.set(Gauge::Second, 51);
        let (hour, minute, second) = sink.into_inner();
        assert_eq!(hour.duty, 1_000);
        assert_eq!(minute.duty, 0);
        assert_eq!(second.duty, 200);
    }
}
