//! Host-level tests for the DS1307 driver, the sweeping time source and the start-up self test.

use core::cell::Cell;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use time::macros::{datetime, time};
use vu_clock::ds1307::DEFAULT_DATETIME;
use vu_clock::time_source::{MonotonicClock, WallClock};
use vu_clock::{
    DriveLevel, DriveSink, Ds1307, Error, Gauge, NeedleController, SweepTimeSource, TimeSource,
    run_self_test,
};

/// Register-level stand-in for a DS1307.
struct FakeDs1307 {
    registers: [u8; 8],
    pointer: usize,
    present: bool,
}

impl FakeDs1307 {
    fn with_registers(time_registers: [u8; 7]) -> Self {
        let mut registers = [0u8; 8];
        registers[..7].copy_from_slice(&time_registers);
        Self {
            registers,
            pointer: 0,
            present: true,
        }
    }

    fn absent() -> Self {
        Self {
            registers: [0; 8],
            pointer: 0,
            present: false,
        }
    }
}

impl ErrorType for FakeDs1307 {
    type Error = ErrorKind;
}

impl I2c for FakeDs1307 {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if !self.present || address != 0x68 {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    if let Some((register, data)) = bytes.split_first() {
                        self.pointer = usize::from(*register);
                        for byte in data {
                            self.registers[self.pointer % 8] = *byte;
                            self.pointer += 1;
                        }
                    }
                }
                Operation::Read(buffer) => {
                    for byte in buffer.iter_mut() {
                        *byte = self.registers[self.pointer % 8];
                        self.pointer += 1;
                    }
                }
            }
        }
        Ok(())
    }
}

struct ManualClock(Cell<u32>);

impl MonotonicClock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }
}

#[derive(Default)]
struct RecordingSink {
    writes: Vec<(Gauge, DriveLevel)>,
}

impl DriveSink for RecordingSink {
    fn set(&mut self, gauge: Gauge, level: DriveLevel) {
        self.writes.push((gauge, level));
    }
}

#[derive(Default)]
struct CountingDelay {
    total_ns: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

// 15:42:07 on 2023-06-18 (a Sunday), 24-hour mode, oscillator running.
const RUNNING_REGISTERS: [u8; 7] = [0x07, 0x42, 0x15, 1, 0x18, 0x06, 0x23];

#[test]
fn missing_chip_is_reported() {
    let mut rtc = Ds1307::new(FakeDs1307::absent());
    assert!(matches!(rtc.probe(), Err(Error::RtcNotFound)));
    assert!(matches!(
        rtc.datetime(),
        Err(Error::RtcBus(ErrorKind::NoAcknowledge(_)))
    ));
}

#[test]
fn running_chip_reads_back_datetime() {
    let mut rtc = Ds1307::new(FakeDs1307::with_registers(RUNNING_REGISTERS));
    rtc.probe().unwrap();
    assert!(rtc.is_running().unwrap());
    assert!(!rtc.ensure_running().unwrap());
    assert_eq!(rtc.datetime().unwrap(), datetime!(2023-06-18 15:42:07));
    assert_eq!(rtc.time().unwrap(), time!(15:42:07));
}

#[test]
fn halted_chip_is_started_at_default_time() {
    let mut halted = RUNNING_REGISTERS;
    halted[0] |= 0x80;
    let mut rtc = Ds1307::new(FakeDs1307::with_registers(halted));
    assert!(!rtc.is_running().unwrap());

    assert!(rtc.ensure_running().unwrap());
    assert!(rtc.is_running().unwrap());
    assert_eq!(rtc.datetime().unwrap(), DEFAULT_DATETIME);

    // 2020-01-01 was a Wednesday: weekday register 4.
    let bus = rtc.release();
    assert_eq!(bus.registers[..7], [0x00, 0x00, 0x00, 4, 0x01, 0x01, 0x20]);
}

#[test]
fn corrupt_registers_are_rejected() {
    let mut garbage = RUNNING_REGISTERS;
    garbage[1] = 0x7A;
    let mut rtc = Ds1307::new(FakeDs1307::with_registers(garbage));
    assert!(matches!(rtc.datetime(), Err(Error::InvalidRtcData)));
}

#[test]
fn rtc_feeds_the_controller() {
    let clock = ManualClock(Cell::new(10_000));
    let rtc = Ds1307::new(FakeDs1307::with_registers(RUNNING_REGISTERS));
    let mut source = SweepTimeSource::new(rtc, &clock);
    let mut controller = NeedleController::default();
    let mut sink = RecordingSink::default();

    let targets = controller.step(&mut source, &mut sink).unwrap();
    // 15:42 -> dial 3 and minute 42; second 7 with no time into the second yet.
    assert_eq!(targets.hour, 44);
    assert_eq!(targets.minute, 179);
    assert_eq!(targets.second, 29);
    assert_eq!(sink.writes.len(), 3);

    // 400 ms later, same RTC second: only the sweeping second meter moves.
    clock.0.set(10_400);
    sink.writes.clear();
    let targets = controller.step(&mut source, &mut sink).unwrap();
    assert_eq!(targets.second, 31);
    assert_eq!(source.millis_since_last_second_change(), 400);
    assert_eq!(sink.writes, vec![(Gauge::Second, 31)]);
}

#[test]
fn rtc_disappearing_holds_the_meters() {
    let clock = ManualClock(Cell::new(0));
    let rtc = Ds1307::new(FakeDs1307::with_registers(RUNNING_REGISTERS));
    let mut source = SweepTimeSource::new(rtc, &clock);
    let mut controller = NeedleController::default();
    let mut sink = RecordingSink::default();
    controller.step(&mut source, &mut sink).unwrap();
    sink.writes.clear();

    let mut bus = source.into_inner().0.release();
    bus.present = false;
    let mut source = SweepTimeSource::new(Ds1307::new(bus), &clock);
    clock.0.set(5_000);

    assert!(matches!(
        controller.step(&mut source, &mut sink),
        Err(Error::RtcBus(_))
    ));
    assert!(sink.writes.is_empty());
    assert_eq!(controller.level(Gauge::Hour), 44);
}

#[test]
fn self_test_sweeps_each_meter_and_leaves_it_at_zero() {
    let mut sink = RecordingSink::default();
    let mut delay = CountingDelay::default();

    run_self_test(&mut sink, &mut delay);

    for gauge in Gauge::ALL {
        let levels: Vec<DriveLevel> = sink
            .writes
            .iter()
            .filter(|(written, _)| *written == gauge)
            .map(|(_, level)| *level)
            .collect();
        assert_eq!(levels.len(), 511);
        assert_eq!(levels.iter().copied().max(), Some(255));
        assert_eq!(levels.last(), Some(&0));
    }
    // Hour first, then minute, then second.
    assert_eq!(sink.writes.first().map(|(gauge, _)| *gauge), Some(Gauge::Hour));
    assert_eq!(sink.writes.last().map(|(gauge, _)| *gauge), Some(Gauge::Second));
    assert_eq!(delay.total_ns, 3 * 1_535_000 * 1_000);
}
