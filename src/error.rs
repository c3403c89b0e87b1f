use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
#[expect(missing_docs, reason = "The variants are self-explanatory.")]
#[derive(Debug, Display, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // `#[error(not(source))]` below tells `derive_more` that `embassy_executor::SpawnError` does
    // not implement `core::error::Error`.
    #[cfg(feature = "embassy")]
    #[display("{_0:?}")]
    TaskSpawn(#[error(not(source))] embassy_executor::SpawnError),

    #[cfg(feature = "embassy")]
    #[display("PWM slice is missing an output channel")]
    PwmChannelMissing,

    #[display("DS1307 real-time clock did not respond")]
    RtcNotFound,

    #[display("I2C transfer with the real-time clock failed: {_0:?}")]
    RtcBus(#[error(not(source))] embedded_hal::i2c::ErrorKind),

    #[display("Real-time clock registers hold an invalid date or time")]
    InvalidRtcData,
}

impl From<time::error::ComponentRange> for Error {
    fn from(_: time::error::ComponentRange) -> Self {
        Self::InvalidRtcData
    }
}

#[cfg(feature = "embassy")]
impl From<embassy_executor::SpawnError> for Error {
    fn from(err: embassy_executor::SpawnError) -> Self {
        Self::TaskSpawn(err)
    }
}
