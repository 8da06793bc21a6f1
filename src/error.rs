//! Driver error codes

use core::fmt;

/// Errors returned by the peripheral drivers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Errno {
    /// A caller supplied argument or configuration value is out of range
    InvalidArgs,
    /// The addressed target did not acknowledge
    Nak,
    /// A bounded wait expired before the hardware became ready
    Timeout,
}

/// Result alias used across the crate.
pub type Result<T> = core::result::Result<T, Errno>;

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Errno::InvalidArgs => f.write_str("invalid argument"),
            Errno::Nak => f.write_str("target did not acknowledge"),
            Errno::Timeout => f.write_str("timed out waiting for hardware"),
        }
    }
}

impl embedded_hal::i2c::Error for Errno {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

        match self {
            Errno::Nak => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
            Errno::InvalidArgs | Errno::Timeout => ErrorKind::Other,
        }
    }
}
