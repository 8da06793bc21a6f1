//! Drivers for the Sunburst SoC peripherals
//!
//! The I2C host and USB device drivers target OpenTitan blocks; GPIO, RGB
//! LED and SPI are the Sonata system's own small peripherals.

#![cfg_attr(not(test), no_std)]

pub mod common;
pub mod config;
pub mod ctype;
pub mod error;
pub mod flags;
pub mod gpio;
pub mod registers;
pub mod rgbctrl;
pub mod spi;
pub mod usbdev;
pub mod wait;

pub use crate::common::{timing, timing::TimingParameters, I2cSpeedMode};
pub use crate::flags::{FormatFlags, I2cInterrupt, Joystick, UsbdevInterrupt};
pub use crate::error::{Errno, Result};
pub use crate::registers::MmioRef;

mod host;
pub use crate::config::I2cConfig;
pub use crate::host::{I2cHostDriver, I2cHostRegisters};

#[cfg(test)]
mod testing;
