//! Build time and driver configuration

use core::num::NonZeroU32;

use crate::error::{Errno, Result};
use crate::wait::WaitPolicy;

const DEFAULT_CPU_TIMER_HZ: u32 = 40_000_000;

/// Device clock feeding the peripherals, in Hz.
///
/// Override at build time with `SUNBURST_CPU_TIMER_HZ=<decimal hz>`.
pub const CPU_TIMER_HZ: u32 = match option_env!("SUNBURST_CPU_TIMER_HZ") {
    Some(hz) => parse_hz(hz),
    None => DEFAULT_CPU_TIMER_HZ,
};

const CPU_TIMER_PERIOD_NS: NonZeroU32 = match NonZeroU32::new(clock_period_ns(CPU_TIMER_HZ)) {
    Some(period) => period,
    None => panic!("SUNBURST_CPU_TIMER_HZ must be between 1 Hz and 1 GHz"),
};

const fn parse_hz(s: &str) -> u32 {
    let bytes = s.as_bytes();
    assert!(!bytes.is_empty(), "SUNBURST_CPU_TIMER_HZ is empty");
    let mut value: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        assert!(b.is_ascii_digit(), "SUNBURST_CPU_TIMER_HZ must be decimal");
        value = match value.checked_mul(10) {
            Some(v) => match v.checked_add((b - b'0') as u32) {
                Some(v) => v,
                None => panic!("SUNBURST_CPU_TIMER_HZ overflows u32"),
            },
            None => panic!("SUNBURST_CPU_TIMER_HZ overflows u32"),
        };
        i += 1;
    }
    value
}

/// Clock period in whole nanoseconds for a device clock of `hz`.
///
/// The frequency is rounded up and the period down, which makes every cycle
/// count derived from it err on the long side. Returns 0 when no usable
/// period exists (`hz` of 0 or above 1 GHz).
pub const fn clock_period_ns(hz: u32) -> u32 {
    let khz = hz.div_ceil(1000);
    if khz == 0 || khz > 1_000_000 {
        0
    } else {
        1_000_000 / khz
    }
}

/// Configuration of an I2C host driver instance.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct I2cConfig {
    dev_clock_hz: u32,
    clock_period_ns: NonZeroU32,
    wait: WaitPolicy,
}

impl I2cConfig {
    /// Create a config for a controller clocked at `dev_clock_hz`.
    pub fn new(dev_clock_hz: u32) -> Result<Self> {
        let clock_period_ns =
            NonZeroU32::new(clock_period_ns(dev_clock_hz)).ok_or(Errno::InvalidArgs)?;
        Ok(Self {
            dev_clock_hz,
            clock_period_ns,
            wait: WaitPolicy::Forever,
        })
    }

    /// Replace the polling policy used by every hardware wait.
    #[inline]
    pub fn with_wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    /// get device clock in Hz
    #[inline]
    pub fn dev_clock_hz(&self) -> u32 {
        self.dev_clock_hz
    }

    /// get clock period in ns
    #[inline]
    pub fn clock_period_ns(&self) -> NonZeroU32 {
        self.clock_period_ns
    }

    /// get wait policy
    #[inline]
    pub fn wait_policy(&self) -> WaitPolicy {
        self.wait
    }
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            dev_clock_hz: CPU_TIMER_HZ,
            clock_period_ns: CPU_TIMER_PERIOD_NS,
            wait: WaitPolicy::Forever,
        }
    }
}
