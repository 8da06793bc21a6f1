//! I2c common module
//!
//! Include:
//! timing: bus timing parameters derived from the device clock

/// i2c Speed mode
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum I2cSpeedMode {
      /// Standard Speed Mode, up to 100 kHz.
      StandMode = 0,
      /// Fast Speed Mode, up to 400 kHz.
      FastMode,
      /// Fast Plus Mode, above 400 kHz.
      FastPlusMode,
}

/// I2C standard mode max bus frequency in khz
pub const I2C_MAX_STANDARD_MODE_KHZ: u32 = 100;
/// I2C fast mode max bus frequency in khz
pub const I2C_MAX_FAST_MODE_KHZ: u32 = 400;

impl I2cSpeedMode {
    /// Pick the bus mode for a requested speed
    pub fn from_khz(speed_khz: u32) -> Self {
        match (speed_khz > I2C_MAX_STANDARD_MODE_KHZ) as usize
            + (speed_khz > I2C_MAX_FAST_MODE_KHZ) as usize
        {
            0 => I2cSpeedMode::StandMode,
            1 => I2cSpeedMode::FastMode,
            _ => I2cSpeedMode::FastPlusMode,
        }
    }

    /// Row of the I2C bus timing tables for this mode
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// i2c timing
pub mod timing;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_thresholds() {
        assert_eq!(I2cSpeedMode::from_khz(1), I2cSpeedMode::StandMode);
        assert_eq!(I2cSpeedMode::from_khz(100), I2cSpeedMode::StandMode);
        assert_eq!(I2cSpeedMode::from_khz(101), I2cSpeedMode::FastMode);
        assert_eq!(I2cSpeedMode::from_khz(400), I2cSpeedMode::FastMode);
        assert_eq!(I2cSpeedMode::from_khz(401), I2cSpeedMode::FastPlusMode);
        assert_eq!(I2cSpeedMode::from_khz(1000).index(), 2);
    }
}
