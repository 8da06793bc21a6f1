//! I2C Time configuration
//!
//! Timing counts programmed into TIMING0..TIMING4, derived from the minimum
//! values of table 10 of the I2C-bus specification. See
//! <https://opentitan.org/book/hw/ip/i2c/doc/programmers_guide.html>

use core::num::NonZeroU32;

use crate::registers::{TIMING0, TIMING1, TIMING2, TIMING3, TIMING4};
use crate::I2cSpeedMode;

// Specification minimums in ns, indexed by I2cSpeedMode
const SPC_THIGH: [u32; 3] = [4000, 600, 260];
const SPC_TLOW: [u32; 3] = [4700, 1300, 150];
const SPC_THD_STA: [u32; 3] = [4000, 600, 260];
const SPC_TSU_STA: [u32; 3] = [4700, 600, 260];
const SPC_THD_DAT: [u32; 3] = [5000, 1, 1];
const SPC_TSU_DAT: [u32; 3] = [250, 100, 50];
const SPC_TBUF: [u32; 3] = [4700, 1300, 500];
const SPC_TSU_STO: [u32; 3] = [4000, 600, 260];

/// Fall time at 3.3V, ns
const SPC_TFALL: u32 = 20 * 3 / 5;
/// Rise time, ns
const SPC_TRISE: u32 = 120;

/// Round-up divide keeping the low 16 bits of the quotient.
#[inline]
fn cycles(ns: u32, clock_period_ns: NonZeroU32) -> u16 {
    ns.div_ceil(clock_period_ns.get()) as u16
}

/// Bus timing counts, in device clock cycles
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimingParameters {
    /// SCL high period
    pub t_high: u16,
    /// SCL low period
    pub t_low: u16,
    /// SCL/SDA fall time
    pub t_fall: u16,
    /// SCL/SDA rise time
    pub t_rise: u16,
    /// hold time for (repeated) START
    pub thd_sta: u16,
    /// setup time for repeated START
    pub tsu_sta: u16,
    /// data hold time
    pub thd_dat: u16,
    /// data setup time
    pub tsu_dat: u16,
    /// bus free time between STOP and START
    pub t_buf: u16,
    /// setup time for STOP
    pub tsu_sto: u16,
}

impl TimingParameters {
    /// Timing counts for a bus running at `speed_khz` from a device clock
    /// whose period is `clock_period_ns`.
    ///
    /// The period should be underestimated (see
    /// [`crate::config::clock_period_ns`]) so every count comes out long.
    pub fn compute(speed_khz: u32, clock_period_ns: NonZeroU32) -> TimingParameters {
        let mode = I2cSpeedMode::from_khz(speed_khz).index();

        let mut t = TimingParameters {
            t_high: cycles(SPC_THIGH[mode], clock_period_ns),
            t_low: cycles(SPC_TLOW[mode], clock_period_ns),
            t_fall: cycles(SPC_TFALL, clock_period_ns),
            t_rise: cycles(SPC_TRISE, clock_period_ns),
            thd_sta: cycles(SPC_THD_STA[mode], clock_period_ns),
            tsu_sta: cycles(SPC_TSU_STA[mode], clock_period_ns),
            thd_dat: cycles(SPC_THD_DAT[mode], clock_period_ns),
            tsu_dat: cycles(SPC_TSU_DAT[mode], clock_period_ns),
            t_buf: cycles(SPC_TBUF[mode], clock_period_ns),
            tsu_sto: cycles(SPC_TSU_STO[mode], clock_period_ns),
        };

        // Prevent the hardware counters from underflowing
        t.t_low = t.t_low.max(t.thd_dat.saturating_add(1));
        t.t_buf = t.t_buf.max(t.tsu_sta.saturating_add(1));

        log::debug!(
            "i2c timing: {} kHz mode {} period {}ns -> {:?}",
            speed_khz,
            mode,
            clock_period_ns,
            t
        );
        t
    }

    /// Register values for TIMING0..TIMING4, in that order.
    pub fn packed(&self) -> [u32; 5] {
        [
            (TIMING0::TLOW.val(self.t_low.into()) + TIMING0::THIGH.val(self.t_high.into())).value,
            (TIMING1::T_F.val(self.t_fall.into()) + TIMING1::T_R.val(self.t_rise.into())).value,
            (TIMING2::THD_STA.val(self.thd_sta.into()) + TIMING2::TSU_STA.val(self.tsu_sta.into()))
                .value,
            (TIMING3::THD_DAT.val(self.thd_dat.into()) + TIMING3::TSU_DAT.val(self.tsu_dat.into()))
                .value,
            (TIMING4::T_BUF.val(self.t_buf.into()) + TIMING4::TSU_STO.val(self.tsu_sto.into()))
                .value,
        ]
    }
}
