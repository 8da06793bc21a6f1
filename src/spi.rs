//! Sonata SPI host
//!
//! <https://lowrisc.org/sonata-system/doc/ip/spi.html>

use core::ops::Deref;

use tock_registers::interfaces::{Readable, Writeable};

use crate::error::{Errno, Result};
use crate::registers::{SpiRegisters, SPI_CFG, SPI_CONTROL, SPI_STATUS};
use crate::wait::{spin_until, WaitPolicy};

/// Depth of the TX FIFO in bytes
pub const TX_FIFO_DEPTH: u32 = 64;

/// SPI host driver
pub struct SonataSpi<R> {
    regs: R,
    wait: WaitPolicy,
}

impl<R> SonataSpi<R>
where
    R: Deref<Target = SpiRegisters>,
{
    /// Wrap the SPI register block, waiting forever on the hardware
    pub fn new(regs: R) -> Self {
        Self {
            regs,
            wait: WaitPolicy::Forever,
        }
    }

    /// Replace the policy used by every hardware wait
    pub fn with_wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    /// Program clock polarity, phase, bit order and SCK half period.
    pub fn init(&mut self, cpol: bool, cpha: bool, msb_first: bool, half_clk_period: u16) {
        self.regs.cfg.write(
            SPI_CFG::CPOL.val(cpol.into())
                + SPI_CFG::CPHA.val(cpha.into())
                + SPI_CFG::MSB_FIRST.val(msb_first.into())
                + SPI_CFG::HALF_CLK_PERIOD.val(half_clk_period.into()),
        );
        log::debug!(
            "spi: cpol {} cpha {} msb_first {} half period {}",
            cpol,
            cpha,
            msb_first,
            half_clk_period
        );
    }

    /// Block until no transfer is in progress
    pub fn wait_idle(&self) -> Result<()> {
        spin_until(self.wait, || self.regs.status.is_set(SPI_STATUS::IDLE))
    }

    /// Clock `data` out, discarding whatever comes back.
    pub fn tx(&mut self, data: &[u8]) -> Result<()> {
        let len = u32::try_from(data.len()).map_err(|_| Errno::InvalidArgs)?;
        self.wait_idle()?;
        self.regs.control.write(SPI_CONTROL::TX_ENABLE::SET);
        self.regs.start.set(len);

        let mut avail = 0;
        for &byte in data {
            if avail == 0 {
                // refill only once the FIFO has drained
                spin_until(self.wait, || {
                    self.regs.status.read(SPI_STATUS::TX_FIFO_LEVEL) == 0
                })?;
                avail = TX_FIFO_DEPTH;
            }
            self.regs.tx_fifo.set(byte.into());
            avail -= 1;
        }
        Ok(())
    }

    /// Clock in `buf.len()` bytes.
    pub fn rx(&mut self, buf: &mut [u8]) -> Result<()> {
        let len = u32::try_from(buf.len()).map_err(|_| Errno::InvalidArgs)?;
        self.wait_idle()?;
        self.regs.control.write(SPI_CONTROL::RX_ENABLE::SET);
        self.regs.start.set(len);

        for slot in buf.iter_mut() {
            spin_until(self.wait, || {
                self.regs.status.read(SPI_STATUS::RX_FIFO_LEVEL) != 0
            })?;
            *slot = self.regs.rx_fifo.get() as u8;
        }
        Ok(())
    }
}
