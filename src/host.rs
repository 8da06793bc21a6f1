//! OpenTitan I2C host mode driver
//!
//! Transactions are sequenced through the FMT FIFO by polling; there is no
//! interrupt driven path. Reads are split into chunks the 8-bit READB count
//! can express.

use core::ops::Deref;

use embedded_hal::i2c::Operation;
use tock_registers::fields::FieldValue;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::LocalRegisterCopy;

use crate::error::{Errno, Result};
use crate::registers::{I2cRegisters, CTRL, FIFO_CTRL, HOST_FIFO_CONFIG, RDATA, STATUS};
use crate::wait::spin_until;
use crate::{FormatFlags, I2cConfig, I2cInterrupt, TimingParameters};

/// Largest 7-bit target address
const MAX_ADDRESS: u8 = 0x7f;
/// Bytes requested per READB word when more data follows
const READ_CHUNK: usize = u8::MAX as usize;
/// Largest READB count, encoded as 0
const READB_MAX: usize = 256;
/// FIFO threshold fields are 12 bits wide
const THRESHOLD_MASK: u16 = 0xfff;

/// Register level contract the host driver needs from an I2C controller.
pub trait I2cHostRegisters {
    /// Live STATUS register
    fn status(&self) -> LocalRegisterCopy<u32, STATUS::Register>;
    /// Write one word into the FMT FIFO
    fn push_format(&self, word: u32);
    /// Pop one byte from the RX FIFO
    fn read_data(&self) -> u8;
    /// Read INTR_STATE
    fn intr_state(&self) -> u32;
    /// Write INTR_STATE
    fn set_intr_state(&self, value: u32);
    /// Read INTR_ENABLE
    fn intr_enable(&self) -> u32;
    /// Write INTR_ENABLE
    fn set_intr_enable(&self, value: u32);
    /// Write INTR_TEST
    fn set_intr_test(&self, value: u32);
    /// Write CTRL
    fn set_ctrl(&self, value: FieldValue<u32, CTRL::Register>);
    /// Write FIFO_CTRL
    fn set_fifo_ctrl(&self, value: FieldValue<u32, FIFO_CTRL::Register>);
    /// Write HOST_FIFO_CONFIG
    fn set_host_fifo_config(&self, value: FieldValue<u32, HOST_FIFO_CONFIG::Register>);
    /// Program TIMING0..TIMING4
    fn set_timing(&self, packed: [u32; 5]);
}

impl I2cHostRegisters for I2cRegisters {
    fn status(&self) -> LocalRegisterCopy<u32, STATUS::Register> {
        self.status.extract()
    }

    fn push_format(&self, word: u32) {
        self.fdata.set(word);
    }

    fn read_data(&self) -> u8 {
        self.rdata.read(RDATA::RDATA) as u8
    }

    fn intr_state(&self) -> u32 {
        self.intr_state.get()
    }

    fn set_intr_state(&self, value: u32) {
        self.intr_state.set(value);
    }

    fn intr_enable(&self) -> u32 {
        self.intr_enable.get()
    }

    fn set_intr_enable(&self, value: u32) {
        self.intr_enable.set(value);
    }

    fn set_intr_test(&self, value: u32) {
        self.intr_test.set(value);
    }

    fn set_ctrl(&self, value: FieldValue<u32, CTRL::Register>) {
        self.ctrl.write(value);
    }

    fn set_fifo_ctrl(&self, value: FieldValue<u32, FIFO_CTRL::Register>) {
        self.fifo_ctrl.write(value);
    }

    fn set_host_fifo_config(&self, value: FieldValue<u32, HOST_FIFO_CONFIG::Register>) {
        self.host_fifo_config.write(value);
    }

    fn set_timing(&self, packed: [u32; 5]) {
        self.timing0.set(packed[0]);
        self.timing1.set(packed[1]);
        self.timing2.set(packed[2]);
        self.timing3.set(packed[3]);
        self.timing4.set(packed[4]);
    }
}

/// Direction of an operation that moves data, `None` for an empty one
fn direction(op: &Operation<'_>) -> Option<bool> {
    match op {
        Operation::Write(bytes) if !bytes.is_empty() => Some(false),
        Operation::Read(buf) if !buf.is_empty() => Some(true),
        _ => None,
    }
}

/// The I2C host Driver
///
/// Owns the handle to one controller. Nothing is locked internally; sharing
/// a controller between threads needs external mutual exclusion.
pub struct I2cHostDriver<R> {
    regs: R,
    config: I2cConfig,
}

impl<R> I2cHostDriver<R>
where
    R: Deref,
    R::Target: I2cHostRegisters,
{
    /// Create a new host driver over `regs`
    pub fn new(regs: R, config: I2cConfig) -> I2cHostDriver<R> {
        Self { regs, config }
    }

    /// Give back the register handle
    pub fn free(self) -> R {
        self.regs
    }

    /// return driver config
    pub fn config(&self) -> &I2cConfig {
        &self.config
    }

    /// Reset every FIFO, enter host mode and program timing for `speed_khz`
    pub fn init(&mut self, speed_khz: u32) -> TimingParameters {
        self.reset_fifos();
        self.set_host_mode();
        self.set_speed(speed_khz)
    }

    /// Drop the contents of the RX, FMT, ACQ and TX FIFOs
    pub fn reset_fifos(&mut self) {
        log::debug!("i2c: resetting fifos");
        self.regs.set_fifo_ctrl(
            FIFO_CTRL::RXRST::SET
                + FIFO_CTRL::FMTRST::SET
                + FIFO_CTRL::ACQRST::SET
                + FIFO_CTRL::TXRST::SET,
        );
    }

    /// Enable host functionality, disabling target mode
    pub fn set_host_mode(&mut self) {
        self.regs.set_ctrl(CTRL::ENABLEHOST::SET);
    }

    /// Program the bus timing registers for a bit rate of `speed_khz`
    pub fn set_speed(&mut self, speed_khz: u32) -> TimingParameters {
        let timing = TimingParameters::compute(speed_khz, self.config.clock_period_ns());
        self.regs.set_timing(timing.packed());
        timing
    }

    /// Set the FMT and RX FIFO threshold levels, each masked to 12 bits
    pub fn set_host_thresholds(&mut self, fmt_threshold: u16, rx_threshold: u16) {
        self.regs.set_host_fifo_config(
            HOST_FIFO_CONFIG::FMT_THRESH.val((fmt_threshold & THRESHOLD_MASK).into())
                + HOST_FIFO_CONFIG::RX_THRESH.val((rx_threshold & THRESHOLD_MASK).into()),
        );
    }

    /// Push a format word once the FMT FIFO has room
    fn blocking_push(&mut self, word: u32) -> Result<()> {
        let regs = &self.regs;
        spin_until(self.config.wait_policy(), || !regs.status().is_set(STATUS::FMTFULL))?;
        regs.push_format(word);
        Ok(())
    }

    fn wait_fmt_empty(&self) -> Result<()> {
        spin_until(self.config.wait_policy(), || self.fmt_empty())
    }

    fn address_byte(address: u8, read: bool) -> Result<u8> {
        if address > MAX_ADDRESS {
            return Err(Errno::InvalidArgs);
        }
        Ok((address << 1) | read as u8)
    }

    /// Clear a pending NAK and report it
    fn take_nak(&mut self, address: u8) -> Result<()> {
        if self.interrupt_asserted(I2cInterrupt::Nak) {
            self.clear_interrupt(I2cInterrupt::Nak);
            log::warn!("i2c: {:#04x} NAK'd", address);
            return Err(Errno::Nak);
        }
        Ok(())
    }

    /// Queue a write of `data` to the target at `address`.
    ///
    /// Finishes with a STOP unless `skip_stop` is set. A NAK from the target
    /// is not reported here: the caller checks [`I2cInterrupt::Nak`].
    /// Writing nothing is a no-op.
    pub fn write(&mut self, address: u8, data: &[u8], skip_stop: bool) -> Result<()> {
        let Some((last, body)) = data.split_last() else {
            return Ok(());
        };
        let addr = Self::address_byte(address, false)?;

        self.blocking_push(FormatFlags::START.with_byte(addr))?;
        for &byte in body {
            self.blocking_push(FormatFlags::empty().with_byte(byte))?;
        }
        let end = if skip_stop {
            FormatFlags::empty()
        } else {
            FormatFlags::STOP
        };
        self.blocking_push(end.with_byte(*last))
    }

    /// Fill `buf` from the target at `address`.
    ///
    /// Fails with [`Errno::Nak`] if the target refuses an address phase. The
    /// NAK interrupt is cleared and no further chunks are issued; bytes of
    /// chunks completed before the NAK stay in `buf`.
    pub fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        let addr = Self::address_byte(address, true)?;

        let mut offset = 0;
        while offset < buf.len() {
            self.blocking_push(FormatFlags::START.with_byte(addr))?;
            self.wait_fmt_empty()?;
            self.take_nak(address)?;

            let remaining = buf.len() - offset;
            let last_chunk = remaining <= READB_MAX;
            let chunk = if last_chunk { remaining } else { READ_CHUNK };
            let end = if last_chunk {
                FormatFlags::STOP
            } else {
                FormatFlags::empty()
            };
            log::trace!("i2c: read chunk of {} at {}", chunk, offset);

            // 256 truncates to 0, which READB takes as 256
            self.blocking_push((end | FormatFlags::READB).with_byte(chunk as u8))?;
            self.wait_fmt_empty()?;

            for byte in &mut buf[offset..offset + chunk] {
                *byte = self.regs.read_data();
            }
            offset += chunk;
        }
        Ok(())
    }

    /// Write `bytes` without a STOP, then read into `buf` after a repeated START.
    ///
    /// With nothing to read the write closes the bus itself.
    pub fn write_read(&mut self, address: u8, bytes: &[u8], buf: &mut [u8]) -> Result<()> {
        if buf.is_empty() {
            return self.write(address, bytes, false);
        }
        self.write(address, bytes, true)?;
        self.read(address, buf)
    }

    /// Run `operations` against `address` as one bus transaction.
    ///
    /// Adjacent operations of the same direction share one address phase and
    /// a repeated START is only issued when the direction changes. Reads in
    /// the middle of a run keep ACKing with RCONT. The last byte moved
    /// carries the STOP; a transaction moving no data at all is sent as an
    /// address-only write. A NAK of any address phase is reported as
    /// [`Errno::Nak`] with the interrupt cleared.
    pub fn transfer(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<()> {
        let write_addr = Self::address_byte(address, false)?;
        let read_addr = write_addr | 1;

        let Some(last) = operations.iter().rposition(|op| direction(op).is_some()) else {
            self.blocking_push((FormatFlags::START | FormatFlags::STOP).with_byte(write_addr))?;
            self.wait_fmt_empty()?;
            return self.take_nak(address);
        };

        let mut previous = None;
        for i in 0..=last {
            let Some(is_read) = direction(&operations[i]) else {
                continue;
            };
            let next = operations[i + 1..=last].iter().find_map(direction);
            let stop = i == last;

            match &mut operations[i] {
                Operation::Write(bytes) => {
                    if previous != Some(false) {
                        self.blocking_push(FormatFlags::START.with_byte(write_addr))?;
                    }
                    if let Some((tail, body)) = bytes.split_last() {
                        for &byte in body {
                            self.blocking_push(FormatFlags::empty().with_byte(byte))?;
                        }
                        let end = if stop {
                            FormatFlags::STOP
                        } else {
                            FormatFlags::empty()
                        };
                        self.blocking_push(end.with_byte(*tail))?;
                    }
                }
                Operation::Read(buf) => {
                    if previous != Some(true) {
                        self.blocking_push(FormatFlags::START.with_byte(read_addr))?;
                        self.wait_fmt_empty()?;
                        self.take_nak(address)?;
                    }
                    self.read_run(buf, stop, next == Some(true))?;
                }
            }
            previous = Some(is_read);
        }

        self.wait_fmt_empty()?;
        self.take_nak(address)
    }

    /// Read `buf` inside an already addressed read phase
    fn read_run(&mut self, buf: &mut [u8], stop: bool, continues: bool) -> Result<()> {
        let mut offset = 0;
        while offset < buf.len() {
            let chunk = (buf.len() - offset).min(READB_MAX);
            let last_chunk = offset + chunk == buf.len();
            let mut flags = FormatFlags::READB;
            if last_chunk && stop {
                flags |= FormatFlags::STOP;
            } else if !last_chunk || continues {
                flags |= FormatFlags::RCONT;
            }

            self.blocking_push(flags.with_byte(chunk as u8))?;
            self.wait_fmt_empty()?;
            for byte in &mut buf[offset..offset + chunk] {
                *byte = self.regs.read_data();
            }
            offset += chunk;
        }
        Ok(())
    }

    /// FMT FIFO is empty
    pub fn fmt_empty(&self) -> bool {
        self.regs.status().is_set(STATUS::FMTEMPTY)
    }

    /// FMT FIFO is full
    pub fn fmt_full(&self) -> bool {
        self.regs.status().is_set(STATUS::FMTFULL)
    }

    /// RX FIFO is full
    pub fn rx_full(&self) -> bool {
        self.regs.status().is_set(STATUS::RXFULL)
    }

    /// RX FIFO is empty
    pub fn rx_empty(&self) -> bool {
        self.regs.status().is_set(STATUS::RXEMPTY)
    }

    /// No host transaction in progress
    pub fn host_idle(&self) -> bool {
        self.regs.status().is_set(STATUS::HOSTIDLE)
    }

    /// `interrupt` is pending in INTR_STATE
    pub fn interrupt_asserted(&self, interrupt: I2cInterrupt) -> bool {
        self.regs.intr_state() & interrupt.bit() != 0
    }

    /// Clear `interrupt` by writing INTR_STATE back without its bit.
    ///
    /// On OpenTitan silicon INTR_STATE is write-1-to-clear: there this write
    /// acknowledges every other pending interrupt and leaves `interrupt` set.
    pub fn clear_interrupt(&mut self, interrupt: I2cInterrupt) {
        let state = self.regs.intr_state();
        self.regs.set_intr_state(state & !interrupt.bit());
    }

    /// Let `interrupt` reach the interrupt controller
    pub fn enable_interrupt(&mut self, interrupt: I2cInterrupt) {
        let enable = self.regs.intr_enable();
        self.regs.set_intr_enable(enable | interrupt.bit());
    }

    /// Mask `interrupt`; it still latches in INTR_STATE
    pub fn disable_interrupt(&mut self, interrupt: I2cInterrupt) {
        let enable = self.regs.intr_enable();
        self.regs.set_intr_enable(enable & !interrupt.bit());
    }

    /// Force `interrupt` through the test register
    pub fn test_interrupt(&mut self, interrupt: I2cInterrupt) {
        self.regs.set_intr_test(interrupt.bit());
    }
}

impl<R> embedded_hal::i2c::ErrorType for I2cHostDriver<R> {
    type Error = Errno;
}

/// Framing follows [`I2cHostDriver::transfer`].
impl<R> embedded_hal::i2c::I2c for I2cHostDriver<R>
where
    R: Deref,
    R::Target: I2cHostRegisters,
{
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<()> {
        self.transfer(address, operations)
    }
}
