//! Simulated OpenTitan I2C controller for host driver tests
//!
//! Format words execute the moment they are pushed: reads fill the RX FIFO
//! with an incrementing byte pattern, and STARTs to configured addresses
//! raise the NAK interrupt.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use tock_registers::fields::FieldValue;
use tock_registers::LocalRegisterCopy;

use crate::host::I2cHostRegisters;
use crate::registers::{CTRL, FDATA, FIFO_CTRL, HOST_FIFO_CONFIG, STATUS};
use crate::I2cInterrupt;

pub(crate) struct SimulatedI2c {
    pub(crate) intr_state: Cell<u32>,
    pub(crate) intr_enable: Cell<u32>,
    pub(crate) intr_test: Cell<u32>,
    pub(crate) ctrl: Cell<u32>,
    pub(crate) fifo_ctrl: Cell<u32>,
    pub(crate) host_fifo_config: Cell<u32>,
    pub(crate) timing: Cell<[u32; 5]>,
    fmt_log: RefCell<Vec<u32>>,
    rx: RefCell<VecDeque<u8>>,
    next_byte: Cell<u8>,
    nak_addresses: RefCell<Vec<u8>>,
    starts_seen: Cell<usize>,
    nak_start: Cell<Option<usize>>,
    fmt_full_polls: Cell<u32>,
    wedged: Cell<bool>,
}

impl SimulatedI2c {
    pub(crate) fn new() -> Self {
        Self {
            intr_state: Cell::new(0),
            intr_enable: Cell::new(0),
            intr_test: Cell::new(0),
            ctrl: Cell::new(0),
            fifo_ctrl: Cell::new(0),
            host_fifo_config: Cell::new(0),
            timing: Cell::new([0; 5]),
            fmt_log: RefCell::new(Vec::new()),
            rx: RefCell::new(VecDeque::new()),
            next_byte: Cell::new(0),
            nak_addresses: RefCell::new(Vec::new()),
            starts_seen: Cell::new(0),
            nak_start: Cell::new(None),
            fmt_full_polls: Cell::new(0),
            wedged: Cell::new(false),
        }
    }

    /// Every START addressed to `address` is NAK'd
    pub(crate) fn nak_address(&self, address: u8) {
        self.nak_addresses.borrow_mut().push(address);
    }

    /// NAK the `n`th START pushed (1-based)
    pub(crate) fn nak_nth_start(&self, n: usize) {
        self.nak_start.set(Some(n));
    }

    /// Report the FMT FIFO as full for the next `polls` status reads
    pub(crate) fn hold_fmt_full(&self, polls: u32) {
        self.fmt_full_polls.set(polls);
    }

    /// FMT FIFO stays full and never drains
    pub(crate) fn wedge(&self) {
        self.wedged.set(true);
    }

    pub(crate) fn format_words(&self) -> Vec<u32> {
        self.fmt_log.borrow().clone()
    }

    pub(crate) fn rx_drained(&self) -> bool {
        self.rx.borrow().is_empty()
    }

    fn execute(&self, word: u32) {
        let word = LocalRegisterCopy::<u32, FDATA::Register>::new(word);
        let byte = word.read(FDATA::FBYTE) as u8;

        if word.is_set(FDATA::START) {
            let n = self.starts_seen.get() + 1;
            self.starts_seen.set(n);
            let target = byte >> 1;
            if self.nak_start.get() == Some(n) || self.nak_addresses.borrow().contains(&target) {
                self.intr_state
                    .set(self.intr_state.get() | I2cInterrupt::Nak.bit());
            }
        }

        if word.is_set(FDATA::READB) {
            let count = if byte == 0 { 256 } else { usize::from(byte) };
            let mut rx = self.rx.borrow_mut();
            for _ in 0..count {
                rx.push_back(self.next_byte.get());
                self.next_byte.set(self.next_byte.get().wrapping_add(1));
            }
        }
    }
}

impl I2cHostRegisters for SimulatedI2c {
    fn status(&self) -> LocalRegisterCopy<u32, STATUS::Register> {
        let held = self.fmt_full_polls.get();
        if held > 0 {
            self.fmt_full_polls.set(held - 1);
        }
        let full = self.wedged.get() || held > 0;

        let mut status = LocalRegisterCopy::new(0);
        if full {
            status.modify(STATUS::FMTFULL::SET);
        } else {
            status.modify(STATUS::FMTEMPTY::SET + STATUS::HOSTIDLE::SET);
        }
        if self.rx.borrow().is_empty() {
            status.modify(STATUS::RXEMPTY::SET);
        }
        status
    }

    fn push_format(&self, word: u32) {
        assert!(!self.wedged.get(), "push into a full FMT FIFO");
        self.fmt_log.borrow_mut().push(word);
        self.execute(word);
    }

    fn read_data(&self) -> u8 {
        self.rx
            .borrow_mut()
            .pop_front()
            .expect("read from an empty RX FIFO")
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
        self.ctrl.set(value.value);
    }

    fn set_fifo_ctrl(&self, value: FieldValue<u32, FIFO_CTRL::Register>) {
        self.fifo_ctrl.set(value.value);
    }

    fn set_host_fifo_config(&self, value: FieldValue<u32, HOST_FIFO_CONFIG::Register>) {
        self.host_fifo_config.set(value.value);
    }

    fn set_timing(&self, packed: [u32; 5]) {
        self.timing.set(packed);
    }
}
