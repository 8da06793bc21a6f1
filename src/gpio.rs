//! Sonata GPIO
//!
//! <https://lowrisc.org/sonata-system/doc/ip/gpio.html>

use core::ops::Deref;

use tock_registers::interfaces::{Readable, Writeable};

use crate::registers::GpioRegisters;
use crate::Joystick;

/// Output bit of the first user LED
pub const FIRST_LED: u32 = 4;
/// Output bit of the last user LED
pub const LAST_LED: u32 = 11;
/// Number of user LEDs
pub const LED_COUNT: u32 = LAST_LED - FIRST_LED + 1;
const LED_MASK: u32 = ((1 << LED_COUNT) - 1) << FIRST_LED;

/// Input bit of the first user switch
pub const FIRST_SWITCH: u32 = 5;
/// Input bit of the last user switch
pub const LAST_SWITCH: u32 = 13;
/// Number of user switches
pub const SWITCH_COUNT: u32 = LAST_SWITCH - FIRST_SWITCH + 1;
const SWITCH_MASK: u32 = ((1 << SWITCH_COUNT) - 1) << FIRST_SWITCH;

const JOYSTICK_MASK: u32 = 0x1f;

/// Bit for `index` counted from `first`, 0 when it falls outside `mask`
const fn indexed_bit(index: u32, first: u32, mask: u32) -> u32 {
    match 1u32.checked_shl(index.saturating_add(first)) {
        Some(bit) => bit & mask,
        None => 0,
    }
}

/// GPIO driver. LEDs and switches out of range are ignored.
pub struct SonataGpio<R> {
    regs: R,
}

impl<R> SonataGpio<R>
where
    R: Deref<Target = GpioRegisters>,
{
    /// Wrap the GPIO register block
    pub fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Light user LED `index`
    pub fn led_on(&mut self, index: u32) {
        let output = self.regs.output.get();
        self.regs
            .output
            .set(output | indexed_bit(index, FIRST_LED, LED_MASK));
    }

    /// Turn user LED `index` off
    pub fn led_off(&mut self, index: u32) {
        let output = self.regs.output.get();
        self.regs
            .output
            .set(output & !indexed_bit(index, FIRST_LED, LED_MASK));
    }

    /// Flip user LED `index`
    pub fn led_toggle(&mut self, index: u32) {
        let output = self.regs.output.get();
        self.regs
            .output
            .set(output ^ indexed_bit(index, FIRST_LED, LED_MASK));
    }

    /// State of user switch `index`
    pub fn read_switch(&self, index: u32) -> bool {
        self.regs.input.get() & indexed_bit(index, FIRST_SWITCH, SWITCH_MASK) != 0
    }

    /// Directions and press currently reported by the joystick
    pub fn read_joystick(&self) -> Joystick {
        Joystick::from_bits_truncate((self.regs.input.get() & JOYSTICK_MASK) as u8)
    }
}
