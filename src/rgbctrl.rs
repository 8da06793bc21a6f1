//! Sonata RGB LED controller
//!
//! Two RGB LEDs latched by a write to the control register.

use core::ops::Deref;

use tock_registers::interfaces::{Readable, Writeable};

use crate::error::Result;
use crate::registers::{RgbLedCtrlRegisters, RGBLED, RGBLED_CTRL, RGBLED_STATUS};
use crate::wait::{spin_until, WaitPolicy};

/// Which of the two RGB LEDs a colour goes to
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RgbLed {
    /// driven from RGBLED0
    Led0,
    /// driven from RGBLED1
    Led1,
}

/// RGB LED controller driver
pub struct SonataRgbLedCtrl<R> {
    regs: R,
    wait: WaitPolicy,
}

impl<R> SonataRgbLedCtrl<R>
where
    R: Deref<Target = RgbLedCtrlRegisters>,
{
    /// Wrap the controller's register block, waiting forever for idle
    pub fn new(regs: R) -> Self {
        Self {
            regs,
            wait: WaitPolicy::Forever,
        }
    }

    /// Replace the policy used while waiting for idle
    pub fn with_wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    /// Block until the controller has finished driving the LEDs.
    pub fn wait_idle(&self) -> Result<()> {
        spin_until(self.wait, || self.regs.status.is_set(RGBLED_STATUS::IDLE))
    }

    /// Stage a colour for `led`. It shows after [`Self::update`].
    pub fn set_rgb(&mut self, red: u8, green: u8, blue: u8, led: RgbLed) -> Result<()> {
        self.wait_idle()?;
        let colour = RGBLED::RED.val(red.into())
            + RGBLED::GREEN.val(green.into())
            + RGBLED::BLUE.val(blue.into());
        match led {
            RgbLed::Led0 => self.regs.rgbled0.write(colour),
            RgbLed::Led1 => self.regs.rgbled1.write(colour),
        }
        log::trace!("rgbled {:?} <- #{:02x}{:02x}{:02x}", led, red, green, blue);
        Ok(())
    }

    /// Latch the staged colours onto both LEDs.
    pub fn update(&mut self) -> Result<()> {
        self.wait_idle()?;
        self.regs.ctrl.write(RGBLED_CTRL::SET::SET);
        Ok(())
    }

    /// Switch both LEDs off.
    pub fn clear(&mut self) -> Result<()> {
        self.wait_idle()?;
        self.regs.ctrl.write(RGBLED_CTRL::OFF::SET);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Errno, MmioRef};

    fn block() -> RgbLedCtrlRegisters {
        // SAFETY: all-zero is a valid value for every register.
        let block: RgbLedCtrlRegisters = unsafe { core::mem::zeroed() };
        block.status.set(1);
        block
    }

    fn ctrl(block: &RgbLedCtrlRegisters) -> SonataRgbLedCtrl<MmioRef<RgbLedCtrlRegisters>> {
        // SAFETY: every caller keeps `block` alive for the driver's lifetime.
        let regs = unsafe {
            MmioRef::<RgbLedCtrlRegisters>::new(block as *const RgbLedCtrlRegisters as *mut u8)
        }
        .unwrap();
        SonataRgbLedCtrl::new(regs)
    }

    #[test]
    fn colours_are_packed_per_led() {
        let block = block();
        let mut leds = ctrl(&block);
        leds.set_rgb(0x12, 0x34, 0x56, RgbLed::Led0).unwrap();
        leds.set_rgb(0xff, 0, 0x01, RgbLed::Led1).unwrap();
        assert_eq!(block.rgbled0.get(), 0x56_34_12);
        assert_eq!(block.rgbled1.get(), 0x01_00_ff);
        assert_eq!(block.ctrl.get(), 0);
    }

    #[test]
    fn update_and_clear() {
        let block = block();
        let mut leds = ctrl(&block);
        leds.update().unwrap();
        assert_eq!(block.ctrl.get(), 1);
        leds.clear().unwrap();
        assert_eq!(block.ctrl.get(), 2);
    }

    #[test]
    fn busy_controller_times_out() {
        let block = block();
        block.status.set(0);
        let mut leds = ctrl(&block).with_wait_policy(WaitPolicy::Spins(10));
        assert_eq!(leds.set_rgb(1, 2, 3, RgbLed::Led0), Err(Errno::Timeout));
        assert_eq!(leds.update(), Err(Errno::Timeout));
        assert_eq!(block.rgbled0.get(), 0);
        assert_eq!(block.ctrl.get(), 0);
    }
}
