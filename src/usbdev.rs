//! OpenTitan USB device
//!
//! Polled packet level access: buffer supply, endpoint setup, and moving
//! packets between caller memory and the device's packet buffers. Control
//! transfer handling and descriptors belong to the USB stack above.

use core::ops::Deref;

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::ReadWrite;

use crate::error::{Errno, Result};
use crate::registers::{
    UsbdevRegisters, CONFIGIN, PHY_CONFIG, RXFIFO, USBCTRL, USBDEV_BUFFERS, USBDEV_BUFFER_WORDS,
    USBDEV_ENDPOINTS, USBSTAT,
};
use crate::UsbdevInterrupt;

/// Largest packet the device moves, in bytes
pub const MAX_PACKET_LEN: usize = 64;
/// Packet buffers shared by every endpoint
pub const NUM_BUFFERS: usize = USBDEV_BUFFERS;
/// Endpoints in each direction
pub const MAX_ENDPOINTS: usize = USBDEV_ENDPOINTS;

/// A packet taken from the RX FIFO
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RxPacket {
    /// OUT endpoint it arrived on
    pub endpoint: u8,
    /// Packet buffer holding it; the caller hands it back through
    /// [`OpenTitanUsbdev::supply_buffers`]
    pub buffer: u8,
    /// Length in bytes, 0 for a zero length packet
    pub size: u16,
    /// Arrived as a SETUP transaction
    pub setup: bool,
}

fn endpoint_mask(ep: u8) -> Result<u32> {
    if usize::from(ep) < MAX_ENDPOINTS {
        Ok(1 << ep)
    } else {
        Err(Errno::InvalidArgs)
    }
}

fn set_mask(reg: &ReadWrite<u32>, mask: u32, on: bool) {
    let value = reg.get();
    reg.set(if on { value | mask } else { value & !mask });
}

/// USB device driver
pub struct OpenTitanUsbdev<R> {
    regs: R,
}

impl<R> OpenTitanUsbdev<R>
where
    R: Deref<Target = UsbdevRegisters>,
{
    /// Wrap the USB device register block
    pub fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Hand the buffers set in `available` to the hardware for reception.
    ///
    /// The SETUP FIFO is filled first, then the OUT FIFO. Returns the
    /// buffers that did not fit.
    pub fn supply_buffers(&mut self, mut available: u32) -> u32 {
        for buf in 0..NUM_BUFFERS as u32 {
            let mask = 1 << buf;
            if available & mask == 0 {
                continue;
            }
            let stat = self.regs.usbstat.extract();
            if stat.is_set(USBSTAT::AV_SETUP_FULL) {
                if stat.is_set(USBSTAT::AV_OUT_FULL) {
                    break;
                }
                self.regs.avoutbuffer.set(buf);
            } else {
                self.regs.avsetupbuffer.set(buf);
            }
            available &= !mask;
        }
        available
    }

    /// Supply every buffer and configure the PHY.
    ///
    /// Endpoints are left unconfigured and the device disconnected. Returns
    /// the bitmap of buffers still owned by software.
    pub fn init(&mut self) -> u32 {
        let available = self.supply_buffers(u32::MAX);
        self.regs.phy_config.write(PHY_CONFIG::USE_DIFF_RCVR::SET);
        log::debug!("usbdev: init, {:#010x} buffers left", available);
        available
    }

    /// Enable every source in `interrupts`
    pub fn interrupt_enable(&mut self, interrupts: UsbdevInterrupt) {
        set_mask(&self.regs.intr_enable, interrupts.bits(), true);
    }

    /// Disable every source in `interrupts`
    pub fn interrupt_disable(&mut self, interrupts: UsbdevInterrupt) {
        set_mask(&self.regs.intr_enable, interrupts.bits(), false);
    }

    /// Set up OUT endpoint `ep`: reception, SETUP acceptance and isochronous mode.
    pub fn configure_out_endpoint(
        &mut self,
        ep: u8,
        enabled: bool,
        setup: bool,
        iso: bool,
    ) -> Result<()> {
        let mask = endpoint_mask(ep)?;
        set_mask(&self.regs.ep_out_enable, mask, enabled);
        set_mask(&self.regs.rxenable_setup, mask, setup);
        set_mask(&self.regs.rxenable_out, mask, enabled);
        set_mask(&self.regs.out_iso, mask, iso);
        Ok(())
    }

    /// Set up IN endpoint `ep`
    pub fn configure_in_endpoint(&mut self, ep: u8, enabled: bool, iso: bool) -> Result<()> {
        let mask = endpoint_mask(ep)?;
        set_mask(&self.regs.ep_in_enable, mask, enabled);
        set_mask(&self.regs.in_iso, mask, iso);
        Ok(())
    }

    /// STALL or release both directions of endpoint `ep`
    pub fn set_ep_stalling(&mut self, ep: u8, stalling: bool) -> Result<()> {
        let mask = endpoint_mask(ep)?;
        set_mask(&self.regs.out_stall, mask, stalling);
        set_mask(&self.regs.in_stall, mask, stalling);
        Ok(())
    }

    /// Enable the pull-up so the host sees the device.
    ///
    /// Endpoints must be configured first; traffic may follow at once.
    pub fn connect(&mut self) {
        self.regs.usbctrl.modify(USBCTRL::ENABLE::SET);
        log::debug!("usbdev: connect");
    }

    /// Drop off the bus
    pub fn disconnect(&mut self) {
        self.regs.usbctrl.modify(USBCTRL::ENABLE::CLEAR);
        log::debug!("usbdev: disconnect");
    }

    /// Pull-up is enabled
    pub fn connected(&self) -> bool {
        self.regs.usbctrl.is_set(USBCTRL::ENABLE)
    }

    /// Take the address the host assigned with SET_ADDRESS
    pub fn set_device_address(&mut self, address: u8) -> Result<()> {
        if address >= 0x80 {
            return Err(Errno::InvalidArgs);
        }
        self.regs
            .usbctrl
            .modify(USBCTRL::DEVICE_ADDRESS.val(address.into()));
        log::debug!("usbdev: address {}", address);
        Ok(())
    }

    /// Acknowledge one collected IN packet.
    ///
    /// Returns the endpoint and the buffer it released, which the caller
    /// reuses or supplies back.
    pub fn packet_collected(&mut self) -> Option<(u8, u8)> {
        let sent = self.regs.in_sent.get();
        let ep = (0..MAX_ENDPOINTS).find(|&ep| sent & (1 << ep) != 0)?;
        // write-1-to-clear, this endpoint only
        self.regs.in_sent.set(1 << ep);
        let buffer = self.regs.configin[ep].read(CONFIGIN::BUFFER) as u8;
        Some((ep as u8, buffer))
    }

    /// Copy `data` into `buffer` and present it on IN endpoint `ep`.
    ///
    /// An empty `data` sends a zero length packet.
    pub fn send_packet(&mut self, buffer: u8, ep: u8, data: &[u8]) -> Result<()> {
        endpoint_mask(ep)?;
        if usize::from(buffer) >= NUM_BUFFERS || data.len() > MAX_PACKET_LEN {
            return Err(Errno::InvalidArgs);
        }

        // the buffer memory only takes 32-bit accesses
        let base = usize::from(buffer) * USBDEV_BUFFER_WORDS;
        for (word, bytes) in self.regs.buffer[base..].iter().zip(data.chunks(4)) {
            let mut packed = [0u8; 4];
            packed[..bytes.len()].copy_from_slice(bytes);
            word.set(u32::from_le_bytes(packed));
        }

        let config = &self.regs.configin[usize::from(ep)];
        config.write(CONFIGIN::BUFFER.val(buffer.into()) + CONFIGIN::SIZE.val(data.len() as u32));
        config.modify(CONFIGIN::RDY::SET);
        log::trace!("usbdev: ep{} in {} bytes from buffer {}", ep, data.len(), buffer);
        Ok(())
    }

    /// Pop the next received packet, copying its payload into `data`.
    ///
    /// `None` when the RX FIFO is empty.
    pub fn recv_packet(&mut self, data: &mut [u8; MAX_PACKET_LEN]) -> Option<RxPacket> {
        if self.regs.usbstat.read(USBSTAT::RX_DEPTH) == 0 {
            return None;
        }
        // one read pops the entry
        let rx = self.regs.rxfifo.extract();
        let packet = RxPacket {
            endpoint: rx.read(RXFIFO::EP) as u8,
            buffer: rx.read(RXFIFO::BUFFER) as u8,
            size: rx.read(RXFIFO::SIZE) as u16,
            setup: rx.is_set(RXFIFO::SETUP),
        };

        let len = usize::from(packet.size).min(MAX_PACKET_LEN);
        let base = usize::from(packet.buffer) * USBDEV_BUFFER_WORDS;
        for (bytes, word) in data[..len].chunks_mut(4).zip(&self.regs.buffer[base..]) {
            let unpacked = word.get().to_le_bytes();
            bytes.copy_from_slice(&unpacked[..bytes.len()]);
        }
        log::trace!("usbdev: {:?}", packet);
        Some(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MmioRef;

    const AV_OUT_FULL: u32 = 1 << 23;
    const AV_SETUP_FULL: u32 = 1 << 30;

    fn block() -> UsbdevRegisters {
        // SAFETY: all-zero is a valid value for every register.
        unsafe { core::mem::zeroed() }
    }

    fn usbdev(block: &UsbdevRegisters) -> OpenTitanUsbdev<MmioRef<UsbdevRegisters>> {
        // SAFETY: every caller keeps `block` alive for the driver's lifetime.
        let regs = unsafe {
            MmioRef::<UsbdevRegisters>::new(block as *const UsbdevRegisters as *mut u8)
        }
        .unwrap();
        OpenTitanUsbdev::new(regs)
    }

    #[test]
    fn init_hands_every_buffer_to_setup_fifo() {
        let block = block();
        assert_eq!(usbdev(&block).init(), 0);
        assert_eq!(block.avsetupbuffer.get(), 31);
        assert_eq!(block.avoutbuffer.get(), 0);
        assert_eq!(block.phy_config.get(), 1);
    }

    #[test]
    fn buffers_go_to_out_fifo_once_setup_is_full() {
        let block = block();
        block.usbstat.set(AV_SETUP_FULL);
        assert_eq!(usbdev(&block).supply_buffers(0b1010), 0);
        assert_eq!(block.avoutbuffer.get(), 3);
        assert_eq!(block.avsetupbuffer.get(), 0);
    }

    #[test]
    fn full_fifos_keep_buffers_with_software() {
        let block = block();
        block.usbstat.set(AV_SETUP_FULL | AV_OUT_FULL);
        assert_eq!(usbdev(&block).supply_buffers(0xff), 0xff);
    }

    #[test]
    fn endpoint_configuration() {
        let block = block();
        let mut usb = usbdev(&block);

        usb.configure_out_endpoint(3, true, true, false).unwrap();
        assert_eq!(block.ep_out_enable.get(), 1 << 3);
        assert_eq!(block.rxenable_setup.get(), 1 << 3);
        assert_eq!(block.rxenable_out.get(), 1 << 3);
        assert_eq!(block.out_iso.get(), 0);

        usb.configure_out_endpoint(3, false, false, true).unwrap();
        assert_eq!(block.ep_out_enable.get(), 0);
        assert_eq!(block.rxenable_setup.get(), 0);
        assert_eq!(block.rxenable_out.get(), 0);
        assert_eq!(block.out_iso.get(), 1 << 3);

        usb.configure_in_endpoint(11, true, true).unwrap();
        assert_eq!(block.ep_in_enable.get(), 1 << 11);
        assert_eq!(block.in_iso.get(), 1 << 11);

        assert_eq!(
            usb.configure_out_endpoint(12, true, true, true),
            Err(Errno::InvalidArgs)
        );
        assert_eq!(usb.configure_in_endpoint(12, true, true), Err(Errno::InvalidArgs));
        assert_eq!(block.ep_out_enable.get(), 0);
        assert_eq!(block.ep_in_enable.get(), 1 << 11);
    }

    #[test]
    fn stalling_touches_both_directions_of_one_endpoint() {
        let block = block();
        block.out_stall.set(1);
        let mut usb = usbdev(&block);

        usb.set_ep_stalling(2, true).unwrap();
        assert_eq!((block.out_stall.get(), block.in_stall.get()), (0b101, 0b100));
        usb.set_ep_stalling(2, false).unwrap();
        assert_eq!((block.out_stall.get(), block.in_stall.get()), (0b001, 0));
        assert_eq!(usb.set_ep_stalling(12, true), Err(Errno::InvalidArgs));
    }

    #[test]
    fn connect_and_address() {
        let block = block();
        let mut usb = usbdev(&block);

        assert!(!usb.connected());
        usb.connect();
        assert!(usb.connected());
        usb.set_device_address(0x2a).unwrap();
        assert_eq!(block.usbctrl.get(), (0x2a << 16) | 1);
        assert_eq!(usb.set_device_address(0x80), Err(Errno::InvalidArgs));
        usb.set_device_address(0x7f).unwrap();
        assert_eq!(block.usbctrl.get(), (0x7f << 16) | 1);
        usb.disconnect();
        assert!(!usb.connected());
        assert_eq!(block.usbctrl.get(), 0x7f << 16);
    }

    #[test]
    fn interrupt_masking() {
        let block = block();
        let mut usb = usbdev(&block);
        usb.interrupt_enable(UsbdevInterrupt::PKT_RECEIVED | UsbdevInterrupt::LINK_RESET);
        assert_eq!(block.intr_enable.get(), 0x11);
        usb.interrupt_disable(UsbdevInterrupt::PKT_RECEIVED);
        assert_eq!(block.intr_enable.get(), 0x10);
    }

    #[test]
    fn send_packet_fills_buffer_then_arms_endpoint() {
        let block = block();
        let mut usb = usbdev(&block);
        let data: Vec<u8> = (0..10u8).collect();

        usb.send_packet(5, 1, &data).unwrap();
        let base = 5 * USBDEV_BUFFER_WORDS;
        assert_eq!(block.buffer[base].get(), 0x0302_0100);
        assert_eq!(block.buffer[base + 1].get(), 0x0706_0504);
        assert_eq!(block.buffer[base + 2].get(), 0x0908);
        assert_eq!(block.buffer[base + 3].get(), 0);
        assert_eq!(block.configin[1].get(), (1 << 31) | (10 << 8) | 5);
    }

    #[test]
    fn zero_length_packet_only_arms_endpoint() {
        let block = block();
        usbdev(&block).send_packet(2, 0, &[]).unwrap();
        assert_eq!(block.configin[0].get(), (1 << 31) | 2);
        assert!(block.buffer.iter().all(|word| word.get() == 0));
    }

    #[test]
    fn send_packet_rejects_bad_arguments() {
        let block = block();
        let mut usb = usbdev(&block);
        assert_eq!(usb.send_packet(0, 12, &[1]), Err(Errno::InvalidArgs));
        assert_eq!(usb.send_packet(32, 0, &[1]), Err(Errno::InvalidArgs));
        assert_eq!(usb.send_packet(0, 0, &[0; 65]), Err(Errno::InvalidArgs));
        assert!(block.configin.iter().all(|config| config.get() == 0));
    }

    #[test]
    fn collected_packets_release_their_buffer() {
        let block = block();
        let mut usb = usbdev(&block);
        assert_eq!(usb.packet_collected(), None);

        block.in_sent.set((1 << 4) | (1 << 7));
        block.configin[4].set(9);
        assert_eq!(usb.packet_collected(), Some((4, 9)));
        // only the reported endpoint is acknowledged
        assert_eq!(block.in_sent.get(), 1 << 4);
    }

    #[test]
    fn recv_packet_unpacks_descriptor_and_payload() {
        let block = block();
        let mut usb = usbdev(&block);
        let mut data = [0u8; MAX_PACKET_LEN];
        assert_eq!(usb.recv_packet(&mut data), None);

        block.usbstat.set(1 << 24);
        block.rxfifo.set(3 | (5 << 8) | (1 << 19) | (1 << 20));
        block.buffer[3 * USBDEV_BUFFER_WORDS].set(0x4433_2211);
        block.buffer[3 * USBDEV_BUFFER_WORDS + 1].set(0x55);

        let packet = usb.recv_packet(&mut data).unwrap();
        assert_eq!(
            packet,
            RxPacket {
                endpoint: 1,
                buffer: 3,
                size: 5,
                setup: true,
            }
        );
        assert_eq!(data[..5], [0x11, 0x22, 0x33, 0x44, 0x55]);
        assert!(data[5..].iter().all(|&b| b == 0));
    }
}
