//! Memory mapped register layouts
//!
//! I2C: <https://github.com/lowRISC/opentitan/tree/9ddf276c64e2974ed8e528e8b2feb00b977861de/hw/ip/i2c>
//! GPIO, SPI, RGB LED: <https://lowrisc.org/sonata-system/doc/ip/>
//! USB device: <https://github.com/lowRISC/opentitan/tree/ab878b5d3578939a04db72d4ed966a56a869b2ed/hw/ip/usbdev>

use core::mem::align_of;
use core::ops::Deref;
use core::ptr::NonNull;

use tock_registers::registers::{ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

use crate::error::{Errno, Result};

/// Handle to a peripheral's register block at a fixed address
pub struct MmioRef<T> {
    ptr: NonNull<T>,
}

// SAFETY: the handle owns access to one peripheral instance. Moving it to
// another thread moves that ownership; nothing is shared.
unsafe impl<T> Send for MmioRef<T> {}

impl<T> MmioRef<T> {
    /// Create a handle from the block's base address.
    ///
    /// Null or misaligned addresses are rejected with [`Errno::InvalidArgs`].
    ///
    /// ## Safety
    ///
    /// - `base` must point to a register block laid out as `T`.
    /// - The block must stay mapped for as long as the handle is used.
    /// - No other handle may drive the same block concurrently.
    pub unsafe fn new(base: *mut u8) -> Result<MmioRef<T>> {
        if base as usize % align_of::<T>() != 0 {
            return Err(Errno::InvalidArgs);
        }
        NonNull::new(base)
            .map(|ptr| MmioRef { ptr: ptr.cast() })
            .ok_or(Errno::InvalidArgs)
    }
}

impl<T> Deref for MmioRef<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: `ptr` is aligned and dereferencable for as long as the
        // handle lives, as promised by the caller of `MmioRef::new`.
        unsafe { self.ptr.as_ref() }
    }
}

register_structs! {
    /// OpenTitan I2C controller
    #[allow(dead_code)]
    pub I2cRegisters {
        /// Interrupt State Register
        (0x0000 => pub(crate) intr_state: ReadWrite<u32, INTR::Register>),
        /// Interrupt Enable Register
        (0x0004 => pub(crate) intr_enable: ReadWrite<u32, INTR::Register>),
        /// Interrupt Test Register
        (0x0008 => pub(crate) intr_test: WriteOnly<u32, INTR::Register>),
        /// Alert Test Register
        (0x000c => pub(crate) alert_test: WriteOnly<u32>),
        /// I2C Control Register
        (0x0010 => pub(crate) ctrl: ReadWrite<u32, CTRL::Register>),
        /// Live status for host and target modes
        (0x0014 => pub(crate) status: ReadWrite<u32, STATUS::Register>),
        /// I2C Read Data
        (0x0018 => pub(crate) rdata: ReadWrite<u32, RDATA::Register>),
        /// I2C Host Format Data
        (0x001c => pub(crate) fdata: WriteOnly<u32, FDATA::Register>),
        /// I2C FIFO control register
        (0x0020 => pub(crate) fifo_ctrl: ReadWrite<u32, FIFO_CTRL::Register>),
        /// Host mode FIFO configuration
        (0x0024 => pub(crate) host_fifo_config: ReadWrite<u32, HOST_FIFO_CONFIG::Register>),
        /// Target mode FIFO configuration
        (0x0028 => pub(crate) target_fifo_config: ReadWrite<u32>),
        /// Host mode FIFO status
        (0x002c => pub(crate) host_fifo_status: ReadWrite<u32>),
        /// Target mode FIFO status
        (0x0030 => pub(crate) target_fifo_status: ReadWrite<u32>),
        /// I2C Override Control Register
        (0x0034 => pub(crate) ovrd: ReadWrite<u32>),
        /// Oversampled RX values
        (0x0038 => pub(crate) val: ReadWrite<u32>),
        /// Detailed I2C timings, table 10 of the I2C specification
        (0x003c => pub(crate) timing0: ReadWrite<u32, TIMING0::Register>),
        (0x0040 => pub(crate) timing1: ReadWrite<u32, TIMING1::Register>),
        (0x0044 => pub(crate) timing2: ReadWrite<u32, TIMING2::Register>),
        (0x0048 => pub(crate) timing3: ReadWrite<u32, TIMING3::Register>),
        (0x004c => pub(crate) timing4: ReadWrite<u32, TIMING4::Register>),
        /// Clock stretching timeout control
        (0x0050 => pub(crate) timeout_ctrl: ReadWrite<u32>),
        /// Target address and mask pairs
        (0x0054 => pub(crate) target_id: ReadWrite<u32>),
        /// Target acquired data
        (0x0058 => pub(crate) acqdata: ReadWrite<u32>),
        /// Target transmit data
        (0x005c => pub(crate) txdata: WriteOnly<u32>),
        /// Host clock generation timeout, in input clock cycles
        (0x0060 => pub(crate) host_timeout_ctrl: ReadWrite<u32>),
        /// Target internal stretching timeout control
        (0x0064 => pub(crate) target_timeout_ctrl: ReadWrite<u32>),
        /// Number of new transactions NACK'ed by the target since last read
        (0x0068 => pub(crate) target_nack_count: ReadWrite<u32>),
        /// Target ACK control
        (0x006c => pub(crate) target_ack_ctrl: ReadWrite<u32>),
        (0x0070 => @END),
    }
}

register_bitfields![u32,
    pub INTR [
        FMT_THRESHOLD OFFSET(0) NUMBITS(1) [],
        RX_THRESHOLD OFFSET(1) NUMBITS(1) [],
        ACQ_THRESHOLD OFFSET(2) NUMBITS(1) [],
        RX_OVERFLOW OFFSET(3) NUMBITS(1) [],
        NAK OFFSET(4) NUMBITS(1) [],
        SCL_INTERFERENCE OFFSET(5) NUMBITS(1) [],
        SDA_INTERFERENCE OFFSET(6) NUMBITS(1) [],
        STRETCH_TIMEOUT OFFSET(7) NUMBITS(1) [],
        SDA_UNSTABLE OFFSET(8) NUMBITS(1) [],
        CMD_COMPLETE OFFSET(9) NUMBITS(1) [],
        TX_STRETCH OFFSET(10) NUMBITS(1) [],
        TX_THRESHOLD OFFSET(11) NUMBITS(1) [],
        ACQ_FULL OFFSET(12) NUMBITS(1) [],
        UNEXP_STOP OFFSET(13) NUMBITS(1) [],
        HOST_TIMEOUT OFFSET(14) NUMBITS(1) [],
    ],

    pub CTRL [
        ENABLEHOST OFFSET(0) NUMBITS(1) [],
        ENABLETARGET OFFSET(1) NUMBITS(1) [],
        LLPBK OFFSET(2) NUMBITS(1) [],
    ],

    pub STATUS [
        FMTFULL OFFSET(0) NUMBITS(1) [],
        RXFULL OFFSET(1) NUMBITS(1) [],
        FMTEMPTY OFFSET(2) NUMBITS(1) [],
        HOSTIDLE OFFSET(3) NUMBITS(1) [],
        TARGETIDLE OFFSET(4) NUMBITS(1) [],
        RXEMPTY OFFSET(5) NUMBITS(1) [],
        TXFULL OFFSET(6) NUMBITS(1) [],
        ACQFULL OFFSET(7) NUMBITS(1) [],
        TXEMPTY OFFSET(8) NUMBITS(1) [],
        ACQEMPTY OFFSET(9) NUMBITS(1) [],
        ACK_CTRL_STRETCH OFFSET(10) NUMBITS(1) [],
    ],

    pub RDATA [
        RDATA OFFSET(0) NUMBITS(8) [],
    ],

    pub FDATA [
        FBYTE OFFSET(0) NUMBITS(8) [],
        START OFFSET(8) NUMBITS(1) [],
        STOP OFFSET(9) NUMBITS(1) [],
        READB OFFSET(10) NUMBITS(1) [],
        RCONT OFFSET(11) NUMBITS(1) [],
        NAKOK OFFSET(12) NUMBITS(1) [],
    ],

    pub FIFO_CTRL [
        RXRST OFFSET(0) NUMBITS(1) [],
        FMTRST OFFSET(1) NUMBITS(1) [],
        ACQRST OFFSET(7) NUMBITS(1) [],
        TXRST OFFSET(8) NUMBITS(1) [],
    ],

    pub HOST_FIFO_CONFIG [
        RX_THRESH OFFSET(0) NUMBITS(12) [],
        FMT_THRESH OFFSET(16) NUMBITS(12) [],
    ],

    pub TIMING0 [
        THIGH OFFSET(0) NUMBITS(16) [],
        TLOW OFFSET(16) NUMBITS(16) [],
    ],

    pub TIMING1 [
        T_R OFFSET(0) NUMBITS(16) [],
        T_F OFFSET(16) NUMBITS(16) [],
    ],

    pub TIMING2 [
        TSU_STA OFFSET(0) NUMBITS(16) [],
        THD_STA OFFSET(16) NUMBITS(16) [],
    ],

    pub TIMING3 [
        TSU_DAT OFFSET(0) NUMBITS(16) [],
        THD_DAT OFFSET(16) NUMBITS(16) [],
    ],

    pub TIMING4 [
        TSU_STO OFFSET(0) NUMBITS(16) [],
        T_BUF OFFSET(16) NUMBITS(16) [],
    ],
];

register_structs! {
    /// Sonata GPIO
    #[allow(dead_code)]
    pub GpioRegisters {
        (0x0000 => pub(crate) output: ReadWrite<u32>),
        (0x0004 => pub(crate) input: ReadWrite<u32>),
        (0x0008 => pub(crate) debounced_input: ReadWrite<u32>),
        (0x000c => pub(crate) debounced_threshold: ReadWrite<u32>),
        (0x0010 => pub(crate) raspberry_pi_header: ReadWrite<u32>),
        (0x0014 => pub(crate) raspberry_pi_mask: ReadWrite<u32>),
        (0x0018 => pub(crate) arduino_shield_header: ReadWrite<u32>),
        (0x001c => pub(crate) arduino_shield_mask: ReadWrite<u32>),
        (0x0020 => @END),
    }
}

register_structs! {
    /// Sonata RGB LED controller
    pub RgbLedCtrlRegisters {
        (0x0000 => pub(crate) rgbled0: ReadWrite<u32, RGBLED::Register>),
        (0x0004 => pub(crate) rgbled1: ReadWrite<u32, RGBLED::Register>),
        (0x0008 => pub(crate) ctrl: ReadWrite<u32, RGBLED_CTRL::Register>),
        (0x000c => pub(crate) status: ReadWrite<u32, RGBLED_STATUS::Register>),
        (0x0010 => @END),
    }
}

register_bitfields![u32,
    pub(crate) RGBLED [
        RED OFFSET(0) NUMBITS(8) [],
        GREEN OFFSET(8) NUMBITS(8) [],
        BLUE OFFSET(16) NUMBITS(8) [],
    ],

    pub(crate) RGBLED_CTRL [
        SET OFFSET(0) NUMBITS(1) [],
        OFF OFFSET(1) NUMBITS(1) [],
    ],

    pub(crate) RGBLED_STATUS [
        IDLE OFFSET(0) NUMBITS(1) [],
    ],
];

register_structs! {
    /// Sonata SPI host
    #[allow(dead_code)]
    pub SpiRegisters {
        (0x0000 => pub(crate) intr_state: ReadWrite<u32>),
        (0x0004 => pub(crate) intr_enable: ReadWrite<u32>),
        (0x0008 => pub(crate) intr_test: ReadWrite<u32>),
        (0x000c => pub(crate) cfg: ReadWrite<u32, SPI_CFG::Register>),
        (0x0010 => pub(crate) control: ReadWrite<u32, SPI_CONTROL::Register>),
        (0x0014 => pub(crate) status: ReadWrite<u32, SPI_STATUS::Register>),
        (0x0018 => pub(crate) start: ReadWrite<u32>),
        (0x001c => pub(crate) rx_fifo: ReadWrite<u32>),
        (0x0020 => pub(crate) tx_fifo: ReadWrite<u32>),
        (0x0024 => @END),
    }
}

register_bitfields![u32,
    pub(crate) SPI_CFG [
        HALF_CLK_PERIOD OFFSET(0) NUMBITS(16) [],
        MSB_FIRST OFFSET(29) NUMBITS(1) [],
        CPHA OFFSET(30) NUMBITS(1) [],
        CPOL OFFSET(31) NUMBITS(1) [],
    ],

    pub(crate) SPI_CONTROL [
        TX_CLEAR OFFSET(0) NUMBITS(1) [],
        RX_CLEAR OFFSET(1) NUMBITS(1) [],
        TX_ENABLE OFFSET(2) NUMBITS(1) [],
        RX_ENABLE OFFSET(3) NUMBITS(1) [],
    ],

    pub(crate) SPI_STATUS [
        TX_FIFO_LEVEL OFFSET(0) NUMBITS(8) [],
        RX_FIFO_LEVEL OFFSET(8) NUMBITS(8) [],
        IDLE OFFSET(18) NUMBITS(1) [],
    ],
];

/// Endpoints in each direction
pub const USBDEV_ENDPOINTS: usize = 12;
/// Packet buffers in the device's buffer memory
pub const USBDEV_BUFFERS: usize = 32;
/// 32-bit words per packet buffer
pub const USBDEV_BUFFER_WORDS: usize = 16;

register_structs! {
    /// OpenTitan USB device
    #[allow(dead_code)]
    pub UsbdevRegisters {
        (0x0000 => pub(crate) intr_state: ReadWrite<u32>),
        (0x0004 => pub(crate) intr_enable: ReadWrite<u32>),
        (0x0008 => pub(crate) intr_test: ReadWrite<u32>),
        (0x000c => pub(crate) alert_test: ReadWrite<u32>),
        (0x0010 => pub(crate) usbctrl: ReadWrite<u32, USBCTRL::Register>),
        (0x0014 => pub(crate) ep_out_enable: ReadWrite<u32>),
        (0x0018 => pub(crate) ep_in_enable: ReadWrite<u32>),
        (0x001c => pub(crate) usbstat: ReadWrite<u32, USBSTAT::Register>),
        (0x0020 => pub(crate) avoutbuffer: ReadWrite<u32>),
        (0x0024 => pub(crate) avsetupbuffer: ReadWrite<u32>),
        (0x0028 => pub(crate) rxfifo: ReadWrite<u32, RXFIFO::Register>),
        (0x002c => pub(crate) rxenable_setup: ReadWrite<u32>),
        (0x0030 => pub(crate) rxenable_out: ReadWrite<u32>),
        (0x0034 => _reserved0),
        (0x0038 => pub(crate) in_sent: ReadWrite<u32>),
        (0x003c => pub(crate) out_stall: ReadWrite<u32>),
        (0x0040 => pub(crate) in_stall: ReadWrite<u32>),
        (0x0044 => pub(crate) configin: [ReadWrite<u32, CONFIGIN::Register>; USBDEV_ENDPOINTS]),
        (0x0074 => pub(crate) out_iso: ReadWrite<u32>),
        (0x0078 => pub(crate) in_iso: ReadWrite<u32>),
        (0x007c => pub(crate) out_data_toggle: ReadWrite<u32>),
        (0x0080 => pub(crate) in_data_toggle: ReadWrite<u32>),
        (0x0084 => _reserved1),
        (0x008c => pub(crate) phy_config: ReadWrite<u32, PHY_CONFIG::Register>),
        (0x0090 => _reserved2),
        (0x0800 => pub(crate) buffer: [ReadWrite<u32>; USBDEV_BUFFERS * USBDEV_BUFFER_WORDS]),
        (0x1000 => @END),
    }
}

register_bitfields![u32,
    pub(crate) USBCTRL [
        ENABLE OFFSET(0) NUMBITS(1) [],
        DEVICE_ADDRESS OFFSET(16) NUMBITS(7) [],
    ],

    pub(crate) USBSTAT [
        AV_OUT_FULL OFFSET(23) NUMBITS(1) [],
        RX_DEPTH OFFSET(24) NUMBITS(4) [],
        AV_SETUP_FULL OFFSET(30) NUMBITS(1) [],
    ],

    pub(crate) RXFIFO [
        BUFFER OFFSET(0) NUMBITS(5) [],
        SIZE OFFSET(8) NUMBITS(7) [],
        SETUP OFFSET(19) NUMBITS(1) [],
        EP OFFSET(20) NUMBITS(4) [],
    ],

    pub(crate) CONFIGIN [
        BUFFER OFFSET(0) NUMBITS(5) [],
        SIZE OFFSET(8) NUMBITS(7) [],
        SENDING OFFSET(29) NUMBITS(1) [],
        PEND OFFSET(30) NUMBITS(1) [],
        RDY OFFSET(31) NUMBITS(1) [],
    ],

    pub(crate) PHY_CONFIG [
        USE_DIFF_RCVR OFFSET(0) NUMBITS(1) [],
    ],
];
