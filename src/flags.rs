//! Flag sets shared between the drivers and their register maps

use bitflags::bitflags;

bitflags! {
    /// Control bits of a host-mode format FIFO word, above the 8-bit byte field
    #[repr(transparent)]
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct FormatFlags: u32 {
         /// Issue a START condition before transmitting the byte
         const START  = 1<<8;
         /// Issue a STOP condition after this operation
         const STOP   = 1<<9;
         /// Read BYTE bytes from the bus, 256 if BYTE is 0
         const READB  = 1<<10;
         /// Do not NACK the last byte read, let the read continue
         const RCONT  = 1<<11;
         /// Do not signal an exception if the byte is not ACK'd
         const NAKOK  = 1<<12;
    }
}

impl FormatFlags {
    /// Combine the flags with an 8-bit byte (data, address or read count).
    #[inline]
    pub const fn with_byte(self, byte: u8) -> u32 {
        self.bits() | byte as u32
    }
}

/// I2C interrupt sources, in the bit order of the state/enable/test registers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u32)]
pub enum I2cInterrupt {
    /// host: FMT FIFO level below the low threshold (level)
    FmtThreshold = 0,
    /// host: RX FIFO level above the high threshold (level)
    RxThreshold,
    /// target: ACQ FIFO level above the high threshold (level)
    AcqThreshold,
    /// host: RX FIFO overflowed
    RxOverflow,
    /// host: no ACK in response to an address or data byte
    Nak,
    /// host: SCL dropped early
    SclInterference,
    /// host: SDA went low while the host drove it high
    SdaInterference,
    /// host: target stretched the clock beyond the timeout
    StretchTimeout,
    /// host: target did not hold SDA stable during transmission
    SdaUnstable,
    /// repeated START or STOP observed
    CmdComplete,
    /// target: stretching clocks for a read command (level)
    TxStretch,
    /// target: TX FIFO level below the low threshold (level)
    TxThreshold,
    /// target: stretching because the ACQ FIFO is full (level)
    AcqFull,
    /// target: STOP without a preceding NACK during a host read
    UnexpStop,
    /// target: host stopped sending the clock mid transaction
    HostTimeout,
}

impl I2cInterrupt {
    /// All sources, lowest bit first.
    pub const ALL: [I2cInterrupt; 15] = [
        I2cInterrupt::FmtThreshold,
        I2cInterrupt::RxThreshold,
        I2cInterrupt::AcqThreshold,
        I2cInterrupt::RxOverflow,
        I2cInterrupt::Nak,
        I2cInterrupt::SclInterference,
        I2cInterrupt::SdaInterference,
        I2cInterrupt::StretchTimeout,
        I2cInterrupt::SdaUnstable,
        I2cInterrupt::CmdComplete,
        I2cInterrupt::TxStretch,
        I2cInterrupt::TxThreshold,
        I2cInterrupt::AcqFull,
        I2cInterrupt::UnexpStop,
        I2cInterrupt::HostTimeout,
    ];

    /// Mask of this source in the interrupt registers.
    #[inline]
    pub const fn bit(self) -> u32 {
        1 << self as u32
    }
}

bitflags! {
    /// Sonata joystick positions as read from the GPIO input register
    #[repr(transparent)]
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Joystick: u8 {
         const LEFT     = 1<<0;
         const UP       = 1<<1;
         const PRESSED  = 1<<2;
         const DOWN     = 1<<3;
         const RIGHT    = 1<<4;
    }
}

bitflags! {
    /// OpenTitan USB device interrupt sources, combinable
    #[repr(transparent)]
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct UsbdevInterrupt: u32 {
         /// A packet is waiting in the RX FIFO (level)
         const PKT_RECEIVED         = 1<<0;
         /// A packet was sent and is not yet cleared from IN_SENT (level)
         const PKT_SENT             = 1<<1;
         /// VBUS lost
         const DISCONNECTED         = 1<<2;
         /// No SOF seen for 4.096 ms while the link was active
         const HOST_LOST            = 1<<3;
         /// SE0 held for longer than 3 us
         const LINK_RESET           = 1<<4;
         /// Link idle for more than 3 ms
         const LINK_SUSPEND         = 1<<5;
         /// Link left the suspended state
         const LINK_RESUME          = 1<<6;
         /// RX FIFO is full (level)
         const RX_FULL              = 1<<7;
         /// Available OUT buffer FIFO is empty (level)
         const AV_OUT_EMPTY         = 1<<8;
         /// Available OUT or SETUP buffer FIFO overflowed
         const AV_OVERFLOW          = 1<<9;
         const LINK_IN_ERR          = 1<<10;
         const RX_CRC_ERR           = 1<<11;
         const RX_PID_ERR           = 1<<12;
         const RX_BITSTUFF_ERR      = 1<<13;
         /// USB frame number updated
         const FRAME                = 1<<14;
         /// VBUS detected
         const POWERED              = 1<<15;
         const LINK_OUT_ERR         = 1<<16;
         /// Available SETUP buffer FIFO is empty (level)
         const AV_SETUP_EMPTY       = 1<<17;
    }
}
