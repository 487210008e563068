//! Connection configuration
//!
//! The defaults are the values the firmware has always used. The record has a fixed layout so it
//! can be kept in non-volatile memory in its serialized form.

use serde::{Deserialize, Serialize};

/// Configuration of the serial port connection
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub struct SppConfig {
    /// The reserved RFCOMM server channel of the serial port service
    pub rfcomm_channel: u8,
    /// Largest RFCOMM frame accepted by the service
    pub rfcomm_mtu: u16,
    /// Packet size reported to the application
    pub max_packet_size: u16,
    /// PIN used to answer every PIN code request
    pub pin_code: [u8; 4],
    pub discoverable: bool,
    pub secure_simple_pairing: bool,
}

impl SppConfig {
    pub const DEFAULT: SppConfig = SppConfig {
        rfcomm_channel: 1,
        rfcomm_mtu: 100,
        max_packet_size: 242,
        pin_code: *b"4545",
        discoverable: true,
        secure_simple_pairing: false,
    };

    /// The PIN as a string
    pub fn pin_str(&self) -> &str {
        core::str::from_utf8(&self.pin_code).unwrap_or("????")
    }
}

impl Default for SppConfig {
    fn default() -> Self {
        SppConfig::DEFAULT
    }
}
