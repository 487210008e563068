//! Service Discovery Protocol
//!
//! A single Serial Port Profile record is published, the encoding of the record into SDP data
//! elements is left to the stack.

use crate::hci::HostControllerInterface;

/// Name of the published serial port service
pub const SERVICE_NAME: &str = "IOIO-App";

/// Serial Port Profile service record
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct SppServiceRecord<'a> {
    /// RFCOMM server channel of the service
    pub server_channel: u8,
    pub service_name: &'a str,
}

impl SppServiceRecord<'static> {
    pub fn new(server_channel: u8) -> Self {
        SppServiceRecord {
            server_channel,
            service_name: SERVICE_NAME,
        }
    }
}

/// The SDP server of the stack
pub trait ServiceDiscoveryInterface: HostControllerInterface {

    /// Initialize the SDP server
    ///
    /// This clears all previously registered records.
    fn init_sdp(&mut self) -> Result<(), Self::Error>;

    /// Publish a serial port service record
    fn register_service_record(&mut self, record: &SppServiceRecord<'_>) -> Result<(), Self::Error>;
}
