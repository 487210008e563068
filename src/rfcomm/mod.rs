//! RFCOMM, the serial port emulation protocol carried over L2CAP
//!
//! Only the parts of RFCOMM needed for a single server channel are exposed. Multiplexing,
//! framing, and the credit accounting of the remote side are all within the stack.

use crate::hci::HostControllerInterface;
use core::num::NonZeroU16;

/// RFCOMM channel identifier
///
/// This is the local identifier the stack assigns to an RFCOMM channel when it opens. The value
/// zero is reserved by the stack to mean "no channel", so a `ChannelId` is never zero.
#[derive(Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub struct ChannelId(NonZeroU16);

impl ChannelId {
    /// Create a channel identifier from its raw value
    ///
    /// `None` is returned for the null identifier
    pub fn new(raw: u16) -> Option<Self> {
        NonZeroU16::new(raw).map(ChannelId)
    }

    /// Get the raw value
    pub fn get(&self) -> u16 {
        self.0.get()
    }
}

impl core::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// The RFCOMM part of the stack
///
/// Like the commands of [`HostControllerInterface`], all of these are requests. The opening and
/// closing of a channel is confirmed later through events.
pub trait RfcommInterface: HostControllerInterface {

    /// Initialize the RFCOMM layer
    fn init_rfcomm(&mut self) -> Result<(), Self::Error>;

    /// Register a service on the server channel `server_channel`
    ///
    /// `mtu` is the largest frame the service will accept.
    fn register_service(&mut self, server_channel: u8, mtu: u16) -> Result<(), Self::Error>;

    /// Accept an incoming connection request
    fn accept_connection(&mut self, channel_id: ChannelId) -> Result<(), Self::Error>;

    /// Grant the remote device `credits` more frames it may send on the channel
    fn grant_credits(&mut self, channel_id: ChannelId, credits: u8) -> Result<(), Self::Error>;

    /// Send data on the channel
    fn send(&mut self, channel_id: ChannelId, data: &[u8]) -> Result<(), Self::Error>;

    /// Request the channel be disconnected
    fn disconnect(&mut self, channel_id: ChannelId) -> Result<(), Self::Error>;

    /// Check if the remote device has given credit to send a frame on the channel
    fn can_send(&self, channel_id: ChannelId) -> bool;
}
