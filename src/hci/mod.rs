//! The interface to the host controller side of the lower Bluetooth stack
//!
//! The stack itself (HCI command encoding, the USB transport, L2CAP segmentation) is not
//! implemented here. This module defines what this library needs from it, the
//! [`HostControllerInterface`] trait, and the form in which the stack hands packets back, a
//! [`RawPacket`] delivered to a [`PacketHandler`].

mod opcodes;
#[macro_use] pub mod events;

pub use self::opcodes::{
    HCICommand,
    OpCodePair,
    LinkControl,
    ControllerAndBaseband,
    InformationParameters,
};

use crate::BluetoothDeviceAddress;
use core::fmt::{Debug, Display};

/// HCI packet indicator of an event packet
pub const HCI_EVENT_PACKET: u8 = 0x04;

/// Packet type used by the stack when it hands up the payload of a RFCOMM channel
pub const RFCOMM_DATA_PACKET: u8 = 0x07;

/// The type of packet delivered by the stack
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum PacketType {
    /// An HCI event, or an event generated by one of the stack's protocol layers
    Event,
    /// Payload data of an RFCOMM channel
    RfcommData,
    /// Any other packet type, these are not used by this library
    Other(u8),
}

impl PacketType {
    pub fn to_val(&self) -> u8 {
        match self {
            PacketType::Event => HCI_EVENT_PACKET,
            PacketType::RfcommData => RFCOMM_DATA_PACKET,
            PacketType::Other(val) => *val,
        }
    }
}

impl From<u8> for PacketType {
    fn from(raw: u8) -> Self {
        match raw {
            HCI_EVENT_PACKET => PacketType::Event,
            RFCOMM_DATA_PACKET => PacketType::RfcommData,
            _ => PacketType::Other(raw),
        }
    }
}

/// A packet as it is given to a [`PacketHandler`] by the stack
///
/// `channel` is the local channel the packet was received on. For RFCOMM data this is the RFCOMM
/// channel identifier, for events it is not used.
#[derive(Debug,Clone,Copy)]
pub struct RawPacket<'a> {
    pub packet_type: PacketType,
    pub channel: u16,
    pub data: &'a [u8],
}

impl<'a> RawPacket<'a> {
    pub fn event(data: &'a [u8]) -> Self {
        RawPacket { packet_type: PacketType::Event, channel: 0, data }
    }

    pub fn rfcomm_data(channel: u16, data: &'a [u8]) -> Self {
        RawPacket { packet_type: PacketType::RfcommData, channel, data }
    }
}

/// Operational state of the stack as reported with its state event
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum HciState {
    Off,
    Initializing,
    Working,
    Halting,
    Sleeping,
    FallingAsleep,
    Unknown(u8),
}

impl From<u8> for HciState {
    fn from(raw: u8) -> Self {
        match raw {
            0 => HciState::Off,
            1 => HciState::Initializing,
            2 => HciState::Working,
            3 => HciState::Halting,
            4 => HciState::Sleeping,
            5 => HciState::FallingAsleep,
            _ => HciState::Unknown(raw),
        }
    }
}

/// The protocol layers that can route their packets to the packet handler
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Protocol {
    L2cap,
    Rfcomm,
}

/// Configuration given to the stack when it is initialized
///
/// This library never uses a UART configuration, a chipset specific control block, or anything
/// but the in-memory remote device database, so those are represented by the `None`/default
/// values here and are only carried so the stack can tell what is expected of it.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct HciConfig {
    /// Use a UART configuration for the transport
    pub uart: bool,
    /// Use a chipset specific control block
    pub chipset_control: bool,
    /// Keep remote devices in a volatile, in memory, database
    pub remote_db_in_memory: bool,
}

impl Default for HciConfig {
    fn default() -> Self {
        HciConfig {
            uart: false,
            chipset_control: false,
            remote_db_in_memory: true,
        }
    }
}

/// A sink for the packets of the stack
///
/// The stack calls `handle_packet` synchronously while it is processing its transport tasks. The
/// stack itself is passed back to the handler so that commands can be issued from within the
/// handler.
pub trait PacketHandler<S: ?Sized> {
    fn handle_packet(&mut self, stack: &mut S, packet: RawPacket<'_>);
}

/// Trait for interfacing with the host controller part of the stack
///
/// # Commands
/// All command methods are fire and forget. Returning `Ok` means the stack accepted the command,
/// its completion (if there is one) is reported later through an event. An error means the
/// command was not sent.
///
/// # Transport Tasks
/// [`transport_tasks`](#tymethod.transport_tasks) is called once per tick while the controller is
/// attached. The stack performs its pending transport work within it and delivers every packet
/// for a registered protocol to `handler`. The scratch buffer given to
/// [`init_transport`](#tymethod.init_transport) is passed again on every call, packets handed to
/// the handler may borrow from it.
pub trait HostControllerInterface {
    type Error: Debug + Display;

    /// Handle to an initialized transport
    type Transport;

    /// Initialize the transport using `buffer` as its scratch memory
    fn init_transport(&mut self, buffer: &mut [u8]) -> Result<Self::Transport, Self::Error>;

    /// Initialize the host controller interface over `transport`
    ///
    /// This resets all state kept within the stack.
    fn init(&mut self, transport: Self::Transport, config: &HciConfig) -> Result<(), Self::Error>;

    /// Enable or disable Secure Simple Pairing
    fn set_secure_simple_pairing(&mut self, enable: bool) -> Result<(), Self::Error>;

    /// Route the packets of `protocol` to the handler passed to `transport_tasks`
    fn register_packet_handler(&mut self, protocol: Protocol) -> Result<(), Self::Error>;

    /// Power on the radio
    fn power_on(&mut self) -> Result<(), Self::Error>;

    /// Perform the pending transport work
    fn transport_tasks(&mut self, buffer: &mut [u8], handler: &mut dyn PacketHandler<Self>);

    /// Send the *Write Local Name* command
    fn write_local_name(&mut self, name: &str) -> Result<(), Self::Error>;

    /// Send the *Link Key Request Negative Reply* command
    fn link_key_request_negative_reply(&mut self, address: &BluetoothDeviceAddress)
    -> Result<(), Self::Error>;

    /// Send the *PIN Code Request Reply* command
    fn pin_code_request_reply(&mut self, address: &BluetoothDeviceAddress, pin: &[u8])
    -> Result<(), Self::Error>;

    /// Set whether the controller is discoverable
    fn set_discoverable(&mut self, discoverable: bool) -> Result<(), Self::Error>;
}
