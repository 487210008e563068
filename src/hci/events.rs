//! Events delivered by the stack
//!
//! Every packet the stack hands to the packet handler is decoded here, once, into a
//! [`StackEvent`]. Only the events this library reacts to are decoded, everything else becomes
//! [`StackEvent::Ignored`].
//!
//! Event packets have the layout `[event code, parameter length, parameters ..]`. The HCI events
//! use the layout of the Bluetooth Specification (v5.0 | Vol 2, Part E, Section 7.7), the stack
//! and RFCOMM events use the layout of the stack.

use crate::hci::opcodes::{
    ControllerAndBaseband,
    HCICommand,
    InformationParameters,
    OpCodePair,
};
use crate::hci::{HciState, PacketType, RawPacket};
use crate::rfcomm::ChannelId;
use crate::BluetoothDeviceAddress;
use core::convert::TryFrom;

macro_rules! make_u16 {
    ( $packet:ident, $start:expr ) => {
        u16::from_le_bytes( [ $packet[$start], $packet[$start + 1] ] )
    };
}

macro_rules! make_baddr {
    ( $packet:ident, $start:expr ) => {
        {
            let mut address: BluetoothDeviceAddress = [0u8;6];
            address.copy_from_slice(&$packet[$start..($start + 6)]);
            address
        }
    }
}

/// "chews-off" and returns a slice of size $size from the beginning of $packet.
///
/// Invoking this with only one parameter returns an u8, otherwise a reference to a slice is
/// returned.
macro_rules! chew {
    ( $packet:ident, $size:expr) => {
        {
            let chewed = &$packet[..($size as usize)];
            $packet = &$packet[($size as usize)..];
            chewed
        }
    };
    ( $packet:ident ) => {
        {
            let chewed_byte = $packet[0];
            $packet = &$packet[1..];
            chewed_byte
        }
    };
}

macro_rules! chew_u16 {
    ($packet:ident) => {
        {
            let chewed = make_u16!($packet, 0);
            $packet = &$packet[2..];
            chewed
        }
    };
}

macro_rules! chew_baddr {
    ($packet:ident) => {
        {
            let chewed = make_baddr!($packet, 0);
            $packet = &$packet[6..];
            chewed
        }
    };
}

/// Create the try from implementation for $name
///
/// $size is the minimum number of parameter bytes of the event, the packet is checked against it
/// before $inner is run so the chew macros can be used without further checks. $param is the
/// name of the parameter slice within $inner.
macro_rules! impl_try_from_for_raw_packet {
    ( $name:ty, $size:expr, $param:tt, $inner:block ) => {

        #[allow(unused_assignments)]
        #[allow(unused_mut)]
        impl<'a> TryFrom<&'a [u8]> for $name {
            type Error = EventError;
            fn try_from( param: &'a [u8] ) -> Result<Self, Self::Error> {
                if param.len() < $size {
                    return Err( EventError::PacketTooSmall { expected: $size, actual: param.len() } )
                }

                let mut $param = param;
                $inner
            }
        }

    }
}

/// Create the enumeration of the event codes that are decoded
macro_rules! events_markup {
    ( pub enum $EnumName:ident { $( $name:ident -> $val:literal, )* } ) => {

        #[derive(Debug,Hash,Clone,Copy,PartialEq,Eq,PartialOrd,Ord)]
        pub enum $EnumName {
            $( $name, )*
        }

        impl $EnumName {
            pub fn get_val( &self ) -> u8 {
                match *self {
                    $( $EnumName::$name => $val, )*
                }
            }

            pub fn from_raw( val: u8 ) -> Option<$EnumName> {
                match val {
                    $( $val => Some($EnumName::$name), )*
                    _ => None,
                }
            }
        }
    }
}

events_markup! {
    pub enum Events {
        CommandComplete -> 0x0E,
        PINCodeRequest -> 0x16,
        LinkKeyRequest -> 0x17,
        StackState -> 0x60,
        RfcommOpenChannelComplete -> 0x80,
        RfcommChannelClosed -> 0x81,
        RfcommIncomingConnection -> 0x82,
    }
}

/// Event decoding errors
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum EventError {
    /// Raw data is too small for the event
    PacketTooSmall { expected: usize, actual: usize },
    /// The parameter length in the event header is longer than the received parameters
    ParameterLengthIncorrect { specified: usize, actual: usize },
    /// An event reporting a successfully opened channel contained the null channel identifier
    InvalidChannelId,
}

impl core::fmt::Display for EventError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            EventError::PacketTooSmall { expected, actual } =>
                write!(f, "Raw data is too small for the event, expected {} bytes but got {}",
                    expected, actual),
            EventError::ParameterLengthIncorrect { specified, actual } =>
                write!(f, "Specified parameter length {} is larger than the {} received bytes",
                    specified, actual),
            EventError::InvalidChannelId => write!(f, "Invalid RFCOMM channel id"),
        }
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct StackStateData {
    pub state: HciState,
}

impl_try_from_for_raw_packet! {
    StackStateData,
    1,
    packet,
    {
        Ok(StackStateData {
            state: HciState::from(chew!(packet)),
        })
    }
}

/// Return parameters of a *Command Complete* event
///
/// Only the commands whose completion is acted upon have their return parameters decoded.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum CommandCompleteData {
    ReadBdAddr { status: u8, address: BluetoothDeviceAddress },
    WriteLocalName { status: u8 },
    Other { opcode: u16 },
}

impl_try_from_for_raw_packet! {
    CommandCompleteData,
    3,
    packet,
    {
        let _number_of_hci_command_packets = chew!(packet);

        let opcode = chew_u16!(packet);

        match HCICommand::try_from(OpCodePair::from_opcode(opcode)) {
            Ok(HCICommand::InformationParameters(InformationParameters::ReadBD_ADDR)) => {
                if packet.len() < 7 {
                    return Err( EventError::PacketTooSmall { expected: 10, actual: packet.len() + 3 } )
                }

                Ok(CommandCompleteData::ReadBdAddr {
                    status: chew!(packet),
                    address: chew_baddr!(packet),
                })
            },
            Ok(HCICommand::ControllerAndBaseband(ControllerAndBaseband::WriteLocalName)) => {
                if packet.is_empty() {
                    return Err( EventError::PacketTooSmall { expected: 4, actual: 3 } )
                }

                Ok(CommandCompleteData::WriteLocalName { status: chew!(packet) })
            },
            _ => Ok(CommandCompleteData::Other { opcode }),
        }
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct PINCodeRequestData {
    pub bluetooth_address: BluetoothDeviceAddress,
}

impl_try_from_for_raw_packet! {
    PINCodeRequestData,
    6,
    packet,
    {
        Ok(PINCodeRequestData {
            bluetooth_address: chew_baddr!(packet),
        })
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct LinkKeyRequestData {
    pub bluetooth_address: BluetoothDeviceAddress,
}

impl_try_from_for_raw_packet! {
    LinkKeyRequestData,
    6,
    packet,
    {
        Ok(LinkKeyRequestData {
            bluetooth_address: chew_baddr!(packet),
        })
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct RfcommIncomingConnectionData {
    pub bluetooth_address: BluetoothDeviceAddress,
    pub server_channel: u8,
    pub channel_id: ChannelId,
}

impl_try_from_for_raw_packet! {
    RfcommIncomingConnectionData,
    9,
    packet,
    {
        Ok(RfcommIncomingConnectionData {
            bluetooth_address: chew_baddr!(packet),
            server_channel: chew!(packet),
            channel_id: ChannelId::new(chew_u16!(packet)).ok_or(EventError::InvalidChannelId)?,
        })
    }
}

/// Completion of an RFCOMM channel open
///
/// A status of zero means the channel is open, in which case `channel_id` is always `Some`.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct RfcommOpenChannelCompleteData {
    pub status: u8,
    pub bluetooth_address: BluetoothDeviceAddress,
    pub connection_handle: u16,
    pub server_channel: u8,
    pub channel_id: Option<ChannelId>,
    pub max_frame_size: u16,
}

impl RfcommOpenChannelCompleteData {
    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}

impl_try_from_for_raw_packet! {
    RfcommOpenChannelCompleteData,
    14,
    packet,
    {
        let status = chew!(packet);
        let bluetooth_address = chew_baddr!(packet);
        let connection_handle = chew_u16!(packet);
        let server_channel = chew!(packet);
        let raw_channel_id = chew_u16!(packet);
        let max_frame_size = chew_u16!(packet);

        let channel_id = if status == 0 {
            Some( ChannelId::new(raw_channel_id).ok_or(EventError::InvalidChannelId)? )
        } else {
            None
        };

        Ok(RfcommOpenChannelCompleteData {
            status,
            bluetooth_address,
            connection_handle,
            server_channel,
            channel_id,
            max_frame_size,
        })
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct RfcommChannelClosedData {
    pub channel_id: Option<ChannelId>,
}

impl_try_from_for_raw_packet! {
    RfcommChannelClosedData,
    2,
    packet,
    {
        Ok(RfcommChannelClosedData {
            channel_id: ChannelId::new(chew_u16!(packet)),
        })
    }
}

/// Payload received on an RFCOMM channel
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct RfcommDataPacket<'a> {
    pub channel_id: Option<ChannelId>,
    pub payload: &'a [u8],
}

/// A decoded packet from the stack
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum StackEvent<'a> {
    StackState(StackStateData),
    CommandComplete(CommandCompleteData),
    PINCodeRequest(PINCodeRequestData),
    LinkKeyRequest(LinkKeyRequestData),
    RfcommIncomingConnection(RfcommIncomingConnectionData),
    RfcommOpenChannelComplete(RfcommOpenChannelCompleteData),
    RfcommChannelClosed(RfcommChannelClosedData),
    RfcommData(RfcommDataPacket<'a>),
    /// A packet or event that is not used by this library
    Ignored,
}

impl<'a> StackEvent<'a> {

    /// Decode a packet given to the packet handler
    ///
    /// # Errors
    /// An error is returned if an event is used by this library but its packet is malformed.
    /// Packets that are not used are never an error, they are returned as `Ignored`.
    pub fn from_packet(packet: RawPacket<'a>) -> Result<Self, EventError> {
        match packet.packet_type {
            PacketType::Event => Self::from_event_packet(packet.data),
            PacketType::RfcommData => Ok(StackEvent::RfcommData(RfcommDataPacket {
                channel_id: ChannelId::new(packet.channel),
                payload: packet.data,
            })),
            PacketType::Other(_) => Ok(StackEvent::Ignored),
        }
    }

    fn from_event_packet(data: &'a [u8]) -> Result<Self, EventError> {
        if data.len() < 2 {
            return Err( EventError::PacketTooSmall { expected: 2, actual: data.len() } )
        }

        let mut packet = data;

        let event_code = chew!(packet);

        let event_len = chew!(packet) as usize;

        if packet.len() < event_len {
            return Err( EventError::ParameterLengthIncorrect {
                specified: event_len,
                actual: packet.len()
            } )
        }

        let parameters = &packet[..event_len];

        let event = match Events::from_raw(event_code) {
            Some(Events::CommandComplete) =>
                StackEvent::CommandComplete(CommandCompleteData::try_from(parameters)?),
            Some(Events::PINCodeRequest) =>
                StackEvent::PINCodeRequest(PINCodeRequestData::try_from(parameters)?),
            Some(Events::LinkKeyRequest) =>
                StackEvent::LinkKeyRequest(LinkKeyRequestData::try_from(parameters)?),
            Some(Events::StackState) =>
                StackEvent::StackState(StackStateData::try_from(parameters)?),
            Some(Events::RfcommOpenChannelComplete) =>
                StackEvent::RfcommOpenChannelComplete(RfcommOpenChannelCompleteData::try_from(parameters)?),
            Some(Events::RfcommChannelClosed) =>
                StackEvent::RfcommChannelClosed(RfcommChannelClosedData::try_from(parameters)?),
            Some(Events::RfcommIncomingConnection) =>
                StackEvent::RfcommIncomingConnection(RfcommIncomingConnectionData::try_from(parameters)?),
            None => StackEvent::Ignored,
        };

        Ok(event)
    }
}
