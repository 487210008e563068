//! A stack that records the commands it is given
//!
//! Packets queued with `queue_event` and `queue_data` are delivered to the packet handler on the
//! next call to `transport_tasks`, the same way a real stack hands them up.

use super::ChannelEvent;
use crate::hci::{
    HciConfig,
    HostControllerInterface,
    PacketHandler,
    PacketType,
    Protocol,
    RawPacket,
    HCI_EVENT_PACKET,
};
use crate::rfcomm::{ChannelId, RfcommInterface};
use crate::sdp::{ServiceDiscoveryInterface, SppServiceRecord};
use crate::BluetoothDeviceAddress;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug,Clone,PartialEq,Eq)]
pub enum Command {
    InitTransport(usize),
    InitHci,
    SetSecureSimplePairing(bool),
    RegisterPacketHandler(Protocol),
    InitRfcomm,
    RegisterService { server_channel: u8, mtu: u16 },
    InitSdp,
    RegisterServiceRecord { server_channel: u8, service_name: String },
    PowerOn,
    WriteLocalName(String),
    LinkKeyRequestNegativeReply(BluetoothDeviceAddress),
    PinCodeRequestReply(BluetoothDeviceAddress, Vec<u8>),
    SetDiscoverable(bool),
    AcceptConnection(u16),
    GrantCredits(u16, u8),
    Send(u16, Vec<u8>),
    Disconnect(u16),
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct MockError(pub &'static str);

impl core::fmt::Display for MockError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "mock stack error: {}", self.0)
    }
}

#[derive(Debug)]
pub struct MockStack {
    pub commands: Vec<Command>,
    /// Fail every command that isn't part of bringing up the stack
    pub reject_commands: bool,
    pub fail_power_on: bool,
    pub can_send: bool,
    pub transport_ticks: usize,
    pending: VecDeque<(PacketType, u16, Vec<u8>)>,
}

impl MockStack {
    pub fn new() -> Self {
        MockStack {
            commands: Vec::new(),
            reject_commands: false,
            fail_power_on: false,
            can_send: true,
            transport_ticks: 0,
            pending: VecDeque::new(),
        }
    }

    pub fn queue_event(&mut self, data: &[u8]) {
        self.pending.push_back((PacketType::Event, 0, data.to_vec()));
    }

    pub fn queue_data(&mut self, channel_id: u16, data: &[u8]) {
        self.pending.push_back((PacketType::RfcommData, channel_id, data.to_vec()));
    }

    fn bring_up(&mut self, command: Command) -> Result<(), MockError> {
        self.commands.push(command);
        Ok(())
    }

    fn command(&mut self, command: Command) -> Result<(), MockError> {
        if self.reject_commands {
            Err(MockError("command rejected"))
        } else {
            self.commands.push(command);
            Ok(())
        }
    }
}

impl HostControllerInterface for MockStack {
    type Error = MockError;
    type Transport = ();

    fn init_transport(&mut self, buffer: &mut [u8]) -> Result<(), MockError> {
        self.bring_up(Command::InitTransport(buffer.len()))
    }

    fn init(&mut self, _: (), config: &HciConfig) -> Result<(), MockError> {
        assert_eq!( HciConfig::default(), *config );

        self.bring_up(Command::InitHci)
    }

    fn set_secure_simple_pairing(&mut self, enable: bool) -> Result<(), MockError> {
        self.bring_up(Command::SetSecureSimplePairing(enable))
    }

    fn register_packet_handler(&mut self, protocol: Protocol) -> Result<(), MockError> {
        self.bring_up(Command::RegisterPacketHandler(protocol))
    }

    fn power_on(&mut self) -> Result<(), MockError> {
        if self.fail_power_on {
            Err(MockError("no radio"))
        } else {
            self.bring_up(Command::PowerOn)
        }
    }

    fn transport_tasks(&mut self, buffer: &mut [u8], handler: &mut dyn PacketHandler<Self>) {
        self.transport_ticks += 1;

        while let Some((packet_type, channel, data)) = self.pending.pop_front() {
            let len = data.len();

            buffer[..len].copy_from_slice(&data);

            handler.handle_packet(self, RawPacket { packet_type, channel, data: &buffer[..len] });
        }
    }

    fn write_local_name(&mut self, name: &str) -> Result<(), MockError> {
        self.command(Command::WriteLocalName(name.into()))
    }

    fn link_key_request_negative_reply(&mut self, address: &BluetoothDeviceAddress)
    -> Result<(), MockError>
    {
        self.command(Command::LinkKeyRequestNegativeReply(*address))
    }

    fn pin_code_request_reply(&mut self, address: &BluetoothDeviceAddress, pin: &[u8])
    -> Result<(), MockError>
    {
        self.command(Command::PinCodeRequestReply(*address, pin.to_vec()))
    }

    fn set_discoverable(&mut self, discoverable: bool) -> Result<(), MockError> {
        self.command(Command::SetDiscoverable(discoverable))
    }
}

impl RfcommInterface for MockStack {
    fn init_rfcomm(&mut self) -> Result<(), MockError> {
        self.bring_up(Command::InitRfcomm)
    }

    fn register_service(&mut self, server_channel: u8, mtu: u16) -> Result<(), MockError> {
        self.bring_up(Command::RegisterService { server_channel, mtu })
    }

    fn accept_connection(&mut self, channel_id: ChannelId) -> Result<(), MockError> {
        self.command(Command::AcceptConnection(channel_id.get()))
    }

    fn grant_credits(&mut self, channel_id: ChannelId, credits: u8) -> Result<(), MockError> {
        self.command(Command::GrantCredits(channel_id.get(), credits))
    }

    fn send(&mut self, channel_id: ChannelId, data: &[u8]) -> Result<(), MockError> {
        self.command(Command::Send(channel_id.get(), data.to_vec()))
    }

    fn disconnect(&mut self, channel_id: ChannelId) -> Result<(), MockError> {
        self.command(Command::Disconnect(channel_id.get()))
    }

    fn can_send(&self, _: ChannelId) -> bool {
        self.can_send
    }
}

impl ServiceDiscoveryInterface for MockStack {
    fn init_sdp(&mut self) -> Result<(), MockError> {
        self.bring_up(Command::InitSdp)
    }

    fn register_service_record(&mut self, record: &SppServiceRecord<'_>) -> Result<(), MockError> {
        self.bring_up(Command::RegisterServiceRecord {
            server_channel: record.server_channel,
            service_name: record.service_name.into(),
        })
    }
}

/// What the application's callback was given
#[derive(Debug,Clone,PartialEq,Eq)]
pub enum Received {
    Data(Vec<u8>),
    Closed,
    Detached,
}

/// Callback that records every event in its context
pub fn record(event: ChannelEvent<'_>, log: &mut Rc<RefCell<Vec<Received>>>) {
    let received = match event {
        ChannelEvent::Data(data) => Received::Data(data.to_vec()),
        ChannelEvent::Closed => Received::Closed,
        ChannelEvent::Detached => Received::Detached,
    };

    log.borrow_mut().push(received);
}

fn event(code: u8, parameters: &[u8]) -> Vec<u8> {
    let mut raw = vec![code, parameters.len() as u8];

    raw.extend_from_slice(parameters);

    raw
}

pub fn stack_working() -> Vec<u8> {
    event(0x60, &[2])
}

pub fn read_bd_addr_complete(address: &BluetoothDeviceAddress) -> Vec<u8> {
    let mut parameters = vec![1, 0x09, 0x10, 0x00];

    parameters.extend_from_slice(address);

    event(0x0E, &parameters)
}

pub fn write_local_name_complete() -> Vec<u8> {
    event(0x0E, &[1, 0x13, 0x0C, 0x00])
}

pub fn link_key_request(address: &BluetoothDeviceAddress) -> Vec<u8> {
    event(0x17, address)
}

pub fn pin_code_request(address: &BluetoothDeviceAddress) -> Vec<u8> {
    event(0x16, address)
}

pub fn incoming_connection(channel_id: u16) -> Vec<u8> {
    let mut parameters = vec![0x34, 0x12, 0x66, 0x55, 0x44, 0x33, 1];

    parameters.extend_from_slice(&channel_id.to_le_bytes());

    event(0x82, &parameters)
}

pub fn open_channel_complete(status: u8, channel_id: u16) -> Vec<u8> {
    let mut parameters = vec![status, 0x34, 0x12, 0x66, 0x55, 0x44, 0x33, 0x0B, 0x00, 1];

    parameters.extend_from_slice(&channel_id.to_le_bytes());
    parameters.extend_from_slice(&100u16.to_le_bytes());

    event(0x80, &parameters)
}

pub fn channel_closed(channel_id: u16) -> Vec<u8> {
    event(0x81, &channel_id.to_le_bytes())
}

#[test]
fn queued_packets_are_delivered_test() {
    struct Collect(Vec<(PacketType, u16, Vec<u8>)>);

    impl PacketHandler<MockStack> for Collect {
        fn handle_packet(&mut self, _: &mut MockStack, packet: RawPacket<'_>) {
            self.0.push((packet.packet_type, packet.channel, packet.data.to_vec()));
        }
    }

    let mut stack = MockStack::new();
    let mut buffer = [0u8; 16];
    let mut collect = Collect(Vec::new());

    stack.queue_event(&stack_working());
    stack.queue_data(7, b"abc");

    stack.transport_tasks(&mut buffer, &mut collect);

    assert_eq!( 1, stack.transport_ticks );
    assert_eq!(
        vec![
            (PacketType::Event, 0, vec![0x60, 1, 2]),
            (PacketType::RfcommData, 7, b"abc".to_vec()),
        ],
        collect.0
    );
    assert_eq!( HCI_EVENT_PACKET, PacketType::Event.to_val() );
}
