//! Protocol event adapter
//!
//! The [`Session`] holds everything that is known about the current attachment: the open RFCOMM
//! channel, whether the remote device is owed a credit, the application's callback, and the local
//! name. It is changed only by the events of the stack (and by the lifecycle on attach and
//! detach), so it can only ever be as far along as the stack has reported.

use crate::config::SppConfig;
use crate::gap::LocalName;
use crate::hci::events::{CommandCompleteData, StackEvent};
use crate::hci::{HciState, PacketHandler, RawPacket};
use crate::rfcomm::{ChannelId, RfcommInterface};
use crate::DisplayAddress;
use core::fmt::Display;

/// Events delivered to the application's callback
///
/// A channel delivers any number of `Data` events followed by exactly one of `Closed` or
/// `Detached`.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum ChannelEvent<'a> {
    /// Payload received from the remote device
    Data(&'a [u8]),
    /// The channel was closed normally, by either side
    Closed,
    /// The channel was lost because the Bluetooth controller was detached
    Detached,
}

impl ChannelEvent<'_> {
    /// Check if this is the final event of the channel
    pub fn is_close(&self) -> bool {
        match self {
            ChannelEvent::Data(_) => false,
            ChannelEvent::Closed | ChannelEvent::Detached => true,
        }
    }
}

/// The application's callback
pub type ChannelCallback<C> = fn(ChannelEvent<'_>, &mut C);

/// The receiver of the channel's events
pub enum Subscriber<C> {
    /// No application has opened the channel
    None,
    Registered {
        callback: ChannelCallback<C>,
        context: C,
    },
}

impl<C> Subscriber<C> {
    pub fn is_registered(&self) -> bool {
        match self {
            Subscriber::None => false,
            Subscriber::Registered { .. } => true,
        }
    }

    fn deliver(&mut self, event: ChannelEvent<'_>) {
        if let Subscriber::Registered { callback, context } = self {
            (*callback)(event, context)
        }
    }

    /// Deliver the final event and unregister
    fn close(&mut self, event: ChannelEvent<'_>) {
        debug_assert!( event.is_close() );

        if let Subscriber::Registered { callback, mut context } = core::mem::replace(self, Subscriber::None) {
            callback(event, &mut context)
        }
    }
}

impl<C> Default for Subscriber<C> {
    fn default() -> Self {
        Subscriber::None
    }
}

impl<C> core::fmt::Debug for Subscriber<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Subscriber::None => write!(f, "Subscriber::None"),
            Subscriber::Registered { .. } => write!(f, "Subscriber::Registered"),
        }
    }
}

/// State of the connection for one attachment of the Bluetooth controller
#[derive(Debug)]
pub struct Session<C> {
    channel_id: Option<ChannelId>,
    credit_owed: bool,
    subscriber: Subscriber<C>,
    local_name: LocalName,
}

impl<C> Session<C> {
    pub fn new() -> Self {
        Session {
            channel_id: None,
            credit_owed: false,
            subscriber: Subscriber::None,
            local_name: LocalName::new(),
        }
    }

    /// Get the identifier of the open RFCOMM channel
    pub fn channel_id(&self) -> Option<ChannelId> {
        self.channel_id
    }

    pub fn credit_owed(&self) -> bool {
        self.credit_owed
    }

    pub fn local_name(&self) -> &LocalName {
        &self.local_name
    }

    pub fn subscriber(&self) -> &Subscriber<C> {
        &self.subscriber
    }

    /// Check if the RFCOMM channel is open but not yet claimed by an application
    pub fn is_ready_to_open(&self) -> bool {
        self.channel_id.is_some() && !self.subscriber.is_registered()
    }

    pub(crate) fn subscribe(&mut self, callback: ChannelCallback<C>, context: C) {
        self.subscriber = Subscriber::Registered { callback, context };
    }

    /// Process an event from the stack
    pub fn handle_event<S>(&mut self, stack: &mut S, config: &SppConfig, event: StackEvent<'_>)
    where S: RfcommInterface + ?Sized
    {
        match event {
            StackEvent::StackState(data) => {
                if data.state == HciState::Working {
                    log_failure("write local name", stack.write_local_name(self.local_name.as_str()));
                }
            },

            StackEvent::CommandComplete(CommandCompleteData::ReadBdAddr { status: 0, address }) => {
                log::info!("BD-ADDR: {}", DisplayAddress(&address));

                if !self.local_name.assign_address(&address) {
                    log::debug!("Local name is already {:?}, ignoring BD-ADDR", self.local_name);
                }
            },

            StackEvent::CommandComplete(CommandCompleteData::ReadBdAddr { status, .. }) => {
                log::warn!("Reading the BD-ADDR failed, status {}", status);
            },

            StackEvent::CommandComplete(CommandCompleteData::WriteLocalName { .. }) => {
                log_failure("discoverable control", stack.set_discoverable(config.discoverable));
            },

            StackEvent::CommandComplete(CommandCompleteData::Other { .. }) => (),

            StackEvent::LinkKeyRequest(data) => {
                log::info!("Link key request - deny");

                log_failure("link key negative reply",
                    stack.link_key_request_negative_reply(&data.bluetooth_address));
            },

            StackEvent::PINCodeRequest(data) => {
                log::info!("Pin code request - using '{}'", config.pin_str());

                log_failure("pin code reply",
                    stack.pin_code_request_reply(&data.bluetooth_address, &config.pin_code));
            },

            StackEvent::RfcommIncomingConnection(data) => {
                log::info!("RFCOMM channel {} requested for {}",
                    data.server_channel,
                    DisplayAddress(&data.bluetooth_address));

                log_failure("rfcomm accept connection", stack.accept_connection(data.channel_id));
            },

            StackEvent::RfcommOpenChannelComplete(data) => {
                match data.channel_id {
                    Some(channel_id) if data.is_success() => {
                        log::info!("RFCOMM channel open succeeded. New RFCOMM Channel ID {}, max frame size {}",
                            channel_id,
                            data.max_frame_size);

                        self.channel_id = Some(channel_id);
                        self.credit_owed = true;
                    },
                    _ => log::warn!("RFCOMM channel open failed, status {}", data.status),
                }
            },

            StackEvent::RfcommChannelClosed(_) => {
                log::info!("RFCOMM channel closed.");

                self.subscriber.close(ChannelEvent::Closed);
                self.channel_id = None;
            },

            StackEvent::RfcommData(data) => {
                log::trace!("Received {} bytes on RFCOMM channel", data.payload.len());

                self.subscriber.deliver(ChannelEvent::Data(data.payload));
                self.credit_owed = true;
            },

            StackEvent::Ignored => (),
        }
    }

    /// Grant the remote device one credit if it is owed one
    ///
    /// The credit stays owed if the stack fails to send it.
    pub(crate) fn grant_owed_credit<S>(&mut self, stack: &mut S)
    where S: RfcommInterface + ?Sized
    {
        if let (Some(channel_id), true) = (self.channel_id, self.credit_owed) {
            match stack.grant_credits(channel_id, 1) {
                Ok(()) => self.credit_owed = false,
                Err(e) => log::error!("(SPP) Failed to grant credit on channel {}: {}", channel_id, e),
            }
        }
    }

    /// Drop the channel because the controller is gone
    pub(crate) fn detach(&mut self) {
        self.subscriber.close(ChannelEvent::Detached);
        self.channel_id = None;
    }
}

impl<C> Default for Session<C> {
    fn default() -> Self {
        Session::new()
    }
}

fn log_failure<E: Display>(command: &str, result: Result<(), E>) {
    if let Err(e) = result {
        log::error!("(SPP) '{}' command failed: {}", command, e);
    }
}

/// The packet handler given to the stack
///
/// Packets are decoded into a [`StackEvent`] and applied to the session. Malformed packets are
/// logged and dropped.
pub struct EventAdapter<'a, C> {
    session: &'a mut Session<C>,
    config: &'a SppConfig,
}

impl<'a, C> EventAdapter<'a, C> {
    pub fn new(session: &'a mut Session<C>, config: &'a SppConfig) -> Self {
        EventAdapter { session, config }
    }
}

impl<S, C> PacketHandler<S> for EventAdapter<'_, C> where S: RfcommInterface + ?Sized {
    fn handle_packet(&mut self, stack: &mut S, packet: RawPacket<'_>) {
        match StackEvent::from_packet(packet) {
            Ok(event) => self.session.handle_event(stack, self.config, event),
            Err(e) => {
                log::error!("(SPP) Failed to decode packet from the stack: {}", e);
                log::trace!("(SPP) Failed raw data: {:x?}", packet.data);
            }
        }
    }
}
