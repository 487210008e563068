//! The serial port connection
//!
//! [`SppConnection`] is the single logical channel that the application sees. It is made of three
//! parts:
//! * the attach lifecycle, which polls for the Bluetooth controller and brings the stack up once
//!   per attachment ([`tick`](SppConnection::tick)),
//! * the event adapter, which turns the packets of the stack into updates of the [`Session`]
//!   and into calls of the application's callback,
//! * the channel facade, the [`ConnectionFactory`] implementation used by the application.
//!
//! There is only ever one channel, its handle is always [`Handle::SPP`].

macro_rules! log_error_and_panic {
    ($($arg:tt)+) => {{ log::error!( $($arg)+ ); panic!( $($arg)+ ); }}
}

mod adapter;
mod channel;
mod lifecycle;

#[cfg(test)]
mod mock;

pub use self::adapter::{ChannelCallback, ChannelEvent, EventAdapter, Session, Subscriber};
pub use self::lifecycle::{BringUpError, BringUpStep};

use crate::config::SppConfig;
use crate::gap::LocalName;
use crate::hci::RawPacket;
use crate::rfcomm::{ChannelId, RfcommInterface};
use crate::sdp::ServiceDiscoveryInterface;

/// Presence of the Bluetooth controller
///
/// This is implemented by the USB host driver that detects the dongle. Any `Fn() -> bool` can be
/// used as well.
pub trait DevicePresence {
    fn is_device_attached(&self) -> bool;
}

impl<F> DevicePresence for F where F: Fn() -> bool {
    fn is_device_attached(&self) -> bool {
        self()
    }
}

/// Whether the stack has been brought up for the currently attached controller
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum AttachState {
    Detached,
    Attached,
}

/// Handle to the channel
///
/// There is only one channel so the only valid handle is [`SPP`](Handle::SPP). Using any other
/// handle is a programming error.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct Handle(u8);

impl Handle {
    pub const SPP: Handle = Handle(0);

    pub fn from_raw(raw: u8) -> Self {
        Handle(raw)
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

/// The interface shared by the stream connection transports of the firmware
///
/// # Panics
/// The methods taking a [`Handle`] panic if the handle is not the one returned by
/// [`open`](ConnectionFactory::open).
pub trait ConnectionFactory {
    /// The context given to the callback
    type Context;

    /// Run one scheduling pass
    fn tick(&mut self);

    /// Check if the transport hardware is present
    fn is_available(&self) -> bool;

    /// Check if a channel can be opened
    ///
    /// This is true when the underlying link is up but no application has opened it yet.
    fn is_ready_to_open(&self) -> bool;

    /// Open the channel
    ///
    /// `callback` is called with `context` for every received payload and exactly once when the
    /// channel closes. This must only be called when [`is_ready_to_open`] returns true.
    ///
    /// [`is_ready_to_open`]: ConnectionFactory::is_ready_to_open
    fn open(&mut self, callback: ChannelCallback<Self::Context>, context: Self::Context) -> Handle;

    /// Request the channel be closed
    ///
    /// The close completes when the callback receives its close event.
    fn close(&mut self, handle: Handle);

    /// Send data on the channel
    ///
    /// [`can_send`](ConnectionFactory::can_send) must have returned true before this is called.
    ///
    /// # Panics
    /// The length of `data` must fit in 16 bits and the channel must be open.
    fn send(&mut self, handle: Handle, data: &[u8]);

    /// Check if data can be sent
    fn can_send(&self, handle: Handle) -> bool;

    /// The largest payload that can be given to [`send`](ConnectionFactory::send)
    fn max_packet_size(&self, handle: Handle) -> usize;
}

/// Serial port connection over Bluetooth
///
/// `S` is the lower Bluetooth stack, `P` reports whether the controller is attached, and `C` is
/// the context type given to the application's callback. `buffer` is the scratch memory of the
/// stack's transport, it is lent to the stack on every tick.
pub struct SppConnection<'b, S, P, C> {
    stack: S,
    presence: P,
    buffer: &'b mut [u8],
    config: SppConfig,
    state: AttachState,
    session: Session<C>,
}

impl<'b, S, P, C> SppConnection<'b, S, P, C>
where S: RfcommInterface + ServiceDiscoveryInterface,
      P: DevicePresence,
{
    /// Create a new connection
    ///
    /// The connection starts detached, the stack is not touched until the controller is found
    /// attached by [`tick`](SppConnection::tick).
    pub fn new(stack: S, presence: P, buffer: &'b mut [u8], config: SppConfig) -> Self {
        SppConnection {
            stack,
            presence,
            buffer,
            config,
            state: AttachState::Detached,
            session: Session::new(),
        }
    }

    /// Deliver a packet from the stack
    ///
    /// This is for stacks that hand over packets outside of their transport tasks, packets
    /// handed to the handler within `transport_tasks` are already processed by `tick`.
    pub fn handle_packet(&mut self, packet: RawPacket<'_>) {
        use crate::hci::PacketHandler;

        EventAdapter::new(&mut self.session, &self.config).handle_packet(&mut self.stack, packet)
    }

    /// Get the stack
    pub fn stack(&self) -> &S {
        &self.stack
    }

    /// Get the stack mutably
    pub fn stack_mut(&mut self) -> &mut S {
        &mut self.stack
    }

    pub fn config(&self) -> &SppConfig {
        &self.config
    }

    pub fn attach_state(&self) -> AttachState {
        self.state
    }

    /// Get the identifier of the open RFCOMM channel
    pub fn channel_id(&self) -> Option<ChannelId> {
        self.session.channel_id()
    }

    /// Check if a credit is owed to the remote device
    pub fn credit_owed(&self) -> bool {
        self.session.credit_owed()
    }

    pub fn local_name(&self) -> &LocalName {
        self.session.local_name()
    }
}
