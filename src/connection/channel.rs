//! Channel facade
//!
//! The [`ConnectionFactory`] implementation. Opening and closing here only claim and release the
//! channel for the application, the RFCOMM channel itself is opened by the remote device and its
//! closing is only complete once the stack reports it.

use super::{ChannelCallback, ConnectionFactory, DevicePresence, Handle, SppConnection};
use crate::rfcomm::RfcommInterface;
use crate::sdp::ServiceDiscoveryInterface;

fn check_handle(handle: Handle) {
    assert_eq!( Handle::SPP, handle, "Invalid SPP channel handle" );
}

impl<'b, S, P, C> ConnectionFactory for SppConnection<'b, S, P, C>
where S: RfcommInterface + ServiceDiscoveryInterface,
      P: DevicePresence,
{
    type Context = C;

    fn tick(&mut self) {
        SppConnection::tick(self)
    }

    fn is_available(&self) -> bool {
        self.presence.is_device_attached()
    }

    fn is_ready_to_open(&self) -> bool {
        self.session.is_ready_to_open()
    }

    fn open(&mut self, callback: ChannelCallback<C>, context: C) -> Handle {
        log::info!("BTOpen()");

        self.session.subscribe(callback, context);

        Handle::SPP
    }

    fn close(&mut self, handle: Handle) {
        check_handle(handle);

        match self.session.channel_id() {
            Some(channel_id) => if let Err(e) = self.stack.disconnect(channel_id) {
                log::error!("(SPP) Failed to request disconnect of channel {}: {}", channel_id, e);
            },
            None => log::warn!("(SPP) Close requested without an open channel"),
        }
    }

    fn send(&mut self, handle: Handle, data: &[u8]) {
        check_handle(handle);

        assert!( data.len() <= <u16>::max_value() as usize,
            "SPP send of {} bytes exceeds 16 bit length", data.len() );

        let channel_id = match self.session.channel_id() {
            Some(channel_id) => channel_id,
            None => log_error_and_panic!("SPP send without an open channel"),
        };

        if let Err(e) = self.stack.send(channel_id, data) {
            log::error!("(SPP) Failed to send {} bytes on channel {}: {}", data.len(), channel_id, e);
        }
    }

    fn can_send(&self, handle: Handle) -> bool {
        check_handle(handle);

        self.session.channel_id()
            .map(|channel_id| self.stack.can_send(channel_id))
            .unwrap_or(false)
    }

    fn max_packet_size(&self, handle: Handle) -> usize {
        check_handle(handle);

        self.config.max_packet_size as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SppConfig;
    use crate::connection::mock::{self, Command, MockStack, Received};
    use crate::hci::RawPacket;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<Received>>>;

    /// Create an attached connection with channel 7 open
    macro_rules! open_connection {
        ($buffer:ident, $present:ident) => {
            {
                let present = $present.clone();

                let mut connection = SppConnection::<_, _, Log>::new(
                    MockStack::new(),
                    move || present.get(),
                    &mut $buffer,
                    SppConfig::default()
                );

                connection.tick();
                connection.handle_packet(RawPacket::event(&mock::open_channel_complete(0, 7)));
                connection.tick();
                connection.stack_mut().commands.clear();

                connection
            }
        }
    }

    #[test]
    fn availability_follows_presence_test() {
        let mut buffer = [0u8; 64];
        let present = Rc::new(Cell::new(false));
        let connection = SppConnection::<_, _, Log>::new(
            MockStack::new(),
            { let present = present.clone(); move || present.get() },
            &mut buffer,
            SppConfig::default()
        );

        assert!( !connection.is_available() );

        present.set(true);

        assert!( connection.is_available() );
    }

    #[test]
    fn open_claims_channel_test() {
        let mut buffer = [0u8; 64];
        let present = Rc::new(Cell::new(true));
        let mut connection = open_connection!(buffer, present);

        assert!( connection.is_ready_to_open() );

        let handle = connection.open(mock::record, Log::default());

        assert_eq!( Handle::SPP, handle );
        assert_eq!( 0, handle.get() );
        assert!( !connection.is_ready_to_open() );

        // Opening doesn't send anything to the stack
        assert!( connection.stack().commands.is_empty() );
    }

    #[test]
    fn send_test() {
        let mut buffer = [0u8; 64];
        let present = Rc::new(Cell::new(true));
        let mut connection = open_connection!(buffer, present);

        let handle = connection.open(mock::record, Log::default());

        connection.send(handle, b"abc");

        assert_eq!( vec![Command::Send(7, b"abc".to_vec())], connection.stack().commands );
    }

    #[test]
    #[should_panic]
    fn send_without_channel_test() {
        let mut buffer = [0u8; 64];
        let present = Rc::new(Cell::new(true));
        let mut connection = SppConnection::<_, _, Log>::new(
            MockStack::new(),
            move || present.get(),
            &mut buffer,
            SppConfig::default()
        );

        connection.tick();

        connection.send(Handle::SPP, b"abc");
    }

    #[test]
    #[should_panic]
    fn send_with_invalid_handle_test() {
        let mut buffer = [0u8; 64];
        let present = Rc::new(Cell::new(true));
        let mut connection = open_connection!(buffer, present);

        connection.send(Handle::from_raw(1), b"abc");
    }

    #[test]
    #[should_panic]
    fn oversized_send_test() {
        let mut buffer = [0u8; 64];
        let present = Rc::new(Cell::new(true));
        let mut connection = open_connection!(buffer, present);

        let data = vec![0u8; 0x1_0000];

        connection.send(Handle::SPP, &data);
    }

    #[test]
    fn can_send_test() {
        let mut buffer = [0u8; 64];
        let present = Rc::new(Cell::new(true));
        let mut connection = open_connection!(buffer, present);

        assert!( connection.can_send(Handle::SPP) );

        connection.stack_mut().can_send = false;

        assert!( !connection.can_send(Handle::SPP) );

        connection.stack_mut().can_send = true;
        connection.handle_packet(RawPacket::event(&mock::channel_closed(7)));

        assert!( !connection.can_send(Handle::SPP) );
    }

    #[test]
    #[should_panic]
    fn can_send_with_invalid_handle_test() {
        let mut buffer = [0u8; 64];
        let present = Rc::new(Cell::new(true));
        let connection = open_connection!(buffer, present);

        connection.can_send(Handle::from_raw(3));
    }

    #[test]
    fn close_is_confirmed_by_stack_test() {
        let mut buffer = [0u8; 64];
        let present = Rc::new(Cell::new(true));
        let log = Log::default();
        let mut connection = open_connection!(buffer, present);

        let handle = connection.open(mock::record, log.clone());

        connection.close(handle);

        assert_eq!( vec![Command::Disconnect(7)], connection.stack().commands );

        // Nothing changes until the stack reports the channel closed
        assert!( log.borrow().is_empty() );
        assert!( connection.channel_id().is_some() );

        connection.handle_packet(RawPacket::event(&mock::channel_closed(7)));

        assert_eq!( vec![Received::Closed], *log.borrow() );
        assert_eq!( None, connection.channel_id() );
        assert!( !connection.is_ready_to_open() );
    }

    #[test]
    fn close_without_channel_test() {
        let mut buffer = [0u8; 64];
        let present = Rc::new(Cell::new(true));
        let mut connection = open_connection!(buffer, present);

        connection.handle_packet(RawPacket::event(&mock::channel_closed(7)));
        connection.stack_mut().commands.clear();

        connection.close(Handle::SPP);

        assert!( connection.stack().commands.is_empty() );
    }

    #[test]
    fn channel_can_be_reopened_test() {
        let mut buffer = [0u8; 64];
        let present = Rc::new(Cell::new(true));
        let first = Log::default();
        let second = Log::default();
        let mut connection = open_connection!(buffer, present);

        connection.open(mock::record, first.clone());
        connection.handle_packet(RawPacket::event(&mock::channel_closed(7)));

        assert!( !connection.is_ready_to_open() );

        connection.handle_packet(RawPacket::event(&mock::open_channel_complete(0, 9)));

        assert!( connection.is_ready_to_open() );

        connection.open(mock::record, second.clone());
        connection.handle_packet(RawPacket::rfcomm_data(9, b"x"));

        assert_eq!( vec![Received::Closed], *first.borrow() );
        assert_eq!( vec![Received::Data(b"x".to_vec())], *second.borrow() );
    }

    #[test]
    fn max_packet_size_test() {
        let mut buffer = [0u8; 64];
        let present = Rc::new(Cell::new(true));
        let connection = open_connection!(buffer, present);

        assert_eq!( 242, connection.max_packet_size(Handle::SPP) );
    }

    #[test]
    #[should_panic]
    fn max_packet_size_with_invalid_handle_test() {
        let mut buffer = [0u8; 64];
        let present = Rc::new(Cell::new(true));
        let connection = open_connection!(buffer, present);

        connection.max_packet_size(Handle::from_raw(1));
    }
}
