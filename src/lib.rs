//! Bluetooth Serial Port Profile connection adapter
//!
//! This binds a lower Bluetooth host stack (HCI transport, L2CAP, RFCOMM, and SDP) to a single
//! stream channel that application firmware can open, write to, and close. The lower stack is not
//! part of this library, it is reached through the traits [`HostControllerInterface`],
//! [`RfcommInterface`], and [`ServiceDiscoveryInterface`].
//!
//! Everything is driven by polling. The firmware calls
//! [`tick`](connection::SppConnection::tick) once per scheduling pass, the stack calls back into
//! the connection's packet handler from within that same call, and the application is told about
//! received data and channel closure through the callback it registered with
//! [`open`](connection::ConnectionFactory::open).
//!
//! [`HostControllerInterface`]: hci::HostControllerInterface
//! [`RfcommInterface`]: rfcomm::RfcommInterface
//! [`ServiceDiscoveryInterface`]: sdp::ServiceDiscoveryInterface

// So this library can be used with no_std targets
#![cfg_attr(not(test), no_std)]

// Host Controller interface
pub mod hci;

pub mod config;
pub mod connection;
pub mod gap;
pub mod rfcomm;
pub mod sdp;

/// A Bluetooth device address
///
/// The address is kept in the order it is sent over HCI, that is the least significant octet is
/// at index 0.
pub type BluetoothDeviceAddress = [u8; 6];

/// Display wrapper for a [`BluetoothDeviceAddress`]
///
/// Formats the address in the usual `XX:XX:XX:XX:XX:XX` notation, most significant octet first.
pub struct DisplayAddress<'a>(pub &'a BluetoothDeviceAddress);

impl core::fmt::Display for DisplayAddress<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let a = self.0;

        write!(f, "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}", a[5], a[4], a[3], a[2], a[1], a[0])
    }
}

impl core::fmt::Debug for DisplayAddress<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(self, f)
    }
}
