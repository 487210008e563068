//! Generic Access Profile
//!
//! The local device name and discoverability are the only GAP matters handled here. The device is
//! always discoverable once its name is written.

use crate::BluetoothDeviceAddress;

/// Local name used until the device address is known
pub const LOCAL_NAME_TEMPLATE: &str = "IOIO (00:00)";

const LOCAL_NAME_LEN: usize = 12;

/// Index of the first hex digit within the template
const FIRST_OCTET_INDEX: usize = 6;

/// The local device name
///
/// This is the template `"IOIO (00:00)"` where the digits are replaced by the two least
/// significant octets of the device address, most significant first. The digits are replaced at
/// most once, after which the name stays fixed until a new one is created.
#[derive(Clone,Copy,PartialEq,Eq)]
pub struct LocalName {
    name: [u8; LOCAL_NAME_LEN],
    assigned: bool,
}

impl LocalName {
    pub fn new() -> Self {
        let mut name = [0u8; LOCAL_NAME_LEN];

        name.copy_from_slice(LOCAL_NAME_TEMPLATE.as_bytes());

        LocalName { name, assigned: false }
    }

    /// Replace the digits of the name with the address
    ///
    /// Returns false (and the name is unchanged) if an address was already assigned.
    pub fn assign_address(&mut self, address: &BluetoothDeviceAddress) -> bool {
        if self.assigned {
            return false;
        }

        write_hex_octet(&mut self.name[FIRST_OCTET_INDEX..], address[1]);
        write_hex_octet(&mut self.name[(FIRST_OCTET_INDEX + 3)..], address[0]);

        self.assigned = true;

        true
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned
    }

    pub fn as_str(&self) -> &str {
        // The name only ever contains ASCII
        core::str::from_utf8(&self.name).unwrap_or(LOCAL_NAME_TEMPLATE)
    }
}

impl Default for LocalName {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for LocalName {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

fn write_hex_octet(dest: &mut [u8], octet: u8) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    dest[0] = HEX[(octet >> 4) as usize];
    dest[1] = HEX[(octet & 0xF) as usize];
}
