//! WPS vendor element for the pairing AP.
//!
//! The GamePad only tries to pair with an AP that advertises an active,
//! configured WPS registrar expecting a PIN. The element built here goes
//! into beacons and probe responses (vendor-specific element 0xDD, OUI
//! 00:50:F2 type 4) and carries big-endian type/length/value attributes.

use heapless::Vec;

/// Vendor-specific element ID.
pub const ELEMENT_ID: u8 = 0xDD;

/// Microsoft OUI followed by the WPS OUI type.
pub const WPS_OUI: [u8; 4] = [0x00, 0x50, 0xF2, 0x04];

/// Encoded element (id, length, body). The capacity keeps the body well
/// under the 255-byte element limit, so the length always fits its byte.
pub type VendorElement = Vec<u8, 64>;

/// Wi-Fi Simple Configuration state values.
pub const SETUP_STATE_CONFIGURED: u8 = 0x02;

/// Device password ID for the default PIN method.
pub const PASSWORD_ID_PIN: u16 = 0x0000;

/// Config methods: keypad (0x0100) and display (0x0008).
pub const CONFIG_METHODS_KEYPAD_DISPLAY: u16 = 0x0108;

/// WPS version 1.0 as advertised on the wire.
pub const WPS_VERSION_1_0: u8 = 0x10;

/// Attributes the pairing AP advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Version(u8),
    SetupState(u8),
    SelectedRegistrar(bool),
    DevicePasswordId(u16),
    ConfigMethods(u16),
}

impl Attribute {
    /// Attribute type code.
    pub const fn kind(&self) -> u16 {
        match self {
            Attribute::Version(_) => 0x104A,
            Attribute::SetupState(_) => 0x1044,
            Attribute::SelectedRegistrar(_) => 0x1041,
            Attribute::DevicePasswordId(_) => 0x1012,
            Attribute::ConfigMethods(_) => 0x1053,
        }
    }

    fn write_value<const N: usize>(&self, out: &mut Vec<u8, N>) -> Option<()> {
        match *self {
            Attribute::Version(v) | Attribute::SetupState(v) => out.push(v).ok(),
            Attribute::SelectedRegistrar(on) => out.push(on as u8).ok(),
            Attribute::DevicePasswordId(v) | Attribute::ConfigMethods(v) => {
                out.extend_from_slice(&v.to_be_bytes()).ok()
            }
        }
    }

    /// Value length in bytes.
    pub const fn value_len(&self) -> u16 {
        match self {
            Attribute::Version(_) | Attribute::SetupState(_) | Attribute::SelectedRegistrar(_) => 1,
            Attribute::DevicePasswordId(_) | Attribute::ConfigMethods(_) => 2,
        }
    }
}

/// Attributes for a registrar that is configured, selected and waiting for a
/// PIN entered on the enrollee's keypad.
pub const PAIRING_ATTRIBUTES: [Attribute; 5] = [
    Attribute::Version(WPS_VERSION_1_0),
    Attribute::SetupState(SETUP_STATE_CONFIGURED),
    Attribute::SelectedRegistrar(true),
    Attribute::DevicePasswordId(PASSWORD_ID_PIN),
    Attribute::ConfigMethods(CONFIG_METHODS_KEYPAD_DISPLAY),
];

/// Encode `attrs` as a complete vendor element. `None` if it doesn't fit.
pub fn encode(attrs: &[Attribute]) -> Option<VendorElement> {
    let mut element = VendorElement::new();
    element.push(ELEMENT_ID).ok()?;
    element.push(0).ok()?; // length, patched below
    element.extend_from_slice(&WPS_OUI).ok()?;
    for attr in attrs {
        element.extend_from_slice(&attr.kind().to_be_bytes()).ok()?;
        element
            .extend_from_slice(&attr.value_len().to_be_bytes())
            .ok()?;
        attr.write_value(&mut element)?;
    }
    element[1] = (element.len() - 2) as u8;
    Some(element)
}

/// The element the pairing AP installs on beacons and probe responses.
pub fn pairing_element() -> Option<VendorElement> {
    encode(&PAIRING_ATTRIBUTES)
}
