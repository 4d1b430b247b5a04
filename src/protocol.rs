/// NDJSON status protocol on the serial console.
///
/// One JSON object per line, tagged by `type`. Uses `heapless` types so the
/// messages can be built without an allocator.
use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

/// Maximum length for MAC address strings ("AA:BB:CC:DD:EE:FF")
pub type MacString = String<18>;

/// Maximum length for SSID strings
pub type NameString = String<33>;

/// Messages sent from the device to the host
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum DeviceMessage<'a> {
    /// Sent once after the radio is up
    #[serde(rename = "boot")]
    Boot {
        version: &'static str,
        board: &'static str,
        /// Address being hunted
        target: &'a MacString,
        /// Pairing code the AP expects
        pin: &'a str,
    },
    /// Scanner moved to a new channel
    #[serde(rename = "hop")]
    Hop { ch: u8 },
    /// The target was recognized and the hunt stopped hopping
    #[serde(rename = "lock")]
    Lock {
        ch: u8,
        /// "capture" or "ap_probe"
        via: &'static str,
    },
    /// A station associated with the pairing AP
    #[serde(rename = "connect")]
    Connect { mac: &'a MacString, target: bool },
    /// Device status report
    #[serde(rename = "status")]
    Status {
        /// "scanning" or "locked"
        state: &'static str,
        ch: u8,
        /// Uptime in seconds
        uptime: u32,
    },
}

/// Commands sent from the host to the device.
///
/// Deserialized manually via [`RawCommand`] in `comm::parse_command()` because
/// `serde_json_core` does not support internally tagged enums (`deserialize_any`).
#[derive(Debug, PartialEq)]
pub enum HostCommand {
    /// Request current status
    GetStatus,
}

/// Wire format for host commands. Converted to [`HostCommand`] in
/// `comm::parse_command()`.
#[derive(Deserialize)]
pub(crate) struct RawCommand {
    pub cmd: String<16>,
}

/// Firmware version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum size of a serialized JSON message
pub const MAX_MSG_LEN: usize = 256;

/// Buffer type for serialized JSON messages
pub type MsgBuffer = Vec<u8, MAX_MSG_LEN>;
