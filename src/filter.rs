//! Target filter for captured frames.
//!
//! Looks for the one probe request that matters: the hunted GamePad's.
//! A match while scanning takes the acquisition lock; the capture path gets
//! back a [`Sighting`] exactly once and forwards it for reporting. Nothing
//! here logs, blocks or allocates.

use crate::protocol::{MacString, NameString};
use crate::scanner;
use crate::state::{AcquisitionState, LockSource};

/// Result of inspecting one captured frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inspection {
    /// Not a probe request, or too short to carry a source address.
    Ignored,
    /// A probe request from some other station.
    OtherStation,
    /// The target again, after the lock was already taken.
    AlreadyLocked,
    /// The target, and this call took the lock.
    Locked(Sighting),
}

/// Details of the frame that took the lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sighting {
    /// Channel the capture reported the frame on.
    pub channel: u8,
    /// SSID the target was probing for (empty for a wildcard probe).
    pub ssid: NameString,
}

/// Frame filter bound to one target address and the shared acquisition
/// state.
pub struct FrameFilter<'a> {
    target: [u8; 6],
    state: &'a AcquisitionState,
}

impl<'a> FrameFilter<'a> {
    pub const fn new(target: [u8; 6], state: &'a AcquisitionState) -> Self {
        Self { target, state }
    }

    pub fn is_target(&self, mac: &[u8; 6]) -> bool {
        *mac == self.target
    }

    /// Inspect one raw frame received on `channel`.
    pub fn inspect(&self, frame: &[u8], channel: u8) -> Inspection {
        let Some(source) = scanner::probe_request_source(frame) else {
            return Inspection::Ignored;
        };
        if !self.is_target(&source) {
            return Inspection::OtherStation;
        }
        if !self.state.lock(LockSource::Capture) {
            return Inspection::AlreadyLocked;
        }
        Inspection::Locked(Sighting {
            channel,
            ssid: scanner::probe_ssid(frame).unwrap_or_default(),
        })
    }
}

/// Format a 6-byte MAC address into "AA:BB:CC:DD:EE:FF" string
pub fn format_mac(mac: &[u8; 6], buf: &mut MacString) {
    use core::fmt::Write;
    let _ = write!(
        buf,
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    );
}

/// Convenience wrapper returning a fresh [`MacString`].
pub fn mac_string(mac: &[u8; 6]) -> MacString {
    let mut s = MacString::new();
    format_mac(mac, &mut s);
    s
}
