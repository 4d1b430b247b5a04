//! Raw 802.11 frame inspection for the promiscuous capture path.
//!
//! Header fields are read through [`Field`] descriptors that length-check
//! the frame before every access, so truncated captures fall out as `None`
//! instead of reading past the buffer. The SSID of a probe request is only
//! needed for the lock notification and is parsed with the ieee80211 crate.
//!
//! Everything here is safe to call from the WiFi driver's receive callback
//! (no allocation, no blocking).

use ieee80211::match_frames;
use ieee80211::mgmt_frame::ProbeRequestFrame;

use crate::protocol::NameString;

/// A fixed-offset field of the 802.11 MAC header.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub offset: usize,
    pub len: usize,
}

impl Field {
    /// Borrow the field out of `frame`, or `None` if the frame is too short.
    pub fn read<'a>(&self, frame: &'a [u8]) -> Option<&'a [u8]> {
        frame.get(self.offset..self.offset.checked_add(self.len)?)
    }

    /// Offset one past the last byte of the field.
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Address 2 (transmitter). For a probe request this is the station itself.
pub const SOURCE_ADDRESS: Field = Field { offset: 10, len: 6 };

/// Shortest frame we will classify: up to and including Address 2.
pub const MIN_HEADER_LEN: usize = SOURCE_ADDRESS.end();

const TYPE_MANAGEMENT: u8 = 0;
const TYPE_CONTROL: u8 = 1;
const TYPE_DATA: u8 = 2;
const SUBTYPE_PROBE_REQUEST: u8 = 4;

/// Coarse frame classification from the frame control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    ProbeRequest,
    Management,
    Control,
    Data,
    Other,
}

/// Classify a frame by its first frame-control byte: version (bits 0-1),
/// type (2-3), subtype (4-7). Returns `None` for an empty buffer.
pub fn classify(frame: &[u8]) -> Option<FrameKind> {
    let fc = *frame.first()?;
    if fc & 0x03 != 0 {
        // Only protocol version 0 exists.
        return Some(FrameKind::Other);
    }
    let kind = match ((fc >> 2) & 0x3, fc >> 4) {
        (TYPE_MANAGEMENT, SUBTYPE_PROBE_REQUEST) => FrameKind::ProbeRequest,
        (TYPE_MANAGEMENT, _) => FrameKind::Management,
        (TYPE_CONTROL, _) => FrameKind::Control,
        (TYPE_DATA, _) => FrameKind::Data,
        _ => FrameKind::Other,
    };
    Some(kind)
}

/// Extract the transmitter address of a probe request.
///
/// Any other frame kind, and any probe request too short to carry Address 2,
/// yields `None`.
pub fn probe_request_source(frame: &[u8]) -> Option<[u8; 6]> {
    if classify(frame)? != FrameKind::ProbeRequest {
        return None;
    }
    SOURCE_ADDRESS.read(frame)?.try_into().ok()
}

/// SSID a probe request is asking for. Empty for a wildcard probe; `None`
/// if the frame does not parse as a probe request.
pub fn probe_ssid(frame: &[u8]) -> Option<NameString> {
    let result = match_frames! {
        frame,
        probe_req = ProbeRequestFrame<'_> => {
            let mut ssid = NameString::new();
            let _ = ssid.push_str(probe_req.body.ssid().unwrap_or(""));
            ssid
        }
    };
    result.ok()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a probe request from `src` with an SSID element.
    pub(crate) fn probe_request(src: [u8; 6], ssid: &str) -> std::vec::Vec<u8> {
        let mut f = std::vec![0x40, 0x00, 0x00, 0x00];
        f.extend_from_slice(&[0xFF; 6]); // addr1: broadcast
        f.extend_from_slice(&src); // addr2
        f.extend_from_slice(&[0xFF; 6]); // addr3: wildcard BSSID
        f.extend_from_slice(&[0x10, 0x00]); // sequence control
        f.push(0x00); // SSID element
        f.push(ssid.len() as u8);
        f.extend_from_slice(ssid.as_bytes());
        f.extend_from_slice(&[0x01, 0x02, 0x8C, 0x12]); // supported rates
        f
    }

    const SRC: [u8; 6] = [0x02, 0x11, 0x22, 0x33, 0x44, 0x55];

    // ── Classification ──────────────────────────────────────────────

    #[test]
    fn classify_probe_request() {
        assert_eq!(classify(&[0x40, 0x00]), Some(FrameKind::ProbeRequest));
    }

    #[test]
    fn classify_other_management() {
        assert_eq!(classify(&[0x80, 0x00]), Some(FrameKind::Management)); // beacon
        assert_eq!(classify(&[0x50, 0x00]), Some(FrameKind::Management)); // probe resp
        assert_eq!(classify(&[0xB0, 0x00]), Some(FrameKind::Management)); // auth
    }

    #[test]
    fn classify_control_and_data() {
        assert_eq!(classify(&[0xD4, 0x00]), Some(FrameKind::Control)); // ACK
        assert_eq!(classify(&[0x08, 0x01]), Some(FrameKind::Data));
        assert_eq!(classify(&[0x88, 0x02]), Some(FrameKind::Data)); // QoS data
    }

    #[test]
    fn classify_rejects_unknown_version() {
        assert_eq!(classify(&[0x41, 0x00]), Some(FrameKind::Other));
    }

    #[test]
    fn classify_single_byte_and_empty() {
        assert_eq!(classify(&[0x40]), Some(FrameKind::ProbeRequest));
        assert_eq!(classify(&[]), None);
    }

    // ── Source address extraction ───────────────────────────────────

    #[test]
    fn source_of_probe_request() {
        let frame = probe_request(SRC, "WiiU");
        assert_eq!(probe_request_source(&frame), Some(SRC));
    }

    #[test]
    fn source_needs_only_header_prefix() {
        let frame = probe_request(SRC, "");
        assert_eq!(probe_request_source(&frame[..MIN_HEADER_LEN]), Some(SRC));
    }

    #[test]
    fn source_ignores_non_probe_frames() {
        let mut frame = probe_request(SRC, "WiiU");
        frame[0] = 0x80;
        assert_eq!(probe_request_source(&frame), None);
        frame[0] = 0x08;
        assert_eq!(probe_request_source(&frame), None);
    }

    #[test]
    fn truncated_frames_never_panic() {
        let frame = probe_request(SRC, "WiiU");
        for len in 0..MIN_HEADER_LEN {
            assert_eq!(probe_request_source(&frame[..len]), None, "len {len}");
            let _ = probe_ssid(&frame[..len]);
        }
    }

    #[test]
    fn field_read_bounds() {
        let buf = [0u8; 12];
        assert!(SOURCE_ADDRESS.read(&buf).is_none());
        let receiver = Field { offset: 4, len: 6 };
        assert_eq!(receiver.read(&buf).map(|f| f.len()), Some(6));
        let huge = Field {
            offset: usize::MAX,
            len: 2,
        };
        assert!(huge.read(&buf).is_none());
    }

    // ── SSID ────────────────────────────────────────────────────────

    #[test]
    fn ssid_of_directed_probe() {
        let frame = probe_request(SRC, "WiiU");
        assert_eq!(probe_ssid(&frame).as_deref(), Some("WiiU"));
    }

    #[test]
    fn ssid_of_non_probe_is_none() {
        assert!(probe_ssid(&[0xD4, 0x00, 0x00, 0x00]).is_none());
    }
}
