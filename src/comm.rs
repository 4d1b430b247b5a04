/// Serial NDJSON transport.
///
/// The device reports boot, hops, the lock and connections as
/// newline-delimited JSON on the console, and answers status requests read
/// back from the same line.

use crate::protocol::{DeviceMessage, HostCommand, RawCommand, MAX_MSG_LEN};
use crate::state::{Acquisition, AcquisitionState};

// ── Serialization helpers ──────────────────────────────────────────────

/// Serialize a DeviceMessage to JSON bytes and write to the output buffer.
/// Returns the number of bytes written, or None if serialization failed.
pub fn serialize_message(msg: &DeviceMessage, buf: &mut [u8]) -> Option<usize> {
    let len = serde_json_core::to_slice(msg, buf).ok()?;
    // NDJSON needs the terminator; a message that fills the buffer is dropped
    let nl = buf.get_mut(len)?;
    *nl = b'\n';
    Some(len + 1)
}

/// Deserialize a HostCommand from a JSON byte slice.
pub fn parse_command(data: &[u8]) -> Option<HostCommand> {
    let trimmed = data.trim_ascii();
    if trimmed.is_empty() {
        return None;
    }
    let (raw, _) = serde_json_core::from_slice::<RawCommand>(trimmed).ok()?;
    match raw.cmd.as_str() {
        "get_status" => Some(HostCommand::GetStatus),
        other => {
            log::warn!("Unknown command: {}", other);
            None
        }
    }
}

/// Build the status report for the current acquisition state.
pub fn status_message(
    state: &AcquisitionState,
    channel: u8,
    uptime_secs: u32,
) -> DeviceMessage<'static> {
    DeviceMessage::Status {
        state: state.get().as_str(),
        ch: channel,
        uptime: uptime_secs,
    }
}

/// Process a received host command and produce the reply.
pub fn handle_command(
    cmd: HostCommand,
    state: &AcquisitionState,
    channel: u8,
    uptime_secs: u32,
) -> DeviceMessage<'static> {
    match cmd {
        HostCommand::GetStatus => status_message(state, channel, uptime_secs),
    }
}

/// Build the lock report. Returns None while still scanning.
pub fn lock_message(state: &AcquisitionState, channel: u8) -> Option<DeviceMessage<'static>> {
    match state.get() {
        Acquisition::Scanning => None,
        Acquisition::Locked => Some(DeviceMessage::Lock {
            ch: channel,
            via: state.locked_by()?.as_str(),
        }),
    }
}

// ── Serial NDJSON reader ───────────────────────────────────────────────

/// Serial NDJSON reader state machine.
/// Accumulates bytes until a newline is found, then yields the line.
pub struct LineReader {
    buf: [u8; MAX_MSG_LEN],
    pos: usize,
    overflowed: bool,
}

impl LineReader {
    pub const fn new() -> Self {
        Self {
            buf: [0; MAX_MSG_LEN],
            pos: 0,
            overflowed: false,
        }
    }

    /// Feed a byte into the reader. Returns a complete line (without newline)
    /// when one is detected.
    pub fn feed(&mut self, byte: u8) -> Option<&[u8]> {
        if byte == b'\n' || byte == b'\r' {
            let pos = core::mem::take(&mut self.pos);
            // The tail of an overlong line is not a command
            if core::mem::take(&mut self.overflowed) || pos == 0 {
                return None;
            }
            Some(&self.buf[..pos])
        } else if self.overflowed {
            None
        } else if self.pos < self.buf.len() {
            self.buf[self.pos] = byte;
            self.pos += 1;
            None
        } else {
            self.pos = 0;
            self.overflowed = true;
            None
        }
    }
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}
