//! Access point lifecycle events.
//!
//! The pairing AP reports two things we care about: a probe request it
//! answered, and a station that associated. A probe from the target is a
//! second way to take the acquisition lock (the capture path is the other);
//! an association from the target means the handshake is under way and the
//! LCD says so.

use crate::display::{self, StatusDisplay};
use crate::filter::mac_string;
use crate::state::{AcquisitionState, LockNotice, LockSource};

/// Events delivered by the access point subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApEvent {
    /// The AP received a probe request from `mac`.
    ProbeSeen { mac: [u8; 6] },
    /// `mac` associated with the AP.
    StationConnected { mac: [u8; 6] },
    /// Anything else the AP reports.
    Other,
}

/// What the handler did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Not an event about the target, or not an event kind we handle.
    Ignored,
    /// Target probe; this event took the lock.
    Locked,
    /// Target probe after the lock was already taken.
    AlreadyLocked,
    /// Some station associated. `target` tells whether it was ours;
    /// `shown` whether the handshake screen made it to the display.
    Connected { target: bool, shown: bool },
}

/// Reacts to AP events for one target. Owns the display after boot.
pub struct AssociationHandler<'a, D> {
    target: [u8; 6],
    state: &'a AcquisitionState,
    display: D,
}

impl<'a, D: StatusDisplay> AssociationHandler<'a, D> {
    pub fn new(target: [u8; 6], state: &'a AcquisitionState, display: D) -> Self {
        Self {
            target,
            state,
            display,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// React to one AP event. `channel` is the AP's current channel, used
    /// in the lock line.
    pub fn handle(&mut self, event: &ApEvent, channel: u8) -> Reaction {
        match *event {
            ApEvent::ProbeSeen { mac } if mac == self.target => {
                if self.state.lock(LockSource::ApProbe) {
                    log::info!(
                        "{}",
                        LockNotice {
                            source: LockSource::ApProbe,
                            channel,
                        }
                    );
                    log::info!("AP recognized GamePad. Projecting WPS flags...");
                    Reaction::Locked
                } else {
                    Reaction::AlreadyLocked
                }
            }
            ApEvent::StationConnected { mac } => {
                log::info!("[!!!] DEVICE CONNECTED: {}", mac_string(&mac));
                if mac != self.target {
                    return Reaction::Connected {
                        target: false,
                        shown: false,
                    };
                }
                log::info!("=> Association successful! Handshake initiated!");
                let shown = match display::show_handshake(&mut self.display) {
                    Ok(()) => true,
                    Err(e) => {
                        log::warn!("Display update failed: {:?}", e);
                        false
                    }
                };
                Reaction::Connected {
                    target: true,
                    shown,
                }
            }
            ApEvent::ProbeSeen { .. } | ApEvent::Other => Reaction::Ignored,
        }
    }
}
