//! Target acquisition state shared between the capture callback, the AP
//! event handler and the channel scheduler.
//!
//! The state only ever moves `Scanning -> Locked`. The cell is a single
//! atomic byte: writers race with a compare-exchange so exactly one of them
//! observes the transition, and readers use acquire loads so a lock taken on
//! another core is seen at the scheduler's next check.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

const SCANNING: u8 = 0;

/// Observable acquisition state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
    /// Target not seen yet; the scheduler keeps hopping.
    Scanning,
    /// Target seen on the current channel; hopping stops for good.
    Locked,
}

impl Acquisition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Acquisition::Scanning => "scanning",
            Acquisition::Locked => "locked",
        }
    }
}

/// What attributed a frame or event to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LockSource {
    /// A raw probe request seen by the promiscuous capture.
    Capture = 1,
    /// A probe request reported by the access point subsystem.
    ApProbe = 2,
}

impl LockSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockSource::Capture => "capture",
            LockSource::ApProbe => "ap_probe",
        }
    }

    fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(LockSource::Capture),
            2 => Some(LockSource::ApProbe),
            _ => None,
        }
    }
}

/// Human-readable line for the winning lock: the trigger and the channel
/// it fired on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockNotice {
    pub source: LockSource,
    pub channel: u8,
}

impl fmt::Display for LockNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[TARGET LOCKED] GamePad via {} on channel {}",
            self.source.as_str(),
            self.channel
        )
    }
}

/// Lock-free acquisition cell. Holds `SCANNING` until the first lock, then
/// the [`LockSource`] that won.
pub struct AcquisitionState {
    raw: AtomicU8,
}

impl AcquisitionState {
    pub const fn new() -> Self {
        Self {
            raw: AtomicU8::new(SCANNING),
        }
    }

    pub fn get(&self) -> Acquisition {
        match self.raw.load(Ordering::Acquire) {
            SCANNING => Acquisition::Scanning,
            _ => Acquisition::Locked,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.get() == Acquisition::Locked
    }

    /// Which trigger took the lock, if any.
    pub fn locked_by(&self) -> Option<LockSource> {
        LockSource::from_raw(self.raw.load(Ordering::Acquire))
    }

    /// Apply `Scanning -> Locked`. Returns `true` only for the caller that
    /// performed the transition; every later call is a no-op returning
    /// `false`. Never blocks.
    pub fn lock(&self, source: LockSource) -> bool {
        self.raw
            .compare_exchange(SCANNING, source as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for AcquisitionState {
    fn default() -> Self {
        Self::new()
    }
}
