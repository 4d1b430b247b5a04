//! Compiled-in hunt parameters.
//!
//! The target address, the channel plan and the timing constants are fixed
//! at build time. [`crate::HunterConfig::new`] bundles them; nothing reads
//! them at runtime from storage.

/// Hardware address of the GamePad being hunted.
pub const TARGET_MAC: [u8; 6] = [0x5A, 0x02, 0x83, 0xCD, 0xC2, 0x9F];

/// 5 GHz channels the GamePad sweeps while looking for its console
/// (UNII-1 and UNII-3, 20 MHz primaries).
pub const CHANNEL_PLAN: [u8; 8] = [36, 40, 44, 48, 149, 153, 157, 161];

/// Dwell per channel while scanning. Long enough for the GamePad to finish a
/// full discovery sweep before we move.
pub const DWELL_MS: u32 = 3000;

/// Idle wait once locked. Only keeps the control loop alive.
pub const IDLE_MS: u32 = 1000;

/// SSID of the impersonated pairing access point.
pub const AP_SSID: &str = "WiiU_Dongle";

/// Only the GamePad should ever associate.
pub const AP_MAX_CONNECTIONS: u16 = 1;

/// Status report period on the serial console.
pub const STATUS_INTERVAL_SECS: u64 = 30;

/// Hunt parameters handed to the filter and the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunterConfig {
    /// The one address we lock onto.
    pub target: [u8; 6],
    /// Channels visited in order while scanning, wrapping at the end.
    pub plan: [u8; CHANNEL_PLAN.len()],
    /// Wait on each channel before moving, in milliseconds.
    pub dwell_ms: u32,
    /// Wait between checks once locked, in milliseconds.
    pub idle_ms: u32,
}

impl HunterConfig {
    pub const fn new() -> Self {
        Self {
            target: TARGET_MAC,
            plan: CHANNEL_PLAN,
            dwell_ms: DWELL_MS,
            idle_ms: IDLE_MS,
        }
    }
}

impl Default for HunterConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_plan_is_5ghz_20mhz_primaries() {
        for &ch in CHANNEL_PLAN.iter() {
            assert!((36..=165).contains(&ch), "channel {ch} outside 5 GHz band");
            assert_eq!(ch % 4, if ch >= 149 { 1 } else { 0 });
        }
    }

    #[test]
    fn channel_plan_has_no_duplicates() {
        for (i, a) in CHANNEL_PLAN.iter().enumerate() {
            for b in &CHANNEL_PLAN[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn config_defaults() {
        let config = HunterConfig::default();
        assert_eq!(config.target, TARGET_MAC);
        assert_eq!(config.plan[0], 36);
        assert!(config.dwell_ms > config.idle_ms);
    }

    #[test]
    fn ssid_fits_in_beacon_element() {
        assert!(!AP_SSID.is_empty() && AP_SSID.len() <= 32);
    }
}
