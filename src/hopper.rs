//! Channel hopping while the target is unlocked.
//!
//! The scheduler walks a fixed channel plan, dwelling on each channel long
//! enough for the GamePad to sweep it, and stops for good once the
//! acquisition state is locked. Every move uses the safe swap sequence:
//! capture off, set channel, capture on. Capture is never enabled while the
//! radio retunes.

use embedded_hal::delay::DelayNs;

use crate::defaults::HunterConfig;
use crate::state::AcquisitionState;

/// The slice of the radio the scheduler drives.
pub trait Radio {
    type Error: core::fmt::Debug;

    /// Enable or disable promiscuous capture. The frame callback stays
    /// registered across toggles.
    fn set_capture(&mut self, enabled: bool) -> Result<(), Self::Error>;

    /// Retune to a primary channel (20 MHz, no secondary).
    fn set_channel(&mut self, channel: u8) -> Result<(), Self::Error>;
}

/// Cyclic channel plan. The index is the only mutable scheduling state.
#[derive(Debug, Clone)]
pub struct ChannelPlan<const N: usize> {
    channels: [u8; N],
    index: usize,
}

impl<const N: usize> ChannelPlan<N> {
    /// Start at the first entry. Panics on an empty plan.
    pub const fn new(channels: [u8; N]) -> Self {
        assert!(N > 0, "channel plan must not be empty");
        Self { channels, index: 0 }
    }

    pub fn current(&self) -> u8 {
        self.channels[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The entry after the current one, wrapping to the first.
    pub fn peek_next(&self) -> u8 {
        self.channels[(self.index + 1) % N]
    }

    /// Move to the next entry, wrapping, and return it.
    pub fn advance(&mut self) -> u8 {
        self.index = (self.index + 1) % N;
        self.current()
    }
}

/// Outcome of one scheduler cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hop {
    /// Still scanning; the radio is now on `to`.
    Moved { from: u8, to: u8 },
    /// Locked; the radio stays on `channel`.
    Held { channel: u8 },
    /// The swap failed; the plan index did not move and the next cycle
    /// retries the same channel.
    Failed { channel: u8 },
}

/// Channel hopping scheduler. Owned by the main control context; the only
/// writer of the plan index.
pub struct ChannelScheduler<'a, const N: usize> {
    plan: ChannelPlan<N>,
    state: &'a AcquisitionState,
    dwell_ms: u32,
    idle_ms: u32,
}

impl<'a> ChannelScheduler<'a, 8> {
    pub fn from_config(config: &HunterConfig, state: &'a AcquisitionState) -> Self {
        Self::new(ChannelPlan::new(config.plan), state, config.dwell_ms, config.idle_ms)
    }
}

impl<'a, const N: usize> ChannelScheduler<'a, N> {
    pub fn new(plan: ChannelPlan<N>, state: &'a AcquisitionState, dwell_ms: u32, idle_ms: u32) -> Self {
        Self {
            plan,
            state,
            dwell_ms,
            idle_ms,
        }
    }

    /// Channel the radio is (or was last successfully put) on.
    pub fn current_channel(&self) -> u8 {
        self.plan.current()
    }

    pub fn plan(&self) -> &ChannelPlan<N> {
        &self.plan
    }

    /// One pass of the control loop: wait, then act on the current state.
    ///
    /// Scanning: wait the dwell time, re-check the state (a lock may have
    /// landed during the dwell), and move to the next channel if still
    /// scanning. Locked: wait the idle time and do nothing else.
    pub fn cycle<R: Radio, D: DelayNs>(&mut self, radio: &mut R, delay: &mut D) -> Hop {
        if self.state.is_locked() {
            delay.delay_ms(self.idle_ms);
            return Hop::Held {
                channel: self.current_channel(),
            };
        }
        delay.delay_ms(self.dwell_ms);
        self.step(radio)
    }

    /// Re-check the state and hop if still scanning. No waiting.
    pub fn step<R: Radio>(&mut self, radio: &mut R) -> Hop {
        let from = self.current_channel();
        if self.state.is_locked() {
            return Hop::Held { channel: from };
        }

        let to = self.plan.peek_next();
        match swap_channel(radio, to) {
            Ok(()) => {
                self.plan.advance();
                log::info!("No hit on channel {}. Moving to channel {}...", from, to);
                Hop::Moved { from, to }
            }
            Err(e) => {
                log::warn!("Channel switch to {} failed: {:?}, retrying next cycle", to, e);
                Hop::Failed { channel: to }
            }
        }
    }
}

/// Capture off, retune, capture on.
///
/// If capture cannot be disabled the channel is left alone. If retuning
/// fails, capture is still re-enabled on the old channel before the error
/// is returned.
pub fn swap_channel<R: Radio>(radio: &mut R, channel: u8) -> Result<(), R::Error> {
    radio.set_capture(false)?;
    let retuned = radio.set_channel(channel);
    if let Err(e) = radio.set_capture(true) {
        // Deaf until the next swap turns capture back on.
        log::warn!("Capture not resumed after switch to {}: {:?}", channel, e);
    }
    retuned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LockSource;

    // ── Test doubles ────────────────────────────────────────────────

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Capture(bool),
        Channel(u8),
    }

    #[derive(Debug, PartialEq, Eq)]
    struct RadioError;

    struct FakeRadio {
        capture: bool,
        channel: u8,
        calls: std::vec::Vec<Call>,
        retunes_while_capturing: usize,
        fail_channel: Option<u8>,
        fail_disable: bool,
        fail_enable: bool,
    }

    impl FakeRadio {
        fn new(channel: u8) -> Self {
            Self {
                capture: true,
                channel,
                calls: std::vec::Vec::new(),
                retunes_while_capturing: 0,
                fail_channel: None,
                fail_disable: false,
                fail_enable: false,
            }
        }

        fn channels(&self) -> std::vec::Vec<u8> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Channel(ch) => Some(*ch),
                    _ => None,
                })
                .collect()
        }
    }

    impl Radio for FakeRadio {
        type Error = RadioError;

        fn set_capture(&mut self, enabled: bool) -> Result<(), RadioError> {
            self.calls.push(Call::Capture(enabled));
            if (!enabled && self.fail_disable) || (enabled && self.fail_enable) {
                return Err(RadioError);
            }
            self.capture = enabled;
            Ok(())
        }

        fn set_channel(&mut self, channel: u8) -> Result<(), RadioError> {
            self.calls.push(Call::Channel(channel));
            if self.capture {
                self.retunes_while_capturing += 1;
            }
            if self.fail_channel == Some(channel) {
                return Err(RadioError);
            }
            self.channel = channel;
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingDelay {
        total_ns: u64,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += ns as u64;
        }
    }

    const PLAN: [u8; 8] = [36, 40, 44, 48, 149, 153, 157, 161];

    fn scheduler(state: &AcquisitionState) -> ChannelScheduler<'_, 8> {
        ChannelScheduler::new(ChannelPlan::new(PLAN), state, 3000, 1000)
    }

    // ── Plan ────────────────────────────────────────────────────────

    #[test]
    fn plan_wraps_after_last_entry() {
        let mut plan = ChannelPlan::new([1, 6, 11]);
        assert_eq!(plan.current(), 1);
        assert_eq!(plan.advance(), 6);
        assert_eq!(plan.advance(), 11);
        assert_eq!(plan.peek_next(), 1);
        assert_eq!(plan.advance(), 1);
        assert_eq!(plan.index(), 0);
    }

    #[test]
    fn single_entry_plan_stays_put() {
        let mut plan = ChannelPlan::new([36]);
        assert_eq!(plan.advance(), 36);
        assert_eq!(plan.advance(), 36);
    }

    // ── Hopping ─────────────────────────────────────────────────────

    #[test]
    fn visits_every_channel_before_repeating() {
        let state = AcquisitionState::new();
        let mut sched = scheduler(&state);
        let mut radio = FakeRadio::new(36);

        for _ in 0..PLAN.len() {
            assert!(matches!(sched.step(&mut radio), Hop::Moved { .. }));
        }
        assert_eq!(radio.channels(), [40, 44, 48, 149, 153, 157, 161, 36]);
        assert_eq!(sched.current_channel(), 36);
    }

    #[test]
    fn never_retunes_while_capturing() {
        let state = AcquisitionState::new();
        let mut sched = scheduler(&state);
        let mut radio = FakeRadio::new(36);
        for _ in 0..20 {
            sched.step(&mut radio);
        }
        assert_eq!(radio.retunes_while_capturing, 0);
        assert!(radio.capture);
    }

    #[test]
    fn swap_sequence_order() {
        let state = AcquisitionState::new();
        let mut sched = scheduler(&state);
        let mut radio = FakeRadio::new(36);
        assert_eq!(sched.step(&mut radio), Hop::Moved { from: 36, to: 40 });
        assert_eq!(
            radio.calls,
            [Call::Capture(false), Call::Channel(40), Call::Capture(true)]
        );
    }

    #[test]
    fn locked_scheduler_holds_channel() {
        let state = AcquisitionState::new();
        let mut sched = scheduler(&state);
        let mut radio = FakeRadio::new(36);
        sched.step(&mut radio);
        sched.step(&mut radio);
        state.lock(LockSource::Capture);

        radio.calls.clear();
        for _ in 0..10 {
            assert_eq!(sched.step(&mut radio), Hop::Held { channel: 44 });
        }
        assert!(radio.calls.is_empty());
        assert_eq!(sched.plan().index(), 2);
    }

    // ── Waiting ─────────────────────────────────────────────────────

    #[test]
    fn scanning_cycle_dwells_then_moves() {
        let state = AcquisitionState::new();
        let mut sched = scheduler(&state);
        let mut radio = FakeRadio::new(36);
        let mut delay = RecordingDelay::default();

        assert_eq!(sched.cycle(&mut radio, &mut delay), Hop::Moved { from: 36, to: 40 });
        assert_eq!(delay.total_ns, 3_000_000_000);
    }

    #[test]
    fn locked_cycle_idles_without_radio_calls() {
        let state = AcquisitionState::new();
        state.lock(LockSource::ApProbe);
        let mut sched = scheduler(&state);
        let mut radio = FakeRadio::new(36);
        let mut delay = RecordingDelay::default();

        for _ in 0..3 {
            assert_eq!(sched.cycle(&mut radio, &mut delay), Hop::Held { channel: 36 });
        }
        assert_eq!(delay.total_ns, 3_000_000_000);
        assert!(radio.calls.is_empty());
    }

    #[test]
    fn lock_during_dwell_prevents_move() {
        struct LockingDelay<'a>(&'a AcquisitionState);
        impl DelayNs for LockingDelay<'_> {
            fn delay_ns(&mut self, _ns: u32) {
                self.0.lock(LockSource::Capture);
            }
        }

        let state = AcquisitionState::new();
        let mut sched = scheduler(&state);
        let mut radio = FakeRadio::new(36);
        let mut delay = LockingDelay(&state);

        assert_eq!(sched.cycle(&mut radio, &mut delay), Hop::Held { channel: 36 });
        assert!(radio.calls.is_empty());
    }

    // ── Failures ────────────────────────────────────────────────────

    #[test]
    fn failed_retune_retries_same_channel() {
        let state = AcquisitionState::new();
        let mut sched = scheduler(&state);
        let mut radio = FakeRadio::new(36);
        radio.fail_channel = Some(40);

        assert_eq!(sched.step(&mut radio), Hop::Failed { channel: 40 });
        assert_eq!(sched.current_channel(), 36);
        assert!(radio.capture, "capture must resume after a failed retune");

        radio.fail_channel = None;
        assert_eq!(sched.step(&mut radio), Hop::Moved { from: 36, to: 40 });
    }

    #[test]
    fn failed_capture_disable_skips_retune() {
        let state = AcquisitionState::new();
        let mut sched = scheduler(&state);
        let mut radio = FakeRadio::new(36);
        radio.fail_disable = true;

        assert_eq!(sched.step(&mut radio), Hop::Failed { channel: 40 });
        assert!(radio.channels().is_empty());
        assert_eq!(radio.channel, 36);
    }

    #[test]
    fn failed_retune_and_resume_still_attempts_resume() {
        let state = AcquisitionState::new();
        let mut sched = scheduler(&state);
        let mut radio = FakeRadio::new(36);
        radio.fail_channel = Some(40);
        radio.fail_enable = true;

        assert_eq!(sched.step(&mut radio), Hop::Failed { channel: 40 });
        assert_eq!(
            radio.calls,
            [Call::Capture(false), Call::Channel(40), Call::Capture(true)]
        );
        assert_eq!(sched.current_channel(), 36);

        // Next cycle retries the same channel and turns capture back on.
        radio.fail_channel = None;
        radio.fail_enable = false;
        assert_eq!(sched.step(&mut radio), Hop::Moved { from: 36, to: 40 });
        assert!(radio.capture);
    }

    #[test]
    fn failed_resume_alone_still_counts_as_moved() {
        let state = AcquisitionState::new();
        let mut sched = scheduler(&state);
        let mut radio = FakeRadio::new(36);
        radio.fail_enable = true;

        assert_eq!(swap_channel(&mut radio, 40), Ok(()));
        assert_eq!(radio.channel, 40);
        assert!(!radio.capture);
        assert_eq!(sched.step(&mut radio), Hop::Moved { from: 36, to: 40 });
    }

    #[test]
    fn from_config_uses_plan_and_timings() {
        let state = AcquisitionState::new();
        let config = HunterConfig::new();
        let mut sched = ChannelScheduler::from_config(&config, &state);
        let mut radio = FakeRadio::new(config.plan[0]);
        let mut delay = RecordingDelay::default();

        assert_eq!(sched.current_channel(), config.plan[0]);
        sched.cycle(&mut radio, &mut delay);
        assert_eq!(delay.total_ns, config.dwell_ms as u64 * 1_000_000);
        assert_eq!(sched.current_channel(), config.plan[1]);
    }
}
