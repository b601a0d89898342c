//! IDLE/ACTIVE/INACTIVE hysteresis state machine. Grounded in
//! `vad/turn_detection.py`. The probability model itself (ONNX/energy) is
//! injected via `VoiceActivityDetector`; this module only tracks state.

use std::collections::VecDeque;
use std::sync::Arc;
use voice_agent_core::{rms_db, VadResult, VadState, VoiceActivityDetector};

#[derive(Debug, Clone)]
pub struct VadConfig {
    pub prob_threshold: f32,
    pub db_threshold: f32,
    pub required_hits: u32,
    pub required_misses: u32,
    pub smoothing_window: usize,
    pub pre_roll_windows: usize,
    pub min_utterance_bytes: usize,
    /// Windows spent in ACTIVE/INACTIVE since the IDLE->ACTIVE transition
    /// before the timeout-rescue path forces an end-of-utterance, even if
    /// every window since then has been a hit (continuous speech).
    pub timeout_windows: u32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            prob_threshold: 0.4,
            db_threshold: -60.0,
            required_hits: 3,
            required_misses: 24,
            smoothing_window: 5,
            pre_roll_windows: 20,
            min_utterance_bytes: 8_000,
            timeout_windows: 750,
        }
    }
}

/// A trailing mean over the last `window` scalar readings.
struct RollingMean {
    window: usize,
    values: VecDeque<f32>,
    sum: f32,
}

impl RollingMean {
    fn new(window: usize) -> Self {
        Self { window, values: VecDeque::with_capacity(window), sum: 0.0 }
    }

    fn push(&mut self, value: f32) -> f32 {
        self.values.push_back(value);
        self.sum += value;
        if self.values.len() > self.window {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
            }
        }
        self.sum / self.values.len() as f32
    }
}

/// The IDLE/ACTIVE/INACTIVE turn-detection state machine for one session.
/// Not `Send`-shared directly; a session owns one behind its own lock.
pub struct VadStateMachine {
    config: VadConfig,
    detector: Arc<dyn VoiceActivityDetector>,
    state: VadState,
    prob_mean: RollingMean,
    db_mean: RollingMean,
    hit_streak: u32,
    miss_streak: u32,
    windows_since_hit: u32,
    windows_since_active_start: u32,
    pre_roll: VecDeque<Vec<u8>>,
    utterance: Vec<u8>,
}

impl VadStateMachine {
    pub fn new(detector: Arc<dyn VoiceActivityDetector>, config: VadConfig) -> Self {
        let smoothing = config.smoothing_window;
        Self {
            prob_mean: RollingMean::new(smoothing),
            db_mean: RollingMean::new(smoothing),
            pre_roll: VecDeque::with_capacity(config.pre_roll_windows),
            detector,
            config,
            state: VadState::Idle,
            hit_streak: 0,
            miss_streak: 0,
            windows_since_hit: 0,
            windows_since_active_start: 0,
            utterance: Vec::new(),
        }
    }

    pub fn state(&self) -> VadState {
        self.state
    }

    fn push_pre_roll(&mut self, window_bytes: &[u8]) {
        if self.pre_roll.len() >= self.config.pre_roll_windows {
            self.pre_roll.pop_front();
        }
        self.pre_roll.push_back(window_bytes.to_vec());
    }

    fn drain_pre_roll_into_utterance(&mut self) {
        for chunk in self.pre_roll.drain(..) {
            self.utterance.extend_from_slice(&chunk);
        }
    }

    /// Feeds one fixed-width PCM16LE window (as bytes) plus its equivalent
    /// normalized `f32` samples (used for the probability model and dB
    /// computation) through the state machine.
    pub async fn process_window(&mut self, window_bytes: &[u8], window_samples: &[f32]) -> VadResult {
        let raw_prob = self.detector.speech_probability(window_samples).await;
        let db = rms_db(window_samples);

        let smoothed_prob = self.prob_mean.push(raw_prob);
        // A non-finite dB (true digital silence) floors the rolling mean at
        // a very low sentinel rather than poisoning it with -inf.
        let db_sample = if db.is_finite() { db } else { -1000.0 };
        let smoothed_db = self.db_mean.push(db_sample);

        let is_speech_window = smoothed_prob >= self.config.prob_threshold && smoothed_db >= self.config.db_threshold;

        if is_speech_window {
            self.hit_streak += 1;
            self.miss_streak = 0;
            self.windows_since_hit = 0;
        } else {
            self.miss_streak += 1;
            self.hit_streak = 0;
            self.windows_since_hit += 1;
        }

        match self.state {
            VadState::Idle => {
                self.push_pre_roll(window_bytes);
                if self.hit_streak >= self.config.required_hits {
                    self.state = VadState::Active;
                    self.windows_since_active_start = 0;
                    self.utterance.clear();
                    self.drain_pre_roll_into_utterance();
                    self.utterance.extend_from_slice(window_bytes);
                    return VadResult {
                        state: self.state,
                        is_speech_start: true,
                        is_speech_end: false,
                        audio_data: Vec::new(),
                    };
                }
                VadResult { state: self.state, is_speech_start: false, is_speech_end: false, audio_data: Vec::new() }
            }
            VadState::Active | VadState::Inactive => {
                self.utterance.extend_from_slice(window_bytes);
                self.windows_since_active_start += 1;

                if is_speech_window {
                    self.state = VadState::Active;
                } else {
                    self.state = VadState::Inactive;
                }

                // The miss-streak check alone never fires for continuous
                // speech-like audio (every window is a hit, so miss_streak
                // and windows_since_hit stay at 0); this is a stuck-ACTIVE
                // timeout measured from the IDLE->ACTIVE transition, not
                // from the last hit, so it fires regardless of streak state.
                let timed_out = self.windows_since_active_start >= self.config.timeout_windows;
                if self.miss_streak >= self.config.required_misses || timed_out {
                    self.state = VadState::Idle;
                    self.hit_streak = 0;
                    self.miss_streak = 0;
                    self.windows_since_hit = 0;
                    self.windows_since_active_start = 0;
                    let audio = std::mem::take(&mut self.utterance);
                    self.pre_roll.clear();
                    if audio.len() >= self.config.min_utterance_bytes {
                        return VadResult { state: self.state, is_speech_start: false, is_speech_end: true, audio_data: audio };
                    }
                    return VadResult { state: self.state, is_speech_start: false, is_speech_end: false, audio_data: Vec::new() };
                }

                VadResult { state: self.state, is_speech_start: false, is_speech_end: false, audio_data: Vec::new() }
            }
        }
    }

    /// Forces a synthetic speech-end using whatever audio has accumulated
    /// so far and resets to IDLE, regardless of `min_utterance_bytes` or
    /// streak state. Used by a caller-side wall-clock timeout (the session
    /// layer's own `VAD_TIMEOUT` rescue) when ACTIVE/INACTIVE has persisted
    /// too long, independent of this state machine's own window-count
    /// timeout.
    pub fn force_end(&mut self) -> Vec<u8> {
        let audio = std::mem::take(&mut self.utterance);
        self.reset();
        audio
    }

    pub fn reset(&mut self) {
        self.state = VadState::Idle;
        self.hit_streak = 0;
        self.miss_streak = 0;
        self.windows_since_hit = 0;
        self.windows_since_active_start = 0;
        self.utterance.clear();
        self.pre_roll.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedVad(f32);

    #[async_trait]
    impl VoiceActivityDetector for FixedVad {
        async fn speech_probability(&self, _window: &[f32]) -> f32 {
            self.0
        }
        fn provider_name(&self) -> &str {
            "fixed"
        }
    }

    fn loud_window() -> (Vec<u8>, Vec<f32>) {
        let samples: Vec<f32> = vec![0.8; 512];
        let bytes: Vec<u8> = samples
            .iter()
            .map(|s| (*s * i16::MAX as f32) as i16)
            .flat_map(|v: i16| v.to_le_bytes())
            .collect();
        (bytes, samples)
    }

    fn silent_window() -> (Vec<u8>, Vec<f32>) {
        let samples: Vec<f32> = vec![0.0; 512];
        let bytes = vec![0u8; 1024];
        (bytes, samples)
    }

    #[tokio::test]
    async fn idle_to_active_requires_consecutive_hits() {
        let mut fsm = VadStateMachine::new(Arc::new(FixedVad(0.9)), VadConfig { required_hits: 3, ..Default::default() });
        let (bytes, samples) = loud_window();
        let r1 = fsm.process_window(&bytes, &samples).await;
        assert!(!r1.is_speech_start);
        let r2 = fsm.process_window(&bytes, &samples).await;
        assert!(!r2.is_speech_start);
        let r3 = fsm.process_window(&bytes, &samples).await;
        assert!(r3.is_speech_start);
        assert_eq!(fsm.state(), VadState::Active);
    }

    #[tokio::test]
    async fn short_utterance_is_dropped_below_min_bytes() {
        let mut fsm = VadStateMachine::new(
            Arc::new(FixedVad(0.9)),
            VadConfig { required_hits: 1, required_misses: 1, min_utterance_bytes: 1_000_000, ..Default::default() },
        );
        let (loud_bytes, loud_samples) = loud_window();
        let (silent_bytes, silent_samples) = silent_window();
        fsm.process_window(&loud_bytes, &loud_samples).await;
        let r = fsm.process_window(&silent_bytes, &silent_samples).await;
        assert!(!r.is_speech_end);
        assert_eq!(fsm.state(), VadState::Idle);
    }

    #[tokio::test]
    async fn long_utterance_emits_speech_end_with_accumulated_audio() {
        let mut fsm = VadStateMachine::new(
            Arc::new(FixedVad(0.9)),
            VadConfig { required_hits: 1, required_misses: 1, min_utterance_bytes: 100, ..Default::default() },
        );
        let (loud_bytes, loud_samples) = loud_window();
        let (silent_bytes, silent_samples) = silent_window();
        fsm.process_window(&loud_bytes, &loud_samples).await;
        let r = fsm.process_window(&silent_bytes, &silent_samples).await;
        assert!(r.is_speech_end);
        assert!(!r.audio_data.is_empty());
        assert_eq!(fsm.state(), VadState::Idle);
    }

    #[tokio::test]
    async fn continuous_speech_times_out_without_a_gap() {
        let mut fsm = VadStateMachine::new(
            Arc::new(FixedVad(0.9)),
            VadConfig { required_hits: 1, required_misses: 1_000_000, timeout_windows: 5, min_utterance_bytes: 1, ..Default::default() },
        );
        let (bytes, samples) = loud_window();
        let start = fsm.process_window(&bytes, &samples).await;
        assert!(start.is_speech_start);

        let mut timed_out = None;
        for _ in 0..10 {
            let r = fsm.process_window(&bytes, &samples).await;
            if r.is_speech_end {
                timed_out = Some(r);
                break;
            }
        }
        let r = timed_out.expect("continuous speech should still time out");
        assert!(!r.audio_data.is_empty());
        assert_eq!(fsm.state(), VadState::Idle);
    }

    #[tokio::test]
    async fn silence_never_leaves_idle() {
        let mut fsm = VadStateMachine::new(Arc::new(FixedVad(0.01)), VadConfig::default());
        let (bytes, samples) = silent_window();
        for _ in 0..10 {
            let r = fsm.process_window(&bytes, &samples).await;
            assert_eq!(r.state, VadState::Idle);
        }
    }
}
