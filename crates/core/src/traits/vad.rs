use async_trait::async_trait;

/// The VAD state machine has exactly three states (see the VAD State
/// Machine component). `Idle` is both the initial and resting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadState {
    Idle,
    Active,
    Inactive,
}

impl Default for VadState {
    fn default() -> Self {
        VadState::Idle
    }
}

/// Outcome of feeding one window into the VAD state machine. Most windows
/// produce `None` (no transition worth reporting); `speech_start` and
/// `speech_end` carry the moments handlers care about.
#[derive(Debug, Clone)]
pub struct VadResult {
    pub state: VadState,
    pub is_speech_start: bool,
    pub is_speech_end: bool,
    pub audio_data: Vec<u8>,
}

impl VadResult {
    pub fn is_special_signal(&self) -> bool {
        self.is_speech_start || self.is_speech_end
    }
}

/// A pluggable speech-probability model. The hysteresis state machine
/// (`voice-agent-pipeline::vad`) wraps one of these; this trait only ever
/// has to answer "how likely is this window speech" for a fixed-width PCM
/// window.
#[async_trait]
pub trait VoiceActivityDetector: Send + Sync + 'static {
    /// Probability in `[0, 1]` that `window` (normalized `f32` samples)
    /// contains speech.
    async fn speech_probability(&self, window: &[f32]) -> f32;

    fn provider_name(&self) -> &str;
}
