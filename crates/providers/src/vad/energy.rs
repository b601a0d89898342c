//! Energy-based speech probability estimate. No model dependency, so this
//! is always available and is what the `onnx` feature falls back to when a
//! model path isn't configured.

use async_trait::async_trait;
use voice_agent_core::{rms_db, VoiceActivityDetector};

#[derive(Debug, Clone)]
pub struct EnergyVadConfig {
    pub floor_db: f32,
    pub ceil_db: f32,
}

impl Default for EnergyVadConfig {
    fn default() -> Self {
        Self {
            floor_db: -50.0,
            ceil_db: -20.0,
        }
    }
}

pub struct EnergyVad {
    config: EnergyVadConfig,
}

impl EnergyVad {
    pub fn new(config: EnergyVadConfig) -> Self {
        Self { config }
    }
}

impl Default for EnergyVad {
    fn default() -> Self {
        Self::new(EnergyVadConfig::default())
    }
}

#[async_trait]
impl VoiceActivityDetector for EnergyVad {
    async fn speech_probability(&self, window: &[f32]) -> f32 {
        let db = rms_db(window);
        if !db.is_finite() || db <= self.config.floor_db {
            return 0.0;
        }
        if db >= self.config.ceil_db {
            return 1.0;
        }
        ((db - self.config.floor_db) / (self.config.ceil_db - self.config.floor_db)).clamp(0.0, 1.0)
    }

    fn provider_name(&self) -> &str {
        "energy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn silence_yields_zero_probability() {
        let vad = EnergyVad::default();
        assert_eq!(vad.speech_probability(&[0.0; 512]).await, 0.0);
    }

    #[tokio::test]
    async fn loud_tone_yields_high_probability() {
        let vad = EnergyVad::default();
        let loud: Vec<f32> = (0..512).map(|i| (i as f32 * 0.3).sin() * 0.9).collect();
        assert!(vad.speech_probability(&loud).await > 0.8);
    }
}
