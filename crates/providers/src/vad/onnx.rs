//! Silero VAD v5 via ONNX Runtime. Stateful LSTM inference over fixed-size
//! windows; the caller is responsible for chunking audio into
//! `window_size_samples`-sized slices (the pipeline's VAD state machine
//! does this). Adapted from the non-streaming `SileroVad` adapter this
//! workspace used to ship, trimmed to just the probability model — the
//! IDLE/ACTIVE/INACTIVE hysteresis now lives one layer up.

use async_trait::async_trait;
use ndarray::Array2;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use parking_lot::Mutex;
use std::path::Path;
use voice_agent_core::VoiceActivityDetector;

use crate::error::ProviderError;

struct LstmState {
    h: Array2<f32>,
    c: Array2<f32>,
}

pub struct SileroOnnxVad {
    session: Mutex<Session>,
    state: Mutex<LstmState>,
    sample_rate: i64,
}

impl SileroOnnxVad {
    pub fn load(model_path: impl AsRef<Path>, sample_rate: u32) -> Result<Self, ProviderError> {
        let session = Session::builder()
            .map_err(|e| ProviderError::Model(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ProviderError::Model(e.to_string()))?
            .with_intra_threads(1)
            .map_err(|e| ProviderError::Model(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| ProviderError::Model(e.to_string()))?;

        Ok(Self {
            session: Mutex::new(session),
            state: Mutex::new(LstmState {
                h: Array2::zeros((2, 64)),
                c: Array2::zeros((2, 64)),
            }),
            sample_rate: sample_rate as i64,
        })
    }

    /// Clears LSTM state, e.g. at the start of a new utterance.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.h.fill(0.0);
        state.c.fill(0.0);
    }
}

#[async_trait]
impl VoiceActivityDetector for SileroOnnxVad {
    async fn speech_probability(&self, window: &[f32]) -> f32 {
        let input = match Array2::from_shape_vec((1, window.len()), window.to_vec()) {
            Ok(a) => a,
            Err(_) => return 0.0,
        };
        let sr = ndarray::arr1(&[self.sample_rate]);

        let mut state = self.state.lock();
        let result = (|| -> Result<f32, ProviderError> {
            let input_tensor = Tensor::from_array(input).map_err(|e| ProviderError::Model(e.to_string()))?;
            let sr_tensor = Tensor::from_array(sr).map_err(|e| ProviderError::Model(e.to_string()))?;
            let h_tensor =
                Tensor::from_array(state.h.clone()).map_err(|e| ProviderError::Model(e.to_string()))?;
            let c_tensor =
                Tensor::from_array(state.c.clone()).map_err(|e| ProviderError::Model(e.to_string()))?;

            let mut session = self.session.lock();
            let outputs = session
                .run(ort::inputs![
                    "input" => input_tensor,
                    "sr" => sr_tensor,
                    "h" => h_tensor,
                    "c" => c_tensor,
                ])
                .map_err(|e| ProviderError::Model(e.to_string()))?;

            let (_, speech_data) = outputs
                .get("output")
                .ok_or_else(|| ProviderError::Model("missing output tensor".to_string()))?
                .try_extract_tensor::<f32>()
                .map_err(|e| ProviderError::Model(e.to_string()))?;
            let probability = speech_data.first().copied().unwrap_or(0.0);

            if let Some(hn) = outputs.get("hn") {
                let (shape, data) = hn
                    .try_extract_tensor::<f32>()
                    .map_err(|e| ProviderError::Model(e.to_string()))?;
                let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
                if dims.len() == 2 && data.len() == dims[0] * dims[1] {
                    if let Ok(view) = ndarray::ArrayView2::from_shape((dims[0], dims[1]), data) {
                        state.h.assign(&view);
                    }
                }
            }
            if let Some(cn) = outputs.get("cn") {
                let (shape, data) = cn
                    .try_extract_tensor::<f32>()
                    .map_err(|e| ProviderError::Model(e.to_string()))?;
                let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
                if dims.len() == 2 && data.len() == dims[0] * dims[1] {
                    if let Ok(view) = ndarray::ArrayView2::from_shape((dims[0], dims[1]), data) {
                        state.c.assign(&view);
                    }
                }
            }

            Ok(probability)
        })();

        match result {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "silero inference failed, reporting silence");
                0.0
            }
        }
    }

    fn provider_name(&self) -> &str {
        "onnx"
    }
}
