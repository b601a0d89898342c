//! Duration and lip-sync volume envelope for synthesized audio. Grounded in
//! `live2d/audio_analyzer.py`.

use voice_agent_core::AudioFrame;

pub const DEFAULT_ENVELOPE_HZ: f64 = 50.0;

pub struct AudioAnalysis {
    pub duration_secs: f64,
    /// Normalized RMS volume per envelope tick, each in `[0, 1]`.
    pub volume_envelope: Vec<f32>,
}

pub fn analyze(audio: &AudioFrame, envelope_hz: f64) -> AudioAnalysis {
    let duration_secs = audio.duration_secs();
    if audio.samples.is_empty() || envelope_hz <= 0.0 {
        return AudioAnalysis { duration_secs, volume_envelope: Vec::new() };
    }

    let window_samples = ((audio.sample_rate as f64 / envelope_hz).round() as usize).max(1);
    let raw: Vec<f32> = audio
        .samples
        .chunks(window_samples)
        .map(|chunk| voice_agent_core::rms_db(chunk))
        .map(|db| if db.is_finite() { (db / 20.0).exp2().min(10.0).max(0.0) } else { 0.0 })
        .collect();

    let peak = raw.iter().cloned().fold(0.0_f32, f32::max);
    let normalized = if peak > 0.0 {
        raw.iter().map(|v| (v / peak).clamp(0.0, 1.0)).collect()
    } else {
        vec![0.0; raw.len()]
    };

    AudioAnalysis { duration_secs, volume_envelope: normalized }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_matches_sample_count_over_sample_rate() {
        let audio = AudioFrame::new(vec![0.1; 16_000], 16_000);
        let analysis = analyze(&audio, DEFAULT_ENVELOPE_HZ);
        assert!((analysis.duration_secs - 1.0).abs() < 1e-9);
    }

    #[test]
    fn envelope_has_one_tick_per_20ms_at_50hz() {
        let audio = AudioFrame::new(vec![0.5; 16_000], 16_000);
        let analysis = analyze(&audio, DEFAULT_ENVELOPE_HZ);
        assert_eq!(analysis.volume_envelope.len(), 50);
    }

    #[test]
    fn envelope_values_are_normalized_into_unit_range() {
        let mut samples = vec![0.01; 8_000];
        samples.extend(vec![0.9; 8_000]);
        let audio = AudioFrame::new(samples, 16_000);
        let analysis = analyze(&audio, DEFAULT_ENVELOPE_HZ);
        assert!(analysis.volume_envelope.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert!(analysis.volume_envelope.iter().cloned().fold(0.0_f32, f32::max) > 0.9);
    }

    #[test]
    fn silent_audio_yields_zero_envelope() {
        let audio = AudioFrame::new(vec![0.0; 16_000], 16_000);
        let analysis = analyze(&audio, DEFAULT_ENVELOPE_HZ);
        assert!(analysis.volume_envelope.iter().all(|&v| v == 0.0));
    }
}
