//! Wires this crate's concrete providers into a `ProviderRegistry`. Called
//! once from the server binary's `main`.

use crate::asr::{HttpAsrConfig, HttpSpeechToText, MockSpeechToText};
use crate::llm::{HttpLanguageModel, HttpLlmConfig, MockLanguageModel};
use crate::tts::{HttpTextToSpeech, HttpTtsConfig, MockTextToSpeech};
use crate::vad::EnergyVad;
use std::sync::Arc;
use voice_agent_config::{Category, ConfigError, ProviderHandle, ProviderRegistry};

pub fn register_builtin_providers(registry: &ProviderRegistry) {
    registry.register(Category::Llm, "mock", |_settings, _system_prompt| {
        Ok(ProviderHandle::Llm(Arc::new(MockLanguageModel::default())))
    });
    registry.register(Category::Llm, "http", |settings, system_prompt| {
        let config: HttpLlmConfig = serde_yaml::from_value(settings.clone())
            .map_err(|e| ConfigError::ParseError { path: "services.agent".into(), message: e.to_string() })?;
        let model = HttpLanguageModel::new(config, system_prompt.map(str::to_string))
            .map_err(|e| ConfigError::ProviderConstruction(e.to_string()))?;
        Ok(ProviderHandle::Llm(Arc::new(model)))
    });

    registry.register(Category::Asr, "mock", |_settings, _system_prompt| {
        Ok(ProviderHandle::Asr(Arc::new(MockSpeechToText::default())))
    });
    registry.register(Category::Asr, "http", |settings, _system_prompt| {
        let config: HttpAsrConfig = serde_yaml::from_value(settings.clone())
            .map_err(|e| ConfigError::ParseError { path: "services.asr".into(), message: e.to_string() })?;
        let asr = HttpSpeechToText::new(config)
            .map_err(|e| ConfigError::ProviderConstruction(e.to_string()))?;
        Ok(ProviderHandle::Asr(Arc::new(asr)))
    });

    registry.register(Category::Tts, "mock", |_settings, _system_prompt| {
        Ok(ProviderHandle::Tts(Arc::new(MockTextToSpeech)))
    });
    registry.register(Category::Tts, "http", |settings, _system_prompt| {
        let config: HttpTtsConfig = serde_yaml::from_value(settings.clone())
            .map_err(|e| ConfigError::ParseError { path: "services.tts".into(), message: e.to_string() })?;
        let tts = HttpTextToSpeech::new(config)
            .map_err(|e| ConfigError::ProviderConstruction(e.to_string()))?;
        Ok(ProviderHandle::Tts(Arc::new(tts)))
    });

    registry.register(Category::Vad, "energy", |_settings, _system_prompt| {
        Ok(ProviderHandle::Vad(Arc::new(EnergyVad::default())))
    });
    register_onnx_vad(registry);
}

#[cfg(feature = "onnx")]
fn register_onnx_vad(registry: &ProviderRegistry) {
    use crate::vad::SileroOnnxVad;

    #[derive(serde::Deserialize)]
    struct OnnxVadSettings {
        model_path: String,
        #[serde(default = "default_sample_rate")]
        sample_rate: u32,
    }
    fn default_sample_rate() -> u32 {
        16_000
    }

    registry.register(Category::Vad, "onnx", |settings, _system_prompt| {
        let parsed: OnnxVadSettings = serde_yaml::from_value(settings.clone())
            .map_err(|e| ConfigError::ParseError { path: "services.vad".into(), message: e.to_string() })?;
        let vad = SileroOnnxVad::load(&parsed.model_path, parsed.sample_rate)
            .map_err(|e| ConfigError::ProviderConstruction(e.to_string()))?;
        Ok(ProviderHandle::Vad(Arc::new(vad)))
    });
}

#[cfg(not(feature = "onnx"))]
fn register_onnx_vad(_registry: &ProviderRegistry) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_llm_constructs_without_settings() {
        let registry = ProviderRegistry::new();
        register_builtin_providers(&registry);
        let handle = registry
            .create_service(Category::Llm, "mock", &serde_yaml::Value::Null, None)
            .unwrap();
        assert!(handle.into_llm().is_some());
    }

    #[test]
    fn unregistered_vad_provider_is_rejected() {
        let registry = ProviderRegistry::new();
        register_builtin_providers(&registry);
        let err = registry
            .create_service(Category::Vad, "whisper-vad", &serde_yaml::Value::Null, None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDiscriminator { .. }));
    }
}
