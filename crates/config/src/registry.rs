//! Provider Registry — the runtime `(category, type) -> {schema, constructor}`
//! map that lets new providers self-register without touching the
//! orchestrator, the config loader, or the session manager.
//!
//! Grounded in the reference implementation's `config/core/registry.py`
//! (`ProviderRegistry.register_config`/`register_service`/`create_service`),
//! adapted from a class-metadata registry to a Rust map of type-erased
//! closures since there is no runtime reflection to hang this off of.

use crate::error::ConfigError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use voice_agent_core::{LanguageModel, SpeechToText, TextToSpeech, VoiceActivityDetector};

/// Provider category. `Vad` here names the pluggable probability model the
/// VAD state machine wraps, not the state machine itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Llm,
    Asr,
    Tts,
    Vad,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Llm => "llm",
            Category::Asr => "asr",
            Category::Tts => "tts",
            Category::Vad => "vad",
        }
    }
}

/// A constructed provider, type-erased at the category boundary. The
/// orchestrator/session manager downcast to the trait they need via the
/// `into_*` helpers.
pub enum ProviderHandle {
    Llm(Arc<dyn LanguageModel>),
    Asr(Arc<dyn SpeechToText>),
    Tts(Arc<dyn TextToSpeech>),
    Vad(Arc<dyn VoiceActivityDetector>),
}

impl ProviderHandle {
    pub fn into_llm(self) -> Option<Arc<dyn LanguageModel>> {
        match self {
            ProviderHandle::Llm(p) => Some(p),
            _ => None,
        }
    }
    pub fn into_asr(self) -> Option<Arc<dyn SpeechToText>> {
        match self {
            ProviderHandle::Asr(p) => Some(p),
            _ => None,
        }
    }
    pub fn into_tts(self) -> Option<Arc<dyn TextToSpeech>> {
        match self {
            ProviderHandle::Tts(p) => Some(p),
            _ => None,
        }
    }
    pub fn into_vad(self) -> Option<Arc<dyn VoiceActivityDetector>> {
        match self {
            ProviderHandle::Vad(p) => Some(p),
            _ => None,
        }
    }
}

type Constructor = Arc<
    dyn Fn(&serde_yaml::Value, Option<&str>) -> Result<ProviderHandle, ConfigError> + Send + Sync,
>;

struct ProviderEntry {
    constructor: Constructor,
}

/// Read-mostly after process init; registration is not required to be
/// thread-safe in principle (it happens once, before any session starts),
/// but an `RwLock` costs nothing and avoids a footgun if a future caller
/// registers providers lazily.
#[derive(Default)]
pub struct ProviderRegistry {
    entries: RwLock<HashMap<(Category, String), ProviderEntry>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider's constructor under `(category, provider_type)`.
    /// `constructor` receives the fragment's settings (everything but the
    /// `type` discriminator) and an optional system prompt.
    pub fn register(
        &self,
        category: Category,
        provider_type: impl Into<String>,
        constructor: impl Fn(&serde_yaml::Value, Option<&str>) -> Result<ProviderHandle, ConfigError>
            + Send
            + Sync
            + 'static,
    ) {
        let provider_type = provider_type.into();
        tracing::debug!(category = category.as_str(), provider_type = %provider_type, "registering provider");
        self.entries.write().insert(
            (category, provider_type),
            ProviderEntry {
                constructor: Arc::new(constructor),
            },
        );
    }

    pub fn list_providers(&self, category: Category) -> Vec<String> {
        self.entries
            .read()
            .keys()
            .filter(|(c, _)| *c == category)
            .map(|(_, t)| t.clone())
            .collect()
    }

    /// Builds a service instance from a validated fragment. Rejects an
    /// unknown `(category, type)` pair outright.
    pub fn create_service(
        &self,
        category: Category,
        provider_type: &str,
        settings: &serde_yaml::Value,
        system_prompt: Option<&str>,
    ) -> Result<ProviderHandle, ConfigError> {
        let entries = self.entries.read();
        let entry = entries
            .get(&(category, provider_type.to_string()))
            .ok_or_else(|| ConfigError::UnknownDiscriminator {
                category: category.as_str().to_string(),
                provider_type: provider_type.to_string(),
            })?;
        (entry.constructor)(settings, system_prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_type_is_rejected() {
        let registry = ProviderRegistry::new();
        let err = registry
            .create_service(Category::Llm, "nonexistent", &serde_yaml::Value::Null, None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDiscriminator { .. }));
    }
}
