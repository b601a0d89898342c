//! Shared, read-mostly application state. Grounded in the reference
//! implementation's `AppState`, pruned to what this crate actually wires:
//! a reloadable config, the read-only provider registry, and the session
//! manager. Domain-specific fields the teacher carried (vector store, text
//! processing, translation, audit logging, persistence-layer session store)
//! have no counterpart here and are dropped.

use crate::error::ServerError;
use crate::session::SessionManager;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use voice_agent_config::{AppConfig, Category, ConfigLoader, ProviderRegistry};
use voice_agent_orchestrator::ServiceContext;

pub struct AppState {
    config: RwLock<AppConfig>,
    main_config_path: PathBuf,
    registry: Arc<ProviderRegistry>,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(config: AppConfig, main_config_path: PathBuf, registry: Arc<ProviderRegistry>, sessions: Arc<SessionManager>) -> Self {
        Self {
            config: RwLock::new(config),
            main_config_path,
            registry,
            sessions,
        }
    }

    pub fn config(&self) -> AppConfig {
        self.config.read().clone()
    }

    /// Re-resolves `file` (relative to the main config's directory) and
    /// replaces the live config. Existing sessions keep whatever
    /// `ServiceContext` they were built with; only sessions connecting
    /// afterward see the new config, matching the teacher's "switch_config
    /// affects new sessions" semantics.
    pub fn reload_config(&self, file: &str) -> Result<(), ServerError> {
        let base_dir = self.main_config_path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let new_config = ConfigLoader::load(base_dir.join(file))?;
        *self.config.write() = new_config;
        Ok(())
    }

    /// Builds a fresh `ServiceContext` (LLM + optional ASR/TTS/VAD) from the
    /// current config. Called once per new connection.
    pub fn build_service_context(&self) -> Result<ServiceContext, ServerError> {
        let config = self.config();
        let persona = ConfigLoader::load_persona_config(&self.main_config_path, &config.persona).unwrap_or_default();
        let system_prompt = persona.build_system_prompt(None);

        let llm = self
            .registry
            .create_service(Category::Llm, &config.services.agent.provider_type, config.services.agent.settings_value(), Some(&system_prompt))
            .map_err(|e| ServerError::Provider(e.to_string()))?
            .into_llm()
            .ok_or_else(|| ServerError::Provider("agent provider did not construct a language model".into()))?;

        let mut service = ServiceContext::new(llm);

        if let Some(fragment) = &config.services.asr {
            let handle = self
                .registry
                .create_service(Category::Asr, &fragment.provider_type, fragment.settings_value(), None)
                .map_err(|e| ServerError::Provider(e.to_string()))?;
            if let Some(asr) = handle.into_asr() {
                service = service.with_asr(asr);
            }
        }

        if let Some(fragment) = &config.services.tts {
            let handle = self
                .registry
                .create_service(Category::Tts, &fragment.provider_type, fragment.settings_value(), None)
                .map_err(|e| ServerError::Provider(e.to_string()))?;
            if let Some(tts) = handle.into_tts() {
                service = service.with_tts(tts);
            }
        }

        if let Some(fragment) = &config.services.vad {
            let handle = self
                .registry
                .create_service(Category::Vad, &fragment.provider_type, fragment.settings_value(), None)
                .map_err(|e| ServerError::Provider(e.to_string()))?;
            if let Some(vad) = handle.into_vad() {
                service = service.with_vad(vad);
            }
        }

        Ok(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::NoopHistoryStore;
    use std::io::Write;
    use voice_agent_providers::register_builtin_providers;

    fn write_file(dir: &std::path::Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut f = std::fs::File::create(path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn builds_a_service_context_from_mock_providers() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "config.yaml", "persona: default\nservices: { agent: default }\nsystem: {}\n");
        write_file(dir.path(), "services/agent/default.yaml", "type: mock\n");

        let main_path = dir.path().join("config.yaml");
        let config = ConfigLoader::load(&main_path).unwrap();
        let registry = Arc::new(ProviderRegistry::new());
        register_builtin_providers(&registry);
        let sessions = Arc::new(SessionManager::new(Arc::new(NoopHistoryStore)));

        let state = AppState::new(config, main_path, registry, sessions);
        let service = state.build_service_context().unwrap();
        assert_eq!(service.llm.provider_name(), "mock");
    }
}
