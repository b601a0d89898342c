//! Typed shape of the main configuration file. Per-provider fragments stay
//! as [`serde_yaml::Value`] rather than a compile-time enum of every known
//! provider, since [`crate::registry::ProviderRegistry`] is the thing that
//! actually knows which `type` discriminators exist.

use serde::{Deserialize, Serialize};

/// Names the fragment file under `services/{asr,tts,agent,vad}/` to load for
/// each pluggable service. `agent` is the LLM slot; it is the one service
/// every turn needs, so it is not optional.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceNames {
    pub asr: Option<String>,
    pub tts: Option<String>,
    pub agent: String,
    pub vad: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8765
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debug: false,
            log_level: default_log_level(),
        }
    }
}

/// One resolved provider fragment: the `type` discriminator plus whatever
/// settings the provider itself expects, kept untyped until the registry
/// validates it against the provider's declared schema.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceFragment {
    #[serde(rename = "type")]
    pub provider_type: String,
    #[serde(flatten)]
    pub settings: serde_yaml::Value,
}

impl ServiceFragment {
    pub fn settings_value(&self) -> &serde_yaml::Value {
        &self.settings
    }
}

/// The fully loaded, interpolated, and validated application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub persona: String,
    pub services: ServiceNamesResolved,
    #[serde(default)]
    pub system: SystemConfig,
}

/// `services` after fragment grafting: each name in [`ServiceNames`] has
/// been replaced by the parsed fragment it pointed to.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceNamesResolved {
    pub asr: Option<ServiceFragment>,
    pub tts: Option<ServiceFragment>,
    pub agent: ServiceFragment,
    pub vad: Option<ServiceFragment>,
}

/// Raw shape of the main YAML file before fragment grafting: `services` is
/// still just names, not parsed fragments.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawAppConfig {
    pub persona: String,
    pub services: ServiceNames,
    #[serde(default)]
    pub system: SystemConfig,
}

/// Environment variable overrides applied after typed deserialization
/// (§4.2 step 5). Each is optional; absent ones leave the loaded value
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct HardOverrides {
    pub llm_api_key: Option<String>,
    pub asr_api_key: Option<String>,
    pub tts_api_key: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl HardOverrides {
    pub fn from_env() -> Self {
        Self {
            llm_api_key: std::env::var("LLM_API_KEY").ok(),
            asr_api_key: std::env::var("ASR_API_KEY").ok(),
            tts_api_key: std::env::var("TTS_API_KEY").ok(),
            host: std::env::var("ANIMA_HOST").ok(),
            port: std::env::var("ANIMA_PORT").ok().and_then(|p| p.parse().ok()),
        }
    }
}

/// Key used to store an API key inside a fragment's settings map when a
/// hard override applies. Providers that expect an API key read it under
/// this field name.
pub const API_KEY_FIELD: &str = "api_key";

pub(crate) fn set_setting(fragment: &mut ServiceFragment, key: &str, value: String) {
    if let serde_yaml::Value::Mapping(map) = &mut fragment.settings {
        map.insert(
            serde_yaml::Value::String(key.to_string()),
            serde_yaml::Value::String(value),
        );
    } else {
        let mut map = serde_yaml::Mapping::new();
        map.insert(
            serde_yaml::Value::String(key.to_string()),
            serde_yaml::Value::String(value),
        );
        fragment.settings = serde_yaml::Value::Mapping(map);
    }
}

/// Declared schema for a provider: the field names and types a fragment's
/// settings must contain, used by the registry to reject a type mismatch
/// (§4.1, "reject a config whose static type does not match the provider's
/// declared schema").
#[derive(Debug, Clone)]
pub struct ProviderSchema {
    pub required_fields: Vec<&'static str>,
}

impl ProviderSchema {
    pub fn new(required_fields: Vec<&'static str>) -> Self {
        Self { required_fields }
    }

    pub fn validate(&self, fragment: &ServiceFragment) -> Result<(), Vec<String>> {
        let mut missing = Vec::new();
        let map = match &fragment.settings {
            serde_yaml::Value::Mapping(m) => Some(m),
            _ => None,
        };
        for field in &self.required_fields {
            let present = map
                .map(|m| m.contains_key(&serde_yaml::Value::String(field.to_string())))
                .unwrap_or(false);
            if !present {
                missing.push(field.to_string());
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }
}
