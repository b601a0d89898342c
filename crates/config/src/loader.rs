//! Config Loader — reads the main YAML file, grafts per-service fragments
//! under it, interpolates environment variables, and applies the hard
//! overrides the runtime always honors.

use crate::error::ConfigError;
use crate::persona::PersonaConfig;
use crate::schema::{
    set_setting, AppConfig, HardOverrides, RawAppConfig, ServiceFragment, ServiceNamesResolved,
    API_KEY_FIELD,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static ENV_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)").unwrap());

/// Resolves the main config path per §6: CLI argument > `ANIMA_CONFIG` env
/// var > `config/config.yaml` default.
pub fn resolve_main_path(cli_arg: Option<&str>) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }
    if let Ok(path) = std::env::var("ANIMA_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/config.yaml")
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads and fully resolves the application config rooted at `main_path`.
    /// Fragment files are looked up relative to `main_path`'s parent
    /// directory, as `services/{category}/{name}.yaml`.
    pub fn load(main_path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
        let main_path = main_path.as_ref();
        let base_dir = main_path.parent().unwrap_or_else(|| Path::new("."));

        let raw_text = std::fs::read_to_string(main_path)
            .map_err(|_| ConfigError::FileNotFound(main_path.display().to_string()))?;
        let mut raw_value: serde_yaml::Value =
            serde_yaml::from_str(&raw_text).map_err(|e| ConfigError::ParseError {
                path: main_path.display().to_string(),
                message: e.to_string(),
            })?;
        interpolate_env(&mut raw_value);

        let raw: RawAppConfig =
            serde_yaml::from_value(raw_value).map_err(|e| ConfigError::ParseError {
                path: main_path.display().to_string(),
                message: e.to_string(),
            })?;

        let asr = raw
            .services
            .asr
            .as_deref()
            .map(|name| load_fragment(base_dir, "asr", name))
            .transpose()?;
        let tts = raw
            .services
            .tts
            .as_deref()
            .map(|name| load_fragment(base_dir, "tts", name))
            .transpose()?;
        let vad = raw
            .services
            .vad
            .as_deref()
            .map(|name| load_fragment(base_dir, "vad", name))
            .transpose()?;
        let agent = load_fragment(base_dir, "agent", &raw.services.agent)?;

        let mut config = AppConfig {
            persona: raw.persona,
            services: ServiceNamesResolved {
                asr,
                tts,
                agent,
                vad,
            },
            system: raw.system,
        };

        apply_hard_overrides(&mut config, &HardOverrides::from_env());
        Ok(config)
    }

    /// Loads the persona YAML at `config/personas/{persona}.yaml` (relative
    /// to `main_path`'s parent) as a raw value; the system-prompt builder
    /// interprets its fields.
    pub fn load_persona(
        main_path: impl AsRef<Path>,
        persona: &str,
    ) -> Result<serde_yaml::Value, ConfigError> {
        let base_dir = main_path
            .as_ref()
            .parent()
            .unwrap_or_else(|| Path::new("."));
        let path = base_dir.join("personas").join(format!("{persona}.yaml"));
        let text = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        let mut value: serde_yaml::Value =
            serde_yaml::from_str(&text).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        interpolate_env(&mut value);
        Ok(value)
    }

    /// Like [`Self::load_persona`] but parses the result into a typed
    /// [`PersonaConfig`] for the system-prompt builder.
    pub fn load_persona_config(main_path: impl AsRef<Path>, persona: &str) -> Result<PersonaConfig, ConfigError> {
        let value = Self::load_persona(&main_path, persona)?;
        serde_yaml::from_value(value).map_err(|e| ConfigError::ParseError {
            path: format!("personas/{persona}.yaml"),
            message: e.to_string(),
        })
    }
}

fn load_fragment(base_dir: &Path, category: &str, name: &str) -> Result<ServiceFragment, ConfigError> {
    let path = base_dir.join("services").join(category).join(format!("{name}.yaml"));
    let text = std::fs::read_to_string(&path)
        .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
    let mut value: serde_yaml::Value =
        serde_yaml::from_str(&text).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    interpolate_env(&mut value);

    let fragment: ServiceFragment =
        serde_yaml::from_value(value).map_err(|_| ConfigError::MissingField(format!(
            "services.{category}.{name}: type"
        )))?;
    if fragment.provider_type.is_empty() {
        return Err(ConfigError::MissingField(format!(
            "services.{category}.{name}.type"
        )));
    }
    Ok(fragment)
}

/// Recursively substitutes `${NAME}` and `$NAME` tokens in every string leaf
/// with the named environment variable's value. A missing variable becomes
/// an empty string, logged at debug rather than failing the load.
pub fn interpolate_env(value: &mut serde_yaml::Value) {
    match value {
        serde_yaml::Value::String(s) => {
            if ENV_TOKEN.is_match(s) {
                let replaced = ENV_TOKEN
                    .replace_all(s, |caps: &regex::Captures| {
                        let name = caps.get(1).or_else(|| caps.get(2)).unwrap().as_str();
                        std::env::var(name).unwrap_or_else(|_| {
                            tracing::debug!(var = name, "environment variable not set, substituting empty string");
                            String::new()
                        })
                    })
                    .into_owned();
                *s = replaced;
            }
        }
        serde_yaml::Value::Sequence(seq) => {
            for item in seq {
                interpolate_env(item);
            }
        }
        serde_yaml::Value::Mapping(map) => {
            for (_, v) in map.iter_mut() {
                interpolate_env(v);
            }
        }
        _ => {}
    }
}

fn apply_hard_overrides(config: &mut AppConfig, overrides: &HardOverrides) {
    if let Some(key) = &overrides.llm_api_key {
        set_setting(&mut config.services.agent, API_KEY_FIELD, key.clone());
    }
    if let (Some(asr), Some(key)) = (config.services.asr.as_mut(), overrides.asr_api_key.as_ref()) {
        set_setting(asr, API_KEY_FIELD, key.clone());
    }
    if let (Some(tts), Some(key)) = (config.services.tts.as_mut(), overrides.tts_api_key.as_ref()) {
        set_setting(tts, API_KEY_FIELD, key.clone());
    }
    if let Some(host) = &overrides.host {
        config.system.host = host.clone();
    }
    if let Some(port) = overrides.port {
        config.system.port = port;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut f = std::fs::File::create(path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn interpolates_braced_and_bare_env_tokens() {
        std::env::set_var("VOICE_AGENT_TEST_TOKEN", "shhh");
        let mut value: serde_yaml::Value =
            serde_yaml::from_str("a: \"${VOICE_AGENT_TEST_TOKEN}\"\nb: \"$VOICE_AGENT_TEST_TOKEN\"").unwrap();
        interpolate_env(&mut value);
        assert_eq!(value["a"].as_str().unwrap(), "shhh");
        assert_eq!(value["b"].as_str().unwrap(), "shhh");
    }

    #[test]
    fn missing_env_var_becomes_empty_string() {
        std::env::remove_var("VOICE_AGENT_DOES_NOT_EXIST");
        let mut value: serde_yaml::Value =
            serde_yaml::from_str("a: \"${VOICE_AGENT_DOES_NOT_EXIST}\"").unwrap();
        interpolate_env(&mut value);
        assert_eq!(value["a"].as_str().unwrap(), "");
    }

    #[test]
    fn load_grafts_fragments_and_validates_discriminator() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "config.yaml",
            "persona: aria\nservices: { agent: default, vad: default }\nsystem: { port: 9000 }\n",
        );
        write_file(
            dir.path(),
            "services/agent/default.yaml",
            "type: mock\nmodel: test-model\n",
        );
        write_file(dir.path(), "services/vad/default.yaml", "type: mock\n");

        let config = ConfigLoader::load(dir.path().join("config.yaml")).unwrap();
        assert_eq!(config.persona, "aria");
        assert_eq!(config.services.agent.provider_type, "mock");
        assert_eq!(config.system.port, 9000);
        assert!(config.services.vad.is_some());
        assert!(config.services.asr.is_none());
    }

    #[test]
    fn missing_main_file_is_fatal() {
        let err = ConfigLoader::load("/nonexistent/path/config.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn missing_fragment_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "config.yaml",
            "persona: aria\nservices: { agent: missing }\nsystem: {}\n",
        );
        let err = ConfigLoader::load(dir.path().join("config.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
