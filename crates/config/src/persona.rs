//! Persona configuration and system-prompt assembly. Grounded in the
//! reference implementation's `config/persona.py` `PersonaConfig.build_
//! system_prompt`: a fixed section order, each section only appended when
//! its backing field is non-empty.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PersonalityTraits {
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub catchphrases: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BehaviorRules {
    #[serde(default)]
    pub forbidden_phrases: Vec<String>,
    pub response_to_praise: Option<String>,
    pub response_to_criticism: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DialogueExample {
    pub user: String,
    pub ai: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PersonaConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_identity")]
    pub identity: String,
    #[serde(default)]
    pub personality: PersonalityTraits,
    #[serde(default)]
    pub behavior: BehaviorRules,
    #[serde(default)]
    pub speaking_style: String,
    #[serde(default)]
    pub examples: Vec<DialogueExample>,
    #[serde(default)]
    pub emoji_style: String,
    #[serde(default)]
    pub common_emojis: Vec<String>,
    #[serde(default)]
    pub slang_words: Vec<String>,
    pub live2d_prompt: Option<String>,
}

fn default_name() -> String {
    "Anima".to_string()
}
fn default_role() -> String {
    "AI assistant".to_string()
}
fn default_identity() -> String {
    "You are a friendly AI assistant.".to_string()
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            role: default_role(),
            identity: default_identity(),
            personality: PersonalityTraits::default(),
            behavior: BehaviorRules::default(),
            speaking_style: String::new(),
            examples: Vec::new(),
            emoji_style: String::new(),
            common_emojis: Vec::new(),
            slang_words: Vec::new(),
            live2d_prompt: None,
        }
    }
}

impl PersonaConfig {
    /// Assembles the full system prompt. `live2d_prompt_override`, when
    /// given, takes precedence over the persona's own `live2d_prompt` field.
    pub fn build_system_prompt(&self, live2d_prompt_override: Option<&str>) -> String {
        let mut parts: Vec<String> = Vec::new();

        parts.push(format!("# Role: {}", self.role));
        parts.push(format!("\n## Identity\n{}", self.identity));

        if !self.personality.traits.is_empty() {
            parts.push("\n## Personality Traits".to_string());
            for (i, trait_) in self.personality.traits.iter().enumerate() {
                parts.push(format!("{}. {trait_}", i + 1));
            }
        }

        if !self.speaking_style.is_empty() {
            parts.push(format!("\n## Speaking Style\n{}", self.speaking_style));
        }

        if !self.behavior.forbidden_phrases.is_empty() || self.behavior.response_to_praise.is_some() {
            parts.push("\n## Behavior Rules".to_string());
            if !self.behavior.forbidden_phrases.is_empty() {
                let forbidden = self.behavior.forbidden_phrases.iter().map(|p| format!("\"{p}\"")).collect::<Vec<_>>().join(", ");
                parts.push(format!("- Never say: {forbidden}"));
            }
            if let Some(praise) = &self.behavior.response_to_praise {
                parts.push(format!("- When praised: {praise}"));
            }
            if let Some(criticism) = &self.behavior.response_to_criticism {
                parts.push(format!("- When criticized: {criticism}"));
            }
        }

        if !self.emoji_style.is_empty() || !self.common_emojis.is_empty() {
            parts.push("\n## Emoji Usage".to_string());
            if !self.emoji_style.is_empty() {
                parts.push(self.emoji_style.clone());
            }
            if !self.common_emojis.is_empty() {
                parts.push(format!("Common: {}", self.common_emojis.join(" ")));
            }
        }

        if !self.slang_words.is_empty() {
            parts.push(format!("\n## Slang\n{}", self.slang_words.join(", ")));
        }

        if let Some(live2d) = live2d_prompt_override.or(self.live2d_prompt.as_deref()) {
            parts.push(format!("\n{live2d}"));
        }

        if !self.examples.is_empty() {
            parts.push("\n## Examples".to_string());
            for example in self.examples.iter().take(5) {
                if !example.user.is_empty() && !example.ai.is_empty() {
                    parts.push(format!("\nUser: {}\nAI: {}", example.user, example.ai));
                }
            }
        }

        parts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_persona_produces_a_minimal_prompt() {
        let persona = PersonaConfig::default();
        let prompt = persona.build_system_prompt(None);
        assert!(prompt.contains("# Role: AI assistant"));
        assert!(prompt.contains("You are a friendly AI assistant."));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let persona = PersonaConfig::default();
        let prompt = persona.build_system_prompt(None);
        assert!(!prompt.contains("## Personality Traits"));
        assert!(!prompt.contains("## Behavior Rules"));
        assert!(!prompt.contains("## Examples"));
    }

    #[test]
    fn populated_sections_appear_in_fixed_order() {
        let mut persona = PersonaConfig::default();
        persona.personality.traits = vec!["confident".into(), "witty".into()];
        persona.speaking_style = "short and punchy".into();
        persona.examples.push(DialogueExample { user: "hi".into(), ai: "hey there".into() });

        let prompt = persona.build_system_prompt(None);
        let traits_pos = prompt.find("## Personality Traits").unwrap();
        let style_pos = prompt.find("## Speaking Style").unwrap();
        let examples_pos = prompt.find("## Examples").unwrap();
        assert!(traits_pos < style_pos);
        assert!(style_pos < examples_pos);
    }

    #[test]
    fn explicit_live2d_override_wins_over_configured_value() {
        let mut persona = PersonaConfig::default();
        persona.live2d_prompt = Some("configured".into());
        let prompt = persona.build_system_prompt(Some("override"));
        assert!(prompt.contains("override"));
        assert!(!prompt.contains("configured"));
    }
}
