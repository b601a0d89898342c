//! Grounded in `live2d/emotion_extractor.py`: pulls `[emotion]` markers out
//! of agent text, recording each tag's character offset in the *original*
//! text before the tags are stripped.

use once_cell::sync::Lazy;
use regex::Regex;
use voice_agent_core::EmotionTag;

static EMOTION_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([a-zA-Z_]+)\]").unwrap());

pub struct ExtractionResult {
    pub tags: Vec<EmotionTag>,
    pub cleaned_text: String,
}

/// Finds every `[tag]` occurrence in `text`. If `valid_emotions` is given,
/// tags not in that set are left in place (not extracted, not stripped) —
/// they're presumably not emotion markers at all.
pub fn extract(text: &str, valid_emotions: Option<&[String]>) -> ExtractionResult {
    let mut tags = Vec::new();
    let mut matches_to_remove: Vec<(usize, usize)> = Vec::new();

    for m in EMOTION_TAG.find_iter(text) {
        let emotion = m.as_str()[1..m.as_str().len() - 1].to_string();
        if let Some(valid) = valid_emotions {
            if !valid.iter().any(|v| v.eq_ignore_ascii_case(&emotion)) {
                continue;
            }
        }
        tags.push(EmotionTag { emotion, position: m.start() });
        matches_to_remove.push((m.start(), m.end()));
    }

    let mut cleaned = text.to_string();
    for (start, end) in matches_to_remove.into_iter().rev() {
        cleaned.replace_range(start..end, "");
    }

    ExtractionResult { tags, cleaned_text: cleaned }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_tags_and_strips_them_from_text() {
        let result = extract("[happy] Hello there! [sad] I must go.", None);
        assert_eq!(result.tags.len(), 2);
        assert_eq!(result.tags[0].emotion, "happy");
        assert_eq!(result.tags[1].emotion, "sad");
        assert_eq!(result.cleaned_text, " Hello there!  I must go.");
    }

    #[test]
    fn no_tags_yields_empty_list_and_unchanged_text() {
        let result = extract("Hello there.", None);
        assert!(result.tags.is_empty());
        assert_eq!(result.cleaned_text, "Hello there.");
    }

    #[test]
    fn invalid_emotion_tags_are_left_untouched_when_filtered() {
        let valid = vec!["happy".to_string(), "sad".to_string()];
        let result = extract("[happy] text [unknown_tag] more", Some(&valid));
        assert_eq!(result.tags.len(), 1);
        assert!(result.cleaned_text.contains("[unknown_tag]"));
    }

    #[test]
    fn positions_refer_to_the_original_unmodified_text() {
        let text = "[happy] abc [sad] def";
        let result = extract(text, None);
        for tag in &result.tags {
            assert_eq!(&text[tag.position..tag.position + tag.emotion.len() + 2], format!("[{}]", tag.emotion));
        }
    }
}
