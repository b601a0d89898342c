//! Emotion tag and timeline segment types.
//!
//! Extraction and timeline-calculation *logic* live in `voice-agent-pipeline`
//! (they need the pipeline's step/strategy machinery); this module only
//! holds the data both that crate and the orchestrator pass around.

use serde::{Deserialize, Serialize};

/// An `[emotion]` marker found in agent text, with its character offset in
/// the *original* (un-cleaned) text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionTag {
    pub emotion: String,
    pub position: usize,
}

/// One span of an emotion timeline, in seconds from turn-audio start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSegment {
    pub emotion: String,
    pub start_time: f64,
    pub end_time: f64,
    pub intensity: f32,
}

impl TimelineSegment {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}
