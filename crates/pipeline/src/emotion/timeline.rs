//! Emotion timeline calculation. Grounded in `live2d/emotion_timeline.py`,
//! with the position-based strategy implemented per the simpler equal-share
//! description (see DESIGN.md) rather than the Python reference's
//! position-weighted-midpoint variant.

use std::collections::HashMap;
use voice_agent_core::TimelineSegment;

#[derive(Debug, Clone)]
pub enum TimelineStrategy {
    /// Equal-share split: segment `i` of `N` spans `[i*D/N, (i+1)*D/N]`.
    Position,
    /// Segment length proportional to a per-emotion weight, clamped to
    /// `[min_dur, max_dur]` and renormalized to sum to `D`.
    Duration { weights: HashMap<String, f32>, min_dur: f64, max_dur: f64 },
    /// Segment length weighted by `(1-alpha) + alpha*intensity`; emotions
    /// below `min_intensity` are dropped first.
    Intensity { intensities: HashMap<String, f32>, alpha: f32, min_intensity: f32 },
}

#[derive(Debug, Clone)]
pub struct TimelineConfig {
    pub strategy: TimelineStrategy,
    pub default_emotion: String,
    pub merge_adjacent_same_emotion: bool,
    pub min_segment_duration: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            strategy: TimelineStrategy::Position,
            default_emotion: "neutral".to_string(),
            merge_adjacent_same_emotion: true,
            min_segment_duration: 0.15,
        }
    }
}

/// Builds an ordered, gap-free sequence of `TimelineSegment` spanning
/// `[0, duration]` from the given list of emotion names (in text order).
pub fn build_timeline(emotions: &[String], duration: f64, config: &TimelineConfig) -> Vec<TimelineSegment> {
    if duration <= 0.0 {
        return Vec::new();
    }
    if emotions.is_empty() {
        return vec![TimelineSegment { emotion: config.default_emotion.clone(), start_time: 0.0, end_time: duration, intensity: 1.0 }];
    }

    let raw = match &config.strategy {
        TimelineStrategy::Position => position_based(emotions, duration),
        TimelineStrategy::Duration { weights, min_dur, max_dur } => duration_based(emotions, duration, weights, *min_dur, *max_dur),
        TimelineStrategy::Intensity { intensities, alpha, min_intensity } => {
            intensity_based(emotions, duration, intensities, *alpha, *min_intensity, &config.default_emotion)
        }
    };

    let segments = enforce_monotonic_non_overlap(raw, duration);
    let segments = gap_fill(segments, duration, &config.default_emotion);
    let segments = if config.merge_adjacent_same_emotion { merge_adjacent(segments) } else { segments };
    drop_or_merge_short(segments, config.min_segment_duration)
}

fn position_based(emotions: &[String], duration: f64) -> Vec<TimelineSegment> {
    let n = emotions.len() as f64;
    emotions
        .iter()
        .enumerate()
        .map(|(i, emotion)| TimelineSegment {
            emotion: emotion.clone(),
            start_time: i as f64 * duration / n,
            end_time: (i as f64 + 1.0) * duration / n,
            intensity: 1.0,
        })
        .collect()
}

fn duration_based(emotions: &[String], duration: f64, weights: &HashMap<String, f32>, min_dur: f64, max_dur: f64) -> Vec<TimelineSegment> {
    let raw_weights: Vec<f64> = emotions.iter().map(|e| *weights.get(e).unwrap_or(&1.0) as f64).collect();
    let total_weight: f64 = raw_weights.iter().sum();
    let n = emotions.len() as f64;
    let unclamped: Vec<f64> = if total_weight > 0.0 {
        raw_weights.iter().map(|w| (w / total_weight) * duration).collect()
    } else {
        vec![duration / n; emotions.len()]
    };
    let clamped: Vec<f64> = unclamped.iter().map(|d| d.clamp(min_dur, max_dur)).collect();
    let clamped_total: f64 = clamped.iter().sum();
    let scale = if clamped_total > 0.0 { duration / clamped_total } else { 1.0 };

    let mut cursor = 0.0;
    emotions
        .iter()
        .zip(clamped.iter())
        .map(|(emotion, d)| {
            let start = cursor;
            let end = (cursor + d * scale).min(duration);
            cursor = end;
            TimelineSegment { emotion: emotion.clone(), start_time: start, end_time: end, intensity: 1.0 }
        })
        .collect()
}

fn intensity_based(
    emotions: &[String],
    duration: f64,
    intensities: &HashMap<String, f32>,
    alpha: f32,
    min_intensity: f32,
    default_emotion: &str,
) -> Vec<TimelineSegment> {
    let filtered: Vec<(String, f32)> = emotions
        .iter()
        .map(|e| (e.clone(), *intensities.get(e).unwrap_or(&1.0)))
        .filter(|(_, intensity)| *intensity >= min_intensity)
        .collect();

    if filtered.is_empty() {
        return vec![TimelineSegment { emotion: default_emotion.to_string(), start_time: 0.0, end_time: duration, intensity: 1.0 }];
    }

    let weights: Vec<f64> = filtered.iter().map(|(_, i)| ((1.0 - alpha) + alpha * i) as f64).collect();
    let total: f64 = weights.iter().sum();
    let mut cursor = 0.0;
    filtered
        .iter()
        .zip(weights.iter())
        .map(|((emotion, intensity), w)| {
            let span = if total > 0.0 { (w / total) * duration } else { duration / filtered.len() as f64 };
            let start = cursor;
            let end = (cursor + span).min(duration);
            cursor = end;
            TimelineSegment { emotion: emotion.clone(), start_time: start, end_time: end, intensity: *intensity }
        })
        .collect()
}

fn enforce_monotonic_non_overlap(mut segments: Vec<TimelineSegment>, duration: f64) -> Vec<TimelineSegment> {
    let mut cursor = 0.0;
    for seg in segments.iter_mut() {
        if seg.start_time < cursor {
            seg.start_time = cursor;
        }
        if seg.end_time < seg.start_time {
            seg.end_time = seg.start_time;
        }
        seg.end_time = seg.end_time.min(duration);
        cursor = seg.end_time;
    }
    segments.retain(|s| s.end_time > s.start_time);
    segments
}

fn gap_fill(segments: Vec<TimelineSegment>, duration: f64, default_emotion: &str) -> Vec<TimelineSegment> {
    let mut filled = Vec::with_capacity(segments.len() + 1);
    let mut cursor = 0.0;
    for seg in segments {
        if seg.start_time > cursor {
            filled.push(TimelineSegment { emotion: default_emotion.to_string(), start_time: cursor, end_time: seg.start_time, intensity: 1.0 });
        }
        cursor = seg.end_time;
        filled.push(seg);
    }
    if cursor < duration {
        filled.push(TimelineSegment { emotion: default_emotion.to_string(), start_time: cursor, end_time: duration, intensity: 1.0 });
    }
    filled
}

fn merge_adjacent(segments: Vec<TimelineSegment>) -> Vec<TimelineSegment> {
    let mut merged: Vec<TimelineSegment> = Vec::with_capacity(segments.len());
    for seg in segments {
        if let Some(last) = merged.last_mut() {
            if last.emotion == seg.emotion {
                last.end_time = seg.end_time;
                continue;
            }
        }
        merged.push(seg);
    }
    merged
}

fn drop_or_merge_short(segments: Vec<TimelineSegment>, min_duration: f64) -> Vec<TimelineSegment> {
    if segments.len() <= 1 {
        return segments;
    }
    let mut result: Vec<TimelineSegment> = Vec::with_capacity(segments.len());
    for seg in segments {
        if seg.duration() < min_duration {
            if let Some(last) = result.last_mut() {
                last.end_time = seg.end_time;
                continue;
            }
        }
        result.push(seg);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emotions(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_emotion_list_yields_one_default_segment() {
        let segments = build_timeline(&[], 10.0, &TimelineConfig::default());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].emotion, "neutral");
        assert_eq!(segments[0].start_time, 0.0);
        assert_eq!(segments[0].end_time, 10.0);
    }

    #[test]
    fn position_based_splits_equally_and_covers_full_duration() {
        let segments = build_timeline(&emotions(&["happy", "sad", "angry"]), 9.0, &TimelineConfig::default());
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].start_time, 0.0);
        assert_eq!(segments[0].end_time, 3.0);
        assert_eq!(segments.last().unwrap().end_time, 9.0);
        let total: f64 = segments.iter().map(|s| s.duration()).sum();
        assert!((total - 9.0).abs() < 1e-9);
    }

    #[test]
    fn duration_based_respects_weights_and_sums_to_total() {
        let mut weights = HashMap::new();
        weights.insert("happy".to_string(), 3.0);
        weights.insert("sad".to_string(), 1.0);
        let config = TimelineConfig {
            strategy: TimelineStrategy::Duration { weights, min_dur: 0.0, max_dur: 100.0 },
            ..TimelineConfig::default()
        };
        let segments = build_timeline(&emotions(&["happy", "sad"]), 8.0, &config);
        assert!(segments[0].duration() > segments[1].duration());
        let total: f64 = segments.iter().map(|s| s.duration()).sum();
        assert!((total - 8.0).abs() < 1e-6);
    }

    #[test]
    fn intensity_based_filters_below_min_intensity() {
        let mut intensities = HashMap::new();
        intensities.insert("happy".to_string(), 0.9);
        intensities.insert("bored".to_string(), 0.05);
        let config = TimelineConfig {
            strategy: TimelineStrategy::Intensity { intensities, alpha: 0.5, min_intensity: 0.2 },
            ..TimelineConfig::default()
        };
        let segments = build_timeline(&emotions(&["happy", "bored"]), 5.0, &config);
        assert!(segments.iter().all(|s| s.emotion != "bored"));
    }

    #[test]
    fn adjacent_same_emotion_segments_are_merged() {
        let config = TimelineConfig { merge_adjacent_same_emotion: true, ..TimelineConfig::default() };
        let segments = build_timeline(&emotions(&["happy", "happy", "sad"]), 9.0, &config);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].emotion, "happy");
        assert_eq!(segments[0].start_time, 0.0);
        assert_eq!(segments[0].end_time, 6.0);
    }
}
