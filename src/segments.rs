use anyhow::Context;
use serde::Serialize;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperSegment};

use crate::error::Result;

/// A timed span of caption text.
///
/// Invariant (after [`normalize`]): segments are time-ordered, non-overlapping,
/// and carry non-empty trimmed text.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Segment {
    pub start_seconds: f32,
    pub end_seconds: f32,
    pub text: String,
}

/// Run a full Whisper pass over mono 16 kHz samples and collect segments.
pub fn transcribe_samples(
    ctx: &WhisperContext,
    samples: &[f32],
    language: Option<&str>,
) -> Result<Vec<Segment>> {
    let params = full_params(language);

    let mut state = ctx
        .create_state()
        .context("failed to create whisper state")?;

    state
        .full(params, samples)
        .context("failed to run whisper full()")?;

    let mut segments = Vec::new();
    for whisper_segment in state.as_iter() {
        segments.push(to_segment(whisper_segment)?);
    }

    Ok(segments)
}

fn to_segment(segment: WhisperSegment) -> Result<Segment> {
    // whisper timestamps are ms
    let start_seconds = segment.start_timestamp() as f32 / 1000.0;
    let end_seconds = segment.end_timestamp() as f32 / 1000.0;
    let text = segment
        .to_str()
        .context("failed to get segment text")?
        .trim()
        .to_owned();

    Ok(Segment {
        start_seconds,
        end_seconds,
        text,
    })
}

fn full_params(language: Option<&str>) -> FullParams<'_, 'static> {
    let mut params = FullParams::new(SamplingStrategy::BeamSearch {
        beam_size: 5,
        patience: 1.0,
    });

    params.set_n_threads(num_cpus::get() as i32);
    params.set_translate(false);
    params.set_language(language);
    params.set_no_context(true);
    params.set_single_segment(false);
    params.set_print_progress(false);
    params.set_print_special(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);
    params
}

/// Normalize raw backend output into display-ready caption segments.
///
/// - sorts by start time
/// - drops whitespace-only segments and zero/negative-duration spans
/// - clamps each end time to the next segment's start so cues never overlap
pub fn normalize(mut segments: Vec<Segment>) -> Vec<Segment> {
    segments.retain(|s| !s.text.trim().is_empty() && s.end_seconds > s.start_seconds);
    segments.sort_by(|a, b| {
        a.start_seconds
            .partial_cmp(&b.start_seconds)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for i in 1..segments.len() {
        let next_start = segments[i].start_seconds;
        let prev = &mut segments[i - 1];
        if prev.end_seconds > next_start {
            prev.end_seconds = next_start;
        }
    }

    // Clamping can collapse a fully-contained segment to zero duration.
    segments.retain(|s| s.end_seconds > s.start_seconds);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f32, end: f32, text: &str) -> Segment {
        Segment {
            start_seconds: start,
            end_seconds: end,
            text: text.to_string(),
        }
    }

    #[test]
    fn normalize_sorts_by_start_time() {
        let out = normalize(vec![seg(2.0, 3.0, "b"), seg(0.0, 1.0, "a")]);
        assert_eq!(out[0].text, "a");
        assert_eq!(out[1].text, "b");
    }

    #[test]
    fn normalize_drops_empty_text() {
        let out = normalize(vec![seg(0.0, 1.0, "  "), seg(1.0, 2.0, "kept")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "kept");
    }

    #[test]
    fn normalize_clamps_overlapping_ends() {
        let out = normalize(vec![seg(0.0, 2.5, "a"), seg(2.0, 3.0, "b")]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].end_seconds, 2.0);
        assert_eq!(out[1].start_seconds, 2.0);
    }

    #[test]
    fn normalize_drops_contained_segments_collapsed_by_clamping() {
        // "a" shares its start with "b", so clamping collapses it to zero width.
        let out = normalize(vec![seg(1.0, 1.5, "a"), seg(1.0, 3.0, "b")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "b");
    }

    #[test]
    fn normalize_drops_zero_duration_segments() {
        let out = normalize(vec![seg(1.0, 1.0, "zero"), seg(2.0, 1.0, "backwards")]);
        assert!(out.is_empty());
    }

    #[test]
    fn normalized_output_is_ordered_and_disjoint() {
        let out = normalize(vec![
            seg(5.0, 7.0, "c"),
            seg(0.0, 6.0, "a"),
            seg(4.0, 5.5, "b"),
        ]);

        for pair in out.windows(2) {
            assert!(pair[0].start_seconds <= pair[1].start_seconds);
            assert!(pair[0].end_seconds <= pair[1].start_seconds);
        }
    }

    #[test]
    fn segments_serialize_to_json() -> anyhow::Result<()> {
        let json = serde_json::to_string(&seg(0.0, 1.5, "hello"))?;
        assert!(json.contains("\"text\":\"hello\""));
        assert!(json.contains("start_seconds"));
        Ok(())
    }
}
