//! Energy-based silence splitting.
//!
//! The network fallback backend can't transcribe arbitrarily long audio in one
//! request, so it splits the track into speech chunks at silent points and
//! derives each chunk's timestamps from its sample offset. The thresholds
//! mirror the tool's documented behavior: a pause of at least 500 ms below
//! (overall level − 14 dB) splits, and 500 ms of surrounding silence is kept
//! so words aren't clipped at chunk edges.

/// A run of speech extracted from a longer sample buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechChunk {
    /// Offset of the first sample of this chunk within the source buffer.
    pub start_sample: usize,

    /// Samples belonging to this chunk (including kept silence padding).
    pub samples: Vec<f32>,
}

impl SpeechChunk {
    /// Start time of this chunk in seconds at the given sample rate.
    pub fn start_seconds(&self, sample_rate: u32) -> f32 {
        self.start_sample as f32 / sample_rate as f32
    }

    /// End time of this chunk in seconds at the given sample rate.
    pub fn end_seconds(&self, sample_rate: u32) -> f32 {
        (self.start_sample + self.samples.len()) as f32 / sample_rate as f32
    }
}

/// Tunables for [`split_on_silence`].
#[derive(Debug, Clone, Copy)]
pub struct SplitOpts {
    /// Minimum length of a silent run that causes a split (ms).
    pub min_silence_ms: usize,

    /// How far below the overall level a frame must fall to count as silent (dB).
    pub silence_offset_db: f32,

    /// Silence retained on both sides of each chunk (ms).
    pub keep_silence_ms: usize,
}

impl Default for SplitOpts {
    fn default() -> Self {
        Self {
            min_silence_ms: 500,
            silence_offset_db: 14.0,
            keep_silence_ms: 500,
        }
    }
}

/// Analysis frame length (ms). 10 ms gives 160-sample frames at 16 kHz.
const FRAME_MS: usize = 10;

/// Split `samples` into speech chunks separated by silence.
///
/// Returns an empty vec when the buffer contains no frames above the silence
/// threshold (i.e. the input is effectively silent).
pub fn split_on_silence(samples: &[f32], sample_rate: u32, opts: SplitOpts) -> Vec<SpeechChunk> {
    let frame_len = (sample_rate as usize * FRAME_MS) / 1000;
    if frame_len == 0 || samples.len() < frame_len {
        return Vec::new();
    }

    let overall = dbfs(samples);
    if !overall.is_finite() {
        // Digital silence: nothing to split.
        return Vec::new();
    }
    let threshold = overall - opts.silence_offset_db;

    // Classify each frame, then walk the frame sequence collecting speech runs
    // separated by silent runs of at least `min_silence_ms`.
    let silent: Vec<bool> = samples
        .chunks(frame_len)
        .map(|frame| dbfs(frame) < threshold)
        .collect();

    let min_silence_frames = opts.min_silence_ms.div_ceil(FRAME_MS).max(1);
    let mut ranges: Vec<(usize, usize)> = Vec::new(); // sample ranges, speech only
    let mut run_start: Option<usize> = None;
    let mut silence_run = 0usize;

    for (i, &is_silent) in silent.iter().enumerate() {
        if is_silent {
            silence_run += 1;
            if silence_run == min_silence_frames {
                // A long enough pause closes the current speech run.
                if let Some(start) = run_start.take() {
                    let end_frame = i + 1 - silence_run;
                    ranges.push((start * frame_len, end_frame * frame_len));
                }
            }
        } else {
            silence_run = 0;
            if run_start.is_none() {
                run_start = Some(i);
            }
        }
    }

    if let Some(start) = run_start {
        let trailing = silence_run.min(silent.len() - start);
        let end_frame = silent.len() - trailing;
        ranges.push((start * frame_len, end_frame * frame_len));
    }

    // Pad each range with kept silence, clamp to the buffer, and merge any
    // ranges the padding caused to overlap.
    let keep = (sample_rate as usize * opts.keep_silence_ms) / 1000;
    let mut padded: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        let start = start.saturating_sub(keep);
        let end = (end + keep).min(samples.len());
        if let Some((_, prev_end)) = padded.last_mut() {
            if start <= *prev_end {
                *prev_end = (*prev_end).max(end);
                continue;
            }
        }
        padded.push((start, end));
    }

    padded
        .into_iter()
        .map(|(start, end)| SpeechChunk {
            start_sample: start,
            samples: samples[start..end].to_vec(),
        })
        .collect()
}

/// RMS level of a sample buffer in dBFS (full scale = 1.0).
///
/// Returns `-inf` for empty or all-zero input.
pub fn dbfs(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return f32::NEG_INFINITY;
    }

    let sum_sq: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    let rms = (sum_sq / samples.len() as f64).sqrt();
    if rms <= 0.0 {
        return f32::NEG_INFINITY;
    }

    (20.0 * rms.log10()) as f32
}
