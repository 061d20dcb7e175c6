//! High-level API for running the caption pipeline.
//!
//! We expose a single, ergonomic entry point (`Captioner`) that wires up the
//! lower-level extraction, transcription, rendering, and encoding logic.
//!
//! The intent is:
//! - We load the Whisper model once (expensive).
//! - We reuse the backend to caption multiple videos.
//! - Callers choose styling and fallback behavior via `Opts`.
//!
//! The pipeline is strictly sequential: extract audio → transcribe →
//! normalize → render subtitles → burn in with FFmpeg. Each stage finishes
//! before the next begins.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use crate::ass_encoder::AssEncoder;
use crate::audio::WHISPER_SAMPLE_RATE;
use crate::backend::Transcriber;
use crate::backends::{RemoteBackend, WhisperBackend};
use crate::error::{Error, Result};
use crate::extract::decode_audio_track;
use crate::ffmpeg;
use crate::opts::Opts;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::{Segment, normalize};
use crate::srt_encoder::SrtEncoder;

/// Summary of a completed captioning run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Number of caption segments burned into the output.
    pub segments: usize,

    /// Duration of the extracted audio track, in seconds.
    pub audio_seconds: f32,

    /// Which backend produced the captions ("whisper" or "remote").
    pub backend: &'static str,
}

/// The main high-level captioning entry point.
///
/// `Captioner` owns the long-lived transcription backend. Typical usage:
/// - Construct once (model loading happens here).
/// - Call `caption` for each input/output pair.
pub struct Captioner<B: Transcriber = WhisperBackend> {
    backend: B,
}

impl Captioner<WhisperBackend> {
    /// Create a new `Captioner` using the built-in Whisper backend.
    pub fn new(model_path: &Path) -> Result<Self> {
        Ok(Self::with_backend(WhisperBackend::new(model_path)?))
    }
}

impl<B: Transcriber> Captioner<B> {
    /// Create a new `Captioner` using a custom primary backend.
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// Access the configured backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run the full pipeline for one video.
    ///
    /// Stages:
    /// 1. Verify FFmpeg is available (fail fast, before model inference).
    /// 2. Decode the input's audio track to mono 16 kHz.
    /// 3. Transcribe; on primary failure, try the configured fallback once.
    /// 4. Normalize segments; zero usable segments is [`Error::NoSpeech`].
    /// 5. Render a styled ASS file (plus the optional sidecar SRT).
    /// 6. Burn the subtitles into an H.264 + AAC MP4.
    pub fn caption(&mut self, input: &Path, output: &Path, opts: &Opts) -> Result<Report> {
        ffmpeg::ensure_available()?;

        let samples = decode_audio_track(input)?;
        let audio_seconds = samples.len() as f32 / WHISPER_SAMPLE_RATE as f32;
        info!(audio_seconds, "extracted audio track");

        let (raw_segments, backend_name) = transcribe_with_fallback(
            &mut self.backend,
            &samples,
            opts,
        )?;

        let segments = normalize(raw_segments);
        if segments.is_empty() {
            return Err(Error::NoSpeech);
        }
        info!(segments = segments.len(), backend = backend_name, "transcription complete");

        let (frame_width, frame_height) = ffmpeg::probe_dimensions(input)?;

        // Subtitle files live in a scratch dir that is removed on drop, after
        // FFmpeg has consumed them.
        let scratch = tempfile::tempdir().context("failed to create scratch directory")?;
        let ass_path = scratch.path().join("captions.ass");

        let file = File::create(&ass_path)
            .with_context(|| format!("failed to create subtitle file: {}", ass_path.display()))?;
        let mut encoder = AssEncoder::new(
            BufWriter::new(file),
            opts.style.clone(),
            frame_width,
            frame_height,
        );
        write_all_segments(&mut encoder, &segments)?;

        if let Some(srt_path) = &opts.sidecar_srt {
            let file = File::create(srt_path).with_context(|| {
                format!("failed to create sidecar SRT: {}", srt_path.display())
            })?;
            let mut encoder = SrtEncoder::new(BufWriter::new(file));
            write_all_segments(&mut encoder, &segments)?;
        }

        ffmpeg::burn_in(input, &ass_path, output)?;

        Ok(Report {
            segments: segments.len(),
            audio_seconds,
            backend: backend_name,
        })
    }
}

/// Run the primary backend, falling back to the remote service on failure.
///
/// The fallback is attempted at most once, and only when configured. A
/// fallback failure is reported on its own; the primary error has already
/// been logged at that point.
fn transcribe_with_fallback(
    primary: &mut dyn Transcriber,
    samples: &[f32],
    opts: &Opts,
) -> Result<(Vec<Segment>, &'static str)> {
    let primary_name = primary.name();
    match primary.transcribe(samples, opts) {
        Ok(segments) => Ok((segments, primary_name)),
        Err(err) => {
            let Some(fallback) = &opts.fallback else {
                return Err(err);
            };

            warn!(
                backend = primary_name,
                error = %err,
                "primary transcription failed; trying network fallback"
            );

            let mut remote = RemoteBackend::new(&fallback.endpoint, fallback.timeout)?;
            let segments = remote.transcribe(samples, opts)?;
            Ok((segments, remote.name()))
        }
    }
}

/// Write every segment and close the encoder, preferring the write error when
/// both the run and the close fail.
fn write_all_segments(encoder: &mut dyn SegmentEncoder, segments: &[Segment]) -> Result<()> {
    let run_res = segments
        .iter()
        .try_for_each(|seg| encoder.write_segment(seg));
    let close_res = encoder.close();

    match (run_res, close_res) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(close_err)) => Err(close_err),
        (Err(err), _) => Err(err),
    }
}
