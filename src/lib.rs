//! `capburn` — transcribe a video's audio with Whisper and burn the captions in.
//!
//! This crate provides:
//! - Audio extraction from video containers (Symphonia decode → mono 16 kHz)
//! - Whisper transcription with a network ASR fallback
//! - Styled subtitle rendering (ASS, SRT)
//! - FFmpeg orchestration for the final burn-in encode
//!
//! The pipeline is deliberately linear: extract → transcribe → normalize →
//! render → encode. Each stage lives in its own module so the pieces stay
//! testable without models, networks, or FFmpeg installed.

// High-level API (most consumers should start here).
pub mod captioner;
pub mod opts;

// Crate-wide error taxonomy.
pub mod error;

// Whisper model selection and context management.
pub mod ctx;
pub mod model;

// Audio extraction and preprocessing.
pub mod audio;
pub mod extract;
pub mod silence;

// Transcription backends.
pub mod backend;
pub mod backends;

// Segment data structures and transcription helpers.
pub mod segments;

// Subtitle styling and encoder interfaces.
pub mod ass_encoder;
pub mod segment_encoder;
pub mod srt_encoder;
pub mod style;

// FFmpeg process orchestration (probe + burn-in encode).
pub mod ffmpeg;

// Logging configuration and control.
pub mod logging;

pub use error::{Error, Result};
