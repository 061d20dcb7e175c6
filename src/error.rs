use std::path::PathBuf;

use thiserror::Error;

/// Capburn's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Capburn's crate-wide error type.
///
/// The pipeline has a small, fixed failure surface (missing external encoder,
/// missing model, silent input, unreachable fallback service), so we name those
/// cases explicitly instead of collapsing everything into strings. This is
/// intentionally decoupled from `anyhow` so downstream libraries aren't forced
/// to adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// The external `ffmpeg` / `ffprobe` binary could not be found on PATH.
    #[error("FFmpeg not found: '{program}' is not installed or not on PATH")]
    FfmpegNotFound { program: &'static str },

    /// FFmpeg ran but exited with a failure status.
    #[error("{program} exited with {status}: {stderr}")]
    FfmpegFailed {
        program: &'static str,
        status: String,
        stderr: String,
    },

    /// The requested Whisper model file does not exist on disk.
    #[error(
        "model not found at '{}'; download it with `model-downloader --name {name}`",
        path.display()
    )]
    ModelNotFound { name: String, path: PathBuf },

    /// The input container has no decodable audio track.
    #[error("no audio track found in '{}'", .0.display())]
    NoAudioTrack(PathBuf),

    /// Transcription completed but produced no usable segments.
    #[error("no speech detected in the input audio")]
    NoSpeech,

    /// The network ASR fallback could not be reached or returned an error.
    #[error("could not request results from fallback service: {0}")]
    RemoteRequest(String),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}
