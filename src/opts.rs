use std::path::PathBuf;
use std::time::Duration;

use crate::style::CaptionStyle;

/// Options that control how a captioning run is performed.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that:
/// - the library remains reusable outside of a CLI context
/// - other frontends (APIs, tests, batch jobs) can construct options programmatically
#[derive(Debug, Clone, Default)]
pub struct Opts {
    /// Optional language hint (e.g. `"en"`, `"es"`).
    ///
    /// When `None`, we allow Whisper to auto-detect the spoken language.
    pub language: Option<String>,

    /// Visual style for the burned-in captions.
    pub style: CaptionStyle,

    /// Network ASR fallback, used when the primary backend fails.
    ///
    /// When `None`, a primary-backend failure propagates directly.
    pub fallback: Option<FallbackOpts>,

    /// Optional path for a sidecar SRT file written next to the output video.
    pub sidecar_srt: Option<PathBuf>,
}

/// Configuration for the network ASR fallback.
#[derive(Debug, Clone)]
pub struct FallbackOpts {
    /// HTTP endpoint accepting 16 kHz mono WAV and returning `{"text": ...}`.
    pub endpoint: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl FallbackOpts {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(30),
        }
    }
}
