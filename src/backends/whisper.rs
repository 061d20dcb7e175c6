use std::path::Path;

use whisper_rs::WhisperContext;

use crate::backend::Transcriber;
use crate::ctx::get_context;
use crate::error::{Error, Result};
use crate::opts::Opts;
use crate::segments::{Segment, transcribe_samples};

/// Built-in backend powered by `whisper-rs` / `whisper.cpp`.
///
/// The model is loaded once at construction (expensive); the context is then
/// reused across `transcribe` calls.
pub struct WhisperBackend {
    ctx: WhisperContext,
}

impl WhisperBackend {
    /// Load a whisper.cpp model from disk and initialize the backend.
    pub fn new(model_path: &Path) -> Result<Self> {
        if model_path.as_os_str().is_empty() {
            return Err(Error::msg("model path must be provided"));
        }

        let ctx = get_context(model_path)?;
        Ok(Self { ctx })
    }

    /// Access the underlying Whisper context.
    ///
    /// This is primarily intended for advanced or experimental use-cases.
    pub fn context(&self) -> &WhisperContext {
        &self.ctx
    }
}

impl Transcriber for WhisperBackend {
    fn name(&self) -> &'static str {
        "whisper"
    }

    fn transcribe(&mut self, samples: &[f32], opts: &Opts) -> Result<Vec<Segment>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        transcribe_samples(&self.ctx, samples, opts.language.as_deref())
    }
}
