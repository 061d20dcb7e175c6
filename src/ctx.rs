use std::path::Path;

use anyhow::{Context, Result};
use whisper_rs::{WhisperContext, WhisperContextParameters};

use crate::logging::init_whisper_logging;

/// Load a Whisper model and return an initialized `WhisperContext`.
///
/// Why this exists:
/// - We centralize model loading in one place so error handling and defaults stay consistent.
///
/// Design notes:
/// - We silence whisper.cpp's logging before loading so model initialization
///   noise never reaches the user's terminal.
pub fn get_context(model_path: &Path) -> Result<WhisperContext> {
    init_whisper_logging();

    // We start with default Whisper context parameters.
    // If we need to tune performance or enable optional features later, we can do it here.
    let ctx_params = WhisperContextParameters::default();

    let model_path = model_path
        .to_str()
        .with_context(|| format!("model path is not valid UTF-8: {}", model_path.display()))?;

    let ctx = WhisperContext::new_with_params(model_path, ctx_params)
        .with_context(|| format!("failed to load model from path: {model_path}"))?;

    Ok(ctx)
}
