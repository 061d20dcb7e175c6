use crate::Result;
use crate::opts::Opts;
use crate::segments::Segment;

/// Pluggable ASR backend used by [`crate::captioner::Captioner`].
///
/// A backend turns mono `f32` samples at the Whisper sample rate into raw
/// [`Segment`]s. Callers normalize the result; backends only need to produce
/// timestamps relative to the start of the buffer they were given.
pub trait Transcriber {
    /// A short human-readable name used in logs ("whisper", "remote", ...).
    fn name(&self) -> &'static str;

    /// Transcribe a contiguous buffer of mono 16 kHz samples.
    ///
    /// Implementations take `&mut self` because whisper_rs state creation and
    /// HTTP clients both want mutable access.
    fn transcribe(&mut self, samples: &[f32], opts: &Opts) -> Result<Vec<Segment>>;
}
