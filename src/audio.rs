//! Audio normalization for capburn.
//!
//! Responsibilities:
//! - Downmix interleaved PCM to mono
//! - Resample mono audio to the Whisper sample rate (when needed)
//!
//! The extraction stage (`extract`) feeds decoded packets through a
//! `MonoResampler`; everything downstream (Whisper, silence splitting, the
//! fallback backend) assumes mono f32 at exactly [`WHISPER_SAMPLE_RATE`].

use anyhow::{Context, Result, anyhow, bail};
use rubato::{Resampler, SincFixedIn, WindowFunction};

/// The sample rate whisper.cpp expects (Hz), mono.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Source frames fed to rubato per `process()` call.
///
/// Tradeoff: larger blocks = better throughput; smaller blocks = less padding
/// to flush at end-of-stream.
const RESAMPLE_BLOCK_FRAMES: usize = 2048;

/// A small stateful converter that turns mono samples at an arbitrary source
/// rate into mono samples at [`WHISPER_SAMPLE_RATE`].
///
/// Usage:
/// - `push` mono source-rate samples as they are decoded
/// - `finish` once at end-of-stream to flush the resampler tail
/// - take the accumulated output via `into_samples`
pub struct MonoResampler {
    src_rate: u32,

    // `None` when the source is already at the target rate (passthrough).
    resampler: Option<SincFixedIn<f32>>,

    // Source samples waiting for a full rubato input block.
    pending: Vec<f32>,

    // Accumulated output at the target rate.
    out: Vec<f32>,
}

impl MonoResampler {
    /// Create a resampler for the given source sample rate.
    pub fn new(src_rate: u32) -> Result<Self> {
        if src_rate == 0 {
            bail!("source sample rate must be non-zero");
        }

        let resampler = if src_rate == WHISPER_SAMPLE_RATE {
            None
        } else {
            let rs = SincFixedIn::<f32>::new(
                WHISPER_SAMPLE_RATE as f64 / src_rate as f64,
                2.0,
                rubato::SincInterpolationParameters {
                    sinc_len: 256,
                    f_cutoff: 0.95,
                    interpolation: rubato::SincInterpolationType::Linear,
                    oversampling_factor: 256,
                    window: WindowFunction::BlackmanHarris2,
                },
                RESAMPLE_BLOCK_FRAMES,
                1, // mono
            )
            .map_err(|e| anyhow!(e))
            .context("failed to init resampler")?;
            Some(rs)
        };

        Ok(Self {
            src_rate,
            resampler,
            pending: Vec::new(),
            out: Vec::new(),
        })
    }

    /// The source sample rate this converter was created for.
    pub fn src_rate(&self) -> u32 {
        self.src_rate
    }

    /// Push mono source-rate samples through the converter.
    pub fn push(&mut self, mono_src: &[f32]) -> Result<()> {
        let Some(_) = self.resampler else {
            // Passthrough: already at the target rate.
            self.out.extend_from_slice(mono_src);
            return Ok(());
        };

        self.pending.extend_from_slice(mono_src);
        self.drain_full_blocks()
    }

    /// Flush remaining buffered samples at end-of-stream.
    ///
    /// rubato expects exact block sizes, so the remainder is zero-padded up to
    /// one block before the final `process()` call.
    pub fn finish(&mut self) -> Result<()> {
        if self.resampler.is_none() || self.pending.is_empty() {
            return Ok(());
        }

        let rem = self.pending.len() % RESAMPLE_BLOCK_FRAMES;
        if rem != 0 {
            self.pending
                .resize(self.pending.len() + (RESAMPLE_BLOCK_FRAMES - rem), 0.0);
        }

        self.drain_full_blocks()
    }

    /// Consume the converter and return the accumulated target-rate samples.
    pub fn into_samples(self) -> Vec<f32> {
        self.out
    }

    fn drain_full_blocks(&mut self) -> Result<()> {
        while self.pending.len() >= RESAMPLE_BLOCK_FRAMES {
            let block: Vec<f32> = self.pending.drain(..RESAMPLE_BLOCK_FRAMES).collect();

            let rs = self
                .resampler
                .as_mut()
                .ok_or_else(|| anyhow!("resampler not initialized"))?;

            // rubato takes one Vec per channel; we are always mono here.
            let resampled = rs
                .process(&[block], None)
                .map_err(|e| anyhow!(e))
                .context("resampler process failed")?;

            if resampled.len() != 1 {
                bail!("expected mono output from resampler");
            }

            self.out.extend_from_slice(&resampled[0]);
        }

        Ok(())
    }
}

/// Downmix interleaved samples into mono by averaging channels.
///
/// Policy: equal-weight average across channels (simple, predictable).
pub fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    let frames = interleaved.len() / channels;
    let mut mono = Vec::with_capacity(frames);

    for f in 0..frames {
        let base = f * channels;
        let mut acc = 0.0;
        for c in 0..channels {
            acc += interleaved[base + c];
        }
        mono.push(acc / channels as f32);
    }

    mono
}
