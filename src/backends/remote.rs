use std::io::Cursor;
use std::time::Duration;

use hound::{SampleFormat, WavSpec, WavWriter};
use serde::Deserialize;
use tracing::debug;

use crate::audio::WHISPER_SAMPLE_RATE;
use crate::backend::Transcriber;
use crate::error::{Error, Result};
use crate::opts::Opts;
use crate::segments::Segment;
use crate::silence::{SplitOpts, split_on_silence};

/// Network-dependent fallback backend.
///
/// The audio is split on silence into utterance-sized chunks; each chunk is
/// encoded as 16-bit PCM WAV and POSTed to an ASR HTTP service. Chunk offsets
/// within the source buffer supply the segment timestamps, since the service
/// only returns text.
///
/// This backend requires network connectivity; without it, every request
/// fails and the documented "could not request results" error surfaces.
pub struct RemoteBackend {
    client: reqwest::blocking::Client,
    endpoint: String,
}

/// The response shape expected from the ASR service.
#[derive(Debug, Deserialize)]
struct RemoteTranscription {
    text: String,
}

impl RemoteBackend {
    /// Create a fallback backend targeting `endpoint`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("capburn/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::RemoteRequest(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// The configured service endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn recognize_chunk(&self, wav: Vec<u8>, language: Option<&str>) -> Result<String> {
        let mut req = self
            .client
            .post(&self.endpoint)
            .header("content-type", "audio/wav")
            .body(wav);

        if let Some(lang) = language {
            req = req.query(&[("language", lang)]);
        }

        let resp = req
            .send()
            .map_err(|e| Error::RemoteRequest(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(Error::RemoteRequest(format!(
                "service returned {status}: {body}"
            )));
        }

        let parsed: RemoteTranscription = resp
            .json()
            .map_err(|e| Error::RemoteRequest(format!("unparseable response: {e}")))?;

        Ok(parsed.text)
    }
}

impl Transcriber for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn transcribe(&mut self, samples: &[f32], opts: &Opts) -> Result<Vec<Segment>> {
        let chunks = split_on_silence(samples, WHISPER_SAMPLE_RATE, SplitOpts::default());
        debug!(chunks = chunks.len(), "silence split for remote fallback");

        let mut segments = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let wav = wav_bytes(&chunk.samples)?;
            let text = self.recognize_chunk(wav, opts.language.as_deref())?;

            if text.trim().is_empty() {
                continue;
            }

            segments.push(Segment {
                start_seconds: chunk.start_seconds(WHISPER_SAMPLE_RATE),
                end_seconds: chunk.end_seconds(WHISPER_SAMPLE_RATE),
                text: text.trim().to_owned(),
            });
        }

        Ok(segments)
    }
}

/// Encode mono 16 kHz f32 samples as a 16-bit PCM WAV file in memory.
fn wav_bytes(samples: &[f32]) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: WHISPER_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)
            .map_err(|e| Error::msg(format!("failed to create WAV writer: {e}")))?;

        for &s in samples {
            let pcm = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(pcm)
                .map_err(|e| Error::msg(format!("failed to write WAV sample: {e}")))?;
        }

        writer
            .finalize()
            .map_err(|e| Error::msg(format!("failed to finalize WAV data: {e}")))?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_bytes_produces_riff_header_and_pcm_payload() -> anyhow::Result<()> {
        let bytes = wav_bytes(&[0.0, 0.5, -0.5, 1.0])?;

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");

        // Round-trip through hound to confirm spec and sample count.
        let reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, WHISPER_SAMPLE_RATE);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 4);
        Ok(())
    }

    #[test]
    fn wav_bytes_clamps_out_of_range_samples() -> anyhow::Result<()> {
        let bytes = wav_bytes(&[2.0, -2.0])?;
        let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
        let pcm: Vec<i16> = reader.samples::<i16>().collect::<std::result::Result<_, _>>()?;
        assert_eq!(pcm, vec![i16::MAX, i16::MIN + 1]);
        Ok(())
    }

    #[test]
    fn remote_transcription_response_parses() -> anyhow::Result<()> {
        let parsed: RemoteTranscription = serde_json::from_str(r#"{"text":"hello world"}"#)?;
        assert_eq!(parsed.text, "hello world");
        Ok(())
    }

    #[test]
    fn unreachable_endpoint_reports_request_failure() -> anyhow::Result<()> {
        // Port 1 on localhost is essentially guaranteed closed.
        let mut backend =
            RemoteBackend::new("http://127.0.0.1:1/asr", Duration::from_millis(200))?;

        let samples: Vec<f32> = (0..16_000).map(|i| 0.5 * (i as f32 * 0.3).sin()).collect();
        let opts = Opts::default();
        let err = backend.transcribe(&samples, &opts).unwrap_err();
        assert!(err.to_string().starts_with("could not request results"));
        Ok(())
    }
}
