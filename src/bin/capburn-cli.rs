use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::Parser;

use capburn::captioner::Captioner;
use capburn::logging;
use capburn::model::ModelSize;
use capburn::opts::{FallbackOpts, Opts};
use capburn::style::CaptionStyle;

#[derive(Parser, Debug)]
#[command(name = "capburn")]
#[command(about = "Transcribe a video's audio and burn the captions into it")]
struct Params {
    /// Path to the input video file (MP4, AVI, MOV, MKV, WMV, FLV, ...).
    input_video: PathBuf,

    /// Path for the output video. Always written as MP4 (H.264 + AAC).
    output_video: PathBuf,

    /// Whisper model size.
    #[arg(long = "model", value_enum, default_value_t = ModelSize::Base)]
    model: ModelSize,

    /// Directory containing downloaded ggml models.
    #[arg(long = "model-dir", default_value = "./models")]
    model_dir: PathBuf,

    /// Language hint (e.g. "en"). Auto-detected when omitted.
    #[arg(short = 'l', long = "language")]
    language: Option<String>,

    /// Caption font family.
    #[arg(long = "font")]
    font: Option<String>,

    /// Caption font size in pixels.
    #[arg(long = "font-size")]
    font_size: Option<u32>,

    /// Also write the captions as a sidecar SRT file at this path.
    #[arg(long = "subtitles")]
    subtitles: Option<PathBuf>,

    /// ASR HTTP endpoint to fall back to when Whisper transcription fails.
    #[arg(long = "fallback-url")]
    fallback_url: Option<String>,
}

fn main() -> Result<()> {
    logging::init();

    let params = Params::parse();

    ensure!(
        params.input_video.is_file(),
        "input video file '{}' not found",
        params.input_video.display()
    );

    if let Some(parent) = params.output_video.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory: {}", parent.display())
            })?;
        }
    }

    let model_path = params.model.resolve(&params.model_dir)?;
    eprintln!("loading Whisper model ({})...", params.model);
    let mut captioner = Captioner::new(&model_path)?;

    let opts = build_opts(&params);

    let report = captioner.caption(&params.input_video, &params.output_video, &opts)?;

    eprintln!(
        "wrote {} with {} caption segments ({} backend, {:.1}s of audio)",
        params.output_video.display(),
        report.segments,
        report.backend,
        report.audio_seconds,
    );

    Ok(())
}

fn build_opts(params: &Params) -> Opts {
    let mut style = CaptionStyle::default();
    if let Some(font) = &params.font {
        style.font = font.clone();
    }
    if let Some(size) = params.font_size {
        style.font_size = size;
    }

    Opts {
        language: params.language.clone(),
        style,
        fallback: params.fallback_url.as_deref().map(FallbackOpts::new),
        sidecar_srt: params.subtitles.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positional_input_and_output() -> anyhow::Result<()> {
        let params = Params::try_parse_from(["capburn", "in.mp4", "out.mp4"])?;
        assert_eq!(params.input_video, PathBuf::from("in.mp4"));
        assert_eq!(params.output_video, PathBuf::from("out.mp4"));
        assert_eq!(params.model, ModelSize::Base);
        Ok(())
    }

    #[test]
    fn model_flag_accepts_documented_sizes() -> anyhow::Result<()> {
        for (flag, expected) in [
            ("tiny", ModelSize::Tiny),
            ("base", ModelSize::Base),
            ("small", ModelSize::Small),
            ("medium", ModelSize::Medium),
            ("large", ModelSize::Large),
        ] {
            let params = Params::try_parse_from(["capburn", "a.mp4", "b.mp4", "--model", flag])?;
            assert_eq!(params.model, expected);
        }
        Ok(())
    }

    #[test]
    fn rejects_unknown_model_size() {
        assert!(Params::try_parse_from(["capburn", "a.mp4", "b.mp4", "--model", "huge"]).is_err());
    }

    #[test]
    fn missing_output_argument_is_an_error() {
        assert!(Params::try_parse_from(["capburn", "a.mp4"]).is_err());
    }

    #[test]
    fn style_overrides_flow_into_opts() -> anyhow::Result<()> {
        let params = Params::try_parse_from([
            "capburn",
            "a.mp4",
            "b.mp4",
            "--font",
            "Helvetica",
            "--font-size",
            "36",
            "--fallback-url",
            "http://localhost:9000/asr",
        ])?;

        let opts = build_opts(&params);
        assert_eq!(opts.style.font, "Helvetica");
        assert_eq!(opts.style.font_size, 36);
        assert_eq!(
            opts.fallback.as_ref().map(|f| f.endpoint.as_str()),
            Some("http://localhost:9000/asr")
        );
        Ok(())
    }
}
