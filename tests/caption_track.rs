//! End-to-end checks for the pure-Rust half of the pipeline: decode →
//! normalize → render. The FFmpeg burn-in stage is exercised separately and
//! needs the external binary, so it is not covered here.

use std::io::Read;

use capburn::ass_encoder::AssEncoder;
use capburn::extract::decode_audio_track;
use capburn::segment_encoder::SegmentEncoder;
use capburn::segments::{Segment, normalize};
use capburn::srt_encoder::SrtEncoder;
use capburn::style::CaptionStyle;

fn seg(start: f32, end: f32, text: &str) -> Segment {
    Segment {
        start_seconds: start,
        end_seconds: end,
        text: text.to_string(),
    }
}

/// Write a short stereo WAV file and return its path inside `dir`.
fn write_stereo_wav(dir: &std::path::Path, sample_rate: u32, seconds: f32) -> std::path::PathBuf {
    let path = dir.join("clip.wav");
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(&path, spec).expect("create wav");
    let frames = (seconds * sample_rate as f32) as usize;
    for i in 0..frames {
        let s = (0.3 * (i as f32 * 0.05).sin() * i16::MAX as f32) as i16;
        writer.write_sample(s).expect("left");
        writer.write_sample(-s).expect("right");
    }
    writer.finalize().expect("finalize wav");
    path
}

#[test]
fn decodes_stereo_wav_to_mono_16k() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_stereo_wav(dir.path(), 8_000, 1.0);

    let samples = decode_audio_track(&path)?;

    // 1 second at 8 kHz resampled to 16 kHz: about 16000 mono samples.
    // The resampler zero-pads its final block, so allow slack.
    assert!(samples.len() >= 15_000, "got {} samples", samples.len());
    assert!(samples.len() <= 19_000, "got {} samples", samples.len());
    Ok(())
}

#[test]
fn decodes_wav_already_at_target_rate_without_resampling_drift() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_stereo_wav(dir.path(), 16_000, 0.5);

    let samples = decode_audio_track(&path)?;
    assert_eq!(samples.len(), 8_000);
    Ok(())
}

#[test]
fn wav_without_audio_frames_is_a_missing_track_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("empty.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    hound::WavWriter::create(&path, spec)?.finalize()?;

    let err = decode_audio_track(&path).unwrap_err();
    assert!(matches!(err, capburn::Error::NoAudioTrack(_)), "got: {err}");
    assert!(err.to_string().contains("empty.wav"));
    Ok(())
}

#[test]
fn normalized_segments_render_to_a_complete_ass_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let ass_path = dir.path().join("captions.ass");

    // Deliberately unsorted and overlapping input.
    let segments = normalize(vec![
        seg(2.0, 4.5, "second cue"),
        seg(0.0, 2.5, "first cue"),
        seg(4.5, 4.5, "degenerate"),
    ]);
    assert_eq!(segments.len(), 2);

    let file = std::fs::File::create(&ass_path)?;
    let mut encoder = AssEncoder::new(file, CaptionStyle::default(), 1280, 720);
    for s in &segments {
        encoder.write_segment(s)?;
    }
    encoder.close()?;

    let mut contents = String::new();
    std::fs::File::open(&ass_path)?.read_to_string(&mut contents)?;

    assert!(contents.starts_with("[Script Info]"));
    assert!(contents.contains("PlayResX: 1280"));
    assert!(contents.contains("PlayResY: 720"));
    // 720p margins: 15% of 720 = 108 vertical, 10% of 1280 = 128 per side.
    assert!(contents.contains(",128,128,108,"));
    assert!(contents.contains("Dialogue: 0,0:00:00.00,0:00:02.00,Caption,,0,0,0,,first cue"));
    assert!(contents.contains("Dialogue: 0,0:00:02.00,0:00:04.50,Caption,,0,0,0,,second cue"));
    assert!(!contents.contains("degenerate"));
    Ok(())
}

#[test]
fn sidecar_srt_matches_burned_segments() -> anyhow::Result<()> {
    let segments = normalize(vec![seg(0.0, 1.5, "hello"), seg(1.5, 3.0, "world")]);

    let mut out = Vec::new();
    let mut encoder = SrtEncoder::new(&mut out);
    for s in &segments {
        encoder.write_segment(s)?;
    }
    encoder.close()?;

    let srt = String::from_utf8(out)?;
    assert_eq!(
        srt,
        "1\n00:00:00,000 --> 00:00:01,500\nhello\n\n\
         2\n00:00:01,500 --> 00:00:03,000\nworld\n\n"
    );
    Ok(())
}
