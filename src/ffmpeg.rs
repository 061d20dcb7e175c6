//! FFmpeg process orchestration.
//!
//! The final pipeline stage delegates video work to external binaries:
//! `ffprobe` reports the frame dimensions (needed for subtitle styling) and
//! `ffmpeg` performs the burn-in encode. The output container and codecs are
//! fixed: MP4 with H.264 video and AAC audio.
//!
//! Argument construction is kept in pure functions so command lines are
//! testable without the binaries installed.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use anyhow::Context;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Verify that `ffmpeg` and `ffprobe` are invocable.
///
/// We check up front so a missing encoder fails before any transcription work
/// is spent, with the documented "FFmpeg not found" message.
pub fn ensure_available() -> Result<()> {
    for program in ["ffmpeg", "ffprobe"] {
        run_version_probe(program)?;
    }
    Ok(())
}

fn run_version_probe(program: &'static str) -> Result<()> {
    match Command::new(program).arg("-version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(output) => Err(Error::FfmpegFailed {
            program,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(Error::FfmpegNotFound { program })
        }
        Err(err) => Err(err.into()),
    }
}

/// Probe the first video stream's frame dimensions via `ffprobe`.
pub fn probe_dimensions(input: &Path) -> Result<(u32, u32)> {
    let output = Command::new("ffprobe")
        .args(probe_dimensions_args(input))
        .output()
        .map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => Error::FfmpegNotFound { program: "ffprobe" },
            _ => err.into(),
        })?;

    if !output.status.success() {
        return Err(Error::FfmpegFailed {
            program: "ffprobe",
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_dimensions(&stdout)
}

/// Extract the audio track of `input` as a mono 16 kHz WAV file via `ffmpeg`.
///
/// Used for containers the in-process demuxer can't read (AVI, WMV, FLV).
pub fn extract_audio(input: &Path, output: &Path) -> Result<()> {
    let args = extract_audio_args(input, output);
    debug!(?args, "running ffmpeg audio extraction");

    let out = Command::new("ffmpeg")
        .args(&args)
        .output()
        .map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => Error::FfmpegNotFound { program: "ffmpeg" },
            _ => err.into(),
        })?;

    if !out.status.success() {
        return Err(Error::FfmpegFailed {
            program: "ffmpeg",
            status: out.status.to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        });
    }

    Ok(())
}

/// Burn `subtitles` (an ASS file) into `input`, writing an H.264 + AAC MP4.
pub fn burn_in(input: &Path, subtitles: &Path, output: &Path) -> Result<()> {
    let args = burn_in_args(input, subtitles, output);
    debug!(?args, "running ffmpeg burn-in");

    let out = Command::new("ffmpeg")
        .args(&args)
        .output()
        .map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => Error::FfmpegNotFound { program: "ffmpeg" },
            _ => err.into(),
        })?;

    if !out.status.success() {
        return Err(Error::FfmpegFailed {
            program: "ffmpeg",
            status: out.status.to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        });
    }

    info!(output = %output.display(), "burn-in encode complete");
    Ok(())
}

/// ffprobe arguments for querying the first video stream's `width,height`.
fn probe_dimensions_args(input: &Path) -> Vec<OsString> {
    vec![
        "-v".into(),
        "error".into(),
        "-select_streams".into(),
        "v:0".into(),
        "-show_entries".into(),
        "stream=width,height".into(),
        "-of".into(),
        "csv=p=0".into(),
        input.as_os_str().to_owned(),
    ]
}

/// ffmpeg arguments for extracting mono audio at the Whisper sample rate.
fn extract_audio_args(input: &Path, output: &Path) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-i".into(),
        input.as_os_str().to_owned(),
        "-vn".into(),
        "-ac".into(),
        "1".into(),
        "-ar".into(),
        crate::audio::WHISPER_SAMPLE_RATE.to_string().into(),
        "-f".into(),
        "wav".into(),
        output.as_os_str().to_owned(),
    ]
}

/// ffmpeg arguments for the burn-in encode.
///
/// Container and codec selection is fixed: the documented output is always an
/// MP4 with H.264 video and AAC audio, regardless of the input container or
/// the output path's extension.
fn burn_in_args(input: &Path, subtitles: &Path, output: &Path) -> Vec<OsString> {
    let mut filter = OsString::from("ass=");
    filter.push(escape_filter_path(subtitles));

    vec![
        "-y".into(),
        "-i".into(),
        input.as_os_str().to_owned(),
        "-vf".into(),
        filter,
        "-c:v".into(),
        "libx264".into(),
        "-c:a".into(),
        "aac".into(),
        "-movflags".into(),
        "+faststart".into(),
        "-f".into(),
        "mp4".into(),
        output.as_os_str().to_owned(),
    ]
}

/// Escape a path for use inside an ffmpeg filter argument.
///
/// Filter strings treat `\`, `:`, `'`, `[`, `]`, `,` and `;` specially, so
/// each is backslash-escaped.
fn escape_filter_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | ':' | '\'' | '[' | ']' | ',' | ';') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn parse_dimensions(stdout: &str) -> Result<(u32, u32)> {
    let line = stdout
        .lines()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| Error::msg("ffprobe reported no video stream"))?;

    let mut parts = line.trim().split(',');
    let width: u32 = parts
        .next()
        .unwrap_or_default()
        .parse()
        .context("failed to parse frame width from ffprobe output")?;
    let height: u32 = parts
        .next()
        .unwrap_or_default()
        .parse()
        .context("failed to parse frame height from ffprobe output")?;

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn burn_in_args_use_fixed_codecs() {
        let args = burn_in_args(
            Path::new("in.mkv"),
            Path::new("/tmp/captions.ass"),
            Path::new("out.mp4"),
        );

        let strs: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        let v = strs.iter().position(|a| a == "-c:v").unwrap();
        assert_eq!(strs[v + 1], "libx264");
        let a = strs.iter().position(|a| a == "-c:a").unwrap();
        assert_eq!(strs[a + 1], "aac");
        assert!(strs.contains(&"-y".to_string()));
        assert!(strs.contains(&"+faststart".to_string()));
        assert_eq!(strs.last().unwrap(), "out.mp4");
    }

    #[test]
    fn burn_in_args_pin_the_mp4_container() {
        // The output is always MP4, even when the output path says otherwise.
        let args = burn_in_args(
            Path::new("in.mp4"),
            Path::new("/tmp/captions.ass"),
            Path::new("out.avi"),
        );

        let strs: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        let f = strs.iter().position(|a| a == "-f").unwrap();
        assert_eq!(strs[f + 1], "mp4");
        assert_eq!(strs.last().unwrap(), "out.avi");
    }

    #[test]
    fn extract_audio_args_request_mono_16k_wav() {
        let args = extract_audio_args(Path::new("clip.wmv"), Path::new("/tmp/audio.wav"));
        let strs: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert!(strs.contains(&"-vn".to_string()));
        let ac = strs.iter().position(|a| a == "-ac").unwrap();
        assert_eq!(strs[ac + 1], "1");
        let ar = strs.iter().position(|a| a == "-ar").unwrap();
        assert_eq!(strs[ar + 1], "16000");
        let f = strs.iter().position(|a| a == "-f").unwrap();
        assert_eq!(strs[f + 1], "wav");
        assert_eq!(strs.last().unwrap(), "/tmp/audio.wav");
    }

    #[test]
    fn burn_in_args_escape_the_subtitle_filter_path() {
        let args = burn_in_args(
            Path::new("in.mp4"),
            Path::new("/tmp/a dir/cap,tions.ass"),
            Path::new("out.mp4"),
        );

        let vf = args
            .iter()
            .position(|a| a == "-vf")
            .map(|i| args[i + 1].to_string_lossy().into_owned())
            .unwrap();
        assert_eq!(vf, "ass=/tmp/a dir/cap\\,tions.ass");
    }

    #[test]
    fn escape_filter_path_handles_colons_and_quotes() {
        let escaped = escape_filter_path(&PathBuf::from("C:/subs/it's.ass"));
        assert_eq!(escaped, "C\\:/subs/it\\'s.ass");
    }

    #[test]
    fn parse_dimensions_reads_csv_pair() -> anyhow::Result<()> {
        assert_eq!(parse_dimensions("1920,1080\n")?, (1920, 1080));
        assert_eq!(parse_dimensions("\n640,480\n")?, (640, 480));
        Ok(())
    }

    #[test]
    fn parse_dimensions_rejects_empty_output() {
        let err = parse_dimensions("").unwrap_err();
        assert!(err.to_string().contains("no video stream"));
    }

    #[test]
    fn parse_dimensions_rejects_garbage() {
        assert!(parse_dimensions("wide,tall").is_err());
    }

    #[test]
    fn probe_args_select_first_video_stream() {
        let args = probe_dimensions_args(Path::new("clip.mov"));
        let strs: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert!(strs.contains(&"v:0".to_string()));
        assert!(strs.contains(&"stream=width,height".to_string()));
        assert_eq!(strs.last().unwrap(), "clip.mov");
    }
}
