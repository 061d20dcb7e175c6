// A small CLI utility to download the supported Whisper ggml models into a
// target directory.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "model-downloader")]
#[command(about = "Download Whisper models for capburn", long_about = None)]
struct Args {
    /// List supported model names and exit.
    #[arg(long)]
    list: bool,

    /// Model name (one of: tiny, base, small, medium, large).
    #[arg(long, required_unless_present = "list")]
    name: Option<String>,

    /// Target directory to store models (created if missing).
    #[arg(long, default_value = "./models")]
    dir: PathBuf,
}

/// Download source for a known model.
///
/// We intentionally keep an allowlist of known-good artifacts; the names and
/// filenames match what `capburn --model` resolves on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ModelSpec {
    /// Friendly name users type (e.g. "base").
    name: &'static str,

    /// Filename written to disk (e.g. "ggml-base.bin").
    filename: &'static str,

    /// Full download URL.
    url: &'static str,
}

// These URLs match whisper.cpp's standard Hugging Face repo for GGML models.
static WHISPER_MODELS: &[ModelSpec] = &[
    ModelSpec {
        name: "tiny",
        filename: "ggml-tiny.bin",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-tiny.bin",
    },
    ModelSpec {
        name: "base",
        filename: "ggml-base.bin",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.bin",
    },
    ModelSpec {
        name: "small",
        filename: "ggml-small.bin",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-small.bin",
    },
    ModelSpec {
        name: "medium",
        filename: "ggml-medium.bin",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-medium.bin",
    },
    ModelSpec {
        name: "large",
        filename: "ggml-large-v3.bin",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-large-v3.bin",
    },
];

fn main() -> Result<()> {
    let args = Args::parse();

    if args.list {
        print!("{}", model_list_string());
        return Ok(());
    }

    let name = args.name.as_deref().expect("clap should require --name");

    fs::create_dir_all(&args.dir)
        .with_context(|| format!("failed to create target dir: {}", args.dir.display()))?;

    let spec = lookup_model(name).with_context(|| {
        format!("unknown model '{name}'. Run with --list to see supported models.")
    })?;

    let dest_path = args.dir.join(spec.filename);

    if dest_path.exists() {
        println!("already exists: {}", dest_path.display());
        return Ok(());
    }

    println!("downloading {}", spec.filename);
    println!("    {}", spec.url);

    let client = reqwest::blocking::Client::builder()
        .user_agent("capburn-model-downloader")
        .build()
        .context("failed to build HTTP client")?;

    download_to_path(&client, spec.url, &dest_path)?;

    println!("saved: {}", dest_path.display());
    Ok(())
}

fn lookup_model(name: &str) -> Option<&'static ModelSpec> {
    WHISPER_MODELS.iter().find(|m| m.name == name)
}

fn model_list_string() -> String {
    let mut out = String::new();

    out.push_str("Whisper models:\n");
    for m in WHISPER_MODELS {
        out.push_str("  - ");
        out.push_str(m.name);
        out.push('\n');
    }

    out
}

/// Download a URL into `dest_path` safely:
/// - download to `dest_path.part`
/// - fsync + rename to final path
fn download_to_path(client: &reqwest::blocking::Client, url: &str, dest_path: &Path) -> Result<()> {
    let resp = client
        .get(url)
        .send()
        .with_context(|| format!("request failed: {url}"))?
        .error_for_status()
        .with_context(|| format!("download failed (bad status): {url}"))?;

    let total = resp.content_length();
    download_to_path_with_reader(resp, total, dest_path)
}

fn download_to_path_with_reader<R: Read>(
    mut reader: R,
    total_bytes: Option<u64>,
    dest_path: &Path,
) -> Result<()> {
    let total = total_bytes.unwrap_or(0);

    let pb = if total > 0 {
        ProgressBar::new(total)
    } else {
        ProgressBar::new_spinner()
    };

    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} {bytes}/{total_bytes} {bar:40.cyan/blue} {eta}",
        )
        .context("invalid progress template")?
        .progress_chars("#>-"),
    );

    let tmp_path = PathBuf::from(format!("{}.part", dest_path.display()));

    let result = (|| -> Result<()> {
        let mut file = fs::File::create(&tmp_path)
            .with_context(|| format!("failed to create temp file: {}", tmp_path.display()))?;

        let mut buf = [0u8; 64 * 1024];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n])?;
            pb.inc(n as u64);
        }

        file.sync_all()?;
        pb.finish_and_clear();

        fs::rename(&tmp_path, dest_path)
            .with_context(|| format!("failed to move into place: {}", dest_path.display()))?;

        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
        pb.finish_and_clear();
    }

    result
}
