use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// The Whisper model sizes capburn supports.
///
/// Why this exists:
/// - We want a single, strongly-typed representation of model sizes across
///   the CLI and library code.
/// - Using an enum avoids stringly-typed conditionals and keeps the
///   size → ggml filename mapping explicit and discoverable.
///
/// Integration notes:
/// - `ValueEnum` allows this enum to be used directly as a CLI flag with `clap`.
/// - Each variant maps to a well-known ggml artifact from whisper.cpp's
///   Hugging Face repo (see the `model-downloader` binary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ModelSize {
    Tiny,
    #[default]
    Base,
    Small,
    Medium,
    Large,
}

impl ModelSize {
    /// The friendly name users type (and the downloader accepts).
    pub fn name(self) -> &'static str {
        match self {
            Self::Tiny => "tiny",
            Self::Base => "base",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    /// The ggml filename this size resolves to on disk.
    pub fn filename(self) -> &'static str {
        match self {
            Self::Tiny => "ggml-tiny.bin",
            Self::Base => "ggml-base.bin",
            Self::Small => "ggml-small.bin",
            Self::Medium => "ggml-medium.bin",
            Self::Large => "ggml-large-v3.bin",
        }
    }

    /// Resolve this model size inside `dir`, failing with a descriptive error
    /// (including the download hint) when the file is missing.
    pub fn resolve(self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.filename());
        if !path.is_file() {
            return Err(Error::ModelNotFound {
                name: self.name().to_string(),
                path,
            });
        }
        Ok(path)
    }
}

impl fmt::Display for ModelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_size_is_base() {
        assert_eq!(ModelSize::default(), ModelSize::Base);
    }

    #[test]
    fn filenames_follow_ggml_convention() {
        assert_eq!(ModelSize::Tiny.filename(), "ggml-tiny.bin");
        assert_eq!(ModelSize::Base.filename(), "ggml-base.bin");
        assert_eq!(ModelSize::Small.filename(), "ggml-small.bin");
        assert_eq!(ModelSize::Medium.filename(), "ggml-medium.bin");
        assert_eq!(ModelSize::Large.filename(), "ggml-large-v3.bin");
    }

    #[test]
    fn resolve_finds_existing_model_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("ggml-tiny.bin"), b"stub")?;

        let path = ModelSize::Tiny.resolve(dir.path())?;
        assert!(path.ends_with("ggml-tiny.bin"));
        Ok(())
    }

    #[test]
    fn resolve_errors_with_download_hint_when_missing() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let err = ModelSize::Medium.resolve(dir.path()).unwrap_err();
        assert!(err.to_string().contains("model-downloader --name medium"));
        Ok(())
    }
}
