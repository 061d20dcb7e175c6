//! Transcription backends.
//!
//! `whisper` is the primary, in-process backend. `remote` is the
//! network-dependent fallback used when the primary backend fails.

pub mod remote;
pub mod whisper;

pub use remote::RemoteBackend;
pub use whisper::WhisperBackend;
