use std::io::Write;

use crate::Result;
use crate::error::Error;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::Segment;

/// A `SegmentEncoder` that writes segments in SubRip (SRT) format.
///
/// Used for optional sidecar subtitle output alongside the burned-in video.
///
/// Design:
/// - We stream output directly to a `Write` implementation.
/// - SRT has no header; cues are numbered starting at 1.
pub struct SrtEncoder<W: Write> {
    /// The underlying writer we stream SRT into.
    w: W,

    /// 1-based index of the next cue.
    next_index: u64,

    /// Whether the encoder has been closed.
    closed: bool,
}

impl<W: Write> SrtEncoder<W> {
    /// Create a new SRT encoder that writes to the provided writer.
    pub fn new(w: W) -> Self {
        Self {
            w,
            next_index: 1,
            closed: false,
        }
    }
}

impl<W: Write> SegmentEncoder for SrtEncoder<W> {
    /// Write a single numbered cue.
    fn write_segment(&mut self, seg: &Segment) -> Result<()> {
        if self.closed {
            return Err(Error::msg("cannot write segment: encoder is already closed"));
        }

        // SRT timestamps use `HH:MM:SS,mmm` with a comma separator.
        let start = format_timestamp_srt(seg.start_seconds);
        let end = format_timestamp_srt(seg.end_seconds);

        writeln!(&mut self.w, "{}", self.next_index)?;
        writeln!(&mut self.w, "{start} --> {end}")?;
        writeln!(&mut self.w, "{}", seg.text)?;
        writeln!(&mut self.w)?;

        self.next_index += 1;

        // Flush so streaming consumers (stdout, pipes, sockets) see output promptly.
        self.w.flush()?;

        Ok(())
    }

    /// Flush the underlying writer. This is idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}

/// Format seconds into an SRT timestamp (`HH:MM:SS,mmm`).
fn format_timestamp_srt(seconds: f32) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;

    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;

    let s = total_s % 60;
    let total_m = total_s / 60;

    let m = total_m % 60;
    let h = total_m / 60;

    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}
