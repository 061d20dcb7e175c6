use std::io::Write;

use crate::Result;
use crate::error::Error;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::Segment;
use crate::style::CaptionStyle;

/// A `SegmentEncoder` that writes a complete ASS (Advanced SubStation Alpha)
/// subtitle file.
///
/// Design:
/// - We stream output directly to a `Write` implementation.
/// - The script header (Script Info + Styles + Events preamble) is written
///   lazily on the first segment so that:
///   - callers can construct the encoder without immediately writing output
///   - even "no segments" runs still behave predictably (close just flushes)
/// - Frame dimensions are required up front because the style margins are
///   expressed in `PlayRes` units.
pub struct AssEncoder<W: Write> {
    /// The underlying writer we stream ASS into.
    w: W,

    style: CaptionStyle,
    frame_width: u32,
    frame_height: u32,

    /// Whether we've written the script header.
    started: bool,

    /// Whether the encoder has been closed.
    closed: bool,
}

impl<W: Write> AssEncoder<W> {
    /// Create a new ASS encoder for a video with the given frame dimensions.
    pub fn new(w: W, style: CaptionStyle, frame_width: u32, frame_height: u32) -> Self {
        Self {
            w,
            style,
            frame_width,
            frame_height,
            started: false,
            closed: false,
        }
    }

    /// Write the script header if we haven't written it yet.
    fn start_if_needed(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }

        writeln!(&mut self.w, "[Script Info]")?;
        writeln!(&mut self.w, "ScriptType: v4.00+")?;
        writeln!(&mut self.w, "PlayResX: {}", self.frame_width)?;
        writeln!(&mut self.w, "PlayResY: {}", self.frame_height)?;
        writeln!(&mut self.w, "WrapStyle: 0")?;
        writeln!(&mut self.w)?;

        writeln!(&mut self.w, "[V4+ Styles]")?;
        writeln!(
            &mut self.w,
            "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
             OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, \
             ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, \
             Alignment, MarginL, MarginR, MarginV, Encoding"
        )?;
        writeln!(
            &mut self.w,
            "{}",
            self.style.ass_style_line(self.frame_width, self.frame_height)
        )?;
        writeln!(&mut self.w)?;

        writeln!(&mut self.w, "[Events]")?;
        writeln!(
            &mut self.w,
            "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text"
        )?;

        self.started = true;
        Ok(())
    }
}

impl<W: Write> SegmentEncoder for AssEncoder<W> {
    /// Write a single dialogue event.
    fn write_segment(&mut self, seg: &Segment) -> Result<()> {
        if self.closed {
            return Err(Error::msg("cannot write segment: encoder is already closed"));
        }

        self.start_if_needed()?;

        let start = format_timestamp_ass(seg.start_seconds);
        let end = format_timestamp_ass(seg.end_seconds);
        let text = escape_ass_text(&seg.text);

        writeln!(
            &mut self.w,
            "Dialogue: 0,{start},{end},Caption,,0,0,0,,{text}"
        )?;

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

/// Format seconds into an ASS timestamp (`H:MM:SS.cc`, centisecond precision).
///
/// Rounding policy:
/// - We round to the nearest centisecond to reduce drift when converting from `f32`.
fn format_timestamp_ass(seconds: f32) -> String {
    let total_cs = (seconds.max(0.0) * 100.0).round() as u64;

    let cs = total_cs % 100;
    let total_s = total_cs / 100;

    let s = total_s % 60;
    let total_m = total_s / 60;

    let m = total_m % 60;
    let h = total_m / 60;

    format!("{h}:{m:02}:{s:02}.{cs:02}")
}

/// Escape caption text for an ASS dialogue line.
///
/// - newlines become ASS hard line breaks (`\N`)
/// - braces are replaced so caption text can never smuggle override tags
fn escape_ass_text(text: &str) -> String {
    text.replace('\r', "")
        .replace('\n', "\\N")
        .replace('{', "(")
        .replace('}', ")")
}
