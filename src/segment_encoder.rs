use crate::Result;
use crate::segments::Segment;

/// Serializes caption segments into a subtitle format.
///
/// Contract shared by all encoders:
/// - `close` is idempotent
/// - writing after `close` is an error
/// - encoders flush after each segment so streaming consumers see output promptly
pub trait SegmentEncoder {
    fn write_segment(&mut self, seg: &Segment) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
