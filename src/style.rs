//! Caption styling.
//!
//! The defaults reproduce the tool's documented rendering: bold sans-serif at
//! 50 px, white fill with a black outline, positioned at 85% of the frame
//! height, with the text block capped at 80% of the frame width. Styling is
//! expressed as an ASS (Advanced SubStation Alpha) style line so FFmpeg's
//! subtitle filter renders it directly during the burn-in encode.

/// Visual style applied to burned-in captions.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionStyle {
    /// Font family name. Must be resolvable by the system fontconfig.
    pub font: String,

    /// Font size in pixels, relative to the source frame height.
    pub font_size: u32,

    /// Render the text bold.
    pub bold: bool,

    /// Outline thickness in pixels.
    pub outline: u32,

    /// Text fill color, ASS `&HAABBGGRR` notation.
    pub primary_colour: String,

    /// Outline color, ASS `&HAABBGGRR` notation.
    pub outline_colour: String,

    /// Vertical anchor of the caption block as a fraction of frame height.
    pub height_frac: f32,

    /// Maximum caption block width as a fraction of frame width.
    pub width_frac: f32,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font: "Arial".to_string(),
            font_size: 50,
            bold: true,
            outline: 2,
            primary_colour: "&H00FFFFFF".to_string(),
            outline_colour: "&H00000000".to_string(),
            height_frac: 0.85,
            width_frac: 0.8,
        }
    }
}

impl CaptionStyle {
    /// Bottom margin (ASS `MarginV`) for a frame of the given height.
    ///
    /// ASS measures the margin from the bottom edge with bottom-center
    /// alignment, so anchoring at 85% of the height means a 15% margin.
    pub fn margin_v(&self, frame_height: u32) -> u32 {
        ((1.0 - self.height_frac).max(0.0) * frame_height as f32).round() as u32
    }

    /// Horizontal margin (ASS `MarginL`/`MarginR`) for a frame of the given width.
    ///
    /// The block is centered, so each side gets half of the unused width.
    pub fn margin_h(&self, frame_width: u32) -> u32 {
        (((1.0 - self.width_frac).max(0.0) / 2.0) * frame_width as f32).round() as u32
    }

    /// Render the `[V4+ Styles]` style line for the given frame dimensions.
    pub fn ass_style_line(&self, frame_width: u32, frame_height: u32) -> String {
        let bold = if self.bold { -1 } else { 0 };
        let margin_h = self.margin_h(frame_width);
        let margin_v = self.margin_v(frame_height);

        // Alignment 2 = bottom center (numpad layout). BorderStyle 1 =
        // outline + shadow.
        format!(
            "Style: Caption,{font},{size},{primary},{primary},{outline_col},&H64000000,\
             {bold},0,0,0,100,100,0,0,1,{outline},0,2,{margin_h},{margin_h},{margin_v},1",
            font = self.font,
            size = self.font_size,
            primary = self.primary_colour,
            outline_col = self.outline_colour,
            bold = bold,
            outline = self.outline,
        )
    }
}
