use crate::RGBA;

/// Current drawing style: colors, stroke width and zoom.
///
/// Passed by reference to every drawing call. Note that rectangles use the
/// background color for their border and the foreground color for the fill.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DrawStyle {
    foreground: RGBA,
    background: RGBA,
    stroke_width: usize,
    zoom: usize,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            foreground: RGBA::WHITE,
            background: RGBA::TRANSPARENT,
            stroke_width: 1,
            zoom: 1,
        }
    }
}

impl DrawStyle {
    pub fn new(foreground: RGBA, background: RGBA) -> Self {
        Self {
            foreground,
            background,
            ..Self::default()
        }
    }

    pub fn foreground(&self) -> RGBA {
        self.foreground
    }

    pub fn set_foreground(&mut self, color: RGBA) -> &mut Self {
        self.foreground = color;
        self
    }

    pub fn background(&self) -> RGBA {
        self.background
    }

    pub fn set_background(&mut self, color: RGBA) -> &mut Self {
        self.background = color;
        self
    }

    /// Stroke width, always at least `1`
    pub fn stroke_width(&self) -> usize {
        self.stroke_width.max(1)
    }

    pub fn set_stroke_width(&mut self, width: usize) -> &mut Self {
        self.stroke_width = width.max(1);
        self
    }

    /// Size of the side of the big pixel block, zoom `0` behaves as `1`
    pub fn zoom(&self) -> usize {
        self.zoom.max(1)
    }

    pub fn set_zoom(&mut self, zoom: usize) -> &mut Self {
        self.zoom = zoom;
        self
    }

    pub fn swap_colors(&mut self) -> &mut Self {
        std::mem::swap(&mut self.foreground, &mut self.background);
        self
    }

    /// Copy of the style with a different stroke width
    pub fn with_stroke_width(mut self, width: usize) -> Self {
        self.set_stroke_width(width);
        self
    }

    /// Copy of the style with a different foreground color
    pub fn with_foreground(mut self, color: RGBA) -> Self {
        self.foreground = color;
        self
    }

    #[cfg(feature = "serde")]
    pub fn from_json(input: impl std::io::Read) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(input)
    }
}
