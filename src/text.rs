//! Bitmap font text rendering
use crate::{DrawStyle, Error, Framebuffer, Layer};
use std::collections::HashMap;

/// Placement of a single character inside of the font atlas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Glyph {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    /// Vertical offset from the text origin to the top of the glyph
    #[cfg_attr(feature = "serde", serde(default))]
    pub yoffset: i32,
    /// Cursor advance after the glyph
    pub xadvance: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TextFlags {
    /// Ignore kerning pairs
    pub no_kerning: bool,
    /// Advance every glyph by the font monospace width, implies `no_kerning`
    pub monospace: bool,
    /// Use atlas colors instead of tinting with the foreground color
    pub keep_color: bool,
    /// Blend glyph pixels instead of overwriting
    pub blend: bool,
}

/// Bitmap font: glyph atlas image with per character metrics
#[derive(Debug, Clone)]
pub struct Font {
    atlas: Framebuffer,
    glyphs: HashMap<char, Glyph>,
    kerning: HashMap<(char, char), i32>,
    alpha: f32,
    monospace: i32,
}

impl Font {
    pub fn new(atlas: Framebuffer) -> Self {
        Self {
            atlas,
            glyphs: HashMap::new(),
            kerning: HashMap::new(),
            alpha: 1.0,
            monospace: 0,
        }
    }

    pub fn atlas(&self) -> &Framebuffer {
        &self.atlas
    }

    pub fn add_glyph(&mut self, ch: char, glyph: Glyph) -> &mut Self {
        self.glyphs.insert(ch, glyph);
        self
    }

    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    pub fn set_kerning(&mut self, first: char, second: char, amount: i32) -> &mut Self {
        self.kerning.insert((first, second), amount);
        self
    }

    /// Cursor adjustment between `first` and `second`, zero when there is no pair
    pub fn kerning(&self, first: Option<char>, second: char) -> i32 {
        first
            .and_then(|first| self.kerning.get(&(first, second)))
            .copied()
            .unwrap_or(0)
    }

    /// Global glyph alpha multiplier
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f32) -> &mut Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Advance used in monospace mode
    pub fn monospace(&self) -> i32 {
        self.monospace
    }

    pub fn set_monospace(&mut self, advance: i32) -> &mut Self {
        self.monospace = advance;
        self
    }

    /// Create font from the atlas and JSON metrics
    ///
    /// ```json
    /// {
    ///   "alpha": 1.0,
    ///   "monospace": 8,
    ///   "glyphs": {"A": {"x": 0, "y": 0, "width": 7, "height": 9, "xadvance": 8}},
    ///   "kerning": [{"first": "A", "second": "V", "amount": -1}]
    /// }
    /// ```
    #[cfg(feature = "serde")]
    pub fn load_metrics_json(
        atlas: Framebuffer,
        input: impl std::io::Read,
    ) -> Result<Self, serde_json::Error> {
        let metrics: FontMetrics = serde_json::from_reader(input)?;
        let mut font = Font::new(atlas);
        font.set_alpha(metrics.alpha).set_monospace(metrics.monospace);
        font.glyphs = metrics.glyphs;
        for pair in metrics.kerning {
            font.set_kerning(pair.first, pair.second, pair.amount);
        }
        Ok(font)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct KerningPair {
    first: char,
    second: char,
    amount: i32,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct FontMetrics {
    #[serde(default = "FontMetrics::default_alpha")]
    alpha: f32,
    #[serde(default)]
    monospace: i32,
    glyphs: HashMap<char, Glyph>,
    #[serde(default)]
    kerning: Vec<KerningPair>,
}

#[cfg(feature = "serde")]
impl FontMetrics {
    fn default_alpha() -> f32 {
        1.0
    }
}

/// Draw text with its origin (top-left corner of the first glyph) at `(x, y)`
///
/// Characters missing from the font are skipped. Glyphs that do not fit entirely
/// inside of the layer are skipped without advancing the cursor, and drawing stops
/// once the cursor passes the right edge of the layer.
pub fn draw_text(
    layer: &mut Layer,
    style: &DrawStyle,
    font: &Font,
    text: &str,
    x: i32,
    y: i32,
    flags: TextFlags,
) -> Result<(), Error> {
    layer.ensure_init("draw_text")?;
    if font.atlas.is_empty() {
        tracing::warn!("draw_text: font atlas is not initialized");
        return Err(Error::NotInitialized);
    }
    let foreground = style.foreground();
    let (layer_width, layer_height) = (layer.width() as i64, layer.height() as i64);
    let kerning = !flags.no_kerning && !flags.monospace;

    let mut cursor = x as i64;
    let mut prev = None;
    for ch in text.chars() {
        if cursor >= layer_width {
            break;
        }
        let Some(glyph) = font.glyph(ch) else {
            tracing::debug!("draw_text: character {:?} is missing from the font", ch);
            continue;
        };
        if kerning {
            cursor += font.kerning(prev, ch) as i64;
        }
        let top = y as i64 + glyph.yoffset as i64;
        if cursor < 0
            || top < 0
            || cursor + glyph.width as i64 > layer_width
            || top + glyph.height as i64 > layer_height
        {
            tracing::debug!("draw_text: character {:?} does not fit into the layer", ch);
            continue;
        }

        for gy in 0..glyph.height {
            for gx in 0..glyph.width {
                let Some(src) = font.atlas.get(glyph.x + gx, glyph.y + gy) else {
                    continue;
                };
                let alpha = (src.alpha() as f32 * font.alpha) as u8;
                let [r, g, b] = src.to_rgb();
                if alpha == 0 || r as u32 + g as u32 + b as u32 == 0 {
                    continue;
                }
                let mut color = src.with_alpha(alpha);
                if !flags.keep_color {
                    color = color.tint(foreground);
                }
                // glyph fits into the layer, coordinates are in i32 range
                let px = (cursor + gx as i64) as i32;
                let py = (top + gy as i64) as i32;
                if flags.blend {
                    layer.plot_blend(px, py, color, color.alpha());
                } else {
                    layer.plot(px, py, color);
                }
            }
        }

        cursor += if flags.monospace {
            font.monospace as i64
        } else {
            glyph.xadvance as i64
        };
        prev = Some(ch);
    }
    Ok(())
}
