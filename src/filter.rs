//! Whole layer filters
use crate::{Error, Framebuffer, Layer, RGBA};

/// Channel delta used by [`Filter::Lighten`] and [`Filter::Darken`]
pub const LIGHTEN_AMOUNT: u8 = 50;

/// Permanent transformation of the layer pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Filter {
    /// Add [`LIGHTEN_AMOUNT`] to color channels
    Lighten,
    /// Subtract [`LIGHTEN_AMOUNT`] from color channels
    Darken,
    /// Dotted black one pixel border along the layer edges
    Border,
    /// Crop to the bounding box of pixels with non-zero alpha
    AutocropAlpha,
    /// Crop to the bounding box of pixels with a color different from the first pixel
    AutocropFirst,
    /// Make pixels with the same color as the first pixel transparent
    BlendFirst,
    /// Mirror rows about the horizontal midline
    FlipX,
    /// Mirror columns about the vertical midline
    FlipY,
    Grayscale,
    ReverseColor,
    /// Red takes green, green takes blue, blue takes red
    RotateColor,
    /// 3x3 box blur
    Blur,
}

/// Apply filter to the layer in place
///
/// Autocrop filters change the layer size and position, if no pixel qualifies the
/// layer is left untouched.
pub fn apply_filter(layer: &mut Layer, filter: Filter) -> Result<(), Error> {
    layer.ensure_init("apply_filter")?;
    tracing::debug_span!("[filter]", filter = ?filter).in_scope(|| {
        match filter {
            Filter::Lighten => map_pixels(layer.fb_mut(), |c| c.lighten(LIGHTEN_AMOUNT)),
            Filter::Darken => map_pixels(layer.fb_mut(), |c| c.darken(LIGHTEN_AMOUNT)),
            Filter::Grayscale => map_pixels(layer.fb_mut(), RGBA::grayscale),
            Filter::ReverseColor => map_pixels(layer.fb_mut(), RGBA::reverse),
            Filter::RotateColor => map_pixels(layer.fb_mut(), RGBA::rotate),
            Filter::BlendFirst => {
                if let Some(first) = layer.fb().get(0, 0) {
                    map_pixels(layer.fb_mut(), |c| {
                        if c.same_rgb(first) { c.with_alpha(0) } else { c }
                    });
                }
            }
            Filter::Border => border(layer.fb_mut()),
            Filter::FlipX => flip_rows(layer.fb_mut()),
            Filter::FlipY => flip_columns(layer.fb_mut()),
            Filter::AutocropAlpha => autocrop(layer, |c| c.alpha() != 0)?,
            Filter::AutocropFirst => {
                if let Some(first) = layer.fb().get(0, 0) {
                    autocrop(layer, |c| !c.same_rgb(first))?;
                }
            }
            Filter::Blur => {
                let blurred = blur(layer.fb());
                layer.replace_fb(blurred)?;
            }
        }
        Ok(())
    })
}

fn map_pixels(fb: &mut Framebuffer, f: impl Fn(RGBA) -> RGBA) {
    for y in 0..fb.height() {
        for x in 0..fb.width() {
            if let Some(color) = fb.get(x, y) {
                fb.set(x, y, f(color));
            }
        }
    }
}

/// Even positions are opaque black, odd positions are transparent
fn border(fb: &mut Framebuffer) {
    let dot = |position: usize| {
        if position % 2 == 0 {
            RGBA::BLACK
        } else {
            RGBA::TRANSPARENT
        }
    };
    let (width, height) = (fb.width(), fb.height());
    for x in 0..width {
        fb.set(x, 0, dot(x));
        fb.set(x, height.saturating_sub(1), dot(x));
    }
    for y in 0..height {
        fb.set(0, y, dot(y));
        fb.set(width.saturating_sub(1), y, dot(y));
    }
}

fn swap_pixels(fb: &mut Framebuffer, a: (usize, usize), b: (usize, usize)) {
    if let (Some(ca), Some(cb)) = (fb.get(a.0, a.1), fb.get(b.0, b.1)) {
        fb.set(a.0, a.1, cb);
        fb.set(b.0, b.1, ca);
    }
}

fn flip_rows(fb: &mut Framebuffer) {
    let height = fb.height();
    for y in 0..height / 2 {
        for x in 0..fb.width() {
            swap_pixels(fb, (x, y), (x, height - 1 - y));
        }
    }
}

fn flip_columns(fb: &mut Framebuffer) {
    let width = fb.width();
    for x in 0..width / 2 {
        for y in 0..fb.height() {
            swap_pixels(fb, (x, y), (width - 1 - x, y));
        }
    }
}

fn autocrop(layer: &mut Layer, keep: impl Fn(RGBA) -> bool) -> Result<(), Error> {
    let bbox = layer
        .fb()
        .pixels()
        .filter(|(_, _, color)| keep(*color))
        .fold(None, |bbox, (x, y, _)| match bbox {
            None => Some((x, y, x, y)),
            Some((minx, miny, maxx, maxy)) => {
                Some((minx.min(x), miny.min(y), maxx.max(x), maxy.max(y)))
            }
        });
    match bbox {
        Some((minx, miny, maxx, maxy)) => layer.crop(minx, miny, maxx + 1, maxy + 1),
        None => {
            tracing::debug!("autocrop: no pixel qualifies, layer is left as is");
            Ok(())
        }
    }
}

/// Average of each pixel and its neighbors that exist inside of the buffer
fn blur(src: &Framebuffer) -> Framebuffer {
    let (width, height) = (src.width(), src.height());
    Framebuffer::new_with(width, height, src.format(), |row, col| {
        let mut sum = [0u32; 4];
        let mut count = 0u32;
        for y in row.saturating_sub(1)..(row + 2).min(height) {
            for x in col.saturating_sub(1)..(col + 2).min(width) {
                if let Some(color) = src.get(x, y) {
                    for (acc, channel) in sum.iter_mut().zip(color.to_rgba()) {
                        *acc += channel as u32;
                    }
                    count += 1;
                }
            }
        }
        let [r, g, b, a] = sum.map(|acc| (acc / count.max(1)) as u8);
        RGBA::new(r, g, b, a)
    })
}
