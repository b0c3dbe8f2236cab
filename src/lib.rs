//! Software 2D rasterization and compositing of framebuffer layers.
//!
//! Intended for direct framebuffer rendering without GPU or windowing system.
//!
//! Main features:
//!  - Thick and anti-aliased lines, circles, bordered rectangles
//!  - Bitmap font text with kerning and tinting
//!  - Whole layer filters (color transforms, flips, autocrop, box blur)
//!  - Layer stack flattening and PNG import/export
//!
#![deny(warnings)]

mod circle;
#[cfg(feature = "png")]
mod codec;
mod color;
mod compose;
mod error;
mod fill;
mod filter;
mod framebuffer;
mod layer;
mod line;
mod rect;
mod style;
mod text;

pub use circle::{draw_circle, draw_circle_aa, midpoint_circle};
#[cfg(feature = "png")]
pub use codec::{decode_png, encode_png, load_png, read_png, save_png};
pub use color::{ColorError, RGBA};
pub use compose::flatten;
pub use error::Error;
pub use fill::flood_fill;
pub use filter::{Filter, LIGHTEN_AMOUNT, apply_filter};
pub use framebuffer::{Framebuffer, PixelFormat, Shape};
pub use layer::{Checks, Layer, LayerFlags, View};
pub use line::{
    Overlap, bresenham, draw_big_line, draw_big_line_aa, draw_line, draw_line_aa,
    draw_line_overlap,
};
pub use rect::{blend_pixel, draw_pixel, draw_rectangle, paint_layer};
pub use style::DrawStyle;
pub use text::{Font, Glyph, TextFlags, draw_text};
