//! Line rasterization
//!
//! All lines include both end points. Horizontal, vertical and zero length lines never
//! go through Bresenham's stepping and are filled directly.
use crate::{DrawStyle, Error, Layer, RGBA};
use std::ops::BitOr;

/// Extra pixels emitted by Bresenham's algorithm at steps that advance the minor axis.
///
/// - `MAJOR` draws an extra pixel after the major step, before the minor step
/// - `MINOR` draws an extra pixel after the minor step, at the previous major position
///
/// Parallel single pixel lines drawn with both flags tile without gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Overlap(u8);

impl Overlap {
    pub const NONE: Overlap = Overlap(0);
    pub const MAJOR: Overlap = Overlap(1);
    pub const MINOR: Overlap = Overlap(2);
    pub const BOTH: Overlap = Overlap(3);

    pub fn contains(self, other: Overlap) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Overlap {
    type Output = Overlap;

    fn bitor(self, other: Overlap) -> Overlap {
        Overlap(self.0 | other.0)
    }
}

/// Color and pixel size used by the rasterizers
#[derive(Debug, Clone, Copy)]
pub(crate) struct Brush {
    color: RGBA,
    zoom: usize,
}

impl Brush {
    pub(crate) fn new(color: RGBA) -> Self {
        Self { color, zoom: 1 }
    }

    pub(crate) fn big(color: RGBA, zoom: usize) -> Self {
        Self {
            color,
            zoom: zoom.max(1),
        }
    }

    #[inline]
    pub(crate) fn put(&self, layer: &mut Layer, x: i32, y: i32) {
        if self.zoom == 1 {
            layer.plot(x, y, self.color);
        } else {
            layer.plot_big(x, y, self.zoom, self.color, None);
        }
    }

    #[inline]
    pub(crate) fn blend(&self, layer: &mut Layer, x: i32, y: i32, alpha: u8) {
        if alpha == 0 {
            return;
        }
        if self.zoom == 1 {
            layer.plot_blend(x, y, self.color, alpha);
        } else {
            layer.plot_big(x, y, self.zoom, self.color, Some(alpha));
        }
    }
}

/// Visit all points of the line from `(x0, y0)` to `(x1, y1)`
///
/// Bresenham's algorithm extended with overlap, see [`Overlap`]. Points might be
/// visited more than once when overlap is requested.
pub fn bresenham(
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    overlap: Overlap,
    mut plot: impl FnMut(i32, i32),
) {
    if y0 == y1 {
        for x in x0.min(x1)..=x0.max(x1) {
            plot(x, y0);
        }
        return;
    }
    if x0 == x1 {
        for y in y0.min(y1)..=y0.max(y1) {
            plot(x0, y);
        }
        return;
    }

    let (mut x, mut y) = (x0 as i64, y0 as i64);
    let (x1, y1) = (x1 as i64, y1 as i64);
    let dx = (x1 - x).abs();
    let dy = (y1 - y).abs();
    let sx = (x1 - x).signum();
    let sy = (y1 - y).signum();
    // coordinates never leave the [p0, p1] box, casts are lossless
    let mut emit = |x: i64, y: i64| plot(x as i32, y as i32);

    emit(x, y);
    if dx >= dy {
        let mut err = 2 * dy - dx;
        while x != x1 {
            x += sx;
            if err >= 0 {
                if overlap.contains(Overlap::MAJOR) {
                    emit(x, y);
                }
                y += sy;
                if overlap.contains(Overlap::MINOR) {
                    emit(x - sx, y);
                }
                err -= 2 * dx;
            }
            err += 2 * dy;
            emit(x, y);
        }
    } else {
        let mut err = 2 * dx - dy;
        while y != y1 {
            y += sy;
            if err >= 0 {
                if overlap.contains(Overlap::MAJOR) {
                    emit(x, y);
                }
                x += sx;
                if overlap.contains(Overlap::MINOR) {
                    emit(x, y - sy);
                }
                err -= 2 * dy;
            }
            err += 2 * dx;
            emit(x, y);
        }
    }
}

/// Unit offset perpendicular (along the minor axis) to the line direction
fn offset_axis(x0: i32, y0: i32, x1: i32, y1: i32) -> (i32, i32) {
    let dx = (x1 as i64 - x0 as i64).abs();
    let dy = (y1 as i64 - y0 as i64).abs();
    if dx > dy { (0, 1) } else { (1, 0) }
}

/// Parallel copy of the line moved `offset` pixels along `axis`
fn shifted(line: [i32; 4], axis: (i32, i32), offset: i32) -> [i32; 4] {
    let [x0, y0, x1, y1] = line;
    let (ox, oy) = (axis.0 * offset, axis.1 * offset);
    [
        x0.saturating_add(ox),
        y0.saturating_add(oy),
        x1.saturating_add(ox),
        y1.saturating_add(oy),
    ]
}

fn solid_line(layer: &mut Layer, brush: Brush, line: [i32; 4], overlap: Overlap) {
    let [x0, y0, x1, y1] = line;
    bresenham(x0, y0, x1, y1, overlap, |x, y| brush.put(layer, x, y));
}

/// Line built from `width` parallel single pixel lines, starting at offset `-(width / 2)`
fn thick_line(layer: &mut Layer, brush: Brush, line: [i32; 4], width: usize) {
    if width <= 1 {
        solid_line(layer, brush, line, Overlap::NONE);
        return;
    }
    let [x0, y0, x1, y1] = line;
    let axis = offset_axis(x0, y0, x1, y1);
    let width = width.min(i32::MAX as usize) as i32;
    let start = -(width / 2);
    for index in 0..width {
        // only the outermost lines skip overlap pixels
        let overlap = if index == 0 || index == width - 1 {
            Overlap::NONE
        } else {
            Overlap::BOTH
        };
        solid_line(layer, brush, shifted(line, axis, start + index), overlap);
    }
}

/// Single pixel anti-aliased line
///
/// At each major step the ideal line passes between two pixels, the distance from the
/// first one (normalized to `[0, 1)`) is the coverage fraction `f`. First pixel is blended
/// with `alpha * (1 - f)` and the second with `alpha * f`.
fn aa_line(layer: &mut Layer, brush: Brush, line: [i32; 4]) {
    let [x0, y0, x1, y1] = line;
    if x0 == x1 || y0 == y1 {
        solid_line(layer, brush, line, Overlap::NONE);
        return;
    }
    let alpha = brush.color.alpha() as i64;
    let x_major = (x1 as i64 - x0 as i64).abs() > (y1 as i64 - y0 as i64).abs();
    // (major, minor) coordinates ordered along the major axis
    let (p0, p1) = if x_major {
        ((x0 as i64, y0 as i64), (x1 as i64, y1 as i64))
    } else {
        ((y0 as i64, x0 as i64), (y1 as i64, x1 as i64))
    };
    let ((m0, n0), (m1, n1)) = if p0.0 <= p1.0 { (p0, p1) } else { (p1, p0) };
    let major = m1 - m0;
    let minor = (n1 - n0).abs();
    let step = (n1 - n0).signum();

    let mut err = 0;
    let mut n = n0;
    for m in m0..=m1 {
        let far = alpha * err / major;
        let near = alpha - far;
        let (m, n_near, n_far) = (m as i32, n as i32, (n + step) as i32);
        if x_major {
            brush.blend(layer, m, n_near, near as u8);
            brush.blend(layer, m, n_far, far as u8);
        } else {
            brush.blend(layer, n_near, m, near as u8);
            brush.blend(layer, n_far, m, far as u8);
        }
        err += minor;
        if err >= major {
            err -= major;
            n += step;
        }
    }
}

/// Thick anti-aliased line, only the two outermost lines are anti-aliased
fn thick_aa_line(layer: &mut Layer, brush: Brush, line: [i32; 4], width: usize) {
    let [x0, y0, x1, y1] = line;
    if x0 == x1 || y0 == y1 {
        thick_line(layer, brush, line, width);
        return;
    }
    if width <= 1 {
        aa_line(layer, brush, line);
        return;
    }
    let axis = offset_axis(x0, y0, x1, y1);
    let width = width.min(i32::MAX as usize) as i32;
    let minus = -(width / 2);
    let plus = width + minus - 1;
    aa_line(layer, brush, shifted(line, axis, minus));
    aa_line(layer, brush, shifted(line, axis, plus));
    for offset in minus + 1..plus {
        solid_line(layer, brush, shifted(line, axis, offset), Overlap::BOTH);
    }
}

/// Draw line with the foreground color and stroke width of the style
pub fn draw_line(
    layer: &mut Layer,
    style: &DrawStyle,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
) -> Result<(), Error> {
    layer.ensure_init("draw_line")?;
    let brush = Brush::new(style.foreground());
    thick_line(layer, brush, [x0, y0, x1, y1], style.stroke_width());
    Ok(())
}

/// Draw single pixel line with explicit overlap, stroke width is ignored
pub fn draw_line_overlap(
    layer: &mut Layer,
    style: &DrawStyle,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    overlap: Overlap,
) -> Result<(), Error> {
    layer.ensure_init("draw_line_overlap")?;
    solid_line(layer, Brush::new(style.foreground()), [x0, y0, x1, y1], overlap);
    Ok(())
}

/// Draw anti-aliased line with the foreground color and stroke width of the style
pub fn draw_line_aa(
    layer: &mut Layer,
    style: &DrawStyle,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
) -> Result<(), Error> {
    layer.ensure_init("draw_line_aa")?;
    let brush = Brush::new(style.foreground());
    thick_aa_line(layer, brush, [x0, y0, x1, y1], style.stroke_width());
    Ok(())
}

/// Same as [`draw_line`] but every logical pixel is a `zoom x zoom` block
pub fn draw_big_line(
    layer: &mut Layer,
    style: &DrawStyle,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
) -> Result<(), Error> {
    layer.ensure_init("draw_big_line")?;
    let brush = Brush::big(style.foreground(), style.zoom());
    thick_line(layer, brush, [x0, y0, x1, y1], style.stroke_width());
    Ok(())
}

/// Same as [`draw_line_aa`] but every logical pixel is a `zoom x zoom` block
pub fn draw_big_line_aa(
    layer: &mut Layer,
    style: &DrawStyle,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
) -> Result<(), Error> {
    layer.ensure_init("draw_big_line_aa")?;
    let brush = Brush::big(style.foreground(), style.zoom());
    thick_aa_line(layer, brush, [x0, y0, x1, y1], style.stroke_width());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PixelFormat;

    fn points(x0: i32, y0: i32, x1: i32, y1: i32, overlap: Overlap) -> Vec<(i32, i32)> {
        let mut result = Vec::new();
        bresenham(x0, y0, x1, y1, overlap, |x, y| result.push((x, y)));
        result
    }

    fn painted(layer: &Layer) -> Vec<(i32, i32)> {
        layer
            .fb()
            .pixels()
            .filter(|(_, _, c)| c.alpha() != 0)
            .map(|(x, y, _)| (x as i32, y as i32))
            .collect()
    }

    #[test]
    fn test_bresenham() {
        assert_eq!(
            points(0, 0, 4, 2, Overlap::NONE),
            vec![(0, 0), (1, 1), (2, 1), (3, 2), (4, 2)]
        );
        // steep line
        assert_eq!(
            points(0, 0, 2, 4, Overlap::NONE),
            vec![(0, 0), (1, 1), (1, 2), (2, 3), (2, 4)]
        );
        // diagonal
        assert_eq!(
            points(3, 3, 0, 0, Overlap::NONE),
            vec![(3, 3), (2, 2), (1, 1), (0, 0)]
        );
    }

    #[test]
    fn test_bresenham_steps() {
        for (x1, y1) in [(9, 1), (9, 4), (9, 8), (9, -3), (-9, 5), (-9, -9)] {
            let pts = points(0, 0, x1, y1, Overlap::NONE);
            assert_eq!(pts.len(), 10);
            assert_eq!(pts.first(), Some(&(0, 0)));
            assert_eq!(pts.last(), Some(&(x1, y1)));
            for pair in pts.windows(2) {
                let (dx, dy) = (pair[1].0 - pair[0].0, pair[1].1 - pair[0].1);
                assert_eq!(dx, x1.signum());
                assert!(dy == 0 || dy == y1.signum(), "{:?}", pair);
            }
        }
    }

    #[test]
    fn test_bresenham_overlap() {
        assert_eq!(
            points(0, 0, 4, 2, Overlap::MAJOR),
            vec![(0, 0), (1, 0), (1, 1), (2, 1), (3, 1), (3, 2), (4, 2)]
        );
        assert_eq!(
            points(0, 0, 4, 2, Overlap::MINOR),
            vec![(0, 0), (0, 1), (1, 1), (2, 1), (2, 2), (3, 2), (4, 2)]
        );
        assert_eq!(points(0, 0, 4, 2, Overlap::MAJOR | Overlap::MINOR).len(), 9);
        assert!(Overlap::BOTH.contains(Overlap::MINOR));
        assert!(!Overlap::MAJOR.contains(Overlap::MINOR));
    }

    #[test]
    fn test_straight_lines() {
        assert_eq!(
            points(5, 2, 2, 2, Overlap::BOTH),
            vec![(2, 2), (3, 2), (4, 2), (5, 2)]
        );
        assert_eq!(points(1, 3, 1, 1, Overlap::NONE), vec![(1, 1), (1, 2), (1, 3)]);
        assert_eq!(points(7, 7, 7, 7, Overlap::NONE), vec![(7, 7)]);
    }

    #[test]
    fn test_thick_straight_line() -> Result<(), Error> {
        let mut layer = Layer::new(10, 10, PixelFormat::Rgba8888);
        let style = DrawStyle::default().with_stroke_width(3);
        draw_line(&mut layer, &style, 2, 5, 6, 5)?;
        let mut expected = Vec::new();
        for y in 4..=6 {
            for x in 2..=6 {
                expected.push((x, y));
            }
        }
        assert_eq!(painted(&layer), expected);

        // even width puts the extra line on the negative side
        let mut layer = Layer::new(10, 10, PixelFormat::Rgba8888);
        let style = DrawStyle::default().with_stroke_width(4);
        draw_line(&mut layer, &style, 5, 1, 5, 2)?;
        assert_eq!(
            painted(&layer),
            vec![(3, 1), (4, 1), (5, 1), (6, 1), (3, 2), (4, 2), (5, 2), (6, 2)]
        );
        Ok(())
    }

    #[test]
    fn test_thick_line_no_gaps() -> Result<(), Error> {
        let mut layer = Layer::new(20, 20, PixelFormat::Rgba8888);
        let style = DrawStyle::default().with_stroke_width(3);
        draw_line(&mut layer, &style, 2, 2, 15, 9)?;
        for x in 2..=15 {
            let column: Vec<_> = (0..20)
                .filter(|y| layer.get_pixel(x, *y).map(|c| c.alpha() != 0) == Ok(true))
                .collect();
            assert!(column.len() >= 3, "column {} {:?}", x, column);
            for pair in column.windows(2) {
                assert_eq!(pair[1] - pair[0], 1, "gap in column {}", x);
            }
        }
        Ok(())
    }

    #[test]
    fn test_aa_line() -> Result<(), Error> {
        let mut layer = Layer::new(12, 6, PixelFormat::Rgb888);
        layer.fb_mut().fill(RGBA::BLACK);
        draw_line_aa(&mut layer, &DrawStyle::default(), 0, 0, 10, 3)?;
        assert_eq!(layer.get_pixel(0, 0)?, RGBA::WHITE);
        assert_eq!(layer.get_pixel(10, 3)?, RGBA::WHITE);
        for x in 0..=10 {
            let total: u32 = (0..6)
                .map(|y| layer.get_pixel(x, y).map(|c| c.red() as u32).unwrap_or(0))
                .sum();
            assert_eq!(total, 255, "column {}", x);
        }
        Ok(())
    }

    #[test]
    fn test_aa_straight_line_is_solid() -> Result<(), Error> {
        let style = DrawStyle::default().with_stroke_width(2);
        let mut aa = Layer::new(8, 8, PixelFormat::Rgba8888);
        let mut solid = Layer::new(8, 8, PixelFormat::Rgba8888);
        draw_line_aa(&mut aa, &style, 1, 3, 6, 3)?;
        draw_line(&mut solid, &style, 1, 3, 6, 3)?;
        assert_eq!(aa.fb(), solid.fb());
        Ok(())
    }

    #[test]
    fn test_thick_aa_interior_is_solid() -> Result<(), Error> {
        let red = RGBA::new(255, 0, 0, 255);
        let style = DrawStyle::new(red, RGBA::TRANSPARENT).with_stroke_width(3);
        let mut layer = Layer::new(30, 20, PixelFormat::Rgba8888);
        draw_line_aa(&mut layer, &style, 2, 5, 25, 12)?;
        bresenham(2, 5, 25, 12, Overlap::NONE, |x, y| {
            assert_eq!(layer.get_pixel(x, y), Ok(red));
        });
        Ok(())
    }

    #[test]
    fn test_big_line() -> Result<(), Error> {
        let mut layer = Layer::new(8, 4, PixelFormat::Rgba8888);
        let mut style = DrawStyle::default();
        style.set_zoom(2);
        draw_big_line(&mut layer, &style, 0, 0, 2, 0)?;
        let expected: Vec<_> = (0..2).flat_map(|y| (0..6).map(move |x| (x, y))).collect();
        assert_eq!(painted(&layer), expected);

        let mut layer = Layer::new(8, 8, PixelFormat::Rgba8888);
        draw_big_line_aa(&mut layer, &style, 0, 0, 3, 1)?;
        assert_eq!(layer.get_pixel(1, 1)?, RGBA::WHITE);
        assert_eq!(layer.get_pixel(7, 3)?, RGBA::WHITE);
        Ok(())
    }

    #[test]
    fn test_clipped_and_uninitialized() -> Result<(), Error> {
        let mut layer = Layer::new(4, 4, PixelFormat::Rgba8888);
        draw_line(&mut layer, &DrawStyle::default(), -10, -10, 10, 10)?;
        assert_eq!(painted(&layer), vec![(0, 0), (1, 1), (2, 2), (3, 3)]);

        let mut empty = Layer::default();
        assert_eq!(
            draw_line(&mut empty, &DrawStyle::default(), 0, 0, 1, 1),
            Err(Error::NotInitialized)
        );
        Ok(())
    }
}
