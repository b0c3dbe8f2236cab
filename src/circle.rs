//! Midpoint circle rasterization
use crate::{DrawStyle, Error, Layer, line::Brush};

/// Visit all points of the circle outline, each octant point is mirrored 8 ways
///
/// Points on the octant boundaries might be visited more than once.
pub fn midpoint_circle(xm: i32, ym: i32, radius: i32, mut plot: impl FnMut(i32, i32)) {
    let (xm, ym) = (xm as i64, ym as i64);
    let mut x = 0i64;
    let mut y = radius.max(0) as i64;
    let mut d = 1 - y;
    let mut emit = |x: i64, y: i64| {
        if (i32::MIN as i64..=i32::MAX as i64).contains(&x)
            && (i32::MIN as i64..=i32::MAX as i64).contains(&y)
        {
            plot(x as i32, y as i32);
        }
    };
    while x <= y {
        emit(xm + x, ym + y);
        emit(xm - x, ym + y);
        emit(xm + x, ym - y);
        emit(xm - x, ym - y);
        emit(xm + y, ym + x);
        emit(xm - y, ym + x);
        emit(xm + y, ym - x);
        emit(xm - y, ym - x);
        x += 1;
        if d < 0 {
            d += 2 * x + 1;
        } else {
            y -= 1;
            d += 2 * (x - y) + 1;
        }
    }
}

/// Inner and outer outline radii of a circle drawn with the stroke width
fn ring(radius: i32, width: i32) -> (i32, i32) {
    let inner = (radius - width / 2).max(0);
    let outer = radius.saturating_add(width - width / 2 - 1);
    (inner, outer)
}

/// Horizontal extent of the ring in each row of the layer, `|dx|` from the center
///
/// Span of a row starts at the inner outline (or the center when the row passes
/// above the inner circle) and ends at the outer outline.
fn ring_spans(layer: &Layer, xm: i32, ym: i32, inner: i32, outer: i32) -> Vec<Option<(i64, i64)>> {
    let rows = layer.height();
    let mut inner_min: Vec<Option<i64>> = vec![None; rows];
    let mut outer_max: Vec<Option<i64>> = vec![None; rows];
    let row = |y: i32| usize::try_from(y).ok().filter(|y| *y < rows);
    midpoint_circle(xm, ym, inner, |x, y| {
        if let Some(y) = row(y) {
            let dx = (x as i64 - xm as i64).abs();
            inner_min[y] = Some(inner_min[y].map_or(dx, |min| min.min(dx)));
        }
    });
    midpoint_circle(xm, ym, outer, |x, y| {
        if let Some(y) = row(y) {
            let dx = (x as i64 - xm as i64).abs();
            outer_max[y] = Some(outer_max[y].map_or(dx, |max| max.max(dx)));
        }
    });
    inner_min
        .into_iter()
        .zip(outer_max)
        .map(|(min, max)| Some((min.unwrap_or(0), max?)))
        .collect()
}

/// Visit every layer pixel of the ring, both halves of each row span are clipped to the layer
fn fill_ring(
    layer: &mut Layer,
    xm: i32,
    ym: i32,
    inner: i32,
    outer: i32,
    mut plot: impl FnMut(&mut Layer, i32, i32),
) {
    let spans = ring_spans(layer, xm, ym, inner, outer);
    let last = layer.width() as i64 - 1;
    let xm = xm as i64;
    for (y, span) in spans.into_iter().enumerate() {
        let Some((lo, hi)) = span else {
            continue;
        };
        // rows of the layer fit into i32
        let y = y as i32;
        for (start, end) in [(xm + lo, xm + hi), (xm - hi, xm - lo)] {
            for x in start.max(0)..=end.min(last) {
                plot(layer, x as i32, y);
            }
        }
    }
}

/// Draw circle outline with the foreground color and stroke width of the style
///
/// Thick circle is the ring between two concentric outlines `radius - width / 2`
/// and `radius + width - width / 2 - 1`, filled row by row.
pub fn draw_circle(
    layer: &mut Layer,
    style: &DrawStyle,
    xm: i32,
    ym: i32,
    radius: i32,
) -> Result<(), Error> {
    layer.ensure_init("draw_circle")?;
    if radius < 0 {
        tracing::warn!("draw_circle: negative radius {}", radius);
        return Err(Error::OutOfRange);
    }
    let brush = Brush::new(style.foreground());
    let width = style.stroke_width().min(i32::MAX as usize) as i32;
    if width == 1 {
        midpoint_circle(xm, ym, radius, |x, y| brush.put(layer, x, y));
        return Ok(());
    }
    let (inner, outer) = ring(radius, width);
    fill_ring(layer, xm, ym, inner, outer, |layer, x, y| brush.put(layer, x, y));
    Ok(())
}

/// Draw anti-aliased circle with the foreground color and stroke width of the style
///
/// Ring is the same as the one drawn by [`draw_circle`], pixels within one pixel
/// outside of it are blended with the foreground proportionally to their distance.
pub fn draw_circle_aa(
    layer: &mut Layer,
    style: &DrawStyle,
    xm: i32,
    ym: i32,
    radius: i32,
) -> Result<(), Error> {
    layer.ensure_init("draw_circle_aa")?;
    if radius < 0 {
        tracing::warn!("draw_circle_aa: negative radius {}", radius);
        return Err(Error::OutOfRange);
    }
    let color = style.foreground();
    let brush = Brush::new(color);
    let width = style.stroke_width().min(i32::MAX as usize) as i32;
    let (inner, outer) = ring(radius, width);
    tracing::debug_span!("[draw_circle_aa]", inner, outer).in_scope(|| {
        let spans = ring_spans(layer, xm, ym, inner, outer);
        let (xm, ym) = (xm as i64, ym as i64);
        let reach = outer as i64 + 1;
        let last_col = layer.width() as i64 - 1;
        let last_row = layer.height() as i64 - 1;
        for y in (ym - reach).max(0)..=(ym + reach).min(last_row) {
            let span = spans.get(y as usize).copied().flatten();
            for x in (xm - reach).max(0)..=(xm + reach).min(last_col) {
                let (dx, dy) = (x - xm, y - ym);
                // coordinates are inside of the layer, they fit into i32
                let (px, py) = (x as i32, y as i32);
                if span.is_some_and(|(lo, hi)| (lo..=hi).contains(&dx.abs())) {
                    brush.put(layer, px, py);
                    continue;
                }
                let dist = (dx as f64).hypot(dy as f64);
                let coverage = (outer as f64 + 1.0 - dist)
                    .min(dist - inner as f64 + 1.0)
                    .clamp(0.0, 1.0);
                if coverage >= 1.0 {
                    brush.put(layer, px, py);
                } else {
                    brush.blend(layer, px, py, (color.alpha() as f64 * coverage) as u8);
                }
            }
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PixelFormat, RGBA};
    use std::collections::BTreeSet;

    fn outline(radius: i32) -> BTreeSet<(i32, i32)> {
        let mut points = BTreeSet::new();
        midpoint_circle(0, 0, radius, |x, y| {
            points.insert((x, y));
        });
        points
    }

    #[test]
    fn test_midpoint_circle() {
        assert_eq!(outline(0), BTreeSet::from([(0, 0)]));
        assert_eq!(
            outline(1),
            BTreeSet::from([(-1, 0), (0, -1), (0, 1), (1, 0)])
        );
        for radius in [5, 12, 31] {
            let points = outline(radius);
            for (x, y) in points.iter() {
                // symmetric and close to the ideal circle
                assert!(points.contains(&(*y, *x)));
                assert!(points.contains(&(-*x, *y)));
                let dist = ((x * x + y * y) as f64).sqrt();
                assert!((dist - radius as f64).abs() < 1.0, "{} {:?}", radius, (x, y));
            }
            assert!(points.contains(&(radius, 0)));
            assert!(points.contains(&(0, -radius)));
        }
    }

    #[test]
    fn test_thick_circle_ring() -> Result<(), Error> {
        let mut layer = Layer::new(41, 41, PixelFormat::Rgba8888);
        let style = DrawStyle::default().with_stroke_width(5);
        draw_circle(&mut layer, &style, 20, 20, 12)?;
        // inner radius 10, outer radius 14
        for y in 0..41 {
            for x in 0..41 {
                let (dx, dy) = ((x - 20) as f64, (y - 20) as f64);
                let dist = (dx * dx + dy * dy).sqrt();
                let color = layer.get_pixel(x, y)?;
                if dist < 9.0 || dist > 15.0 {
                    assert_eq!(color, RGBA::TRANSPARENT, "({}, {})", x, y);
                } else if (10.5..=13.5).contains(&dist) {
                    assert_eq!(color, RGBA::WHITE, "({}, {})", x, y);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_thick_circle_coverage() -> Result<(), Error> {
        for width in 2..=6 {
            for radius in 4..=40 {
                let mut layer = Layer::new(101, 101, PixelFormat::Rgba8888);
                let style = DrawStyle::default().with_stroke_width(width as usize);
                draw_circle(&mut layer, &style, 50, 50, radius)?;
                let (inner, outer) = ring(radius, width);
                let (inner, outer) = (inner as f64, outer as f64);
                for (x, y, color) in layer.fb().pixels() {
                    let dist = (x as f64 - 50.0).hypot(y as f64 - 50.0);
                    if inner + 0.3 < dist && dist < outer - 0.3 {
                        assert_eq!(color, RGBA::WHITE, "{} {} ({}, {})", width, radius, x, y);
                    } else if dist <= inner - 1.0 || dist >= outer + 1.0 {
                        assert_eq!(color, RGBA::TRANSPARENT, "{} {} ({}, {})", width, radius, x, y);
                    }
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_circle_aa() -> Result<(), Error> {
        let style = DrawStyle::default().with_stroke_width(3);
        let mut layer = Layer::new(41, 41, PixelFormat::Rgba8888);
        draw_circle_aa(&mut layer, &style, 20, 20, 12)?;
        let mut solid = Layer::new(41, 41, PixelFormat::Rgba8888);
        draw_circle(&mut solid, &style, 20, 20, 12)?;

        // inner radius 11, outer radius 13
        let mut partial = 0;
        for (x, y, color) in layer.fb().pixels() {
            let dist = (x as f64 - 20.0).hypot(y as f64 - 20.0);
            if (11.0..=13.0).contains(&dist) || solid.fb().get(x, y) == Some(RGBA::WHITE) {
                assert_eq!(color, RGBA::WHITE, "({}, {})", x, y);
            } else if dist <= 10.0 || dist >= 14.0 {
                assert_eq!(color, RGBA::TRANSPARENT, "({}, {})", x, y);
            } else if color.alpha() > 0 && color.alpha() < 255 {
                partial += 1;
            }
        }
        assert!(partial > 0);

        let mut layer = Layer::new(41, 41, PixelFormat::Rgba8888);
        draw_circle_aa(&mut layer, &DrawStyle::default(), 20, 20, 10)?;
        assert_eq!(layer.get_pixel(30, 20)?, RGBA::WHITE);
        assert_eq!(layer.get_pixel(20, 10)?, RGBA::WHITE);
        assert_eq!(layer.get_pixel(20, 20)?, RGBA::TRANSPARENT);

        assert_eq!(
            draw_circle_aa(&mut Layer::default(), &style, 0, 0, 3),
            Err(Error::NotInitialized)
        );
        assert_eq!(
            draw_circle_aa(&mut layer, &style, 0, 0, -3),
            Err(Error::OutOfRange)
        );
        Ok(())
    }

    #[test]
    fn test_circle_clipped() -> Result<(), Error> {
        let mut layer = Layer::new(10, 10, PixelFormat::Rgba8888);
        let style = DrawStyle::default().with_stroke_width(4);
        // ring of the first circle is entirely outside of the layer
        draw_circle(&mut layer, &style, 5, 5, 30)?;
        draw_circle(&mut layer, &style, 0, 0, 6)?;
        assert_eq!(layer.get_pixel(9, 9)?, RGBA::TRANSPARENT);
        assert_eq!(layer.get_pixel(6, 0)?, RGBA::WHITE);
        assert_eq!(
            draw_circle(&mut layer, &style, 0, 0, -1),
            Err(Error::OutOfRange)
        );
        Ok(())
    }
}
