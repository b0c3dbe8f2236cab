//! Rectangles and single pixels drawn with the style colors
use crate::{DrawStyle, Error, Layer, RGBA};

/// Draw rectangle `[x, x + width) x [y, y + height)`
///
/// Pixels closer than the stroke width to any edge form the border, they are
/// overwritten with the background color. Remaining pixels are blended with the
/// foreground color. Parts outside of the layer are clipped.
pub fn draw_rectangle(
    layer: &mut Layer,
    style: &DrawStyle,
    x: i32,
    y: i32,
    width: usize,
    height: usize,
) -> Result<(), Error> {
    layer.ensure_init("draw_rectangle")?;
    let stroke = style.stroke_width();
    let fill = style.foreground();
    let border = style.background();

    // visible part of the rectangle in rectangle local coordinates
    let clip = |origin: i32, size: usize, limit: usize| {
        let size = size.min(i64::MAX as usize) as i64;
        let start = (-(origin as i64)).clamp(0, size) as usize;
        let end = (limit as i64 - origin as i64).clamp(0, size) as usize;
        start..end
    };
    let cols = clip(x, width, layer.width());
    let rows = clip(y, height, layer.height());

    for yc in rows {
        let py = (y as i64 + yc as i64) as i32;
        let border_row = yc < stroke || yc.saturating_add(stroke) >= height;
        for xc in cols.clone() {
            let px = (x as i64 + xc as i64) as i32;
            if border_row || xc < stroke || xc.saturating_add(stroke) >= width {
                layer.plot(px, py, border);
            } else {
                layer.plot_blend(px, py, fill, fill.alpha());
            }
        }
    }
    Ok(())
}

/// Overwrite every pixel of the layer with the color
pub fn paint_layer(layer: &mut Layer, color: RGBA) -> Result<(), Error> {
    layer.ensure_init("paint_layer")?;
    layer.fb_mut().fill(color);
    Ok(())
}

/// Overwrite single pixel with the foreground color
pub fn draw_pixel(layer: &mut Layer, style: &DrawStyle, x: i32, y: i32) -> Result<(), Error> {
    layer.put_pixel(x, y, style.foreground())
}

/// Blend single pixel with the foreground color
pub fn blend_pixel(layer: &mut Layer, style: &DrawStyle, x: i32, y: i32) -> Result<(), Error> {
    layer.blend_pixel(x, y, style.foreground())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PixelFormat;

    #[test]
    fn test_rectangle() -> Result<(), Error> {
        let border = RGBA::new(255, 0, 0, 255);
        let fill = RGBA::new(0, 0, 255, 51);
        let start = RGBA::new(0, 200, 0, 255);
        let style = DrawStyle::new(fill, border).with_stroke_width(2);

        let mut layer = Layer::new(12, 10, PixelFormat::Rgba8888);
        paint_layer(&mut layer, start)?;
        draw_rectangle(&mut layer, &style, 1, 2, 8, 7)?;
        let blended = fill.blend_over(start, fill.alpha());
        for y in 0..10 {
            for x in 0..12 {
                let inside = (1..9).contains(&x) && (2..9).contains(&y);
                let (xc, yc) = (x - 1, y - 2);
                let expected = if !inside {
                    start
                } else if xc < 2 || xc >= 6 || yc < 2 || yc >= 5 {
                    border
                } else {
                    blended
                };
                assert_eq!(layer.get_pixel(x, y)?, expected, "({}, {})", x, y);
            }
        }
        Ok(())
    }

    #[test]
    fn test_rectangle_clipped() -> Result<(), Error> {
        let style = DrawStyle::new(RGBA::WHITE, RGBA::BLACK);
        let mut layer = Layer::new(4, 4, PixelFormat::Rgba8888);
        draw_rectangle(&mut layer, &style, -2, -2, 5, 5)?;
        // border of the rectangle is at local 0 and 4, global -2 and 2
        assert_eq!(layer.get_pixel(0, 0)?, RGBA::WHITE);
        assert_eq!(layer.get_pixel(2, 1)?, RGBA::BLACK);
        assert_eq!(layer.get_pixel(1, 2)?, RGBA::BLACK);
        assert_eq!(layer.get_pixel(3, 3)?, RGBA::TRANSPARENT);
        draw_rectangle(&mut layer, &style, 10, 10, 5, 5)?;
        draw_rectangle(&mut layer, &style, 0, 0, 0, 3)?;
        assert_eq!(layer.get_pixel(3, 3)?, RGBA::TRANSPARENT);
        Ok(())
    }

    #[test]
    fn test_rectangle_huge_size() -> Result<(), Error> {
        let style = DrawStyle::new(RGBA::WHITE, RGBA::BLACK);
        let mut layer = Layer::new(4, 4, PixelFormat::Rgba8888);
        draw_rectangle(&mut layer, &style, 0, 0, usize::MAX, 2)?;
        for y in 0..4 {
            for x in 0..4 {
                let expected = if y < 2 { RGBA::BLACK } else { RGBA::TRANSPARENT };
                assert_eq!(layer.get_pixel(x, y)?, expected, "({}, {})", x, y);
            }
        }

        // only the left column and the top row are border
        let mut layer = Layer::new(4, 4, PixelFormat::Rgba8888);
        draw_rectangle(&mut layer, &style, 0, 0, usize::MAX, usize::MAX)?;
        assert_eq!(layer.get_pixel(0, 3)?, RGBA::BLACK);
        assert_eq!(layer.get_pixel(3, 0)?, RGBA::BLACK);
        assert_eq!(layer.get_pixel(3, 3)?, RGBA::WHITE);
        Ok(())
    }

    #[test]
    fn test_pixels() -> Result<(), Error> {
        let style = DrawStyle::new(RGBA::new(255, 255, 255, 0), RGBA::BLACK);
        let mut layer = Layer::new(2, 1, PixelFormat::Rgba8888);
        draw_pixel(&mut layer, &style, 0, 0)?;
        blend_pixel(&mut layer, &style, 1, 0)?;
        assert_eq!(layer.get_pixel(0, 0)?, RGBA::new(255, 255, 255, 0));
        assert_eq!(layer.get_pixel(1, 0)?, RGBA::TRANSPARENT);
        assert_eq!(draw_pixel(&mut layer, &style, 2, 0), Err(Error::OutOfRange));
        assert_eq!(
            paint_layer(&mut Layer::default(), RGBA::WHITE),
            Err(Error::NotInitialized)
        );
        Ok(())
    }
}
