//! Layer stack compositing
use crate::{Error, Framebuffer, Layer, PixelFormat};

/// Flatten layers (ordered bottom to top) into a new framebuffer
///
/// Output covers the display window `[wx, wx + width) x [wy, wy + height)`. Only the
/// view part of each visible layer is used, placed at the layer position. Pixel alpha
/// is scaled by the layer opacity; fully opaque pixels overwrite the output, others are
/// blended over it. Every touched output pixel becomes opaque.
pub fn flatten<'a>(
    layers: impl IntoIterator<Item = &'a Layer>,
    width: usize,
    height: usize,
    wx: i32,
    wy: i32,
    format: PixelFormat,
) -> Result<Framebuffer, Error> {
    if width == 0 || height == 0 {
        tracing::warn!("flatten: output size {}x{} is empty", width, height);
        return Err(Error::NotInitialized);
    }
    let mut output = Framebuffer::new(width, height, format);
    tracing::debug_span!("[flatten]", width, height).in_scope(|| {
        for (index, layer) in layers.into_iter().enumerate() {
            if layer.flags.invisible {
                continue;
            }
            if layer.fb().is_empty() {
                tracing::debug!("flatten: layer {} is not initialized, skipping", index);
                continue;
            }
            composite(&mut output, layer, wx, wy);
        }
    });
    Ok(output)
}

fn composite(output: &mut Framebuffer, layer: &Layer, wx: i32, wy: i32) {
    let view = layer.view();
    let (relx, rely) = layer.position();
    let opacity = layer.opacity();
    // intersection of the view placed on the display with the output window
    let span = |rel: i32, win: i32, size: usize, out: usize| {
        let start = (win as i64 - rel as i64).clamp(0, size as i64);
        let end = (win as i64 + out as i64 - rel as i64).clamp(0, size as i64);
        start as usize..end as usize
    };
    let cols = span(relx, wx, view.width, output.width());
    let rows = span(rely, wy, view.height, output.height());

    for vy in rows {
        let oy = (rely as i64 + vy as i64 - wy as i64) as usize;
        for vx in cols.clone() {
            let Some(src) = layer.fb().get(view.minx + vx, view.miny + vy) else {
                continue;
            };
            if src.alpha() == 0 {
                continue;
            }
            let ox = (relx as i64 + vx as i64 - wx as i64) as usize;
            let alpha = (src.alpha() as f32 * opacity) as u8;
            if alpha == 255 {
                output.set(ox, oy, src);
            } else if let Some(dst) = output.get(ox, oy) {
                output.set(ox, oy, src.blend_over(dst, alpha).with_alpha(255));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RGBA, View};

    fn solid(width: usize, height: usize, color: RGBA) -> Layer {
        let mut layer = Layer::new(width, height, PixelFormat::Rgba8888);
        layer.fb_mut().fill(color);
        layer
    }

    #[test]
    fn test_flatten_stack() -> Result<(), Error> {
        let red = RGBA::new(255, 0, 0, 255);
        let bottom = solid(4, 4, RGBA::new(0, 0, 200, 255));
        let mut top = solid(2, 2, red);
        top.set_position(1, 1);
        let mut hidden = solid(4, 4, RGBA::WHITE);
        hidden.flags.invisible = true;

        let out = flatten([&bottom, &top, &hidden], 4, 4, 0, 0, PixelFormat::Rgb888)?;
        assert_eq!(out.get(0, 0), Some(RGBA::new(0, 0, 200, 255)));
        assert_eq!(out.get(1, 1), Some(red));
        assert_eq!(out.get(2, 2), Some(red));
        assert_eq!(out.get(3, 3), Some(RGBA::new(0, 0, 200, 255)));
        Ok(())
    }

    #[test]
    fn test_flatten_opacity_and_alpha() -> Result<(), Error> {
        let bottom = solid(2, 1, RGBA::BLACK);
        let mut top = solid(2, 1, RGBA::WHITE);
        top.put_pixel(1, 0, RGBA::new(255, 255, 255, 0))?;
        top.set_opacity(0.2);
        let out = flatten(&[bottom, top], 2, 1, 0, 0, PixelFormat::Rgba8888)?;
        // 255 * 0.2 = 51
        assert_eq!(out.get(0, 0), Some(RGBA::new(51, 51, 51, 255)));
        // transparent source pixel is skipped
        assert_eq!(out.get(1, 0), Some(RGBA::BLACK));

        // semi transparent pixel over empty output
        let layer = solid(1, 1, RGBA::new(255, 0, 0, 51));
        let out = flatten([&layer], 1, 1, 0, 0, PixelFormat::Rgba8888)?;
        assert_eq!(out.get(0, 0), Some(RGBA::new(51, 0, 0, 255)));
        Ok(())
    }

    #[test]
    fn test_flatten_window_and_view() -> Result<(), Error> {
        let mut layer = Layer::new(4, 4, PixelFormat::Rgba8888);
        for y in 0..4 {
            for x in 0..4 {
                layer.put_pixel(x, y, RGBA::new(x as u8 * 10, y as u8 * 10, 0, 255))?;
            }
        }
        layer.set_view(View {
            minx: 1,
            miny: 1,
            width: 2,
            height: 2,
        });
        layer.set_position(5, 5);
        let out = flatten([&layer], 3, 3, 4, 4, PixelFormat::Rgba8888)?;
        // view origin (1, 1) lands on display (5, 5), output (1, 1)
        assert_eq!(out.get(1, 1), Some(RGBA::new(10, 10, 0, 255)));
        assert_eq!(out.get(2, 2), Some(RGBA::new(20, 20, 0, 255)));
        assert_eq!(out.get(0, 0), Some(RGBA::TRANSPARENT));
        assert_eq!(out.get(0, 2), Some(RGBA::TRANSPARENT));

        // layer far outside of the window
        layer.set_position(-100, 0);
        let out = flatten([&layer], 3, 3, 0, 0, PixelFormat::Rgba8888)?;
        assert!(out.pixels().all(|(_, _, c)| c == RGBA::TRANSPARENT));

        assert_eq!(
            flatten([&layer], 0, 3, 0, 0, PixelFormat::Rgba8888),
            Err(Error::NotInitialized)
        );
        Ok(())
    }
}
