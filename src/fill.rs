//! Seeded flood fill bounded by a color
use crate::{Error, Layer, RGBA};

/// Fill the 4-connected region around `(x, y)` with `color`.
///
/// Region stops at pixels equal to `boundary` (compared after conversion to the layer
/// pixel format) and at the layer edges. Uses scanline spans on an explicit stack, every
/// pixel is visited at most once. Returns number of painted pixels.
pub fn flood_fill(
    layer: &mut Layer,
    x: i32,
    y: i32,
    color: RGBA,
    boundary: RGBA,
) -> Result<usize, Error> {
    layer.ensure_init("flood_fill")?;
    let (width, height) = (layer.width(), layer.height());
    if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
        tracing::debug!("flood_fill: seed ({}, {}) is outside of the layer", x, y);
        return Ok(0);
    }
    let boundary = layer.fb().format().normalize(boundary);
    let mut visited = vec![false; width * height];
    let fillable = |layer: &Layer, visited: &[bool], x: usize, y: usize| {
        !visited[y * width + x] && layer.read(x as i32, y as i32) != Some(boundary)
    };

    let mut painted = 0;
    let mut stack = vec![(x as usize, y as usize)];
    while let Some((px, py)) = stack.pop() {
        if !fillable(layer, &visited, px, py) {
            continue;
        }

        // horizontal span around the pixel
        let mut x0 = px;
        while x0 > 0 && fillable(layer, &visited, x0 - 1, py) {
            x0 -= 1;
        }
        let mut x1 = px;
        while x1 + 1 < width && fillable(layer, &visited, x1 + 1, py) {
            x1 += 1;
        }

        for fx in x0..=x1 {
            visited[py * width + fx] = true;
            layer.plot(fx as i32, py as i32, color);
        }
        painted += x1 - x0 + 1;

        for ny in [py.wrapping_sub(1), py + 1] {
            if ny >= height {
                continue;
            }
            // push one seed per run of fillable pixels
            let mut in_run = false;
            for sx in x0..=x1 {
                let open = fillable(layer, &visited, sx, ny);
                if open && !in_run {
                    stack.push((sx, ny));
                }
                in_run = open;
            }
        }
    }
    Ok(painted)
}
