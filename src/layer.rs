use crate::{Error, Framebuffer, PixelFormat, RGBA};

/// Validation mode of a layer
///
/// With checks disabled pixel access and drawing skip all validation and logging,
/// coordinates outside of the layer are the caller's responsibility (writes that
/// land outside of the buffer are dropped, writes that wrap into another row are not).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Checks {
    #[default]
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerFlags {
    /// Layer is skipped when flattening
    pub invisible: bool,
    /// Loaded images overwrite pixels instead of blending with them
    pub no_blend: bool,
}

/// Visible part of the layer framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct View {
    pub minx: usize,
    pub miny: usize,
    pub width: usize,
    pub height: usize,
}

/// Positioned bitmap with its own framebuffer, opacity and visibility flags
#[derive(Debug, Clone)]
pub struct Layer {
    fb: Framebuffer,
    view: View,
    relx: i32,
    rely: i32,
    opacity: f32,
    checks: Checks,
    pub flags: LayerFlags,
}

impl Default for Layer {
    fn default() -> Self {
        Self::from_framebuffer(Framebuffer::default())
    }
}

impl Layer {
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Self {
        Self::from_framebuffer(Framebuffer::new(width, height, format))
    }

    pub fn from_framebuffer(fb: Framebuffer) -> Self {
        let view = View {
            minx: 0,
            miny: 0,
            width: fb.width(),
            height: fb.height(),
        };
        Self {
            fb,
            view,
            relx: 0,
            rely: 0,
            opacity: 1.0,
            checks: Checks::default(),
            flags: LayerFlags::default(),
        }
    }

    pub fn fb(&self) -> &Framebuffer {
        &self.fb
    }

    pub fn fb_mut(&mut self) -> &mut Framebuffer {
        &mut self.fb
    }

    /// Swap in a new framebuffer of the same size, returns the previous one
    pub fn replace_fb(&mut self, fb: Framebuffer) -> Result<Framebuffer, Error> {
        if fb.width() != self.fb.width() || fb.height() != self.fb.height() {
            tracing::warn!(
                "replacement framebuffer {}x{} does not match layer {}x{}",
                fb.width(),
                fb.height(),
                self.fb.width(),
                self.fb.height()
            );
            return Err(Error::WrongFormat);
        }
        Ok(std::mem::replace(&mut self.fb, fb))
    }

    pub fn width(&self) -> usize {
        self.fb.width()
    }

    pub fn height(&self) -> usize {
        self.fb.height()
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Set visible region, it is clipped to the framebuffer
    pub fn set_view(&mut self, view: View) {
        let minx = view.minx.min(self.width());
        let miny = view.miny.min(self.height());
        self.view = View {
            minx,
            miny,
            width: view.width.min(self.width() - minx),
            height: view.height.min(self.height() - miny),
        };
    }

    /// Position of the view origin on the display
    pub fn position(&self) -> (i32, i32) {
        (self.relx, self.rely)
    }

    pub fn set_position(&mut self, relx: i32, rely: i32) {
        self.relx = relx;
        self.rely = rely;
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Layer level opacity in `[0, 1]`
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn checks(&self) -> Checks {
        self.checks
    }

    pub fn set_checks(&mut self, checks: Checks) {
        self.checks = checks;
    }

    /// Reject uninitialized layers, `op` is only used for logging
    pub(crate) fn ensure_init(&self, op: &str) -> Result<(), Error> {
        if self.checks == Checks::Enabled && self.fb.is_empty() {
            tracing::warn!("{}: layer has uninitialized framebuffer", op);
            return Err(Error::NotInitialized);
        }
        Ok(())
    }

    /// Byte offset of the pixel, validated unless checks are disabled
    fn pixel_offset(&self, x: i32, y: i32, op: &str) -> Result<usize, Error> {
        let shape = self.fb.shape();
        if self.checks == Checks::Disabled {
            let offset = (y as usize)
                .wrapping_mul(shape.row_stride)
                .wrapping_add((x as usize).wrapping_mul(shape.col_stride));
            return Ok(offset);
        }
        self.ensure_init(op)?;
        if x < 0 || y < 0 || !shape.contains(y as usize, x as usize) {
            tracing::warn!(
                "{}: ({}, {}) is outside of the layer {}x{}",
                op,
                x,
                y,
                shape.width,
                shape.height
            );
            return Err(Error::OutOfRange);
        }
        Ok(shape.offset(y as usize, x as usize))
    }

    /// Read stored color of the pixel
    pub fn get_pixel(&self, x: i32, y: i32) -> Result<RGBA, Error> {
        let offset = self.pixel_offset(x, y, "get_pixel")?;
        // with checks disabled out of buffer reads produce transparent black
        Ok(self.fb.get_raw(offset).unwrap_or_default())
    }

    /// Overwrite pixel with the color (including alpha)
    pub fn put_pixel(&mut self, x: i32, y: i32, color: RGBA) -> Result<(), Error> {
        let offset = self.pixel_offset(x, y, "put_pixel")?;
        self.fb.set_raw(offset, color);
        Ok(())
    }

    /// Composite color over the pixel using the color's alpha
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: RGBA) -> Result<(), Error> {
        let offset = self.pixel_offset(x, y, "blend_pixel")?;
        if let Some(dst) = self.fb.get_raw(offset) {
            self.fb.set_raw(offset, color.blend_over(dst, color.alpha()));
        }
        Ok(())
    }

    /// Overwrite `zoom x zoom` block of pixels that represents logical pixel `(x, y)`
    pub fn put_big_pixel(
        &mut self,
        x: i32,
        y: i32,
        zoom: usize,
        color: RGBA,
    ) -> Result<(), Error> {
        self.big_pixel_check(x, y, zoom, "put_big_pixel")?;
        self.plot_big(x, y, zoom, color, None);
        Ok(())
    }

    /// Blend `zoom x zoom` block of pixels that represents logical pixel `(x, y)`
    pub fn blend_big_pixel(
        &mut self,
        x: i32,
        y: i32,
        zoom: usize,
        color: RGBA,
    ) -> Result<(), Error> {
        self.big_pixel_check(x, y, zoom, "blend_big_pixel")?;
        self.plot_big(x, y, zoom, color, Some(color.alpha()));
        Ok(())
    }

    fn big_pixel_check(&self, x: i32, y: i32, zoom: usize, op: &str) -> Result<(), Error> {
        if self.checks == Checks::Disabled {
            return Ok(());
        }
        let zoom = zoom.max(1) as i64;
        let px = x as i64 * zoom;
        let py = y as i64 * zoom;
        if px < 0 || py < 0 || px >= self.width() as i64 || py >= self.height() as i64 {
            self.ensure_init(op)?;
            tracing::warn!("{}: ({}, {}) x {} is outside of the layer", op, x, y, zoom);
            return Err(Error::OutOfRange);
        }
        Ok(())
    }

    /// Read pixel without logging, `None` outside of the layer
    #[inline]
    pub(crate) fn read(&self, x: i32, y: i32) -> Option<RGBA> {
        if x < 0 || y < 0 {
            return None;
        }
        self.fb.get(x as usize, y as usize)
    }

    /// Write pixel, silently clipped at the layer edges
    #[inline]
    pub(crate) fn plot(&mut self, x: i32, y: i32, color: RGBA) {
        if x >= 0 && y >= 0 {
            self.fb.set(x as usize, y as usize, color);
        }
    }

    /// Blend pixel with explicit alpha, silently clipped at the layer edges
    #[inline]
    pub(crate) fn plot_blend(&mut self, x: i32, y: i32, color: RGBA, alpha: u8) {
        if let Some(dst) = self.read(x, y) {
            self.fb
                .set(x as usize, y as usize, color.blend_over(dst, alpha));
        }
    }

    /// Write or blend (when `alpha` is provided) a `zoom x zoom` block, silently clipped
    pub(crate) fn plot_big(&mut self, x: i32, y: i32, zoom: usize, color: RGBA, alpha: Option<u8>) {
        let zoom = zoom.max(1) as i64;
        for dy in 0..zoom {
            for dx in 0..zoom {
                let px = x as i64 * zoom + dx;
                let py = y as i64 * zoom + dy;
                if px > i32::MAX as i64 || py > i32::MAX as i64 {
                    continue;
                }
                match alpha {
                    None => self.plot(px as i32, py as i32, color),
                    Some(alpha) => self.plot_blend(px as i32, py as i32, color, alpha),
                }
            }
        }
    }

    /// Shrink the layer to `[minx, maxx) x [miny, maxy)`.
    ///
    /// View is reset to the whole new framebuffer and position is moved by `(minx, miny)`
    /// so the content stays at the same place on the display.
    pub fn crop(
        &mut self,
        minx: usize,
        miny: usize,
        maxx: usize,
        maxy: usize,
    ) -> Result<(), Error> {
        self.ensure_init("crop")?;
        if minx >= maxx || miny >= maxy || maxx > self.width() || maxy > self.height() {
            tracing::warn!(
                "crop: [{}, {}) x [{}, {}) is not inside of the layer {}x{}",
                minx,
                maxx,
                miny,
                maxy,
                self.width(),
                self.height()
            );
            return Err(Error::OutOfRange);
        }
        self.fb = self.fb.region(minx, miny, maxx - minx, maxy - miny);
        self.view = View {
            minx: 0,
            miny: 0,
            width: self.fb.width(),
            height: self.fb.height(),
        };
        self.relx = self.relx.saturating_add(minx as i32);
        self.rely = self.rely.saturating_add(miny as i32);
        Ok(())
    }
}
