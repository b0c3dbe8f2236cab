use crate::{Error, RGBA};

/// Layout of a single pixel inside of the framebuffer byte buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PixelFormat {
    /// `r, g, b, a` bytes
    #[default]
    Rgba8888,
    /// `b, g, r, a` bytes (common linux framebuffer layout)
    Bgra8888,
    /// `r, g, b` bytes
    Rgb888,
    /// `b, g, r` bytes
    Bgr888,
    /// little-endian 16-bit value `rrrrrggg gggbbbbb`
    Rgb565,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8888 | PixelFormat::Bgra8888 => 4,
            PixelFormat::Rgb888 | PixelFormat::Bgr888 => 3,
            PixelFormat::Rgb565 => 2,
        }
    }

    /// Whether alpha channel is stored
    pub const fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::Rgba8888 | PixelFormat::Bgra8888)
    }

    /// Decode pixel, formats without alpha always produce opaque colors
    #[inline]
    pub fn decode(self, pixel: &[u8]) -> RGBA {
        match self {
            PixelFormat::Rgba8888 => RGBA::new(pixel[0], pixel[1], pixel[2], pixel[3]),
            PixelFormat::Bgra8888 => RGBA::new(pixel[2], pixel[1], pixel[0], pixel[3]),
            PixelFormat::Rgb888 => RGBA::new(pixel[0], pixel[1], pixel[2], 255),
            PixelFormat::Bgr888 => RGBA::new(pixel[2], pixel[1], pixel[0], 255),
            PixelFormat::Rgb565 => {
                let value = u16::from_le_bytes([pixel[0], pixel[1]]);
                let r = ((value >> 11) & 0x1f) as u8;
                let g = ((value >> 5) & 0x3f) as u8;
                let b = (value & 0x1f) as u8;
                RGBA::new((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2), 255)
            }
        }
    }

    #[inline]
    pub fn encode(self, color: RGBA, pixel: &mut [u8]) {
        let [r, g, b, a] = color.to_rgba();
        match self {
            PixelFormat::Rgba8888 => pixel[..4].copy_from_slice(&[r, g, b, a]),
            PixelFormat::Bgra8888 => pixel[..4].copy_from_slice(&[b, g, r, a]),
            PixelFormat::Rgb888 => pixel[..3].copy_from_slice(&[r, g, b]),
            PixelFormat::Bgr888 => pixel[..3].copy_from_slice(&[b, g, r]),
            PixelFormat::Rgb565 => {
                let value = ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3);
                pixel[..2].copy_from_slice(&value.to_le_bytes());
            }
        }
    }

    /// Color as it reads back after being stored in this format
    pub fn normalize(self, color: RGBA) -> RGBA {
        let mut pixel = [0u8; 4];
        self.encode(color, &mut pixel);
        self.decode(&pixel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Shape {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// How many bytes we need to skip to get to the next row.
    pub row_stride: usize,
    /// How many bytes we need to skip to get to the next column.
    pub col_stride: usize,
}

impl Shape {
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Self {
        let col_stride = format.bytes_per_pixel();
        Self {
            width,
            height,
            row_stride: width * col_stride,
            col_stride,
        }
    }

    #[inline]
    pub fn offset(&self, row: usize, col: usize) -> usize {
        row * self.row_stride + col * self.col_stride
    }

    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width
    }

    /// Position `(row, col)` of the n-th pixel in row-major order
    #[inline]
    pub fn nth(&self, n: usize) -> Option<(usize, usize)> {
        if self.width == 0 {
            return None;
        }
        let row = n / self.width;
        let col = n - row * self.width;
        (row < self.height).then_some((row, col))
    }
}

/// Raw pixel buffer with a pixel format tag
///
/// Zero sized framebuffer is considered uninitialized, drawing operations reject it.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Framebuffer {
    shape: Shape,
    format: PixelFormat,
    data: Vec<u8>,
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("width", &self.shape.width)
            .field("height", &self.shape.height)
            .field("format", &self.format)
            .finish()
    }
}

impl Framebuffer {
    /// Create framebuffer filled with zero bytes (transparent black)
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Self {
        let shape = Shape::new(width, height, format);
        Self {
            shape,
            format,
            data: vec![0; shape.row_stride * height],
        }
    }

    pub fn new_with<F>(width: usize, height: usize, format: PixelFormat, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> RGBA,
    {
        let mut fb = Self::new(width, height, format);
        for row in 0..height {
            for col in 0..width {
                fb.set(col, row, f(row, col));
            }
        }
        fb
    }

    /// Create `Rgba8888` framebuffer from row-major pixels
    pub fn from_rgba(width: usize, height: usize, pixels: &[RGBA]) -> Result<Self, Error> {
        if pixels.len() != width * height {
            tracing::warn!(
                "pixel count {} does not match size {}x{}",
                pixels.len(),
                width,
                height
            );
            return Err(Error::WrongFormat);
        }
        let format = PixelFormat::Rgba8888;
        let data = if cfg!(target_endian = "little") {
            bytemuck::cast_slice::<RGBA, u8>(pixels).to_vec()
        } else {
            pixels.iter().flat_map(|pixel| pixel.to_rgba()).collect()
        };
        Ok(Self {
            shape: Shape::new(width, height, format),
            format,
            data,
        })
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn width(&self) -> usize {
        self.shape.width
    }

    pub fn height(&self) -> usize {
        self.shape.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Size of the buffer in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Uninitialized framebuffer has no pixels
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Read pixel at column `x` and row `y`
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<RGBA> {
        if !self.shape.contains(y, x) {
            return None;
        }
        let offset = self.shape.offset(y, x);
        let pixel = self.data.get(offset..offset + self.shape.col_stride)?;
        Some(self.format.decode(pixel))
    }

    /// Write pixel at column `x` and row `y`, returns `false` if it is outside of the buffer
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: RGBA) -> bool {
        if !self.shape.contains(y, x) {
            return false;
        }
        self.set_raw(self.shape.offset(y, x), color)
    }

    /// Write pixel at byte offset without checking coordinates, out of buffer
    /// writes are dropped.
    #[inline]
    pub(crate) fn set_raw(&mut self, offset: usize, color: RGBA) -> bool {
        let end = offset.saturating_add(self.shape.col_stride);
        match self.data.get_mut(offset..end) {
            Some(pixel) => {
                self.format.encode(color, pixel);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub(crate) fn get_raw(&self, offset: usize) -> Option<RGBA> {
        let end = offset.saturating_add(self.shape.col_stride);
        let pixel = self.data.get(offset..end)?;
        Some(self.format.decode(pixel))
    }

    /// Fill all pixels with the color
    pub fn fill(&mut self, color: RGBA) {
        let mut pixel = [0u8; 4];
        let stride = self.shape.col_stride;
        self.format.encode(color, &mut pixel);
        for chunk in self.data.chunks_exact_mut(stride) {
            chunk.copy_from_slice(&pixel[..stride]);
        }
    }

    /// Iterate over all pixels in row-major order as `(x, y, color)`
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, RGBA)> + '_ {
        (0..self.shape.width * self.shape.height).filter_map(move |n| {
            let (row, col) = self.shape.nth(n)?;
            Some((col, row, self.get_raw(self.shape.offset(row, col))?))
        })
    }

    /// Copy of the `[x, x + width) x [y, y + height)` region, clipped to the buffer
    pub fn region(&self, x: usize, y: usize, width: usize, height: usize) -> Framebuffer {
        let width = width.min(self.width().saturating_sub(x));
        let height = height.min(self.height().saturating_sub(y));
        let mut region = Framebuffer::new(width, height, self.format);
        let len = width * self.shape.col_stride;
        for row in 0..height {
            let src = self.shape.offset(y + row, x);
            let dst = region.shape.offset(row, 0);
            region.data[dst..dst + len].copy_from_slice(&self.data[src..src + len]);
        }
        region
    }

    /// Packed 24-bit RGB bytes, alpha is discarded
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.width() * self.height() * 3);
        for (_, _, color) in self.pixels() {
            bytes.extend_from_slice(&color.to_rgb());
        }
        bytes
    }
}
