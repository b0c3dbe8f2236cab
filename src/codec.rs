//! PNG import into layers and export of the flattened layer stack
use crate::{Checks, Error, Framebuffer, Layer, PixelFormat, RGBA, compose::flatten};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

impl From<png::DecodingError> for Error {
    fn from(error: png::DecodingError) -> Self {
        tracing::warn!("failed to decode PNG: {}", error);
        Error::CantDecodePng
    }
}

impl From<png::EncodingError> for Error {
    fn from(error: png::EncodingError) -> Self {
        tracing::warn!("failed to encode PNG: {}", error);
        match error {
            png::EncodingError::IoError(_) => Error::CantOpenFile,
            _ => Error::CantDecodePng,
        }
    }
}

/// Decode PNG data into an `Rgba8888` framebuffer
pub fn decode_png(data: &[u8]) -> Result<Framebuffer, Error> {
    if !data.starts_with(&PNG_SIGNATURE) {
        tracing::warn!("decode_png: data is not a PNG image");
        return Err(Error::WrongFormat);
    }
    let mut decoder = png::Decoder::new(std::io::Cursor::new(data));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let bytes = &buf[..info.buffer_size()];

    let pixels: Vec<RGBA> = match info.color_type {
        png::ColorType::Rgba => bytes
            .chunks_exact(4)
            .map(|p| RGBA::new(p[0], p[1], p[2], p[3]))
            .collect(),
        png::ColorType::Rgb => bytes
            .chunks_exact(3)
            .map(|p| RGBA::new(p[0], p[1], p[2], 255))
            .collect(),
        png::ColorType::GrayscaleAlpha => bytes
            .chunks_exact(2)
            .map(|p| RGBA::new(p[0], p[0], p[0], p[1]))
            .collect(),
        png::ColorType::Grayscale => bytes.iter().map(|v| RGBA::new(*v, *v, *v, 255)).collect(),
        png::ColorType::Indexed => {
            tracing::warn!("decode_png: palette was not expanded");
            return Err(Error::CantDecodePng);
        }
    };
    Framebuffer::from_rgba(info.width as usize, info.height as usize, &pixels)
}

/// Read PNG file into an `Rgba8888` framebuffer
pub fn read_png(path: impl AsRef<Path>) -> Result<Framebuffer, Error> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|error| {
        tracing::warn!("failed to read {}: {}", path.display(), error);
        Error::CantOpenFile
    })?;
    decode_png(&data)
}

/// Load PNG file into the layer with its top-left corner at `(relx, rely)`
///
/// Pixels that fall outside of the layer are dropped. Image is blended over the layer
/// content unless the layer has the `no_blend` flag set. Offset outside of the layer
/// is an error only while checks are enabled.
pub fn load_png(
    layer: &mut Layer,
    path: impl AsRef<Path>,
    relx: usize,
    rely: usize,
) -> Result<(), Error> {
    layer.ensure_init("load_png")?;
    if layer.checks() == Checks::Enabled && (relx >= layer.width() || rely >= layer.height()) {
        tracing::warn!(
            "load_png: offset ({}, {}) is outside of the layer {}x{}",
            relx,
            rely,
            layer.width(),
            layer.height()
        );
        return Err(Error::OutOfRange);
    }
    let path = path.as_ref();
    tracing::debug_span!("[load_png]", path = %path.display()).in_scope(|| {
        let image = read_png(path)?;
        let no_blend = layer.flags.no_blend;
        for (x, y, color) in image.pixels() {
            let (Some(x), Some(y)) = (relx.checked_add(x), rely.checked_add(y)) else {
                continue;
            };
            if x >= layer.width() || y >= layer.height() {
                continue;
            }
            // inside of the layer, coordinates fit into i32
            let (x, y) = (x as i32, y as i32);
            if no_blend {
                layer.plot(x, y, color);
            } else {
                layer.plot_blend(x, y, color, color.alpha());
            }
        }
        Ok(())
    })
}

/// Encode framebuffer as 24-bit RGB PNG, alpha is discarded
pub fn encode_png(fb: &Framebuffer, output: impl Write) -> Result<(), Error> {
    let (Ok(width), Ok(height)) = (u32::try_from(fb.width()), u32::try_from(fb.height()))
    else {
        tracing::warn!("encode_png: {}x{} is too large", fb.width(), fb.height());
        return Err(Error::WrongFormat);
    };
    let mut encoder = png::Encoder::new(output, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&fb.to_rgb_bytes())?;
    writer.finish()?;
    Ok(())
}

/// Flatten layers (bottom to top) over the display window `[wx, wx + width) x [wy, wy + height)`
/// and save the result as 24-bit PNG file
pub fn save_png<'a>(
    path: impl AsRef<Path>,
    layers: impl IntoIterator<Item = &'a Layer>,
    width: usize,
    height: usize,
    wx: i32,
    wy: i32,
) -> Result<(), Error> {
    let path = path.as_ref();
    tracing::debug_span!("[save_png]", path = %path.display()).in_scope(|| {
        let image = flatten(layers, width, height, wx, wy, PixelFormat::Rgb888)?;
        let file = File::create(path).map_err(|error| {
            tracing::warn!("failed to create {}: {}", path.display(), error);
            Error::CantOpenFile
        })?;
        let mut output = BufWriter::new(file);
        encode_png(&image, &mut output)?;
        output.flush().map_err(|error| {
            tracing::warn!("failed to write {}: {}", path.display(), error);
            Error::CantOpenFile
        })
    })
}
