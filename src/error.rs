use std::fmt;

/// Error kind returned by every fallible drawing, filter and codec operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// Layer or framebuffer has not been initialized (zero sized)
    NotInitialized,
    /// Input is not in the expected format (e.g. not a PNG file)
    WrongFormat,
    /// File can not be opened for reading or writing
    CantOpenFile,
    /// PNG data is corrupted or can not be encoded
    CantDecodePng,
    /// Target coordinates are outside of the layer
    OutOfRange,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotInitialized => write!(f, "layer or framebuffer is not initialized"),
            Error::WrongFormat => write!(f, "wrong format"),
            Error::CantOpenFile => write!(f, "can not open file"),
            Error::CantDecodePng => write!(f, "can not decode or encode PNG data"),
            Error::OutOfRange => write!(f, "coordinates are out of range"),
        }
    }
}

impl std::error::Error for Error {}
