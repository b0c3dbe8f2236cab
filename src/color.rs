use std::{fmt, str::FromStr};

/// RGBA color packed as u32 value, channels are laid out in memory as `r, g, b, a`
/// on little-endian platforms.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(transparent)]
pub struct RGBA(u32);

impl RGBA {
    pub const BLACK: RGBA = RGBA::new(0, 0, 0, 255);
    pub const WHITE: RGBA = RGBA::new(255, 255, 255, 255);
    pub const TRANSPARENT: RGBA = RGBA::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((a as u32) << 24) | ((b as u32) << 16) | ((g as u32) << 8) | (r as u32))
    }

    pub const fn alpha(self) -> u8 {
        ((self.0 >> 24) & 0xff) as u8
    }

    pub const fn blue(self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    pub const fn green(self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.red(), self.green(), self.blue(), self.alpha()]
    }

    pub fn to_rgb(self) -> [u8; 3] {
        [self.red(), self.green(), self.blue()]
    }

    /// Same color with alpha channel replaced
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self((self.0 & 0x00ff_ffff) | ((alpha as u32) << 24))
    }

    /// Check if red, green and blue channels are equal (alpha is ignored)
    pub fn same_rgb(self, other: Self) -> bool {
        (self.0 ^ other.0) & 0x00ff_ffff == 0
    }

    /// Composite `self` with the given alpha over `dst`.
    ///
    /// Each color channel is `src * alpha / 255 + dst * (255 - alpha) / 255`, resulting
    /// alpha is `alpha + dst_alpha * (255 - alpha) / 255`, so full alpha always
    /// produces `self` with alpha 255.
    pub fn blend_over(self, dst: Self, alpha: u8) -> Self {
        let a = alpha as u32;
        let na = 255 - a;
        let mix = |src: u8, dst: u8| ((src as u32 * a + dst as u32 * na) / 255) as u8;
        RGBA::new(
            mix(self.red(), dst.red()),
            mix(self.green(), dst.green()),
            mix(self.blue(), dst.blue()),
            (a + dst.alpha() as u32 * na / 255) as u8,
        )
    }

    /// Add `amount` to red, green and blue, saturating at 255
    pub fn lighten(self, amount: u8) -> Self {
        RGBA::new(
            self.red().saturating_add(amount),
            self.green().saturating_add(amount),
            self.blue().saturating_add(amount),
            self.alpha(),
        )
    }

    /// Subtract `amount` from red, green and blue, saturating at 0
    pub fn darken(self, amount: u8) -> Self {
        RGBA::new(
            self.red().saturating_sub(amount),
            self.green().saturating_sub(amount),
            self.blue().saturating_sub(amount),
            self.alpha(),
        )
    }

    /// Luma weighted gray, alpha is preserved
    pub fn grayscale(self) -> Self {
        let luma =
            0.21 * self.red() as f32 + 0.71 * self.green() as f32 + 0.07 * self.blue() as f32;
        let luma = luma as u8;
        RGBA::new(luma, luma, luma, self.alpha())
    }

    /// Invert red, green and blue channels
    pub fn reverse(self) -> Self {
        RGBA::new(
            255 - self.red(),
            255 - self.green(),
            255 - self.blue(),
            self.alpha(),
        )
    }

    /// Cyclic channel rotation: red <- green, green <- blue, blue <- red
    pub fn rotate(self) -> Self {
        RGBA::new(self.green(), self.blue(), self.red(), self.alpha())
    }

    /// Multiply each channel by the matching channel of the tint (`channel / 255 * tint`)
    pub fn tint(self, tint: Self) -> Self {
        let mul = |c: u8, t: u8| (c as f32 / 255.0 * t as f32) as u8;
        RGBA::new(
            mul(self.red(), tint.red()),
            mul(self.green(), tint.green()),
            mul(self.blue(), tint.blue()),
            mul(self.alpha(), tint.alpha()),
        )
    }
}

impl From<[u8; 4]> for RGBA {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        RGBA::new(r, g, b, a)
    }
}

impl fmt::Debug for RGBA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RGBA({})", self)
    }
}

impl fmt::Display for RGBA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)?;
        if a != 255 {
            write!(f, "{:02x}", a)?;
        }
        Ok(())
    }
}

impl FromStr for RGBA {
    type Err = ColorError;

    fn from_str(color: &str) -> Result<Self, Self::Err> {
        if color.starts_with('#') && (color.len() == 7 || color.len() == 9) {
            // #RRGGBB(AA)
            let bytes: &[u8] = color[1..].as_ref();
            let digit = |byte| match byte {
                b'A'..=b'F' => Ok(byte - b'A' + 10),
                b'a'..=b'f' => Ok(byte - b'a' + 10),
                b'0'..=b'9' => Ok(byte - b'0'),
                _ => Err(ColorError::HexExpected),
            };
            let mut hex = bytes
                .chunks(2)
                .map(|pair| Ok((digit(pair[0])? << 4) | digit(pair[1])?));
            Ok(RGBA::new(
                hex.next().unwrap_or(Ok(0))?,
                hex.next().unwrap_or(Ok(0))?,
                hex.next().unwrap_or(Ok(0))?,
                hex.next().unwrap_or(Ok(255))?,
            ))
        } else {
            Err(ColorError::HexExpected)
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RGBA {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RGBA {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let color = std::borrow::Cow::<'de, str>::deserialize(deserializer)?;
        color.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone)]
pub enum ColorError {
    HexExpected,
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::HexExpected => {
                write!(f, "Color expected to be #RRGGBB(AA) in hexidemical format")
            }
        }
    }
}

impl std::error::Error for ColorError {}
