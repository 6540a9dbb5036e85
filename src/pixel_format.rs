// src/pixel_format.rs

//! Pixel layouts and conversion between packed pixel values and 8-bit channels.
//!
//! A `PixelFormat` records, for each of the R/G/B/A channels, how many bits it
//! occupies (stored as the "loss" relative to 8 bits) and where it sits in the
//! packed value. One-byte formats are indexed (paletted) and carry no channels.

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::color::{Argb, Rgb};

/// Describes the memory layout of one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    pub bytes_per_pixel: u8,
    pub r_loss: u8,
    pub g_loss: u8,
    pub b_loss: u8,
    pub a_loss: u8,
    pub r_shift: u8,
    pub g_shift: u8,
    pub b_shift: u8,
    pub a_shift: u8,
}

impl PixelFormat {
    /// 8-bit paletted.
    pub const CLUT8: PixelFormat = PixelFormat::new(1, 0, 0, 0, 0, 0, 0, 0, 0);
    /// 16-bit RGB565, no alpha.
    pub const RGB565: PixelFormat = PixelFormat::new(2, 5, 6, 5, 0, 11, 5, 0, 0);
    /// 32-bit ARGB8888.
    pub const ARGB8888: PixelFormat = PixelFormat::new(4, 8, 8, 8, 8, 16, 8, 0, 24);

    /// Creates a format from channel bit widths and shifts.
    ///
    /// # Panics
    /// Panics if the channels need more bits than the pixel holds, or if the
    /// pixel size is not 1, 2 or 4 bytes.
    pub const fn new(
        bytes_per_pixel: u8,
        r_bits: u8,
        g_bits: u8,
        b_bits: u8,
        a_bits: u8,
        r_shift: u8,
        g_shift: u8,
        b_shift: u8,
        a_shift: u8,
    ) -> Self {
        assert!(
            bytes_per_pixel == 1 || bytes_per_pixel == 2 || bytes_per_pixel == 4,
            "unsupported pixel size"
        );
        assert!(
            r_bits <= 8 && g_bits <= 8 && b_bits <= 8 && a_bits <= 8,
            "channel wider than 8 bits"
        );
        assert!(
            (r_bits as u32 + g_bits as u32 + b_bits as u32 + a_bits as u32)
                <= bytes_per_pixel as u32 * 8,
            "channels exceed pixel size"
        );
        Self {
            bytes_per_pixel,
            r_loss: 8 - r_bits,
            g_loss: 8 - g_bits,
            b_loss: 8 - b_bits,
            a_loss: 8 - a_bits,
            r_shift,
            g_shift,
            b_shift,
            a_shift,
        }
    }

    pub const fn r_bits(&self) -> u8 {
        8 - self.r_loss
    }

    pub const fn g_bits(&self) -> u8 {
        8 - self.g_loss
    }

    pub const fn b_bits(&self) -> u8 {
        8 - self.b_loss
    }

    pub const fn a_bits(&self) -> u8 {
        8 - self.a_loss
    }

    /// True for one-byte indexed formats.
    pub const fn is_paletted(&self) -> bool {
        self.bytes_per_pixel == 1
    }

    pub const fn has_alpha(&self) -> bool {
        self.a_bits() != 0
    }

    /// Scales an n-bit channel value up to 8 bits by replicating its high bits.
    pub const fn expand(bits: u8, value: u32) -> u8 {
        match bits {
            0 => 0,
            1 => {
                if value & 1 != 0 {
                    0xff
                } else {
                    0
                }
            }
            2 => {
                let v = value & 0x3;
                (v | (v << 2) | (v << 4) | (v << 6)) as u8
            }
            3 => {
                let v = value & 0x7;
                ((v << 5) | (v << 2) | (v >> 1)) as u8
            }
            4 => {
                let v = value & 0xf;
                ((v << 4) | v) as u8
            }
            5 => {
                let v = value & 0x1f;
                ((v << 3) | (v >> 2)) as u8
            }
            6 => {
                let v = value & 0x3f;
                ((v << 2) | (v >> 4)) as u8
            }
            7 => {
                let v = value & 0x7f;
                ((v << 1) | (v >> 6)) as u8
            }
            _ => (value & 0xff) as u8,
        }
    }

    /// Unpacks the colour channels, ignoring alpha.
    pub fn color_to_rgb(&self, color: u32) -> Rgb {
        Rgb::new(
            Self::expand(self.r_bits(), color >> self.r_shift),
            Self::expand(self.g_bits(), color >> self.g_shift),
            Self::expand(self.b_bits(), color >> self.b_shift),
        )
    }

    /// Unpacks all four channels. Formats without alpha decode as opaque.
    pub fn color_to_argb(&self, color: u32) -> Argb {
        let a = if self.has_alpha() {
            Self::expand(self.a_bits(), color >> self.a_shift)
        } else {
            0xff
        };
        let Rgb { r, g, b } = self.color_to_rgb(color);
        Argb::new(a, r, g, b)
    }

    /// Packs a colour with the alpha channel (if any) fully set.
    pub fn rgb_to_color(&self, r: u8, g: u8, b: u8) -> u32 {
        self.argb_to_color(0xff, r, g, b)
    }

    /// Packs four 8-bit channels, dropping the low `loss` bits of each.
    pub fn argb_to_color(&self, a: u8, r: u8, g: u8, b: u8) -> u32 {
        Self::pack(a, self.a_loss, self.a_shift)
            | Self::pack(r, self.r_loss, self.r_shift)
            | Self::pack(g, self.g_loss, self.g_shift)
            | Self::pack(b, self.b_loss, self.b_shift)
    }

    /// Mask of the bits occupied by the alpha channel.
    pub fn alpha_mask(&self) -> u32 {
        self.argb_to_color(0xff, 0, 0, 0)
    }

    /// Re-encodes a packed value from `from` into this format.
    pub fn convert_from(&self, color: u32, from: &PixelFormat) -> u32 {
        if from == self {
            return color;
        }
        let Argb { a, r, g, b } = from.color_to_argb(color);
        self.argb_to_color(a, r, g, b)
    }

    fn pack(value: u8, loss: u8, shift: u8) -> u32 {
        if loss >= 8 {
            0
        } else {
            ((value as u32) >> loss) << shift
        }
    }
}

/// The colour depths a surface can be created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ColorDepth {
    Bits8,
    Bits16,
    Bits32,
}

impl ColorDepth {
    /// Parses a depth given in bits per pixel.
    pub fn from_bits(bits: u32) -> anyhow::Result<Self> {
        match bits {
            8 => Ok(ColorDepth::Bits8),
            16 => Ok(ColorDepth::Bits16),
            32 => Ok(ColorDepth::Bits32),
            other => bail!("Invalid color depth: {} (expected 8, 16 or 32)", other),
        }
    }

    pub const fn bits(&self) -> u32 {
        match self {
            ColorDepth::Bits8 => 8,
            ColorDepth::Bits16 => 16,
            ColorDepth::Bits32 => 32,
        }
    }

    /// The canonical pixel format for this depth.
    pub const fn format(&self) -> PixelFormat {
        match self {
            ColorDepth::Bits8 => PixelFormat::CLUT8,
            ColorDepth::Bits16 => PixelFormat::RGB565,
            ColorDepth::Bits32 => PixelFormat::ARGB8888,
        }
    }
}

impl TryFrom<u32> for ColorDepth {
    type Error = anyhow::Error;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        ColorDepth::from_bits(bits)
    }
}

impl From<ColorDepth> for u32 {
    fn from(depth: ColorDepth) -> u32 {
        depth.bits()
    }
}
