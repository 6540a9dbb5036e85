// src/color.rs

//! Channel tuples, the 256-entry VGA palette and HSV conversion.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Number of entries in a palette.
pub const PAL_SIZE: usize = 256;

/// Three 8-bit colour channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Four 8-bit channels, alpha first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Argb {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Argb {
    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    pub const fn rgb(&self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

/// One palette slot. Channels are 6-bit VGA DAC values (0..=63).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PaletteEntry {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// The entry with each channel widened to 8 bits.
    pub const fn to_rgb(&self) -> Rgb {
        Rgb::new(vga_expand(self.r), vga_expand(self.g), vga_expand(self.b))
    }
}

/// Widens a 6-bit VGA channel to the 0..=255 range.
pub const fn vga_expand(x: u8) -> u8 {
    ((x as u32) * 255 / 63) as u8
}

/// A 256-colour palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: [PaletteEntry; PAL_SIZE],
}

impl Default for Palette {
    /// All entries black.
    fn default() -> Self {
        Palette {
            entries: [PaletteEntry::default(); PAL_SIZE],
        }
    }
}

// Constants for the generated palette layout
const NAMED_COLOR_COUNT: usize = 16;
const COLOR_CUBE_OFFSET: usize = 16;
const COLOR_CUBE_SIZE: usize = 6; // 6x6x6 cube
const GRAYSCALE_OFFSET: usize = COLOR_CUBE_OFFSET + COLOR_CUBE_SIZE * COLOR_CUBE_SIZE * COLOR_CUBE_SIZE;

const NAMED_COLORS: [(u8, u8, u8); NAMED_COLOR_COUNT] = [
    (0, 0, 0),
    (42, 0, 0),
    (0, 42, 0),
    (42, 21, 0),
    (0, 0, 42),
    (42, 0, 42),
    (0, 42, 42),
    (42, 42, 42),
    (21, 21, 21),
    (63, 21, 21),
    (21, 63, 21),
    (63, 63, 21),
    (21, 21, 63),
    (63, 21, 63),
    (21, 63, 63),
    (63, 63, 63),
];

static VGA_PALETTE: Lazy<Palette> = Lazy::new(|| {
    let mut palette = Palette::default();
    for (idx, entry) in palette.entries.iter_mut().enumerate() {
        *entry = if idx < NAMED_COLOR_COUNT {
            let (r, g, b) = NAMED_COLORS[idx];
            PaletteEntry::new(r, g, b)
        } else if idx < GRAYSCALE_OFFSET {
            let cube_idx = idx - COLOR_CUBE_OFFSET;
            let level = |c: usize| (c * 63 / (COLOR_CUBE_SIZE - 1)) as u8;
            PaletteEntry::new(
                level((cube_idx / (COLOR_CUBE_SIZE * COLOR_CUBE_SIZE)) % COLOR_CUBE_SIZE),
                level((cube_idx / COLOR_CUBE_SIZE) % COLOR_CUBE_SIZE),
                level(cube_idx % COLOR_CUBE_SIZE),
            )
        } else {
            // 24-step grayscale ramp
            let level = ((idx - GRAYSCALE_OFFSET) * 63 / 23) as u8;
            PaletteEntry::new(level, level, level)
        };
    }
    palette
});

impl Palette {
    /// A generated 16-colour + 6x6x6 cube + grayscale palette.
    pub fn vga() -> Palette {
        VGA_PALETTE.clone()
    }

    pub fn entry(&self, index: u8) -> PaletteEntry {
        self.entries[index as usize]
    }

    pub fn set_entry(&mut self, index: u8, entry: PaletteEntry) {
        self.entries[index as usize] = entry;
    }

    pub fn entries(&self) -> &[PaletteEntry; PAL_SIZE] {
        &self.entries
    }
}

/// Converts RGB to hue (degrees, 0..360), saturation and value (both 0..=1).
pub fn rgb_to_hsv(rgb: Rgb) -> (f32, f32, f32) {
    let (r, g, b) = (rgb.r as i32, rgb.g as i32, rgb.b as i32);

    if r > g {
        if b > r {
            // b > r > g
            let delta = (b - g) as f32;
            let h = 240.0 + ((r - g) * 60) as f32 / delta;
            (h, delta / b as f32, b as f32 / 255.0)
        } else {
            // r > g, r >= b
            let delta = (r - g.min(b)) as f32;
            let mut h = ((g - b) * 60) as f32 / delta;
            if h < 0.0 {
                h += 360.0;
            }
            (h, delta / r as f32, r as f32 / 255.0)
        }
    } else if b > g {
        // b > g >= r
        let delta = (b - r) as f32;
        let h = 240.0 + ((r - g) * 60) as f32 / delta;
        (h, delta / b as f32, b as f32 / 255.0)
    } else {
        // g >= b, g >= r
        let delta = g - r.min(b);
        if delta == 0 {
            if g == 0 {
                (0.0, 0.0, 0.0)
            } else {
                (0.0, 0.0, g as f32 / 255.0)
            }
        } else {
            let delta = delta as f32;
            let h = 120.0 + ((b - r) * 60) as f32 / delta;
            (h, delta / g as f32, g as f32 / 255.0)
        }
    }
}

/// Converts hue/saturation/value back to RGB, rounding to the nearest level.
///
/// Results are truncated to the low 8 bits of each channel.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let mut v = v * 255.0;

    if s == 0.0 {
        let c = (v + 0.5) as i32;
        return Rgb::new(c as u8, c as u8, c as u8);
    }

    let mut h = (h % 360.0) / 60.0;
    if h < 0.0 {
        h += 6.0;
    }
    let i = h as i32;
    let f = h - i as f32;
    let x = v * s;
    let y = x * f;
    v += 0.5;
    let z = v - x;

    let (r, g, b) = match i {
        1 => (v - y, v, z),
        2 => (z, v, z + y),
        3 => (z, v - y, v),
        4 => (z + y, z, v),
        5 => (v, z, v - y),
        // 0 and the wrap-around 6
        _ => (v, z + y, z),
    };
    Rgb::new(r as i32 as u8, g as i32 as u8, b as i32 as u8)
}
