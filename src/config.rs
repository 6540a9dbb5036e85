// src/config.rs

//! Defines the configuration structures for the `sprite-blit` demo renderer.
//!
//! The configuration is deserialized from a JSON file and describes a single
//! scene: a canvas, one generated sprite drawn onto it, the blend settings
//! used for the draw and where the resulting image is written.
//!
//! Every section carries sensible defaults so a partial file (or no file at
//! all) still produces a complete scene.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::blender::BlendMode;
use crate::blit::FlipFlags;
use crate::color::Rgb;
use crate::pixel_format::ColorDepth;

// --- Top-Level Configuration Structure ---

/// Represents the complete configuration for a render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)] // Apply default values for the entire struct if a field is missing.
pub struct Config {
    /// Destination canvas settings.
    pub canvas: CanvasConfig,
    /// Blend mode and blend parameter for the sprite draw.
    pub blending: BlendingConfig,
    /// Placement and draw flags for the sprite.
    pub sprite: SpriteConfig,
    /// Output settings.
    pub output: OutputConfig,
}

impl Config {
    /// Reads a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

// --- Canvas Configuration ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: usize,
    pub height: usize,
    /// Bits per pixel: 8, 16 or 32.
    pub depth: ColorDepth,
    /// Fill colour as packed ARGB8888, converted to the canvas format.
    pub background: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        CanvasConfig {
            width: 320,
            height: 200,
            depth: ColorDepth::Bits32,
            background: 0xff20_2840,
        }
    }
}

// --- Blending Configuration ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendingConfig {
    pub mode: BlendMode,
    /// Blend parameter; `None` draws the sprite without blending.
    pub alpha: Option<u8>,
}

impl Default for BlendingConfig {
    fn default() -> Self {
        BlendingConfig {
            mode: BlendMode::RgbToRgb,
            alpha: Some(192),
        }
    }
}

// --- Sprite Configuration ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteConfig {
    /// Side length of the square sprite in pixels.
    pub size: usize,
    pub x: i32,
    pub y: i32,
    /// Integer magnification; anything other than 1 uses `stretch_draw`.
    pub scale: u32,
    pub flip: FlipFlags,
    pub skip_trans: bool,
    pub tint: Option<Rgb>,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        SpriteConfig {
            size: 32,
            x: 144,
            y: 84,
            scale: 1,
            flip: FlipFlags::empty(),
            skip_trans: true,
            tint: None,
        }
    }
}

// --- Output Configuration ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where the rendered canvas is written as PPM.
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            path: PathBuf::from("sprite-blit.ppm"),
        }
    }
}
