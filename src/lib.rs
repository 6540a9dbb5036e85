// src/lib.rs

//! Software 2D pixel surfaces with clipped blitting, format conversion and
//! alpha blending across 8-bit paletted, RGB565 and ARGB8888 pixels.

pub mod blender;
pub mod blit;
pub mod color;
pub mod config;
pub mod context;
pub mod export;
pub mod flood;
pub mod pixel_format;
pub mod rect;
pub mod surface;

pub use blender::{BlendMode, Blender};
pub use blit::{DrawOptions, FlipFlags};
pub use color::{Argb, Palette, PaletteEntry, Rgb};
pub use context::RenderContext;
pub use pixel_format::{ColorDepth, PixelFormat};
pub use rect::Rect;
pub use surface::{OwnedSurface, Surface, SurfaceView};
