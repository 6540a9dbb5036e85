// src/context.rs

//! Render state shared by a batch of draw calls.
//!
//! The palette and the active blend mode are set by the caller before a
//! sequence of blits and read during them. They travel as an explicit value
//! so independent renderers (and tests) never observe each other's state.

use log::debug;

use crate::blender::BlendMode;
use crate::color::Palette;

#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    palette: Palette,
    blend_mode: BlendMode,
}

impl RenderContext {
    pub fn new(palette: Palette, blend_mode: BlendMode) -> Self {
        Self {
            palette,
            blend_mode,
        }
    }

    /// Installs the palette used when paletted sprites land on true-colour surfaces.
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Installs the blend policy for subsequent blended draws.
    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        if mode != self.blend_mode {
            debug!("Blend mode {:?} -> {:?}", self.blend_mode, mode);
        }
        self.blend_mode = mode;
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }
}
