// src/blit.rs

//! Clipped surface-to-surface copies.
//!
//! [`Surface::draw`] copies a source rectangle 1:1 (optionally mirrored) and
//! [`Surface::stretch_draw`] resamples it to an arbitrary destination
//! rectangle. Both share one per-pixel pipeline:
//!
//! ```text
//! raw source value
//!   → colour-key test          (skip_trans)
//!   → paletted destination?    write the index unchanged
//!   → palette lookup           (paletted source, true-colour destination)
//!   → no alpha?                convert and write
//!   → tint or blend            (RenderContext blend mode)
//!   → write
//! ```
//!
//! Only pixels inside both the destination's active clip rectangle and the
//! source surface are touched.

use bitflags::bitflags;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::blender::{BlendMode, Blender};
use crate::color::{Rgb, PAL_SIZE};
use crate::context::RenderContext;
use crate::pixel_format::PixelFormat;
use crate::rect::Rect;
use crate::surface::Surface;

/// Fixed-point unit for stretch stepping (8 fractional bits).
const SCALE_THRESHOLD: i32 = 0x100;

bitflags! {
    /// Mirroring applied to the source rectangle by [`Surface::draw`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct FlipFlags: u8 {
        const HORIZONTAL = 1 << 0;
        const VERTICAL   = 1 << 1;
    }
}

/// Per-call settings for [`Surface::draw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawOptions {
    pub flip: FlipFlags,
    /// Skip source pixels equal to the transparent colour key.
    pub skip_trans: bool,
    /// Blend parameter. `None` copies pixels without blending.
    pub alpha: Option<u8>,
    /// Tint colour for blended draws.
    pub tint: Option<Rgb>,
}

impl DrawOptions {
    /// A straight copy: no flip, no colour key, no blending.
    pub fn opaque() -> Self {
        Self::default()
    }

    pub fn blended(alpha: u8) -> Self {
        Self {
            alpha: Some(alpha),
            ..Self::default()
        }
    }

    pub fn flip(mut self, flip: FlipFlags) -> Self {
        self.flip = flip;
        self
    }

    pub fn skip_trans(mut self, skip: bool) -> Self {
        self.skip_trans = skip;
        self
    }

    pub fn tint(mut self, tint: Rgb) -> Self {
        self.tint = Some(tint);
        self
    }
}

/// Everything about a draw call that is fixed before the pixel loop.
struct PixelPipeline {
    dest_format: PixelFormat,
    /// Format source values are in once they reach the blend stage.
    src_format: PixelFormat,
    /// Paletted source indices resolved into the destination format.
    palette_map: Option<Box<[u32; PAL_SIZE]>>,
    /// `(mask, key)`: skip when `value & mask == key`.
    color_key: Option<(u32, u32)>,
    alpha: Option<u8>,
    tint: Option<u32>,
    mode: BlendMode,
}

impl PixelPipeline {
    fn new(
        ctx: &RenderContext,
        src_format: &PixelFormat,
        dest_format: &PixelFormat,
        skip_trans: bool,
        alpha: Option<u8>,
        tint: Option<Rgb>,
    ) -> Self {
        assert!(
            dest_format.bytes_per_pixel == 2
                || dest_format.bytes_per_pixel == 4
                || (dest_format.is_paletted() && src_format.is_paletted()),
            "Unsupported blit from {}-byte to {}-byte pixels",
            src_format.bytes_per_pixel,
            dest_format.bytes_per_pixel
        );

        let palette_map = if src_format.is_paletted() && !dest_format.is_paletted() {
            let mut map = Box::new([0u32; PAL_SIZE]);
            for (slot, entry) in map.iter_mut().zip(ctx.palette().entries().iter()) {
                let rgb = entry.to_rgb();
                *slot = dest_format.rgb_to_color(rgb.r, rgb.g, rgb.b);
            }
            Some(map)
        } else {
            None
        };

        let color_key = skip_trans.then(|| {
            if src_format.is_paletted() {
                (0xff, 0)
            } else {
                (
                    !src_format.alpha_mask(),
                    src_format.argb_to_color(0, 255, 0, 255),
                )
            }
        });

        // Once looked up, paletted values are already in the destination format.
        let effective_src = if palette_map.is_some() {
            *dest_format
        } else {
            *src_format
        };

        let mode = ctx.blend_mode();
        let mode = if tint.is_some() && !mode.is_tint() {
            BlendMode::Tint
        } else {
            mode
        };

        PixelPipeline {
            dest_format: *dest_format,
            src_format: effective_src,
            palette_map,
            color_key,
            alpha,
            tint: tint.map(|t| dest_format.rgb_to_color(t.r, t.g, t.b)),
            mode,
        }
    }

    /// The value to store at a destination pixel, or `None` to leave it.
    fn resolve(&self, src_col: u32, dest_col: u32) -> Option<u32> {
        if let Some((mask, key)) = self.color_key {
            if src_col & mask == key {
                return None;
            }
        }

        if self.dest_format.is_paletted() {
            return Some(src_col);
        }

        let src_col = match &self.palette_map {
            Some(map) => map[(src_col & 0xff) as usize],
            None => src_col,
        };

        let Some(alpha) = self.alpha else {
            return Some(self.dest_format.convert_from(src_col, &self.src_format));
        };

        let blended = match self.tint {
            Some(tint) => {
                // The sprite pixel supplies brightness, the tint supplies hue.
                let sprite = self.dest_format.convert_from(src_col, &self.src_format);
                self.mode.blend(tint, sprite, &self.dest_format, alpha)
            }
            None => self
                .mode
                .blend_from(src_col, &self.src_format, dest_col, &self.dest_format, alpha),
        };
        Some(blended)
    }
}

impl Surface<'_> {
    /// Copies `src_rect` of `src` so its top-left lands on `(dst_x, dst_y)`.
    ///
    /// # Panics
    /// Panics when drawing true-colour pixels onto a paletted surface.
    pub fn draw(
        &mut self,
        ctx: &RenderContext,
        src: &Surface<'_>,
        src_rect: Rect,
        dst_x: i32,
        dst_y: i32,
        options: &DrawOptions,
    ) {
        let pipeline = PixelPipeline::new(
            ctx,
            src.format(),
            self.format(),
            options.skip_trans,
            options.alpha,
            options.tint,
        );

        let dst_rect = Rect::from_size(dst_x, dst_y, src_rect.width(), src_rect.height());
        let Some(area) = self.clipped_area(&dst_rect) else {
            return;
        };

        let h_flip = options.flip.contains(FlipFlags::HORIZONTAL);
        let v_flip = options.flip.contains(FlipFlags::VERTICAL);
        self.compose(src, area, &pipeline, |dx, dy| {
            let (x_ctr, y_ctr) = (dx - dst_rect.left, dy - dst_rect.top);
            let sx = if h_flip {
                src_rect.right - 1 - x_ctr
            } else {
                src_rect.left + x_ctr
            };
            let sy = if v_flip {
                src_rect.bottom - 1 - y_ctr
            } else {
                src_rect.top + y_ctr
            };
            (sx, sy)
        });
    }

    /// Resamples `src_rect` of `src` onto `dst_rect` (nearest neighbour).
    ///
    /// # Panics
    /// Panics when drawing true-colour pixels onto a paletted surface.
    pub fn stretch_draw(
        &mut self,
        ctx: &RenderContext,
        src: &Surface<'_>,
        src_rect: Rect,
        dst_rect: Rect,
        skip_trans: bool,
        alpha: Option<u8>,
    ) {
        let pipeline = PixelPipeline::new(ctx, src.format(), self.format(), skip_trans, alpha, None);

        if dst_rect.is_empty() {
            trace!("stretch_draw: empty destination {:?}", dst_rect);
            return;
        }
        let Some(area) = self.clipped_area(&dst_rect) else {
            return;
        };

        let scale_x = SCALE_THRESHOLD * src_rect.width() / dst_rect.width();
        let scale_y = SCALE_THRESHOLD * src_rect.height() / dst_rect.height();
        self.compose(src, area, &pipeline, |dx, dy| {
            let (x_ctr, y_ctr) = (dx - dst_rect.left, dy - dst_rect.top);
            (
                src_rect.left + x_ctr * scale_x / SCALE_THRESHOLD,
                src_rect.top + y_ctr * scale_y / SCALE_THRESHOLD,
            )
        });
    }

    /// Intersects a target rectangle with the active clip, `None` if nothing remains.
    fn clipped_area(&self, dst_rect: &Rect) -> Option<Rect> {
        let clip = self.active_clip();
        if clip.is_empty() {
            trace!("Blit skipped: degenerate clip {:?}", clip);
            return None;
        }
        let area = dst_rect.intersect(&clip);
        if area.is_empty() {
            trace!("Blit skipped: {:?} lies outside clip {:?}", dst_rect, clip);
            return None;
        }
        Some(area)
    }

    fn compose<F>(&mut self, src: &Surface<'_>, area: Rect, pipeline: &PixelPipeline, source_at: F)
    where
        F: Fn(i32, i32) -> (i32, i32),
    {
        for dy in area.top..area.bottom {
            for dx in area.left..area.right {
                let (sx, sy) = source_at(dx, dy);
                let Some(src_col) = src.get_pixel(sx, sy) else {
                    continue;
                };
                let offset = self.offset(dx as usize, dy as usize);
                let dest_col = self.read_at(offset);
                if let Some(value) = pipeline.resolve(src_col, dest_col) {
                    self.write_at(offset, value);
                }
            }
        }
    }
}
