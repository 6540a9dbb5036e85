// src/blender.rs

//! Per-pixel colour composition.
//!
//! Every blend policy is a pure function of the source colour (in its own
//! pixel format), the destination colour (in the destination format) and an
//! 8-bit blend parameter. The policies form the closed set [`BlendMode`] and
//! are reached through the [`Blender`] trait, whose same-format method is the
//! cross-format method specialised to one format. Both call shapes therefore
//! always agree.

use serde::{Deserialize, Serialize};

use crate::color::{hsv_to_rgb, rgb_to_hsv, Argb, Rgb};
use crate::pixel_format::PixelFormat;

/// The blend policies a draw call can composite with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Linear interpolation of RGB by the blend parameter; result alpha is 0.
    #[default]
    RgbToRgb,
    /// Like `RgbToRgb` but keeps the destination's alpha.
    AlphaPreserved,
    /// "Over" compositing of two ARGB colours, source alpha scaled by the parameter.
    ArgbToArgb,
    /// "Over" compositing of an opaque RGB source onto an ARGB destination.
    RgbToArgb,
    /// RGB interpolation driven by the source's (scaled) alpha; result alpha is 0.
    ArgbToRgb,
    /// Source RGB with full alpha, parameter ignored.
    Opaque,
    /// RGB interpolation driven by the source's own alpha only.
    SourceAlpha,
    /// Source RGB, alpha is the saturating sum of both alphas.
    Additive,
    /// Source hue and saturation with the destination's value.
    Tint,
    /// `Tint` with the value darkened by the blend parameter.
    TintLight,
}

impl BlendMode {
    pub const ALL: [BlendMode; 10] = [
        BlendMode::RgbToRgb,
        BlendMode::AlphaPreserved,
        BlendMode::ArgbToArgb,
        BlendMode::RgbToArgb,
        BlendMode::ArgbToRgb,
        BlendMode::Opaque,
        BlendMode::SourceAlpha,
        BlendMode::Additive,
        BlendMode::Tint,
        BlendMode::TintLight,
    ];

    pub const fn is_tint(&self) -> bool {
        matches!(self, BlendMode::Tint | BlendMode::TintLight)
    }
}

/// Composes a source colour onto a destination colour.
pub trait Blender {
    /// Blends `src` (encoded in `src_format`) onto `dest` (encoded in
    /// `dest_format`) and returns the new destination value.
    fn blend_from(
        &self,
        src: u32,
        src_format: &PixelFormat,
        dest: u32,
        dest_format: &PixelFormat,
        alpha: u8,
    ) -> u32;

    /// Blends two colours that share `format`.
    fn blend(&self, src: u32, dest: u32, format: &PixelFormat, alpha: u8) -> u32 {
        self.blend_from(src, format, dest, format, alpha)
    }
}

impl Blender for BlendMode {
    fn blend_from(
        &self,
        src: u32,
        src_format: &PixelFormat,
        dest: u32,
        dest_format: &PixelFormat,
        alpha: u8,
    ) -> u32 {
        match self {
            BlendMode::RgbToRgb => {
                let s = src_format.color_to_rgb(src);
                let d = dest_format.color_to_rgb(dest);
                let out = lerp_rgb(s, d, fraction(alpha));
                dest_format.argb_to_color(0, out.r, out.g, out.b)
            }
            BlendMode::AlphaPreserved => {
                let s = src_format.color_to_rgb(src);
                let d = dest_format.color_to_argb(dest);
                let out = lerp_rgb(s, d.rgb(), fraction(alpha));
                dest_format.argb_to_color(d.a, out.r, out.g, out.b)
            }
            BlendMode::ArgbToArgb => {
                let s = src_format.color_to_argb(src);
                let src_alpha = scale_alpha(s.a, alpha);
                if src_alpha == 0 {
                    return dest;
                }
                let d = dest_format.color_to_argb(dest);
                let out = composite_over(s.rgb(), fraction(src_alpha), d);
                dest_format.argb_to_color(out.a, out.r, out.g, out.b)
            }
            BlendMode::RgbToArgb => {
                let s = src_format.color_to_rgb(src);
                if alpha == 0 || alpha == 0xff {
                    return dest_format.argb_to_color(0xff, s.r, s.g, s.b);
                }
                let d = dest_format.color_to_argb(dest);
                let out = composite_over(s, fraction(alpha), d);
                dest_format.argb_to_color(out.a, out.r, out.g, out.b)
            }
            BlendMode::ArgbToRgb => {
                let s = src_format.color_to_argb(src);
                let d = dest_format.color_to_rgb(dest);
                let out = lerp_rgb(s.rgb(), d, fraction(scale_alpha(s.a, alpha)));
                dest_format.argb_to_color(0, out.r, out.g, out.b)
            }
            BlendMode::Opaque => {
                let s = src_format.color_to_rgb(src);
                dest_format.argb_to_color(0xff, s.r, s.g, s.b)
            }
            BlendMode::SourceAlpha => {
                let s = src_format.color_to_argb(src);
                let d = dest_format.color_to_rgb(dest);
                let out = lerp_rgb(s.rgb(), d, fraction(s.a));
                dest_format.argb_to_color(0, out.r, out.g, out.b)
            }
            BlendMode::Additive => {
                let s = src_format.color_to_argb(src);
                if s.a == 0xff {
                    return dest_format.argb_to_color(0xff, s.r, s.g, s.b);
                }
                let dest_alpha = dest_format.color_to_argb(dest).a;
                let sum = (s.a as u32 + dest_alpha as u32).min(0xff) as u8;
                dest_format.argb_to_color(sum, s.r, s.g, s.b)
            }
            BlendMode::Tint => tint(src, src_format, dest, dest_format, None),
            BlendMode::TintLight => tint(src, src_format, dest, dest_format, Some(alpha)),
        }
    }
}

fn fraction(alpha: u8) -> f64 {
    alpha as f64 / 255.0
}

/// Source alpha modulated by a nonzero blend parameter.
fn scale_alpha(src_alpha: u8, alpha: u8) -> u8 {
    if alpha == 0 {
        src_alpha
    } else {
        (src_alpha as u32 * (alpha as u32 + 1) / 256) as u8
    }
}

fn lerp_rgb(s: Rgb, d: Rgb, a: f64) -> Rgb {
    let mix = |sc: u8, dc: u8| (sc as f64 * a + dc as f64 * (1.0 - a)) as u8;
    Rgb::new(mix(s.r, d.r), mix(s.g, d.g), mix(s.b, d.b))
}

/// Porter-Duff "over" with a nonzero source alpha `sa` (0..=1).
fn composite_over(s: Rgb, sa: f64, d: Argb) -> Argb {
    let da = d.a as f64 / 255.0 * (1.0 - sa);
    let total = sa + da;
    let mix = |sc: u8, dc: u8| ((sc as f64 * sa + dc as f64 * da) / total) as u8;
    Argb::new(
        (255.0 * total) as u8,
        mix(s.r, d.r),
        mix(s.g, d.g),
        mix(s.b, d.b),
    )
}

fn tint(
    src: u32,
    src_format: &PixelFormat,
    dest: u32,
    dest_format: &PixelFormat,
    light: Option<u8>,
) -> u32 {
    let s = src_format.color_to_rgb(src);
    let d = dest_format.color_to_argb(dest);
    let (hue, saturation, _) = rgb_to_hsv(s);
    let (_, _, mut value) = rgb_to_hsv(d.rgb());
    if let Some(alpha) = light {
        // Parameters above 250 brighten past 1.0; hsv_to_rgb wraps those channels.
        value -= 1.0 - alpha as f32 / 250.0;
        if value < 0.0 {
            value = 0.0;
        }
    }
    let out = hsv_to_rgb(hue, saturation, value);
    dest_format.argb_to_color(d.a, out.r, out.g, out.b)
}
