//! Integration tests: whole draw calls against the public API.
//!
//! These build surfaces from scratch, run draws through a `RenderContext`
//! and check the resulting pixels.

use std::collections::HashSet;

use sprite_blit::config::Config;
use sprite_blit::export::write_ppm;
use sprite_blit::{
    BlendMode, ColorDepth, DrawOptions, FlipFlags, OwnedSurface, Palette, PixelFormat, Rect,
    RenderContext, Surface,
};
use test_log::test;

const ARGB: PixelFormat = PixelFormat::ARGB8888;

fn solid(width: usize, height: usize, depth: ColorDepth, color: u32) -> OwnedSurface {
    let mut surface = Surface::new(width, height, depth);
    surface.fill(color);
    surface
}

fn gradient(width: usize, height: usize, depth: ColorDepth) -> OwnedSurface {
    let mut surface = Surface::new(width, height, depth);
    let format = *surface.format();
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let color = if format.is_paletted() {
                (x * 16 + y) as u32 & 0xff
            } else {
                format.argb_to_color(0xff, (x * 50) as u8, (y * 40) as u8, ((x + y) * 20) as u8)
            };
            surface.put_pixel(x, y, color);
        }
    }
    surface
}

#[test]
fn test_packing_is_idempotent_after_one_pass() {
    let rgb555 = PixelFormat::new(2, 5, 5, 5, 0, 10, 5, 0, 0);
    let argb4444 = PixelFormat::new(2, 4, 4, 4, 4, 8, 4, 0, 12);
    for format in [PixelFormat::RGB565, ARGB, rgb555, argb4444] {
        for r in (0..=255u32).step_by(15) {
            for g in (0..=255u32).step_by(17) {
                for b in (0..=255u32).step_by(51) {
                    let once = format.rgb_to_color(r as u8, g as u8, b as u8);
                    let rgb = format.color_to_rgb(once);
                    let twice = format.rgb_to_color(rgb.r, rgb.g, rgb.b);
                    assert_eq!(once, twice, "{:?} at ({}, {}, {})", format, r, g, b);
                }
            }
        }
    }
}

#[test]
fn test_opaque_blit_scenario() {
    let ctx = RenderContext::default();
    let mut dest = solid(4, 4, ColorDepth::Bits32, ARGB.argb_to_color(255, 0, 0, 0));
    let src = solid(2, 2, ColorDepth::Bits32, ARGB.argb_to_color(255, 255, 255, 255));

    dest.draw(&ctx, &src, src.bounds(), 1, 1, &DrawOptions::opaque());

    let inside: HashSet<(i32, i32)> = [(1, 1), (1, 2), (2, 1), (2, 2)].into_iter().collect();
    for y in 0..4 {
        for x in 0..4 {
            let argb = ARGB.color_to_argb(dest.get_pixel(x, y).unwrap());
            let expected = if inside.contains(&(x, y)) {
                (255, 255, 255, 255)
            } else {
                (255, 0, 0, 0)
            };
            assert_eq!((argb.a, argb.r, argb.g, argb.b), expected, "pixel ({}, {})", x, y);
        }
    }
}

#[test]
fn test_half_blend_scenario() {
    let ctx = RenderContext::new(Palette::default(), BlendMode::RgbToRgb);
    let mut dest = solid(4, 4, ColorDepth::Bits32, ARGB.argb_to_color(255, 0, 0, 0));
    let src = solid(2, 2, ColorDepth::Bits32, ARGB.argb_to_color(255, 255, 255, 255));

    dest.draw(&ctx, &src, src.bounds(), 1, 1, &DrawOptions::blended(128));

    for (x, y) in [(1, 1), (1, 2), (2, 1), (2, 2)] {
        let argb = ARGB.color_to_argb(dest.get_pixel(x, y).unwrap());
        assert_eq!(argb.a, 0);
        for channel in [argb.r, argb.g, argb.b] {
            assert!(channel.abs_diff(127) <= 1, "channel {} at ({}, {})", channel, x, y);
        }
    }
    assert_eq!(dest.get_pixel(0, 0), Some(ARGB.argb_to_color(255, 0, 0, 0)));
}

#[test]
fn test_degenerate_clip_never_writes() {
    let mut ctx = RenderContext::default();
    for depth in [ColorDepth::Bits8, ColorDepth::Bits16, ColorDepth::Bits32] {
        let src = gradient(5, 5, depth);
        for mode in BlendMode::ALL {
            ctx.set_blend_mode(mode);
            let mut dest = gradient(6, 6, depth);
            dest.set_clip(Rect::new(3, 3, 3, 6));
            let before = dest.pixels().to_vec();
            for flip in [FlipFlags::empty(), FlipFlags::all()] {
                for alpha in [None, Some(0), Some(200)] {
                    let options = DrawOptions {
                        flip,
                        skip_trans: true,
                        alpha,
                        tint: None,
                    };
                    dest.draw(&ctx, &src, src.bounds(), 0, 0, &options);
                }
            }
            assert_eq!(dest.pixels(), &before[..], "{:?} with {:?}", depth, mode);
        }
    }
}

#[test]
fn test_opaque_copy_is_byte_identical_for_every_depth() {
    let ctx = RenderContext::default();
    for depth in [ColorDepth::Bits8, ColorDepth::Bits16, ColorDepth::Bits32] {
        let src = gradient(6, 5, depth);
        let src_rect = Rect::new(1, 0, 5, 4);
        let mut dest = Surface::new(10, 10, depth);
        dest.draw(&ctx, &src, src_rect, 2, 3, &DrawOptions::opaque());

        let bpp = dest.bytes_per_pixel();
        for row in 0..src_rect.height() as usize {
            let width_bytes = src_rect.width() as usize * bpp;
            let s = (src_rect.top as usize + row) * src.pitch() + src_rect.left as usize * bpp;
            let d = (3 + row) * dest.pitch() + 2 * bpp;
            assert_eq!(
                &dest.pixels()[d..d + width_bytes],
                &src.pixels()[s..s + width_bytes],
                "{:?} row {}",
                depth,
                row
            );
        }
    }
}

#[test]
fn test_transparency_key_ignores_alpha_bits() {
    let ctx = RenderContext::default();
    let mut src = Surface::new(4, 1, ColorDepth::Bits32);
    for (x, a) in [0u8, 0x40, 0xc0, 0xff].into_iter().enumerate() {
        src.put_pixel(x as i32, 0, ARGB.argb_to_color(a, 255, 0, 255));
    }
    let background = ARGB.argb_to_color(0xff, 1, 2, 3);
    for alpha in [None, Some(255), Some(64)] {
        let mut dest = solid(4, 1, ColorDepth::Bits32, background);
        let options = DrawOptions {
            skip_trans: true,
            alpha,
            ..DrawOptions::default()
        };
        dest.draw(&ctx, &src, src.bounds(), 0, 0, &options);
        for x in 0..4 {
            assert_eq!(dest.get_pixel(x, 0), Some(background));
        }
    }
}

#[test]
fn test_rgb_to_rgb_boundaries_through_draw() {
    let ctx = RenderContext::default();
    let src = solid(2, 2, ColorDepth::Bits16, 0xf800);
    let background: u16 = 0x001f;

    let mut dest = solid(2, 2, ColorDepth::Bits16, background as u32);
    dest.draw(&ctx, &src, src.bounds(), 0, 0, &DrawOptions::blended(0));
    assert!(dest.pixels().chunks(2).all(|p| u16::from_ne_bytes([p[0], p[1]]) == background));

    dest.draw(&ctx, &src, src.bounds(), 0, 0, &DrawOptions::blended(255));
    assert!(dest.pixels().chunks(2).all(|p| u16::from_ne_bytes([p[0], p[1]]) == 0xf800));
}

#[test]
fn test_argb_to_argb_transparent_source_is_noop() {
    let ctx = RenderContext::new(Palette::default(), BlendMode::ArgbToArgb);
    let src = solid(3, 3, ColorDepth::Bits32, ARGB.argb_to_color(0, 255, 255, 255));
    let background = ARGB.argb_to_color(0x7f, 10, 20, 30);
    let mut dest = solid(3, 3, ColorDepth::Bits32, background);
    for alpha in [1, 128, 255] {
        dest.draw(&ctx, &src, src.bounds(), 0, 0, &DrawOptions::blended(alpha));
    }
    assert!(dest
        .pixels()
        .chunks(4)
        .all(|p| u32::from_ne_bytes([p[0], p[1], p[2], p[3]]) == background));
}

#[test]
fn test_circle_fill_rotation_symmetry() {
    let mut surface = Surface::new(11, 11, ColorDepth::Bits32);
    let color = ARGB.rgb_to_color(9, 8, 7);
    surface.circle_fill(5, 5, 3, color);

    let mut drawn = HashSet::new();
    for y in 0..11 {
        for x in 0..11 {
            if surface.get_pixel(x, y) == Some(color) {
                drawn.insert((x - 5, y - 5));
            }
        }
    }
    assert!(drawn.contains(&(0, 0)));
    for &(dx, dy) in &drawn {
        assert!(drawn.contains(&(-dy, dx)));
        assert!(drawn.contains(&(-dx, -dy)));
        assert!(drawn.contains(&(dy, -dx)));
    }
}

#[test]
fn test_sprite_with_palette_on_truecolour_canvas() {
    let ctx = RenderContext::new(Palette::vga(), BlendMode::RgbToRgb);
    let mut sprite = Surface::new(4, 4, ColorDepth::Bits8);
    sprite.circle_fill(2, 2, 1, 15);

    let mut canvas = solid(8, 8, ColorDepth::Bits16, 0);
    canvas.draw(&ctx, &sprite, sprite.bounds(), 2, 2, &DrawOptions::opaque().skip_trans(true));

    let white = ctx.palette().entry(15).to_rgb();
    let expected = PixelFormat::RGB565.rgb_to_color(white.r, white.g, white.b);
    assert_eq!(canvas.get_pixel(4, 4), Some(expected));
    // Index 0 around the disc stays transparent.
    assert_eq!(canvas.get_pixel(2, 2), Some(0));
}

#[test]
fn test_config_driven_render_exports_ppm() {
    let config: Config = serde_json::from_str(
        r#"{
            "canvas": { "width": 16, "height": 8, "depth": 32, "background": 4278190080 },
            "blending": { "mode": "opaque", "alpha": 255 },
            "sprite": { "size": 4, "x": 2, "y": 2, "scale": 2, "skip_trans": false }
        }"#,
    )
    .unwrap();

    let ctx = RenderContext::new(Palette::vga(), config.blending.mode);
    let mut canvas = solid(
        config.canvas.width,
        config.canvas.height,
        config.canvas.depth,
        config.canvas.background,
    );
    let sprite = solid(4, 4, ColorDepth::Bits32, ARGB.argb_to_color(0x10, 200, 100, 50));
    let side = (config.sprite.size as u32 * config.sprite.scale) as i32;
    canvas.stretch_draw(
        &ctx,
        &sprite,
        sprite.bounds(),
        Rect::from_size(config.sprite.x, config.sprite.y, side, side),
        config.sprite.skip_trans,
        config.blending.alpha,
    );

    assert_eq!(canvas.get_pixel(2, 2), Some(ARGB.argb_to_color(0xff, 200, 100, 50)));
    assert_eq!(canvas.get_pixel(9, 7), Some(ARGB.argb_to_color(0xff, 200, 100, 50)));
    assert_eq!(canvas.get_pixel(10, 2), Some(config.canvas.background));

    let mut out = Vec::new();
    write_ppm(&mut out, &canvas, ctx.palette()).unwrap();
    let header = b"P6\n16 8\n255\n";
    assert_eq!(&out[..header.len()], header);
    assert_eq!(out.len(), header.len() + 16 * 8 * 3);
    let offset = header.len() + (2 * 16 + 2) * 3;
    assert_eq!(&out[offset..offset + 3], &[200, 100, 50]);
}
