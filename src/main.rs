// src/main.rs

//! Renders a single sprite-over-canvas scene described by a JSON config and
//! writes it out as a PPM image.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{ensure, Context};
use log::{info, warn};

use sprite_blit::config::Config;
use sprite_blit::{
    ColorDepth, DrawOptions, OwnedSurface, Palette, PixelFormat, Rect, RenderContext, Surface,
};

/// VGA palette indices used when the canvas is paletted.
const VGA_RED: u32 = 1;
const VGA_BLUE: u32 = 4;
const VGA_YELLOW: u32 = 11;
const VGA_WHITE: u32 = 15;

/// Main entry point for the `sprite-blit` renderer.
fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting sprite-blit...");

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = Config::load_or_default(config_path.as_deref())?;
    match &config_path {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("Configuration loaded (using default)."),
    }

    ensure!(
        config.canvas.width > 0 && config.canvas.height > 0,
        "Canvas must be at least 1x1, got {}x{}",
        config.canvas.width,
        config.canvas.height
    );
    ensure!(config.sprite.size > 0, "Sprite size must be non-zero");

    let ctx = RenderContext::new(Palette::vga(), config.blending.mode);
    let mut canvas = build_canvas(&config);
    info!(
        "Canvas initialized: {}x{} at {} bpp",
        canvas.width(),
        canvas.height(),
        config.canvas.depth.bits()
    );

    let sprite = build_sprite(&config, canvas.format());
    draw_sprite(&ctx, &mut canvas, &sprite, &config);

    let file = File::create(&config.output.path)
        .with_context(|| format!("Failed to create {}", config.output.path.display()))?;
    let mut writer = BufWriter::new(file);
    sprite_blit::export::write_ppm(&mut writer, &canvas, ctx.palette())
        .with_context(|| format!("Failed to export {}", config.output.path.display()))?;

    info!("Wrote {}", config.output.path.display());
    info!("sprite-blit exited successfully.");
    Ok(())
}

/// A canvas filled with the background colour and a flood-filled frame in
/// the top-left corner.
fn build_canvas(config: &Config) -> OwnedSurface {
    let depth = config.canvas.depth;
    let mut canvas = Surface::new(config.canvas.width, config.canvas.height, depth);

    let (background, frame, inside) = match depth {
        ColorDepth::Bits8 => (config.canvas.background & 0xff, VGA_WHITE, VGA_BLUE),
        _ => {
            let format = canvas.format();
            let bg = PixelFormat::ARGB8888.color_to_argb(config.canvas.background);
            (
                format.argb_to_color(bg.a, bg.r, bg.g, bg.b),
                format.rgb_to_color(255, 255, 255),
                format.rgb_to_color(40, 90, 200),
            )
        }
    };
    canvas.fill(background);

    let right = (canvas.width() as i32 - 1).min(24);
    let bottom = (canvas.height() as i32 - 1).min(24);
    canvas.h_line(0, 0, right, frame);
    canvas.h_line(0, bottom, right, frame);
    canvas.v_line(0, 0, bottom, frame);
    canvas.v_line(right, 0, bottom, frame);
    canvas.flood_fill(1, 1, inside);

    canvas
}

/// A square sprite: transparent background with a two-tone disc.
fn build_sprite(config: &Config, canvas_format: &PixelFormat) -> OwnedSurface {
    let size = config.sprite.size;
    let mut sprite = if canvas_format.is_paletted() {
        Surface::new(size, size, ColorDepth::Bits8)
    } else {
        Surface::new(size, size, ColorDepth::Bits32)
    };
    let key = sprite.transparent_color();
    sprite.fill(key);

    let (outer, inner) = if sprite.format().is_paletted() {
        (VGA_YELLOW, VGA_RED)
    } else {
        let format = sprite.format();
        (
            format.argb_to_color(0xff, 240, 190, 40),
            format.argb_to_color(0x80, 200, 30, 30),
        )
    };
    let centre = size as i32 / 2;
    sprite.circle_fill(centre, centre, centre - 1, outer);
    sprite.circle_fill(centre, centre, centre / 2, inner);
    sprite
}

fn draw_sprite(ctx: &RenderContext, canvas: &mut OwnedSurface, sprite: &OwnedSurface, config: &Config) {
    let settings = &config.sprite;

    if settings.scale <= 1 {
        let options = DrawOptions {
            flip: settings.flip,
            skip_trans: settings.skip_trans,
            alpha: config.blending.alpha,
            tint: settings.tint,
        };
        canvas.draw(ctx, sprite, sprite.bounds(), settings.x, settings.y, &options);
        info!(
            "Drew {}x{} sprite at ({}, {}) with {:?}",
            sprite.width(),
            sprite.height(),
            settings.x,
            settings.y,
            config.blending.mode
        );
        return;
    }

    if !settings.flip.is_empty() || settings.tint.is_some() {
        warn!("Flip and tint are ignored for scaled sprites");
    }
    let side = (settings.size as u32 * settings.scale) as i32;
    let target = Rect::from_size(settings.x, settings.y, side, side);
    canvas.stretch_draw(
        ctx,
        sprite,
        sprite.bounds(),
        target,
        settings.skip_trans,
        config.blending.alpha,
    );
    info!("Stretched sprite onto {:?} with {:?}", target, config.blending.mode);
}
