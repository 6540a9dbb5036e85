// src/export.rs

//! Dumps a surface as a binary PPM (P6) image for inspection.

use std::io::Write;

use anyhow::Context;
use log::debug;

use crate::color::{Palette, Rgb};
use crate::surface::Surface;

/// Writes `surface` as P6 PPM. Paletted surfaces are resolved through
/// `palette`; alpha is dropped. The writer is flushed before returning.
pub fn write_ppm<W: Write>(writer: &mut W, surface: &Surface<'_>, palette: &Palette) -> anyhow::Result<()> {
    let (width, height) = (surface.width(), surface.height());
    // PPM header: P6 means binary RGB
    write!(writer, "P6\n{} {}\n255\n", width, height).context("Failed to write PPM header")?;

    let format = surface.format();
    let mut row = Vec::with_capacity(width * 3);
    for y in 0..height as i32 {
        row.clear();
        for x in 0..width as i32 {
            let raw = surface.get_pixel(x, y).unwrap_or(0);
            let Rgb { r, g, b } = if format.is_paletted() {
                palette.entry(raw as u8).to_rgb()
            } else {
                format.color_to_rgb(raw)
            };
            row.extend_from_slice(&[r, g, b]);
        }
        writer
            .write_all(&row)
            .with_context(|| format!("Failed to write PPM row {}", y))?;
    }

    // BufWriter::drop discards flush errors.
    writer.flush().context("Failed to flush PPM output")?;

    debug!("Exported {}x{} surface as PPM", width, height);
    Ok(())
}
