// src/surface.rs

//! Pixel surfaces.
//!
//! A `Surface` is a rectangular pixel buffer with a fixed [`PixelFormat`], a
//! row pitch and a clip rectangle. It either owns its bytes or is a view into
//! a parent surface created with [`Surface::sub_surface`]; the view borrows
//! the parent mutably, so the parent cannot be dropped or drawn to while the
//! view is alive.
//!
//! Pixel values are stored raw, in native byte order, at 1, 2 or 4 bytes per
//! pixel.

use std::fmt;
use std::ops::{Deref, Range};

use anyhow::ensure;
use log::trace;

use crate::pixel_format::{ColorDepth, PixelFormat};
use crate::rect::Rect;

enum PixelStorage<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a mut [u8]),
    /// Only ever wrapped in a `SurfaceView`, which hands out `&Surface`.
    Shared(&'a [u8]),
}

impl PixelStorage<'_> {
    fn as_slice(&self) -> &[u8] {
        match self {
            PixelStorage::Owned(bytes) => bytes,
            PixelStorage::Borrowed(bytes) => bytes,
            PixelStorage::Shared(bytes) => bytes,
        }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            PixelStorage::Owned(bytes) => bytes,
            PixelStorage::Borrowed(bytes) => bytes,
            PixelStorage::Shared(_) => unreachable!("read-only surface view mutated"),
        }
    }
}

/// A pixel buffer plus geometry and clipping state.
pub struct Surface<'a> {
    pixels: PixelStorage<'a>,
    width: usize,
    height: usize,
    pitch: usize,
    format: PixelFormat,
    clip: Rect,
    clipping: bool,
}

/// A surface that owns its pixel buffer.
pub type OwnedSurface = Surface<'static>;

impl Surface<'static> {
    /// Creates a zero-filled surface at one of the canonical colour depths.
    pub fn new(width: usize, height: usize, depth: ColorDepth) -> Self {
        Self::with_format(width, height, depth.format())
    }

    /// Creates a zero-filled surface with an arbitrary pixel format.
    pub fn with_format(width: usize, height: usize, format: PixelFormat) -> Self {
        let pitch = width * format.bytes_per_pixel as usize;
        Self::from_storage(
            PixelStorage::Owned(vec![0u8; pitch * height]),
            width,
            height,
            pitch,
            format,
        )
    }

    /// Wraps existing pixel bytes, e.g. a decoded sprite.
    pub fn from_pixels(
        pixels: Vec<u8>,
        width: usize,
        height: usize,
        pitch: usize,
        format: PixelFormat,
    ) -> anyhow::Result<Self> {
        let row_bytes = width * format.bytes_per_pixel as usize;
        ensure!(
            pitch >= row_bytes,
            "Pitch {} is smaller than a row of {} bytes",
            pitch,
            row_bytes
        );
        let needed = required_len(width, height, pitch, format);
        ensure!(
            pixels.len() >= needed,
            "Pixel buffer holds {} bytes, {}x{} surface with pitch {} needs {}",
            pixels.len(),
            width,
            height,
            pitch,
            needed
        );
        Ok(Self::from_storage(
            PixelStorage::Owned(pixels),
            width,
            height,
            pitch,
            format,
        ))
    }
}

impl<'a> Surface<'a> {
    fn from_storage(
        pixels: PixelStorage<'a>,
        width: usize,
        height: usize,
        pitch: usize,
        format: PixelFormat,
    ) -> Self {
        Surface {
            pixels,
            width,
            height,
            pitch,
            format,
            clip: Rect::new(0, 0, width as i32, height as i32),
            clipping: true,
        }
    }

    /// Returns a view onto `rect` of this surface.
    ///
    /// The rectangle is clamped to the surface bounds. The view shares the
    /// parent's pixels and pitch but has its own origin and a clip rectangle
    /// covering the whole view.
    pub fn sub_surface(&mut self, rect: Rect) -> Surface<'_> {
        let (width, height, range) = self.view_range(rect);
        let (pitch, format) = (self.pitch, self.format);
        let view = &mut self.pixels.as_mut_slice()[range];
        Surface::from_storage(PixelStorage::Borrowed(view), width, height, pitch, format)
    }

    /// Returns a read-only view onto `rect`, e.g. one frame of a shared
    /// sprite sheet used as a draw source.
    ///
    /// Clamping and clip behave as in [`Surface::sub_surface`]; any number of
    /// these views may coexist.
    pub fn view(&self, rect: Rect) -> SurfaceView<'_> {
        let (width, height, range) = self.view_range(rect);
        let bytes = &self.pixels.as_slice()[range];
        SurfaceView(Surface::from_storage(
            PixelStorage::Shared(bytes),
            width,
            height,
            self.pitch,
            self.format,
        ))
    }

    /// Geometry and byte range of `rect` clamped to this surface.
    fn view_range(&self, rect: Rect) -> (usize, usize, Range<usize>) {
        let area = rect.intersect(&self.bounds());
        let (width, height) = (area.width() as usize, area.height() as usize);
        if width == 0 || height == 0 {
            return (0, 0, 0..0);
        }
        let start = self.offset(area.left as usize, area.top as usize);
        let len = required_len(width, height, self.pitch, self.format);
        (width, height, start..start + len)
    }

    /// Copies the pixels into a new owning surface with a tight pitch.
    pub fn to_owned_surface(&self) -> OwnedSurface {
        let mut copy = Surface::with_format(self.width, self.height, self.format);
        let row_bytes = self.row_bytes();
        for y in 0..self.height {
            let src = &self.pixels()[y * self.pitch..y * self.pitch + row_bytes];
            copy.pixels_mut()[y * row_bytes..(y + 1) * row_bytes].copy_from_slice(src);
        }
        copy.clip = self.clip;
        copy.clipping = self.clipping;
        copy
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes per row.
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn format(&self) -> &PixelFormat {
        &self.format
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel as usize
    }

    pub fn is_owned(&self) -> bool {
        matches!(self.pixels, PixelStorage::Owned(_))
    }

    pub fn pixels(&self) -> &[u8] {
        self.pixels.as_slice()
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        self.pixels.as_mut_slice()
    }

    /// The whole surface as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    /// The stored clip rectangle.
    pub fn clip_rect(&self) -> Rect {
        self.clip
    }

    /// Sets the clip rectangle, clamped to the surface bounds.
    ///
    /// An inverted or zero-sized rectangle is kept as given (after clamping)
    /// and disables drawing until the clip is changed again.
    pub fn set_clip(&mut self, rect: Rect) {
        let (w, h) = (self.width as i32, self.height as i32);
        self.clip = Rect::new(
            rect.left.clamp(0, w),
            rect.top.clamp(0, h),
            rect.right.clamp(0, w),
            rect.bottom.clamp(0, h),
        );
    }

    pub fn set_clipping(&mut self, enabled: bool) {
        self.clipping = enabled;
    }

    pub fn is_clipping(&self) -> bool {
        self.clipping
    }

    /// The region draw calls are confined to.
    pub fn active_clip(&self) -> Rect {
        if self.clipping {
            self.clip
        } else {
            self.bounds()
        }
    }

    /// The colour key that `skip_trans` draws treat as see-through.
    ///
    /// Index 0 for paletted surfaces, otherwise magenta with zero alpha.
    pub fn transparent_color(&self) -> u32 {
        if self.format.is_paletted() {
            0
        } else {
            self.format.argb_to_color(0, 255, 0, 255)
        }
    }

    /// Reads the raw value at `(x, y)`, or `None` outside the surface.
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.read_at(self.offset(x as usize, y as usize)))
    }

    /// Writes a raw value at `(x, y)`; ignored outside the surface.
    pub fn put_pixel(&mut self, x: i32, y: i32, color: u32) {
        if !self.in_bounds(x, y) {
            return;
        }
        let offset = self.offset(x as usize, y as usize);
        self.write_at(offset, color);
    }

    /// Horizontal line from `x` to `x2` inclusive, clamped to the surface.
    pub fn h_line(&mut self, x: i32, y: i32, x2: i32, color: u32) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (mut x1, mut x2) = if x2 < x { (x2, x) } else { (x, x2) };
        x1 = x1.max(0);
        x2 = x2.min(self.width as i32 - 1);
        if x2 < x1 {
            return;
        }
        let bpp = self.bytes_per_pixel();
        let mut offset = self.offset(x1 as usize, y as usize);
        for _ in x1..=x2 {
            self.write_at(offset, color);
            offset += bpp;
        }
    }

    /// Vertical line from `y` to `y2` inclusive, clamped to the surface.
    pub fn v_line(&mut self, x: i32, y: i32, y2: i32, color: u32) {
        if x < 0 || x >= self.width as i32 {
            return;
        }
        let (mut y1, mut y2) = if y2 < y { (y2, y) } else { (y, y2) };
        y1 = y1.max(0);
        y2 = y2.min(self.height as i32 - 1);
        if y2 < y1 {
            return;
        }
        let mut offset = self.offset(x as usize, y1 as usize);
        for _ in y1..=y2 {
            self.write_at(offset, color);
            offset += self.pitch;
        }
    }

    /// Sets every pixel to `color`.
    pub fn fill(&mut self, color: u32) {
        for y in 0..self.height as i32 {
            self.h_line(0, y, self.width as i32 - 1, color);
        }
    }

    /// Sets every pixel to zero.
    pub fn clear(&mut self) {
        let row_bytes = self.row_bytes();
        let pitch = self.pitch;
        for y in 0..self.height {
            self.pixels_mut()[y * pitch..y * pitch + row_bytes].fill(0);
        }
    }

    /// Forces the alpha channel of every pixel to fully opaque.
    ///
    /// Does nothing for formats without alpha.
    ///
    /// # Panics
    /// Panics if the format has alpha but is not 4 bytes per pixel.
    pub fn make_opaque(&mut self) {
        if !self.format.has_alpha() {
            return;
        }
        assert_eq!(
            self.format.bytes_per_pixel, 4,
            "make_opaque requires a 32-bit surface"
        );
        let mask = self.format.alpha_mask();
        for y in 0..self.height {
            for x in 0..self.width {
                let offset = self.offset(x, y);
                let value = self.read_at(offset);
                self.write_at(offset, value | mask);
            }
        }
    }

    /// Draws a filled circle centred on `(x, y)`.
    ///
    /// Midpoint algorithm emitting one horizontal span per scanline in each
    /// octant pair; spans are clamped by [`Surface::h_line`].
    pub fn circle_fill(&mut self, x: i32, y: i32, radius: i32, color: u32) {
        if radius < 0 {
            trace!("circle_fill: negative radius {}, nothing to draw", radius);
            return;
        }
        let mut cx = 0;
        let mut cy = radius;
        let mut df = 1 - radius;
        let mut d_e = 3;
        let mut d_se = -2 * radius + 5;

        loop {
            self.h_line(x - cy, y - cx, x + cy, color);
            if cx != 0 {
                self.h_line(x - cy, y + cx, x + cy, color);
            }

            if df < 0 {
                df += d_e;
                d_e += 2;
                d_se += 2;
            } else {
                if cx != cy {
                    self.h_line(x - cx, y - cy, x + cx, color);
                    if cy != 0 {
                        self.h_line(x - cx, y + cy, x + cx, color);
                    }
                }
                df += d_se;
                d_e += 2;
                d_se += 4;
                cy -= 1;
            }

            cx += 1;
            if cx > cy {
                break;
            }
        }
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    fn row_bytes(&self) -> usize {
        self.width * self.bytes_per_pixel()
    }

    /// Byte offset of an in-bounds pixel.
    pub(crate) fn offset(&self, x: usize, y: usize) -> usize {
        y * self.pitch + x * self.bytes_per_pixel()
    }

    /// Reads the raw pixel value at a byte offset.
    pub(crate) fn read_at(&self, offset: usize) -> u32 {
        let bytes = self.pixels();
        match self.format.bytes_per_pixel {
            1 => bytes[offset] as u32,
            2 => u16::from_ne_bytes([bytes[offset], bytes[offset + 1]]) as u32,
            4 => u32::from_ne_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ]),
            other => panic!("Unsupported pixel size {} in Surface::read_at", other),
        }
    }

    /// Writes a raw pixel value at a byte offset, truncated to the pixel size.
    pub(crate) fn write_at(&mut self, offset: usize, color: u32) {
        let bpp = self.format.bytes_per_pixel;
        let bytes = self.pixels_mut();
        match bpp {
            1 => bytes[offset] = color as u8,
            2 => bytes[offset..offset + 2].copy_from_slice(&(color as u16).to_ne_bytes()),
            4 => bytes[offset..offset + 4].copy_from_slice(&color.to_ne_bytes()),
            other => panic!("Unsupported pixel size {} in Surface::write_at", other),
        }
    }
}

impl fmt::Debug for Surface<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pitch", &self.pitch)
            .field("format", &self.format)
            .field("clip", &self.clip)
            .field("clipping", &self.clipping)
            .field("owned", &self.is_owned())
            .finish()
    }
}

/// A read-only window into another surface, created by [`Surface::view`].
///
/// Dereferences to [`Surface`] for reading and for use as a draw source.
pub struct SurfaceView<'a>(Surface<'a>);

impl<'a> Deref for SurfaceView<'a> {
    type Target = Surface<'a>;

    fn deref(&self) -> &Surface<'a> {
        &self.0
    }
}

impl fmt::Debug for SurfaceView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SurfaceView").field(&self.0).finish()
    }
}

fn required_len(width: usize, height: usize, pitch: usize, format: PixelFormat) -> usize {
    if width == 0 || height == 0 {
        0
    } else {
        (height - 1) * pitch + width * format.bytes_per_pixel as usize
    }
}
