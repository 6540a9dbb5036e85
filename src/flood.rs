// src/flood.rs

//! Scanline flood fill.

use log::trace;

use crate::surface::Surface;

impl Surface<'_> {
    /// Replaces the 4-connected region around `(x, y)` that shares the seed's
    /// raw value with `color`.
    ///
    /// The fill never leaves the active clip rectangle. A seed outside the
    /// clip, or a seed already holding `color`, leaves the surface untouched.
    pub fn flood_fill(&mut self, x: i32, y: i32, color: u32) {
        let clip = self.active_clip();
        if !clip.contains(x, y) {
            trace!("flood_fill: seed ({}, {}) outside clip {:?}", x, y, clip);
            return;
        }
        let Some(target) = self.get_pixel(x, y) else {
            return;
        };
        let color = match self.bytes_per_pixel() {
            1 => color & 0xff,
            2 => color & 0xffff,
            _ => color,
        };
        if target == color {
            return;
        }

        let matches = |surface: &Surface<'_>, px: i32, py: i32| surface.get_pixel(px, py) == Some(target);

        let mut stack = vec![(x, y)];
        while let Some((sx, sy)) = stack.pop() {
            if !matches(self, sx, sy) {
                continue;
            }

            let mut left = sx;
            while left > clip.left && matches(self, left - 1, sy) {
                left -= 1;
            }
            let mut right = sx;
            while right + 1 < clip.right && matches(self, right + 1, sy) {
                right += 1;
            }
            self.h_line(left, sy, right, color);

            for ny in [sy - 1, sy + 1] {
                if ny < clip.top || ny >= clip.bottom {
                    continue;
                }
                // Seed one point per run of matching pixels on the adjacent row.
                let mut in_run = false;
                for nx in left..=right {
                    if matches(self, nx, ny) {
                        if !in_run {
                            stack.push((nx, ny));
                            in_run = true;
                        }
                    } else {
                        in_run = false;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::pixel_format::ColorDepth;
    use crate::rect::Rect;
    use crate::surface::Surface;

    fn count(surface: &Surface<'_>, color: u32) -> usize {
        let mut n = 0;
        for y in 0..surface.height() as i32 {
            for x in 0..surface.width() as i32 {
                if surface.get_pixel(x, y) == Some(color) {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn test_fills_enclosed_region_only() {
        let mut surface = Surface::new(9, 9, ColorDepth::Bits8);
        // Box outline from (2,2) to (6,6).
        surface.h_line(2, 2, 6, 1);
        surface.h_line(2, 6, 6, 1);
        surface.v_line(2, 2, 6, 1);
        surface.v_line(6, 2, 6, 1);

        surface.flood_fill(4, 4, 5);
        assert_eq!(count(&surface, 5), 9);
        assert_eq!(surface.get_pixel(0, 0), Some(0));
        assert_eq!(surface.get_pixel(2, 4), Some(1));
    }

    #[test]
    fn test_fills_concave_region() {
        let mut surface = Surface::new(7, 5, ColorDepth::Bits16);
        // A wall with a gap at the bottom: the fill must wrap around it.
        surface.v_line(3, 0, 3, 0xffff);
        surface.flood_fill(0, 0, 0x1111);
        assert_eq!(count(&surface, 0x1111), 7 * 5 - 4);
    }

    #[test]
    fn test_respects_clip_rect() {
        let mut surface = Surface::new(6, 6, ColorDepth::Bits32);
        surface.set_clip(Rect::new(1, 1, 4, 4));
        surface.flood_fill(2, 2, 0xff00_00ff);
        assert_eq!(count(&surface, 0xff00_00ff), 9);

        surface.flood_fill(5, 5, 0xffff_ffff);
        assert_eq!(count(&surface, 0xffff_ffff), 0);
    }

    #[test]
    fn test_same_color_is_noop() {
        let mut surface = Surface::new(3, 3, ColorDepth::Bits8);
        surface.fill(2);
        // 0x102 truncates to index 2 on a paletted surface.
        surface.flood_fill(1, 1, 0x102);
        assert_eq!(count(&surface, 2), 9);
    }
}
