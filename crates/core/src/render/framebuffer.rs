use image::{Rgb, RgbImage};

use super::{
    font::{self, CELL_HEIGHT, CELL_WIDTH, GLYPH_HEIGHT, GLYPH_WIDTH},
    Canvas,
};
use crate::palette;

/// Indexed-colour raster that clips every primitive to its bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major palette indices.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Converts the indexed frame to RGB through the palette.
    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let index = self.pixels[y as usize * self.width as usize + x as usize];
            Rgb(palette::rgb(index))
        })
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn set(&mut self, x: i32, y: i32, color: u8) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    fn hline(&mut self, x1: i32, x2: i32, y: i32, color: u8) {
        for x in x1.min(x2)..=x1.max(x2) {
            self.set(x, y, color);
        }
    }
}

/// Snaps a coordinate to the pixel grid. Non-finite values land far outside
/// any canvas so they are clipped.
fn px(value: f32) -> i32 {
    if value.is_finite() {
        value.round().clamp(i32::MIN as f32 / 2.0, i32::MAX as f32 / 2.0) as i32
    } else {
        i32::MIN / 2
    }
}

/// Limits the work a degenerate radius or size can cause.
const MAX_EXTENT: i32 = 4096;

impl Canvas for Framebuffer {
    fn clear(&mut self, color: u8) {
        self.pixels.fill(color);
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: u8) {
        let (mut x, mut y) = (px(x1), px(y1));
        let (x2, y2) = (px(x2), px(y2));
        let dx = (x2 as i64 - x as i64).abs();
        let dy = -(y2 as i64 - y as i64).abs();
        if dx > MAX_EXTENT as i64 * 4 || -dy > MAX_EXTENT as i64 * 4 {
            return;
        }
        let sx = if x < x2 { 1 } else { -1 };
        let sy = if y < y2 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set(x, y, color);
            if x == x2 && y == y2 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn circle(&mut self, x: f32, y: f32, radius: f32, color: u8) {
        let (cx, cy, r) = (px(x), px(y), px(radius));
        if r < 0 || r > MAX_EXTENT {
            return;
        }
        let (mut dx, mut dy) = (r, 0);
        let mut err = 1 - r;
        while dx >= dy {
            for (ox, oy) in [
                (dx, dy),
                (dy, dx),
                (-dy, dx),
                (-dx, dy),
                (-dx, -dy),
                (-dy, -dx),
                (dy, -dx),
                (dx, -dy),
            ] {
                self.set(cx + ox, cy + oy, color);
            }
            dy += 1;
            if err < 0 {
                err += 2 * dy + 1;
            } else {
                dx -= 1;
                err += 2 * (dy - dx) + 1;
            }
        }
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: u8) {
        let (cx, cy, r) = (px(x), px(y), px(radius));
        if r < 0 || r > MAX_EXTENT {
            return;
        }
        for dy in -r..=r {
            let span = ((r * r - dy * dy) as f32).sqrt() as i32;
            self.hline(cx - span, cx + span, cy + dy, color);
        }
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: u8) {
        let (x0, y0, w, h) = (px(x), px(y), px(width), px(height));
        if w <= 0 || h <= 0 {
            return;
        }
        let x_start = x0.max(0);
        let y_start = y0.max(0);
        let x_end = x0.saturating_add(w).min(self.width as i32);
        let y_end = y0.saturating_add(h).min(self.height as i32);
        for row in y_start..y_end {
            for col in x_start..x_end {
                self.set(col, row, color);
            }
        }
    }

    fn point(&mut self, x: f32, y: f32, color: u8) {
        self.set(px(x), px(y), color);
    }

    fn text(&mut self, x: f32, y: f32, text: &str, color: u8) {
        let (origin_x, mut cursor_y) = (px(x), px(y));
        let mut cursor_x = origin_x;
        for c in text.chars() {
            if c == '\n' {
                cursor_x = origin_x;
                cursor_y += CELL_HEIGHT;
                continue;
            }
            if let Some(rows) = font::glyph(c) {
                for (row, bits) in (0..GLYPH_HEIGHT).zip(rows) {
                    for col in 0..GLYPH_WIDTH {
                        if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                            self.set(cursor_x + col, cursor_y + row, color);
                        }
                    }
                }
            }
            cursor_x += CELL_WIDTH;
        }
    }
}
