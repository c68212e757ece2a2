use std::path::Path;

use image::RgbImage;
use soarscape_common::{Color, Font};

use crate::surface::Surface;

/// Glyph rows for the built-in 3x5 font, most significant of the low three bits on the left.
fn glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        ' ' => [0; 5],
        _ => [0b111, 0b001, 0b011, 0b000, 0b010],
    }
}

/// Errors from exporting a [`Canvas`] frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame buffer does not hold {width}x{height} RGB pixels")]
    BufferSize { width: usize, height: usize },
    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Software RGB framebuffer implementing [`Surface`].
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    color: Color,
    font: Font,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 3],
            color: Color::WHITE,
            font: Font::default(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, color: Color) {
        for px in self.pixels.chunks_exact_mut(3) {
            px.copy_from_slice(&[color.r, color.g, color.b]);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 3;
        Some(Color::rgb(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]))
    }

    /// Raw RGB bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Copy the frame into an `image` buffer.
    pub fn to_image(&self) -> Result<RgbImage, FrameError> {
        RgbImage::from_raw(self.width as u32, self.height as u32, self.as_bytes().to_vec()).ok_or(
            FrameError::BufferSize {
                width: self.width,
                height: self.height,
            },
        )
    }

    /// Save the frame to `path`; the extension picks the format (`.png`, `.ppm`).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FrameError> {
        self.to_image()?.save(path)?;
        Ok(())
    }

    /// Clip a segment to the pixel rectangle (Liang-Barsky). `None` when it misses entirely.
    fn clip_line(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> Option<(i32, i32, i32, i32)> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let x_max = (self.width - 1) as f64;
        let y_max = (self.height - 1) as f64;
        let (fx, fy) = (x0 as f64, y0 as f64);
        let (dx, dy) = ((x1 as f64) - fx, (y1 as f64) - fy);
        let (mut t0, mut t1) = (0.0f64, 1.0f64);
        for (p, q) in [(-dx, fx), (dx, x_max - fx), (-dy, fy), (dy, y_max - fy)] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
        let at = |t: f64| ((fx + t * dx).round() as i32, (fy + t * dy).round() as i32);
        let ((ax, ay), (bx, by)) = (at(t0), at(t1));
        Some((ax, ay, bx, by))
    }

    fn plot(&mut self, x: i32, y: i32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let i = (y as usize * self.width + x as usize) * 3;
        self.pixels[i..i + 3].copy_from_slice(&[self.color.r, self.color.g, self.color.b]);
    }

    fn span(&mut self, y: i32, x_from: i32, x_to: i32) {
        if y < 0 || y as usize >= self.height {
            return;
        }
        let lo = x_from.max(0);
        let hi = x_to.min(self.width as i32 - 1);
        for x in lo..=hi {
            self.plot(x, y);
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        for row in y..y + h {
            self.span(row, x, x + w - 1);
        }
    }
}

impl Surface for Canvas {
    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn set_font(&mut self, font: &Font) {
        self.font = font.clone();
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        let Some((x0, y0, x1, y1)) = self.clip_line(x0, y0, x1, y1) else {
            return;
        };
        let (mut x, mut y) = (x0, y0);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.plot(x, y);
            if x == x1 && y == y1 {
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

    /// Even-odd scanline fill sampled at pixel centers.
    fn fill_polygon(&mut self, points: &[(i32, i32)]) {
        if points.len() < 3 {
            return;
        }
        let y_min = points.iter().map(|p| p.1).min().unwrap_or(0).max(0);
        let y_max = points
            .iter()
            .map(|p| p.1)
            .max()
            .unwrap_or(0)
            .min(self.height as i32 - 1);
        let mut crossings: Vec<f32> = Vec::with_capacity(points.len());
        for y in y_min..=y_max {
            let sy = y as f32 + 0.5;
            crossings.clear();
            for (i, &(x0, y0)) in points.iter().enumerate() {
                let (x1, y1) = points[(i + 1) % points.len()];
                let (fy0, fy1) = (y0 as f32, y1 as f32);
                if (fy0 <= sy && sy < fy1) || (fy1 <= sy && sy < fy0) {
                    let t = (sy - fy0) / (fy1 - fy0);
                    crossings.push(x0 as f32 + t * (x1 - x0) as f32);
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for pair in crossings.chunks_exact(2) {
                let from = (pair[0] - 0.5).ceil() as i32;
                let to = (pair[1] - 0.5).floor() as i32;
                self.span(y, from, to);
            }
        }
    }

    /// Blocky text from the built-in 3x5 font, one glyph cell per `size / 5` pixels.
    fn draw_text(&mut self, text: &str, x: i32, y: i32) {
        let cell = (self.font.size as i32 / 5).max(1);
        let mut pen = x;
        for c in text.chars() {
            for (row, bits) in glyph(c).iter().enumerate() {
                for col in 0..3 {
                    if bits & (0b100 >> col) != 0 {
                        self.fill_rect(pen + col * cell, y + row as i32 * cell, cell, cell);
                    }
                }
            }
            pen += 4 * cell;
        }
    }

    fn fill_oval(&mut self, x: i32, y: i32, width: i32, height: i32) {
        if width <= 0 || height <= 0 {
            return;
        }
        let rx = width as f32 * 0.5;
        let ry = height as f32 * 0.5;
        let cx = x as f32 + rx;
        let cy = y as f32 + ry;
        for row in y..y + height {
            let dy = (row as f32 + 0.5 - cy) / ry;
            if dy.abs() > 1.0 {
                continue;
            }
            let half = rx * (1.0 - dy * dy).sqrt();
            let from = (cx - half - 0.5).ceil() as i32;
            let to = (cx + half - 0.5).floor() as i32;
            self.span(row, from, to);
        }
    }
}
