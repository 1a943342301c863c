use crate::color::Rgb;
use crate::config::render::BLACK_THRESHOLD;
use crate::error::{Result, ShowError};
use std::io::Write;

/// The 2D drawing operations the show needs. Coordinates are logical pixels.
pub trait Canvas {
    /// Logical `(width, height)`, or `SurfaceUnavailable` when there is nothing to draw on.
    fn size(&self) -> Result<(f32, f32)>;
    /// Paints `color` at `alpha` over the whole surface.
    fn wash(&mut self, color: Rgb, alpha: f32);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgb, alpha: f32);
    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb, alpha: f32);
}

/// Software framebuffer shown on a terminal with half-block cells.
pub struct RasterCanvas {
    width: usize,
    height: usize,
    scale: f32,
    pixels: Vec<[f32; 3]>,
    output_buf: Vec<u8>,
}

impl RasterCanvas {
    /// `rows` terminal rows give `rows * 2` raster pixels.
    pub fn new(cols: usize, rows: usize, scale: f32) -> Self {
        let width = cols;
        let height = rows * 2;
        Self {
            width,
            height,
            scale,
            pixels: vec![[0.0; 3]; width * height],
            output_buf: Vec::with_capacity(width * height * 25),
        }
    }

    /// Rebuilds the framebuffer at the new terminal size; contents are dropped.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        *self = Self::new(cols, rows, self.scale);
    }

    #[cfg(test)]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        (x < self.width && y < self.height).then(|| Rgb::from_f32(self.pixels[y * self.width + x]))
    }

    fn blend(&mut self, x: isize, y: isize, color: [f32; 3], alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let px = &mut self.pixels[y as usize * self.width + x as usize];
        for c in 0..3 {
            px[c] = px[c] * (1.0 - alpha) + color[c] * alpha;
        }
    }

    /// Writes the frame as `▄` cells: background is the upper pixel, foreground the lower.
    pub fn present<W: Write>(&mut self, out: &mut W) -> Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let mut prev_top_color = Rgb::WHITE;
        let mut prev_bot_color = Rgb::WHITE;

        for y in (0..self.height).step_by(2) {
            for x in 0..self.width {
                let top_idx = y * self.width + x;
                let bot_idx = if y + 1 < self.height {
                    (y + 1) * self.width + x
                } else {
                    top_idx
                };

                let top_color = quantize(self.pixels[top_idx]);
                let bot_color = quantize(self.pixels[bot_idx]);

                if top_color != prev_top_color {
                    write!(
                        self.output_buf,
                        "\x1b[48;2;{};{};{}m",
                        top_color.r, top_color.g, top_color.b
                    )?;
                    prev_top_color = top_color;
                }
                if bot_color != prev_bot_color {
                    write!(
                        self.output_buf,
                        "\x1b[38;2;{};{};{}m",
                        bot_color.r, bot_color.g, bot_color.b
                    )?;
                    prev_bot_color = bot_color;
                }

                self.output_buf.extend_from_slice("▄".as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            prev_top_color = Rgb::WHITE;
            prev_bot_color = Rgb::WHITE;
            if y + 2 < self.height {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        out.write_all(&self.output_buf)?;
        Ok(())
    }
}

// Near-black collapses to pure black so the washed-out trail stops repainting.
fn quantize(px: [f32; 3]) -> Rgb {
    if px.iter().all(|&c| c < BLACK_THRESHOLD) {
        Rgb::BLACK
    } else {
        Rgb::from_f32(px)
    }
}

impl Canvas for RasterCanvas {
    fn size(&self) -> Result<(f32, f32)> {
        if self.width == 0 || self.height == 0 {
            return Err(ShowError::SurfaceUnavailable);
        }
        Ok((self.width as f32 * self.scale, self.height as f32 * self.scale))
    }

    fn wash(&mut self, color: Rgb, alpha: f32) {
        let color = color.to_f32();
        for px in &mut self.pixels {
            for c in 0..3 {
                px[c] = px[c] * (1.0 - alpha) + color[c] * alpha;
            }
        }
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgb, alpha: f32) {
        let color = color.to_f32();
        let cx = x / self.scale;
        let cy = y / self.scale;
        let r = radius / self.scale;

        let x0 = (cx - r).floor() as isize;
        let x1 = (cx + r).ceil() as isize;
        let y0 = (cy - r).floor() as isize;
        let y1 = (cy + r).ceil() as isize;

        let mut covered = false;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r * r {
                    self.blend(px, py, color, alpha);
                    covered = true;
                }
            }
        }

        // Circles smaller than a raster pixel still light the pixel they sit in.
        if !covered {
            self.blend(cx.floor() as isize, cy.floor() as isize, color, alpha);
        }
    }

    // DDA walk with a square brush; widths under two raster pixels stay one pixel thick.
    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb, alpha: f32) {
        let color = color.to_f32();
        let brush = (width / self.scale / 2.0).floor().max(0.0) as isize;
        let (x0, y0) = (from.0 / self.scale, from.1 / self.scale);
        let (x1, y1) = (to.0 / self.scale, to.1 / self.scale);
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as usize;

        let mut last = None;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let px = (x0 + (x1 - x0) * t).floor() as isize;
            let py = (y0 + (y1 - y0) * t).floor() as isize;
            if last == Some((px, py)) {
                continue;
            }
            for dy in -brush..=brush {
                for dx in -brush..=brush {
                    self.blend(px + dx, py + dy, color, alpha);
                }
            }
            last = Some((px, py));
        }
    }
}
