//! CPU raster implementation of [`DrawSurface`] on an `image` buffer.
//!
//! Good enough for the CLI demo and integration tests: hard-edged Bresenham
//! lines with square brushes and scanline-filled circles. Text is not
//! rasterized (no font stack in this crate); annotations are recorded with
//! their anchors so hosts and tests can still observe them.

use image::{Rgba, RgbaImage};
use kurbo::Point;

use crate::render::{DrawSurface, Rgba8};

#[derive(Clone, Debug)]
pub struct RasterSurface {
    image: RgbaImage,
    annotations: Vec<(String, Point)>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            annotations: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The rendered pixels, straight RGBA8.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Text annotations issued since the last `clear`.
    pub fn annotations(&self) -> &[(String, Point)] {
        &self.annotations
    }

    fn put(&mut self, x: i64, y: i64, color: Rgba8) {
        if x < 0 || y < 0 || x >= i64::from(self.image.width()) || y >= i64::from(self.image.height())
        {
            return;
        }
        self.image
            .put_pixel(x as u32, y as u32, Rgba([color.r, color.g, color.b, color.a]));
    }
}

impl DrawSurface for RasterSurface {
    fn clear(&mut self, color: Rgba8) {
        let px = Rgba([color.r, color.g, color.b, color.a]);
        for pixel in self.image.pixels_mut() {
            *pixel = px;
        }
        self.annotations.clear();
    }

    fn line(&mut self, from: Point, to: Point, color: Rgba8, width: f64) {
        // Bresenham with a square brush of the requested width.
        let brush = (width.max(1.0).round() as i64) / 2;
        let (mut x0, mut y0) = (from.x.round() as i64, from.y.round() as i64);
        let (x1, y1) = (to.x.round() as i64, to.y.round() as i64);

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            for bx in -brush..=brush {
                for by in -brush..=brush {
                    self.put(x0 + bx, y0 + by, color);
                }
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn circle(&mut self, center: Point, radius: f64, color: Rgba8) {
        let r = radius.max(0.5);
        let cx = center.x.round() as i64;
        let cy = center.y.round() as i64;
        let ri = r.ceil() as i64;
        let r2 = r * r;
        for y in -ri..=ri {
            for x in -ri..=ri {
                if (x * x + y * y) as f64 <= r2 {
                    self.put(cx + x, cy + y, color);
                }
            }
        }
    }

    fn fill_rect(&mut self, origin: Point, width: f64, height: f64, color: Rgba8) {
        let x0 = origin.x.round() as i64;
        let y0 = origin.y.round() as i64;
        for y in 0..height.max(0.0).round() as i64 {
            for x in 0..width.max(0.0).round() as i64 {
                self.put(x0 + x, y0 + y, color);
            }
        }
    }

    fn text(&mut self, text: &str, anchor: Point, _color: Rgba8) {
        self.annotations.push((text.to_string(), anchor));
    }
}
