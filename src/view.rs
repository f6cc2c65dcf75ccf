use kurbo::Point;

use crate::error::{OptiplayError, OptiplayResult};

/// Inclusive domain bounds for one plotted axis.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

impl AxisBounds {
    pub const UNIT: Self = Self { min: 0.0, max: 1.0 };

    pub fn new(min: f64, max: f64) -> OptiplayResult<Self> {
        if !(min < max) {
            return Err(OptiplayError::validation("AxisBounds min must be < max"));
        }
        Ok(Self { min, max })
    }
}

impl Default for AxisBounds {
    fn default() -> Self {
        Self::UNIT
    }
}

/// Pixel-space target with a symmetric zoom margin kept free for labels.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Fraction of each axis usable for the artifact, 0 < zoom <= 1.
    /// The remaining (1 - zoom) is split evenly between the two margins.
    pub zoom: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, zoom: f64) -> OptiplayResult<Self> {
        if width <= 0.0 || height <= 0.0 {
            return Err(OptiplayError::validation("Viewport extent must be > 0"));
        }
        if !(zoom > 0.0 && zoom <= 1.0) {
            return Err(OptiplayError::validation("Viewport zoom must be in (0, 1]"));
        }
        Ok(Self {
            width,
            height,
            zoom,
        })
    }

    /// Usable x pixel range, left to right. Half the unused fraction pads
    /// each side, so the range stays ordered for the whole (0, 1] zoom span.
    pub fn x_range(&self) -> (f64, f64) {
        let margin = self.width * (1.0 - self.zoom) / 2.0;
        (margin, self.width - margin)
    }

    /// Usable y pixel range, domain-min first. Screen y grows downward, so
    /// the domain minimum sits at the bottom edge.
    pub fn y_range(&self) -> (f64, f64) {
        let margin = self.height * (1.0 - self.zoom) / 2.0;
        (self.height - margin, margin)
    }

    /// Maps a 2-D domain point into the margined viewport.
    pub fn project(&self, x: f64, y: f64, x_bounds: AxisBounds, y_bounds: AxisBounds) -> Point {
        let (px_min, px_max) = self.x_range();
        let (py_min, py_max) = self.y_range();
        Point::new(
            map_to_screen(x, x_bounds, px_min, px_max),
            map_to_screen(y, y_bounds, py_min, py_max),
        )
    }
}

/// Linear domain-to-pixel interpolation.
///
/// Written as a weighted blend so the domain bounds land exactly on the
/// pixel bounds, which the axis drawing relies on.
pub fn map_to_screen(value: f64, domain: AxisBounds, pixel_min: f64, pixel_max: f64) -> f64 {
    let t = (value - domain.min) / (domain.max - domain.min);
    pixel_min * (1.0 - t) + pixel_max * t
}
