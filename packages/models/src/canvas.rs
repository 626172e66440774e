//! Canvas sizing in physical units.

use serde::{Deserialize, Serialize};

/// Largest pixel count per axis accepted by common raster encoders
/// (`2^16 - 1`).
pub const MAX_RASTER_DIMENSION: u32 = 65_535;

/// Absorbs floating-point noise when converting inches to whole pixels, so
/// that e.g. `24.000000000000004 in x 100 dpi` is still 2400 px.
const PIXEL_EPSILON: f64 = 1e-6;

/// A canvas described by its physical size and output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSpec {
    /// Canvas width in inches.
    pub width_in: f64,
    /// Canvas height in inches.
    pub height_in: f64,
    /// Output resolution in dots per inch.
    pub dpi: f64,
}

impl CanvasSpec {
    #[must_use]
    pub const fn new(width_in: f64, height_in: f64, dpi: f64) -> Self {
        Self {
            width_in,
            height_in,
            dpi,
        }
    }

    /// Pixel width and height, truncated to whole pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_dims(&self) -> (u64, u64) {
        let to_px = |inches: f64| (inches * self.dpi + PIXEL_EPSILON).floor().max(0.0) as u64;
        (to_px(self.width_in), to_px(self.height_in))
    }

    /// Width divided by height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.width_in / self.height_in
    }

    /// Returns a canvas whose physical size is scaled by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            width_in: self.width_in * factor,
            height_in: self.height_in * factor,
            dpi: self.dpi,
        }
    }
}
