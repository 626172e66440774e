//! Mapping between ground, axes and page coordinates.

use geo::Coord;
use geology_map_models::{CanvasSpec, PrintExtent};

/// Points per inch.
const POINTS_PER_INCH: f64 = 72.0;

/// The map frame: the print extent stretched over the whole page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub extent: PrintExtent,
    /// Page width in pixels.
    pub width: f64,
    /// Page height in pixels.
    pub height: f64,
    pub dpi: f64,
}

impl Frame {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(extent: PrintExtent, canvas: &CanvasSpec) -> Self {
        let (width, height) = canvas.pixel_dims();
        Self {
            extent,
            width: width as f64,
            height: height as f64,
            dpi: canvas.dpi,
        }
    }

    /// Ground coordinate to page pixels (origin top-left).
    #[must_use]
    pub fn to_page(&self, c: Coord<f64>) -> (f64, f64) {
        (
            (c.x - self.extent.min_x) / self.extent.width() * self.width,
            (self.extent.max_y - c.y) / self.extent.height() * self.height,
        )
    }

    /// Axes fraction (origin bottom-left) to page pixels.
    #[must_use]
    pub fn axes(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.width, (1.0 - y) * self.height)
    }

    /// Typographic points to pixels.
    #[must_use]
    pub fn pt(&self, points: f64) -> f64 {
        points * self.dpi / POINTS_PER_INCH
    }
}
