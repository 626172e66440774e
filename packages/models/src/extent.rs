//! The print extent: the ground-unit rectangle that fills one page.

use geo::{Coord, Rect, coord};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in working-CRS ground units.
///
/// Always derived from a reference area and a page/scale pair, never edited
/// in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintExtent {
    /// Western edge.
    pub min_x: f64,
    /// Southern edge.
    pub min_y: f64,
    /// Eastern edge.
    pub max_x: f64,
    /// Northern edge.
    pub max_y: f64,
}

impl PrintExtent {
    /// Builds an extent of the given size centred on `center`.
    #[must_use]
    pub fn centered(center: Coord<f64>, width: f64, height: f64) -> Self {
        let half_width = width / 2.0;
        let half_height = height / 2.0;
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[must_use]
    pub fn center(&self) -> Coord<f64> {
        coord! {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }

    /// Width divided by height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.width() / self.height()
    }

    #[must_use]
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.min_x, y: self.min_y },
            coord! { x: self.max_x, y: self.max_y },
        )
    }

    /// Whether `rect` lies entirely inside (or on the edge of) this extent.
    #[must_use]
    pub fn contains_rect(&self, rect: &Rect<f64>) -> bool {
        rect.min().x >= self.min_x
            && rect.min().y >= self.min_y
            && rect.max().x <= self.max_x
            && rect.max().y <= self.max_y
    }

    /// Clamps a coordinate onto the extent.
    #[must_use]
    pub fn clamp(&self, c: Coord<f64>) -> Coord<f64> {
        coord! {
            x: c.x.clamp(self.min_x, self.max_x),
            y: c.y.clamp(self.min_y, self.max_y),
        }
    }
}

impl From<PrintExtent> for Rect<f64> {
    fn from(value: PrintExtent) -> Self {
        value.to_rect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_extent_has_requested_size() {
        let extent = PrintExtent::centered(coord! { x: 10.0, y: -5.0 }, 4.0, 6.0);
        assert!((extent.width() - 4.0).abs() < f64::EPSILON);
        assert!((extent.height() - 6.0).abs() < f64::EPSILON);
        assert_eq!(extent.center(), coord! { x: 10.0, y: -5.0 });
    }

    #[test]
    fn containment_is_inclusive() {
        let extent = PrintExtent::centered(coord! { x: 0.0, y: 0.0 }, 10.0, 10.0);
        let inside = Rect::new(coord! { x: -1.0, y: -1.0 }, coord! { x: 5.0, y: 5.0 });
        let edge = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 5.0, y: 5.0 });
        let partial = Rect::new(coord! { x: 4.0, y: 4.0 }, coord! { x: 6.0, y: 6.0 });

        assert!(extent.contains_rect(&inside));
        assert!(extent.contains_rect(&edge));
        assert!(!extent.contains_rect(&partial));
    }

    #[test]
    fn clamps_onto_edges() {
        let extent = PrintExtent::centered(coord! { x: 0.0, y: 0.0 }, 2.0, 2.0);
        assert_eq!(
            extent.clamp(coord! { x: 5.0, y: -0.5 }),
            coord! { x: 1.0, y: -0.5 }
        );
    }
}
