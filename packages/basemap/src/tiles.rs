//! XYZ tile addressing and zoom selection.

use std::fmt;

use geo::Rect;
use geology_map_projection::web_mercator;

/// Edge length of a standard raster tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// A single XYZ tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// An inclusive block of tiles at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub z: u8,
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

impl TileRange {
    /// Tiles covering `bounds` (Web Mercator metres) at `zoom`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn covering(bounds: &Rect<f64>, zoom: u8) -> Self {
        let zoom = zoom.min(30);
        let last = (1_u32 << zoom) - 1;
        let to_tile = |px: f64| {
            ((px / f64::from(TILE_SIZE)).floor().max(0.0) as u32).min(last)
        };

        let (west, north) = web_mercator::to_world_pixel(bounds.min().x, bounds.max().y, zoom);
        let (east, south) = web_mercator::to_world_pixel(bounds.max().x, bounds.min().y, zoom);

        Self {
            z: zoom,
            min_x: to_tile(west),
            max_x: to_tile(east),
            min_y: to_tile(north),
            max_y: to_tile(south),
        }
    }

    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Total number of tiles.
    #[must_use]
    pub fn count(&self) -> u64 {
        u64::from(self.columns()) * u64::from(self.rows())
    }

    /// World-pixel position of the range's north-west corner.
    #[must_use]
    pub fn origin_px(&self) -> (f64, f64) {
        (
            f64::from(self.min_x) * f64::from(TILE_SIZE),
            f64::from(self.min_y) * f64::from(TILE_SIZE),
        )
    }

    /// All tiles, row by row from the north-west corner.
    pub fn tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        (self.min_y..=self.max_y)
            .flat_map(move |y| (self.min_x..=self.max_x).map(move |x| TileId { z: self.z, x, y }))
    }
}

/// Picks the zoom level for a basemap.
///
/// Starts from the shallowest zoom whose ground resolution at
/// `center_lat` is at least as fine as `metres_per_pixel`, caps it at
/// `max_zoom`, then steps back out until the tiles covering `bounds` number
/// no more than `max_tiles`.
#[must_use]
pub fn choose_zoom(
    bounds: &Rect<f64>,
    center_lat: f64,
    metres_per_pixel: f64,
    max_zoom: u8,
    max_tiles: u32,
) -> u8 {
    let mut zoom = (0..=max_zoom)
        .find(|&z| web_mercator::ground_resolution(center_lat, z) <= metres_per_pixel)
        .unwrap_or(max_zoom);

    while zoom > 0 && TileRange::covering(bounds, zoom).count() > u64::from(max_tiles) {
        zoom -= 1;
    }

    zoom
}

#[cfg(test)]
mod tests {
    use geo::coord;

    use super::*;

    fn mercator_rect(lon0: f64, lat0: f64, lon1: f64, lat1: f64) -> Rect<f64> {
        let (x0, y0) = web_mercator::forward(lon0, lat0);
        let (x1, y1) = web_mercator::forward(lon1, lat1);
        Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 })
    }

    #[test]
    fn whole_world_at_zoom_zero_is_one_tile() {
        let range = TileRange::covering(&mercator_rect(-180.0, -85.0, 179.9, 85.0), 0);
        assert_eq!(range.count(), 1);
        assert_eq!(range.tiles().collect::<Vec<_>>(), [TileId { z: 0, x: 0, y: 0 }]);
    }

    #[test]
    fn covering_matches_known_tile() {
        // Chicago Loop at zoom 10 is tile 262/380.
        let range = TileRange::covering(&mercator_rect(-87.64, 41.87, -87.62, 41.89), 10);
        assert_eq!((range.min_x, range.min_y), (262, 380));
        assert_eq!(range.count(), 1);
    }

    #[test]
    fn tiles_are_row_major() {
        let range = TileRange {
            z: 3,
            min_x: 1,
            max_x: 2,
            min_y: 4,
            max_y: 5,
        };
        let ids: Vec<String> = range.tiles().map(|t| t.to_string()).collect();
        assert_eq!(ids, ["3/1/4", "3/2/4", "3/1/5", "3/2/5"]);
        assert_eq!(range.origin_px(), (256.0, 1024.0));
    }

    #[test]
    fn zoom_matches_output_resolution() {
        let bounds = mercator_rect(-87.64, 41.87, -87.63, 41.88);
        let zoom = choose_zoom(&bounds, 41.875, 2.54, 19, 512);
        assert!(web_mercator::ground_resolution(41.875, zoom) <= 2.54);
        assert!(web_mercator::ground_resolution(41.875, zoom - 1) > 2.54);
    }

    #[test]
    fn zoom_is_capped_by_provider() {
        let bounds = mercator_rect(-87.64, 41.87, -87.63, 41.88);
        assert_eq!(choose_zoom(&bounds, 41.875, 0.01, 17, 512), 17);
    }

    #[test]
    fn zoom_backs_off_to_respect_tile_budget() {
        let bounds = mercator_rect(-90.0, 40.0, -85.0, 44.0);
        let zoom = choose_zoom(&bounds, 42.0, 1.0, 19, 64);
        assert!(TileRange::covering(&bounds, zoom).count() <= 64);
        assert!(TileRange::covering(&bounds, zoom + 1).count() > 64);
    }
}
