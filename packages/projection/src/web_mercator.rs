//! Spherical Web Mercator (EPSG:3857) and the XYZ tile grid built on it.

use std::f64::consts::PI;

/// Sphere radius used by Web Mercator, in metres.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude at which the Web Mercator square world ends.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Half the width of the projected world, in metres.
pub const ORIGIN_SHIFT: f64 = PI * EARTH_RADIUS;

/// Projects WGS 84 `(lon, lat)` degrees to Web Mercator metres.
///
/// Latitudes beyond [`MAX_LATITUDE`] are clamped.
#[must_use]
pub fn forward(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = EARTH_RADIUS * lon.to_radians();
    let y = EARTH_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Inverts Web Mercator metres to WGS 84 `(lon, lat)` degrees.
#[must_use]
pub fn inverse(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}

/// Ground resolution in metres per pixel of a 256 px tile at `zoom`,
/// measured at `lat` degrees.
#[must_use]
pub fn ground_resolution(lat: f64, zoom: u8) -> f64 {
    let world_px = 256.0 * f64::from(1_u32 << zoom.min(31));
    2.0 * ORIGIN_SHIFT * lat.to_radians().cos() / world_px
}

/// Fractional global pixel position of a Web Mercator coordinate at
/// `zoom`, with the origin at the north-west corner of the world.
#[must_use]
pub fn to_world_pixel(x: f64, y: f64, zoom: u8) -> (f64, f64) {
    let world_px = 256.0 * f64::from(1_u32 << zoom.min(31));
    let px = (x + ORIGIN_SHIFT) / (2.0 * ORIGIN_SHIFT) * world_px;
    let py = (ORIGIN_SHIFT - y) / (2.0 * ORIGIN_SHIFT) * world_px;
    (px, py)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn antimeridian_maps_to_origin_shift() {
        let (x, _) = forward(180.0, 0.0);
        assert!((x - 20_037_508.342_789_244).abs() < 1e-6);
    }

    #[test]
    fn clamps_polar_latitudes() {
        let (_, y) = forward(0.0, 89.9);
        assert!((y - ORIGIN_SHIFT).abs() < 1e-3, "{y}");
    }

    #[test]
    fn round_trips() {
        let (x, y) = forward(-87.63, 41.88);
        let (lon, lat) = inverse(x, y);
        assert!((lon - -87.63).abs() < 1e-9);
        assert!((lat - 41.88).abs() < 1e-9);
    }

    #[test]
    fn resolution_halves_per_zoom() {
        let r0 = ground_resolution(0.0, 0);
        assert!((r0 - 156_543.033_928).abs() < 1e-3, "{r0}");
        assert!((ground_resolution(0.0, 1) * 2.0 - r0).abs() < 1e-9);
    }

    #[test]
    fn world_pixel_of_origin_is_centre() {
        let (px, py) = to_world_pixel(0.0, 0.0, 1);
        assert!((px - 256.0).abs() < 1e-9);
        assert!((py - 256.0).abs() < 1e-9);
    }
}
