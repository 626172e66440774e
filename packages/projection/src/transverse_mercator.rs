//! WGS 84 / UTM via the transverse Mercator series.
//!
//! Standard USGS series expansions (Snyder, *Map Projections: A Working
//! Manual*, pp. 60-64) on the WGS 84 ellipsoid. Accurate to well under a
//! centimetre within a zone, degrading slowly outside it.

/// WGS 84 semi-major axis in metres.
const A: f64 = 6_378_137.0;

/// WGS 84 flattening.
const F: f64 = 1.0 / 298.257_223_563;

/// UTM central scale factor.
const K0: f64 = 0.9996;

const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// First eccentricity squared.
const E2: f64 = F * (2.0 - F);

/// Second eccentricity squared.
const EP2: f64 = E2 / (1.0 - E2);

fn central_meridian(zone: u8) -> f64 {
    f64::from(zone).mul_add(6.0, -183.0)
}

/// Meridian arc length from the equator to latitude `phi` (radians).
fn meridian_arc(phi: f64) -> f64 {
    let e4 = E2 * E2;
    let e6 = e4 * E2;
    A * ((1.0 - E2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
        - (3.0 * E2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
        + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
        - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}

/// Wraps a longitude difference into `[-180, 180)`.
fn wrap_degrees(delta: f64) -> f64 {
    (delta + 180.0).rem_euclid(360.0) - 180.0
}

/// Projects WGS 84 `(lon, lat)` degrees into a UTM zone.
///
/// Returns `None` outside the projection's domain (latitude beyond the
/// poles, or a longitude 90 degrees or more from the central meridian).
#[must_use]
pub fn utm_forward(lon: f64, lat: f64, zone: u8, north: bool) -> Option<(f64, f64)> {
    let delta_lon = wrap_degrees(lon - central_meridian(zone));
    if !(-90.0..=90.0).contains(&lat) || delta_lon.abs() >= 90.0 {
        return None;
    }

    let phi = lat.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let tan_phi = phi.tan();

    let n = A / (1.0 - E2 * sin_phi * sin_phi).sqrt();
    let t = tan_phi * tan_phi;
    let c = EP2 * cos_phi * cos_phi;
    let a = cos_phi * delta_lon.to_radians();
    let a2 = a * a;
    let a3 = a2 * a;
    let a4 = a3 * a;
    let a5 = a4 * a;
    let a6 = a5 * a;

    let x = K0
        * n
        * (a + (1.0 - t + c) * a3 / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * EP2) * a5 / 120.0)
        + FALSE_EASTING;

    let mut y = K0
        * (meridian_arc(phi)
            + n * tan_phi
                * (a2 / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * EP2) * a6 / 720.0));
    if !north {
        y += FALSE_NORTHING_SOUTH;
    }

    Some((x, y))
}

/// Inverts a UTM `(easting, northing)` back to WGS 84 `(lon, lat)` degrees.
#[must_use]
pub fn utm_inverse(easting: f64, northing: f64, zone: u8, north: bool) -> (f64, f64) {
    let y = if north {
        northing
    } else {
        northing - FALSE_NORTHING_SOUTH
    };
    let x = easting - FALSE_EASTING;

    let e4 = E2 * E2;
    let e6 = e4 * E2;
    let m = y / K0;
    let mu = m / (A * (1.0 - E2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

    let sqrt_1_e2 = (1.0 - E2).sqrt();
    let e1 = (1.0 - sqrt_1_e2) / (1.0 + sqrt_1_e2);
    let e1_2 = e1 * e1;
    let e1_3 = e1_2 * e1;
    let e1_4 = e1_3 * e1;

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1_3 / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1_2 / 16.0 - 55.0 * e1_4 / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1_3 / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1_4 / 512.0) * (8.0 * mu).sin();

    let (sin_phi1, cos_phi1) = phi1.sin_cos();
    let tan_phi1 = phi1.tan();
    let c1 = EP2 * cos_phi1 * cos_phi1;
    let t1 = tan_phi1 * tan_phi1;
    let denom = 1.0 - E2 * sin_phi1 * sin_phi1;
    let n1 = A / denom.sqrt();
    let r1 = A * (1.0 - E2) / denom.powf(1.5);
    let d = x / (n1 * K0);
    let d2 = d * d;
    let d3 = d2 * d;
    let d4 = d3 * d;
    let d5 = d4 * d;
    let d6 = d5 * d;

    let phi = phi1
        - (n1 * tan_phi1 / r1)
            * (d2 / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * EP2) * d4 / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * EP2 - 3.0 * c1 * c1)
                    * d6
                    / 720.0);

    let lambda = (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * EP2 + 24.0 * t1 * t1) * d5
            / 120.0)
        / cos_phi1;

    let lon = wrap_degrees(central_meridian(zone) + lambda.to_degrees());
    (lon, phi.to_degrees())
}
