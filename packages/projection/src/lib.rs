#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate normalization.
//!
//! Brings every layer into the working CRS before any bounds or
//! intersection math. Reprojection pivots through WGS 84 geographic
//! coordinates: each supported system knows how to go to and from
//! longitude/latitude, so any pair can be chained.

pub mod transverse_mercator;
pub mod web_mercator;

use geo::{Coord, MapCoords as _, coord};
use geology_map_models::{Crs, GeoFeature, VectorLayer};
use thiserror::Error;

/// Errors that can occur while reprojecting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// The layer has no CRS, so there is no origin to reproject from.
    #[error("Layer '{layer}' has no coordinate reference system defined")]
    UndefinedCrs {
        /// Human-readable layer name.
        layer: String,
    },

    /// The layer names a CRS this toolchain cannot reproject.
    #[error("Layer '{layer}' uses an unknown coordinate reference system: {message}")]
    UnknownCrs {
        /// Human-readable layer name.
        layer: String,
        /// Description of the identifier that failed to resolve.
        message: String,
    },

    /// A coordinate is outside the valid domain of a projection.
    #[error("Coordinate ({x}, {y}) cannot be projected from {from} to {to}")]
    OutOfDomain {
        x: f64,
        y: f64,
        from: Crs,
        to: Crs,
    },
}

/// Reprojects `layer` into `target`, or returns it untouched if it is
/// already there.
///
/// `name` only labels log and error messages.
///
/// # Errors
///
/// Returns [`ProjectionError::UndefinedCrs`] if the layer has no CRS, and
/// [`ProjectionError::OutOfDomain`] if any coordinate cannot be projected.
pub fn normalize(
    layer: VectorLayer,
    target: Crs,
    name: &str,
) -> Result<VectorLayer, ProjectionError> {
    let (layer, failures) = reproject(layer, target, name)?;
    match failures.into_iter().next() {
        Some(err) => Err(err),
        None => Ok(layer),
    }
}

/// Like [`normalize`], but drops features that cannot be projected into
/// `target` instead of failing the whole layer.
///
/// Such features lie far outside the working CRS's domain, so they could
/// never reach the print extent anyway.
///
/// # Errors
///
/// Returns [`ProjectionError::UndefinedCrs`] if the layer has no CRS, and
/// [`ProjectionError::OutOfDomain`] if no feature could be projected.
pub fn normalize_dropping_out_of_domain(
    layer: VectorLayer,
    target: Crs,
    name: &str,
) -> Result<VectorLayer, ProjectionError> {
    let (layer, mut failures) = reproject(layer, target, name)?;
    if failures.is_empty() {
        return Ok(layer);
    }
    if layer.is_empty() {
        return Err(failures.remove(0));
    }

    log::warn!(
        "Dropped {} {name} features that cannot be projected into {target} (first: {})",
        failures.len(),
        failures[0]
    );
    Ok(layer)
}

/// Reprojects every feature it can, collecting one error per feature
/// that falls outside the source or target domain.
fn reproject(
    layer: VectorLayer,
    target: Crs,
    name: &str,
) -> Result<(VectorLayer, Vec<ProjectionError>), ProjectionError> {
    let source = layer.crs.ok_or_else(|| ProjectionError::UndefinedCrs {
        layer: name.to_string(),
    })?;

    if source == target {
        log::debug!("{name} already in {target}");
        return Ok((layer, Vec::new()));
    }

    log::info!(
        "Reprojecting {name} ({} features) from {source} to {target}",
        layer.len()
    );

    let mut features = Vec::with_capacity(layer.len());
    let mut failures = Vec::new();
    for feature in layer.features {
        match feature
            .geometry
            .try_map_coords(move |c| transform_coord(c, source, target))
        {
            Ok(geometry) => features.push(GeoFeature::new(geometry, feature.properties)),
            Err(err) => failures.push(err),
        }
    }

    Ok((VectorLayer::new(features, Some(target)), failures))
}

/// Reprojects a single coordinate.
///
/// # Errors
///
/// Returns [`ProjectionError::OutOfDomain`] for non-finite input or
/// coordinates outside the source or target projection's domain.
pub fn transform_coord(c: Coord<f64>, from: Crs, to: Crs) -> Result<Coord<f64>, ProjectionError> {
    let out_of_domain = || ProjectionError::OutOfDomain {
        x: c.x,
        y: c.y,
        from,
        to,
    };

    if !(c.x.is_finite() && c.y.is_finite()) {
        return Err(out_of_domain());
    }
    if from == to {
        return Ok(c);
    }

    let (lon, lat) = to_geographic(c, from).ok_or_else(out_of_domain)?;
    let projected = from_geographic(lon, lat, to).ok_or_else(out_of_domain)?;

    if projected.x.is_finite() && projected.y.is_finite() {
        Ok(projected)
    } else {
        Err(out_of_domain())
    }
}

/// Converts a coordinate in `crs` to WGS 84 `(lon, lat)` degrees.
fn to_geographic(c: Coord<f64>, crs: Crs) -> Option<(f64, f64)> {
    match crs {
        Crs::Wgs84 => ((-90.0..=90.0).contains(&c.y)).then_some((c.x, c.y)),
        Crs::WebMercator => Some(web_mercator::inverse(c.x, c.y)),
        Crs::Utm { zone, north } => Some(transverse_mercator::utm_inverse(c.x, c.y, zone, north)),
    }
}

/// Converts WGS 84 `(lon, lat)` degrees to a coordinate in `crs`.
fn from_geographic(lon: f64, lat: f64, crs: Crs) -> Option<Coord<f64>> {
    match crs {
        Crs::Wgs84 => Some(coord! { x: lon, y: lat }),
        Crs::WebMercator => {
            let (x, y) = web_mercator::forward(lon, lat);
            Some(coord! { x: x, y: y })
        }
        Crs::Utm { zone, north } => {
            let (x, y) = transverse_mercator::utm_forward(lon, lat, zone, north)?;
            Some(coord! { x: x, y: y })
        }
    }
}

#[cfg(test)]
mod tests {
    use geo::{MultiPolygon, polygon};
    use geology_map_models::Properties;

    use super::*;

    const UTM_16N: Crs = Crs::Utm {
        zone: 16,
        north: true,
    };

    fn wgs84_layer() -> VectorLayer {
        let geometry = MultiPolygon::new(vec![polygon![
            (x: -87.70, y: 41.80),
            (x: -87.60, y: 41.80),
            (x: -87.60, y: 41.90),
            (x: -87.70, y: 41.90),
            (x: -87.70, y: 41.80),
        ]]);
        VectorLayer::new(
            vec![GeoFeature::new(geometry, Properties::new())],
            Some(Crs::Wgs84),
        )
    }

    #[test]
    fn undefined_crs_is_an_error() {
        let mut layer = wgs84_layer();
        layer.crs = None;
        let err = normalize(layer, UTM_16N, "project area").unwrap_err();
        assert_eq!(
            err,
            ProjectionError::UndefinedCrs {
                layer: "project area".to_string()
            }
        );
    }

    #[test]
    fn same_crs_is_a_no_op() {
        let layer = wgs84_layer();
        let normalized = normalize(layer.clone(), Crs::Wgs84, "geology").unwrap();
        assert_eq!(normalized, layer);
    }

    #[test]
    fn reprojects_to_utm_metres() {
        let normalized = normalize(wgs84_layer(), UTM_16N, "geology").unwrap();
        assert_eq!(normalized.crs, Some(UTM_16N));

        let bounds = normalized.bounds().unwrap();
        // 0.1 deg of longitude at 41.85N is ~8.3 km, 0.1 deg latitude ~11.1 km.
        assert!((bounds.width() - 8_300.0).abs() < 150.0, "{}", bounds.width());
        assert!((bounds.height() - 11_100.0).abs() < 150.0, "{}", bounds.height());
        assert!(bounds.min().x > 400_000.0 && bounds.max().x < 500_000.0);
        assert!(bounds.min().y > 4_600_000.0 && bounds.max().y < 4_700_000.0);
    }

    fn far_away_feature() -> GeoFeature {
        GeoFeature::new(
            MultiPolygon::new(vec![polygon![
                (x: 100.0, y: 10.0),
                (x: 100.1, y: 10.0),
                (x: 100.1, y: 10.1),
                (x: 100.0, y: 10.1),
                (x: 100.0, y: 10.0),
            ]]),
            Properties::new(),
        )
    }

    #[test]
    fn strict_normalize_rejects_feature_outside_the_zone() {
        let mut layer = wgs84_layer();
        layer.features.push(far_away_feature());
        assert!(matches!(
            normalize(layer, UTM_16N, "project area"),
            Err(ProjectionError::OutOfDomain { x, .. }) if (x - 100.0).abs() < 1e-9
        ));
    }

    #[test]
    fn features_outside_the_zone_are_dropped() {
        let mut layer = wgs84_layer();
        layer.features.push(far_away_feature());

        let normalized = normalize_dropping_out_of_domain(layer, UTM_16N, "geology").unwrap();

        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized.crs, Some(UTM_16N));
        let bounds = normalized.bounds().unwrap();
        assert!(bounds.min().x > 400_000.0 && bounds.max().x < 500_000.0);
    }

    #[test]
    fn dropping_every_feature_is_an_error() {
        let layer = VectorLayer::new(vec![far_away_feature()], Some(Crs::Wgs84));
        assert!(matches!(
            normalize_dropping_out_of_domain(layer, UTM_16N, "geology"),
            Err(ProjectionError::OutOfDomain { .. })
        ));
    }

    #[test]
    fn round_trips_between_utm_and_web_mercator() {
        let original = coord! { x: 447_000.0, y: 4_636_000.0 };
        let mercator = transform_coord(original, UTM_16N, Crs::WebMercator).unwrap();
        let back = transform_coord(mercator, Crs::WebMercator, UTM_16N).unwrap();
        assert!((back.x - original.x).abs() < 0.05);
        assert!((back.y - original.y).abs() < 0.05);
    }

    #[test]
    fn rejects_non_finite_and_out_of_range_coordinates() {
        assert!(matches!(
            transform_coord(coord! { x: f64::NAN, y: 0.0 }, Crs::Wgs84, UTM_16N),
            Err(ProjectionError::OutOfDomain { .. })
        ));
        assert!(matches!(
            transform_coord(coord! { x: 0.0, y: 95.0 }, Crs::Wgs84, UTM_16N),
            Err(ProjectionError::OutOfDomain { .. })
        ));
    }
}
