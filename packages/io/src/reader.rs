//! Reading polygon layers from `GeoJSON`.

use std::path::Path;

use geo::{Geometry, MultiPolygon};
use geojson::{GeoJson, JsonObject};
use geology_map_models::{Crs, GeoFeature, VectorLayer};
use geology_map_projection::ProjectionError;

use crate::IoError;
use crate::crs_member::declared_crs;

type RawFeature = (Option<geojson::Geometry>, Option<JsonObject>);

/// Reads a polygon layer from a `GeoJSON` file.
///
/// The layer CRS is taken from the file's `crs` member if present, then
/// from `crs_override`, and otherwise defaults to WGS 84 as RFC 7946
/// prescribes. `name` labels log lines and errors.
///
/// # Errors
///
/// * [`IoError::File`] if the file cannot be read
/// * [`IoError::GeoJson`] if it is not valid `GeoJSON`
/// * [`IoError::UnsupportedGeometry`] for non-polygonal geometries
/// * [`IoError::Projection`] if the `crs` member names an unknown CRS
pub fn read_layer(
    path: &Path,
    crs_override: Option<Crs>,
    name: &str,
) -> Result<VectorLayer, IoError> {
    log::info!("Reading {name} from {}", path.display());

    let text = std::fs::read_to_string(path).map_err(|source| IoError::File {
        path: path.to_path_buf(),
        source,
    })?;

    parse_layer(&text, crs_override, name)
}

/// Parses a polygon layer from `GeoJSON` text. See [`read_layer`].
///
/// # Errors
///
/// Same as [`read_layer`], minus file errors.
pub fn parse_layer(
    text: &str,
    crs_override: Option<Crs>,
    name: &str,
) -> Result<VectorLayer, IoError> {
    let document: GeoJson = text.parse().map_err(|e| geojson_error(name, e))?;

    let (raw_features, members): (Vec<RawFeature>, Option<JsonObject>) = match document {
        GeoJson::FeatureCollection(collection) => (
            collection
                .features
                .into_iter()
                .map(|f| (f.geometry, f.properties))
                .collect(),
            collection.foreign_members,
        ),
        GeoJson::Feature(feature) => (
            vec![(feature.geometry, feature.properties)],
            feature.foreign_members,
        ),
        GeoJson::Geometry(geometry) => {
            let members = geometry.foreign_members.clone();
            (vec![(Some(geometry), None)], members)
        }
    };

    let crs = resolve_crs(members.as_ref(), crs_override, name)?;

    let mut skipped = 0_usize;
    let mut features = Vec::with_capacity(raw_features.len());
    for (geometry, properties) in raw_features {
        let Some(geometry) = geometry else {
            skipped += 1;
            continue;
        };
        let kind = geometry_kind(&geometry.value);
        let geometry: Geometry<f64> = geometry.try_into().map_err(|e| geojson_error(name, e))?;
        let polygons = to_multipolygon(geometry).ok_or_else(|| IoError::UnsupportedGeometry {
            layer: name.to_string(),
            kind: kind.to_string(),
        })?;
        features.push(GeoFeature::new(polygons, properties.unwrap_or_default()));
    }

    if skipped > 0 {
        log::warn!("{name}: skipped {skipped} features without geometry");
    }
    log::info!("Loaded {} features from {name} ({crs})", features.len());

    Ok(VectorLayer::new(features, Some(crs)))
}

fn resolve_crs(
    members: Option<&JsonObject>,
    crs_override: Option<Crs>,
    name: &str,
) -> Result<Crs, IoError> {
    let declared = declared_crs(members).map_err(|message| ProjectionError::UnknownCrs {
        layer: name.to_string(),
        message,
    })?;

    Ok(match (declared, crs_override) {
        (Some(declared), Some(configured)) if declared != configured => {
            log::warn!(
                "{name} declares {declared} but the configuration says {configured}; \
                 using the declared CRS"
            );
            declared
        }
        (Some(declared), _) => declared,
        (None, Some(configured)) => configured,
        (None, None) => {
            log::debug!("{name} declares no CRS; assuming {}", Crs::Wgs84);
            Crs::Wgs84
        }
    })
}

/// Flattens polygonal geometry into one multipolygon.
fn to_multipolygon(geometry: Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(polygon) => Some(MultiPolygon::new(vec![polygon])),
        Geometry::MultiPolygon(multi) => Some(multi),
        Geometry::Rect(rect) => Some(MultiPolygon::new(vec![rect.to_polygon()])),
        Geometry::GeometryCollection(collection) => {
            let mut polygons = Vec::new();
            for member in collection {
                polygons.extend(to_multipolygon(member)?);
            }
            Some(MultiPolygon::new(polygons))
        }
        _ => None,
    }
}

const fn geometry_kind(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn geojson_error(name: &str, source: geojson::Error) -> IoError {
    IoError::GeoJson {
        layer: name.to_string(),
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use geo::Area;

    use super::*;

    const UTM_16N: Crs = Crs::Utm {
        zone: 16,
        north: true,
    };

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "crs": { "type": "name", "properties": { "name": "urn:ogc:def:crs:EPSG::32616" } },
        "features": [
            {
                "type": "Feature",
                "properties": { "UNIT_NAME": "Shale", "AGE": 300 },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "UNIT_NAME": "Basalt" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[20, 0], [30, 0], [30, 10], [20, 0]]],
                        [[[40, 0], [50, 0], [50, 10], [40, 0]]]
                    ]
                }
            },
            { "type": "Feature", "properties": { "UNIT_NAME": "Ghost" }, "geometry": null }
        ]
    }"#;

    #[test]
    fn reads_feature_collection_with_declared_crs() {
        let layer = parse_layer(COLLECTION, None, "geology").unwrap();

        assert_eq!(layer.crs, Some(UTM_16N));
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.features[0].category("UNIT_NAME"), "Shale");
        assert_eq!(layer.features[0].properties["AGE"], 300);
        assert!((layer.features[0].geometry.unsigned_area() - 100.0).abs() < 1e-9);
        assert_eq!(layer.features[1].geometry.0.len(), 2);
    }

    #[test]
    fn declared_crs_wins_over_configured() {
        let layer = parse_layer(COLLECTION, Some(Crs::WebMercator), "geology").unwrap();
        assert_eq!(layer.crs, Some(UTM_16N));
    }

    #[test]
    fn configured_crs_applies_when_none_declared() {
        let text = r#"{"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}"#;
        let layer = parse_layer(text, Some(UTM_16N), "area").unwrap();
        assert_eq!(layer.crs, Some(UTM_16N));
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn defaults_to_wgs84() {
        let text = r#"{
            "type": "Feature",
            "properties": null,
            "geometry": {"type": "Polygon", "coordinates": [[[-87, 41], [-86, 41], [-86, 42], [-87, 41]]]}
        }"#;
        let layer = parse_layer(text, None, "area").unwrap();
        assert_eq!(layer.crs, Some(Crs::Wgs84));
        assert!(layer.features[0].properties.is_empty());
    }

    #[test]
    fn unknown_declared_crs_is_a_projection_error() {
        let text = r#"{
            "type": "FeatureCollection",
            "crs": { "type": "name", "properties": { "name": "EPSG:2263" } },
            "features": []
        }"#;
        assert!(matches!(
            parse_layer(text, None, "geology"),
            Err(IoError::Projection(ProjectionError::UnknownCrs { .. }))
        ));
    }

    #[test]
    fn rejects_non_polygon_geometry() {
        let text = r#"{"type": "Point", "coordinates": [1, 2]}"#;
        match parse_layer(text, None, "area") {
            Err(IoError::UnsupportedGeometry { kind, .. }) => assert_eq!(kind, "Point"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            parse_layer("{ not json", None, "area"),
            Err(IoError::GeoJson { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_file_error() {
        let path = std::env::temp_dir().join("geology_map_io_does_not_exist.geojson");
        assert!(matches!(
            read_layer(&path, None, "area"),
            Err(IoError::File { .. })
        ));
    }
}
