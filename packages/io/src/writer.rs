//! Writing layers to `GeoJSON`.

use std::path::Path;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use geology_map_models::VectorLayer;

use crate::IoError;
use crate::crs_member::{CRS_MEMBER, crs_member};

/// Converts a layer to a `FeatureCollection`, with a `crs` member if the
/// layer's CRS is known.
#[must_use]
pub fn layer_to_geojson(layer: &VectorLayer) -> FeatureCollection {
    let features = layer
        .features
        .iter()
        .map(|feature| Feature {
            bbox: None,
            geometry: Some(Geometry::new(geojson::Value::from(&feature.geometry))),
            id: None,
            properties: Some(feature.properties.clone()),
            foreign_members: None,
        })
        .collect();

    let foreign_members = layer.crs.map(|crs| {
        let mut members = JsonObject::new();
        members.insert(CRS_MEMBER.to_string(), crs_member(crs));
        members
    });

    FeatureCollection {
        bbox: None,
        features,
        foreign_members,
    }
}

/// Writes `layer` to `path` as a `GeoJSON` `FeatureCollection`, creating
/// parent directories as needed.
///
/// # Errors
///
/// Returns [`IoError::File`] if the directory or file cannot be written.
pub fn write_layer(path: &Path, layer: &VectorLayer) -> Result<(), IoError> {
    let file_error = |source| IoError::File {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(file_error)?;
    }

    let text = serde_json::to_string(&layer_to_geojson(layer))?;
    std::fs::write(path, text).map_err(file_error)?;

    log::info!("Wrote {} features to {}", layer.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use geo::{MultiPolygon, polygon};
    use geology_map_models::{Crs, GeoFeature, Properties};

    use super::*;
    use crate::read_layer;

    fn layer() -> VectorLayer {
        let mut props = Properties::new();
        props.insert("UNIT_NAME".to_string(), "Dolomite".into());
        VectorLayer::new(
            vec![GeoFeature::new(
                MultiPolygon::new(vec![polygon![
                    (x: 447_000.0, y: 4_630_000.0),
                    (x: 448_000.0, y: 4_630_000.0),
                    (x: 448_000.0, y: 4_631_000.0),
                    (x: 447_000.0, y: 4_630_000.0),
                ]]),
                props,
            )],
            Some(Crs::Utm {
                zone: 16,
                north: true,
            }),
        )
    }

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("geology_map_io_{}_{name}", std::process::id()))
    }

    #[test]
    fn geojson_carries_crs_member() {
        let collection = layer_to_geojson(&layer());
        let members = collection.foreign_members.unwrap();
        assert_eq!(
            members[CRS_MEMBER]["properties"]["name"],
            "urn:ogc:def:crs:EPSG::32616"
        );
        assert_eq!(collection.features.len(), 1);
    }

    #[test]
    fn unknown_crs_writes_no_member() {
        let mut layer = layer();
        layer.crs = None;
        assert!(layer_to_geojson(&layer).foreign_members.is_none());
    }

    #[test]
    fn written_file_reads_back_in_the_same_crs() {
        let dir = scratch_dir("write");
        let path = dir.join("nested").join("clipped.geojson");
        let original = layer();

        write_layer(&path, &original).unwrap();
        let restored = read_layer(&path, Some(Crs::Wgs84), "clipped").unwrap();

        assert_eq!(restored, original);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
