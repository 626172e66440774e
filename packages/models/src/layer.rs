//! Vector layers: polygon features carrying string-keyed properties.

use geo::{BoundingRect, MultiPolygon, Rect};

use crate::Crs;

/// Category assigned to features whose category attribute is missing, null
/// or blank.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Feature properties, as read from the source file.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// A single polygonal feature.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature {
    pub geometry: MultiPolygon<f64>,
    pub properties: Properties,
}

impl GeoFeature {
    #[must_use]
    pub const fn new(geometry: MultiPolygon<f64>, properties: Properties) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    /// Returns the category value stored under `attribute`.
    ///
    /// Strings are trimmed; numbers and booleans are stringified; missing,
    /// null and blank values map to [`UNKNOWN_CATEGORY`].
    #[must_use]
    pub fn category(&self, attribute: &str) -> String {
        match self.properties.get(attribute) {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(serde_json::Value::Null | serde_json::Value::String(_)) | None => {
                UNKNOWN_CATEGORY.to_string()
            }
            Some(other) => other.to_string(),
        }
    }
}

/// An ordered collection of features in one coordinate reference system.
///
/// `crs == None` means the source did not define one; such a layer cannot
/// be reprojected.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VectorLayer {
    pub features: Vec<GeoFeature>,
    pub crs: Option<Crs>,
}

impl VectorLayer {
    #[must_use]
    pub const fn new(features: Vec<GeoFeature>, crs: Option<Crs>) -> Self {
        Self { features, crs }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Total bounds of every feature, or `None` if the layer has no
    /// coordinates.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.features
            .iter()
            .filter_map(|feature| feature.geometry.bounding_rect())
            .reduce(|acc, rect| {
                Rect::new(
                    geo::coord! {
                        x: acc.min().x.min(rect.min().x),
                        y: acc.min().y.min(rect.min().y),
                    },
                    geo::coord! {
                        x: acc.max().x.max(rect.max().x),
                        y: acc.max().y.max(rect.max().y),
                    },
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use geo::{MultiPolygon, polygon};

    use super::*;

    fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
            (x: x, y: y),
        ]])
    }

    fn props(value: serde_json::Value) -> Properties {
        let mut map = Properties::new();
        map.insert("UNIT_NAME".to_string(), value);
        map
    }

    #[test]
    fn category_reads_trimmed_string() {
        let feature = GeoFeature::new(square(0.0, 0.0, 1.0), props(" Granite ".into()));
        assert_eq!(feature.category("UNIT_NAME"), "Granite");
    }

    #[test]
    fn category_defaults_to_unknown() {
        let null = GeoFeature::new(square(0.0, 0.0, 1.0), props(serde_json::Value::Null));
        let blank = GeoFeature::new(square(0.0, 0.0, 1.0), props("  ".into()));
        let missing = GeoFeature::new(square(0.0, 0.0, 1.0), Properties::new());
        assert_eq!(null.category("UNIT_NAME"), UNKNOWN_CATEGORY);
        assert_eq!(blank.category("UNIT_NAME"), UNKNOWN_CATEGORY);
        assert_eq!(missing.category("UNIT_NAME"), UNKNOWN_CATEGORY);
    }

    #[test]
    fn category_stringifies_numbers() {
        let feature = GeoFeature::new(square(0.0, 0.0, 1.0), props(42.into()));
        assert_eq!(feature.category("UNIT_NAME"), "42");
    }

    #[test]
    fn bounds_cover_all_features() {
        let layer = VectorLayer::new(
            vec![
                GeoFeature::new(square(0.0, 0.0, 1.0), Properties::new()),
                GeoFeature::new(square(5.0, -3.0, 2.0), Properties::new()),
            ],
            None,
        );
        let bounds = layer.bounds().unwrap();
        assert_eq!(bounds.min(), geo::coord! { x: 0.0, y: -3.0 });
        assert_eq!(bounds.max(), geo::coord! { x: 7.0, y: 1.0 });
    }

    #[test]
    fn empty_layer_has_no_bounds() {
        assert!(VectorLayer::default().bounds().is_none());
    }
}
