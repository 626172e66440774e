//! Clip-and-simplify engine.
//!
//! Truncates a potentially large geology layer to the print extent, then
//! caps vertex counts with a distance-bounded simplification. Feature order
//! is preserved throughout, since it drives legend and colour order.

use geo::{
    Area, BooleanOps, BoundingRect, MapCoords as _, MultiPolygon, Polygon, Simplify, Validation,
};
use geology_map_models::{GeoFeature, PrintExtent, VectorLayer};
use rstar::{AABB, RTree, RTreeObject};

use crate::CompositionError;

/// A feature's envelope in the candidate R-tree.
struct Candidate {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for Candidate {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Indices of features whose envelope touches the extent, in layer order.
fn candidate_indices(layer: &VectorLayer, extent: &PrintExtent) -> Vec<usize> {
    let candidates: Vec<Candidate> = layer
        .features
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| {
            feature.geometry.bounding_rect().map(|rect| Candidate {
                index,
                envelope: AABB::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                ),
            })
        })
        .collect();

    let tree = RTree::bulk_load(candidates);
    let query = AABB::from_corners(
        [extent.min_x, extent.min_y],
        [extent.max_x, extent.max_y],
    );

    let mut indices: Vec<usize> = tree
        .locate_in_envelope_intersecting(&query)
        .map(|candidate| candidate.index)
        .collect();
    indices.sort_unstable();
    indices
}

/// Intersects every feature with the extent rectangle.
///
/// Features with no overlapping area are dropped; partial overlaps are
/// truncated. Geometries already inside the extent are kept verbatim, so
/// clipping a clipped layer is a no-op. The output keeps the input's CRS.
#[must_use]
pub fn clip_to_extent(layer: &VectorLayer, extent: &PrintExtent) -> VectorLayer {
    let clip_polygon = extent.to_rect().to_polygon();
    let extent_copy = *extent;

    let features = candidate_indices(layer, extent)
        .into_iter()
        .filter_map(|index| {
            let feature = &layer.features[index];
            let rect = feature.geometry.bounding_rect()?;

            let geometry = if extent.contains_rect(&rect) {
                feature.geometry.clone()
            } else {
                // Boolean ops round through an integer grid; clamping pulls
                // any sub-grid overshoot back onto the extent edges.
                let clipped = feature
                    .geometry
                    .intersection(&clip_polygon)
                    .map_coords(move |c| extent_copy.clamp(c));
                MultiPolygon::new(
                    clipped
                        .into_iter()
                        .filter(|polygon| polygon.unsigned_area() > 0.0)
                        .collect(),
                )
            };

            (geometry.unsigned_area() > 0.0)
                .then(|| GeoFeature::new(geometry, feature.properties.clone()))
        })
        .collect();

    VectorLayer::new(features, layer.crs)
}

/// Simplifies one polygon, keeping the original if simplification would
/// collapse it or make it invalid.
fn simplify_polygon(polygon: &Polygon<f64>, tolerance: f64) -> Polygon<f64> {
    let simplified = polygon.simplify(tolerance);
    if simplified.unsigned_area() > 0.0 && simplified.is_valid() {
        simplified
    } else {
        polygon.clone()
    }
}

/// Simplifies a multipolygon part by part.
///
/// Uses Ramer-Douglas-Peucker, so no simplified vertex strays more than
/// `tolerance` from the original boundary. Parts that would degenerate are
/// left as they were, and if the simplified parts end up overlapping each
/// other the unsimplified geometry is returned instead.
#[must_use]
pub fn simplify_geometry(geometry: &MultiPolygon<f64>, tolerance: f64) -> MultiPolygon<f64> {
    if tolerance <= 0.0 {
        return geometry.clone();
    }

    let simplified = MultiPolygon::new(
        geometry
            .iter()
            .map(|polygon| simplify_polygon(polygon, tolerance))
            .collect(),
    );

    if simplified.is_valid() || !geometry.is_valid() {
        simplified
    } else {
        geometry.clone()
    }
}

/// Clips `layer` to `extent` and simplifies the result to `tolerance`.
///
/// # Errors
///
/// Returns [`CompositionError::EmptyClipResult`] if no feature overlaps the
/// extent.
pub fn clip_and_simplify(
    layer: &VectorLayer,
    extent: &PrintExtent,
    tolerance: f64,
) -> Result<VectorLayer, CompositionError> {
    let clipped = clip_to_extent(layer, extent);

    log::info!(
        "Clipped geology layer: {} of {} features overlap the print extent",
        clipped.len(),
        layer.len()
    );

    if clipped.is_empty() {
        return Err(CompositionError::EmptyClipResult { total: layer.len() });
    }

    let before: usize = clipped.features.iter().map(vertex_count).sum();
    let features: Vec<GeoFeature> = clipped
        .features
        .into_iter()
        .map(|feature| {
            GeoFeature::new(
                simplify_geometry(&feature.geometry, tolerance),
                feature.properties,
            )
        })
        .collect();
    let after: usize = features.iter().map(vertex_count).sum();

    log::info!("Simplified geology to tolerance {tolerance}: {before} -> {after} vertices");

    Ok(VectorLayer::new(features, clipped.crs))
}

fn vertex_count(feature: &GeoFeature) -> usize {
    feature
        .geometry
        .iter()
        .map(|polygon| {
            polygon.exterior().0.len()
                + polygon
                    .interiors()
                    .iter()
                    .map(|ring| ring.0.len())
                    .sum::<usize>()
        })
        .sum()
}
