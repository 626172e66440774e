#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `GeoJSON` input and output for vector layers.
//!
//! Reads a `FeatureCollection`, a single `Feature` or a bare `Geometry`
//! into a [`VectorLayer`](geology_map_models::VectorLayer), resolving its
//! CRS from the legacy `crs` member when present. Writes layers back out
//! with that member set so downstream GIS tools pick up projected
//! coordinates correctly.

pub mod crs_member;
pub mod reader;
pub mod writer;

use std::path::PathBuf;

use geology_map_projection::ProjectionError;
use thiserror::Error;

pub use reader::{parse_layer, read_layer};
pub use writer::{layer_to_geojson, write_layer};

/// Errors that can occur while reading or writing layers.
#[derive(Debug, Error)]
pub enum IoError {
    /// A file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    File {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not valid `GeoJSON`.
    #[error("Malformed GeoJSON in {layer}: {source}")]
    GeoJson {
        /// Human-readable layer name.
        layer: String,
        /// Underlying parse error.
        source: Box<geojson::Error>,
    },

    /// The layer contains something other than polygons.
    #[error("Layer '{layer}' contains unsupported {kind} geometry; only polygons are supported")]
    UnsupportedGeometry {
        /// Human-readable layer name.
        layer: String,
        /// `GeoJSON` geometry type that was found.
        kind: String,
    },

    /// The layer's CRS could not be resolved.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// Serializing the output document failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
