#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Basemap imagery for the map sheet.
//!
//! Fetches the XYZ raster tiles covering the print extent from a
//! [`TileSource`], stitches them into a mosaic in Web Mercator, and warps
//! the mosaic into the working CRS at the output resolution. The result is
//! a [`tiny_skia::Pixmap`] the renderer draws the vector layers on top of.

pub mod retry;
pub mod source;
pub mod tiles;
pub mod warp;

use geology_map_projection::ProjectionError;
use thiserror::Error;

pub use source::{HttpTileSource, TileSource};
pub use tiles::{TileId, TileRange};
pub use warp::{BasemapRequest, Mosaic, fetch_basemap};

/// Errors that can occur while producing a basemap.
#[derive(Debug, Error)]
pub enum BasemapError {
    /// Tiles could not be fetched after all retries, or the provider
    /// refused the request.
    #[error("Basemap unavailable: {message}")]
    Unavailable {
        /// Description of what went wrong.
        message: String,
    },

    /// A tile was fetched but is not a decodable image.
    #[error("Failed to decode basemap tile {tile}: {message}")]
    Decode {
        /// The offending tile.
        tile: TileId,
        /// Decoder error text.
        message: String,
    },

    /// The request itself is unusable (zero-sized canvas, no provider).
    #[error("Invalid basemap request: {message}")]
    InvalidRequest {
        /// Description of what went wrong.
        message: String,
    },

    /// The extent could not be brought into Web Mercator.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}
