#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map sheet composition.
//!
//! Builds the sheet as an SVG document in page pixels (the print extent
//! stretched over the whole page, y axis flipped), then rasterizes it with
//! `resvg` on top of the basemap and writes a PNG.

pub mod frame;
pub mod furniture;
pub mod raster;
pub mod sheet;

use std::path::PathBuf;

use thiserror::Error;

pub use raster::{rasterize, save_png};
pub use sheet::{Sheet, compose_svg, render_sheet};

/// Errors that can occur while drawing or writing the sheet.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The generated SVG could not be parsed.
    #[error("Failed to parse map SVG: {message}")]
    Svg {
        /// Parser error text.
        message: String,
    },

    /// The canvas is too large (or empty) to allocate.
    #[error("Cannot allocate a {width}x{height} px canvas")]
    Canvas {
        width: u64,
        height: u64,
    },

    /// The basemap does not match the canvas size.
    #[error("Basemap is {actual_width}x{actual_height} px but the canvas is {width}x{height} px")]
    BasemapSize {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// The PNG could not be written.
    #[error("Failed to write {path}: {message}")]
    Write {
        /// Output path.
        path: PathBuf,
        /// Encoder or I/O error text.
        message: String,
    },
}
