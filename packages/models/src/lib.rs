#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared data model and configuration types for the geology map toolchain.
//!
//! Everything that flows between pipeline stages lives here: coordinate
//! reference systems, vector layers, the derived print extent, canvas
//! sizing, category styling, and the [`MapConfig`] that replaces hard-coded
//! paths and constants.

pub mod canvas;
pub mod config;
pub mod crs;
pub mod extent;
pub mod layer;
pub mod progress;
pub mod provider;
pub mod style;

pub use canvas::{CanvasSpec, MAX_RASTER_DIMENSION};
pub use config::{ConfigError, MapConfig};
pub use crs::{Crs, ParseCrsError};
pub use extent::PrintExtent;
pub use layer::{GeoFeature, Properties, UNKNOWN_CATEGORY, VectorLayer};
pub use provider::BasemapProvider;
pub use style::{CategoryStyle, Rgb};
