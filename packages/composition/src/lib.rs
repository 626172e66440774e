#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map composition core.
//!
//! Everything between "layers are in the working CRS" and "draw the
//! sheet": deriving the print extent from the project area and paper
//! scale, clipping and simplifying the geology layer against it, resolving
//! a colour per geology unit, and keeping the output raster under the
//! encoder's pixel ceiling. All of it is pure computation with no I/O.

pub mod clip;
pub mod extent;
pub mod raster_guard;
pub mod style;

use thiserror::Error;

/// Terminal conditions of the composition stages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    /// No geology feature overlaps the print extent. Emitting a map would
    /// produce a blank, misleading sheet, so this ends the run by default.
    #[error(
        "The clipped geology layer is empty: none of the {total} geology features overlap \
         the print extent. There might be no overlap between the geology data and the \
         project area."
    )]
    EmptyClipResult {
        /// Number of features in the unclipped layer.
        total: usize,
    },

    /// The reference area has no coordinates to derive an extent from.
    #[error("The project area layer contains no geometry")]
    EmptyReferenceArea,
}
