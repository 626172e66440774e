//! Scale-to-extent geometry.
//!
//! The print extent deliberately ignores the project area's own shape: it is
//! the rectangle of ground that exactly fills the page at the requested
//! scale, centred on the middle of the project area's bounds.

use geo::Rect;
use geology_map_models::config::PageConfig;
use geology_map_models::{PrintExtent, VectorLayer};

use crate::CompositionError;

/// Derives the print extent for `bounds` at the given page and scale.
///
/// Each axis spans `page_inches x units_per_inch x scale_denominator` ground
/// units.
#[must_use]
pub fn print_extent(bounds: &Rect<f64>, page: &PageConfig) -> PrintExtent {
    let ground_per_page_inch = page.units_per_inch * page.scale_denominator;
    let width = page.width_in * ground_per_page_inch;
    let height = page.height_in * ground_per_page_inch;

    PrintExtent::centered(bounds.center(), width, height)
}

/// Total bounds of a layer, or `None` if it has no coordinates.
#[must_use]
pub fn layer_bounds(layer: &VectorLayer) -> Option<Rect<f64>> {
    layer.bounds()
}

/// Derives the print extent for a reference area layer.
///
/// # Errors
///
/// Returns [`CompositionError::EmptyReferenceArea`] if the layer has no
/// coordinates.
pub fn extent_for_layer(
    reference_area: &VectorLayer,
    page: &PageConfig,
) -> Result<PrintExtent, CompositionError> {
    let bounds = layer_bounds(reference_area).ok_or(CompositionError::EmptyReferenceArea)?;
    let extent = print_extent(&bounds, page);

    log::info!(
        "Print extent at 1:{}: ({:.1}, {:.1}) - ({:.1}, {:.1}), {:.0} x {:.0} ground units",
        page.scale_denominator,
        extent.min_x,
        extent.min_y,
        extent.max_x,
        extent.max_y,
        extent.width(),
        extent.height()
    );

    Ok(extent)
}
