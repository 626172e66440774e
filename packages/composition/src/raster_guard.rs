//! Pixel-dimension ceiling check run before the output raster is
//! allocated.

use geology_map_models::CanvasSpec;

/// Result of checking a canvas against the pixel ceiling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuardOutcome {
    /// The canvas to render, rescaled if the requested one was too large.
    pub canvas: CanvasSpec,
    /// Uniform factor applied to the physical size, if any.
    pub rescaled: Option<f64>,
}

/// Shrinks `canvas` uniformly so neither pixel dimension exceeds
/// `ceiling`.
///
/// A canvas already within the ceiling is returned unchanged. Resolution is
/// kept; only the physical size shrinks, so the aspect ratio is preserved
/// up to whole-pixel rounding. Rescaling is logged as a warning and never
/// fails.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn guard(canvas: CanvasSpec, ceiling: u32) -> GuardOutcome {
    let (width_px, height_px) = canvas.pixel_dims();
    let limit = u64::from(ceiling);

    if width_px <= limit && height_px <= limit {
        return GuardOutcome {
            canvas,
            rescaled: None,
        };
    }

    let ceiling = f64::from(ceiling);
    let factor = (ceiling / width_px as f64).min(ceiling / height_px as f64);
    let resized = canvas.scaled(factor);
    let (new_width, new_height) = resized.pixel_dims();

    log::warn!(
        "Output raster of {width_px}x{height_px} px exceeds the {limit} px limit; \
         rescaling by {factor:.4} to {new_width}x{new_height} px \
         ({:.2} x {:.2} in at {} dpi)",
        resized.width_in,
        resized.height_in,
        resized.dpi
    );

    GuardOutcome {
        canvas: resized,
        rescaled: Some(factor),
    }
}
