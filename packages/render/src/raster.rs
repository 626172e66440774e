//! SVG rasterization and PNG output.

use std::path::Path;

use tiny_skia::{Color, Pixmap, Transform};

use crate::RenderError;

/// Draws `svg` over `background`, or over white if there is none.
///
/// # Errors
///
/// * [`RenderError::BasemapSize`] if the background is not `width x height`
/// * [`RenderError::Canvas`] if a `width x height` pixmap cannot be allocated
/// * [`RenderError::Svg`] if the document does not parse
pub fn rasterize(
    svg: &str,
    background: Option<Pixmap>,
    width: u32,
    height: u32,
) -> Result<Pixmap, RenderError> {
    let mut pixmap = match background {
        Some(pixmap) if pixmap.width() == width && pixmap.height() == height => pixmap,
        Some(pixmap) => {
            return Err(RenderError::BasemapSize {
                width,
                height,
                actual_width: pixmap.width(),
                actual_height: pixmap.height(),
            });
        }
        None => {
            let mut blank = Pixmap::new(width, height).ok_or(RenderError::Canvas {
                width: u64::from(width),
                height: u64::from(height),
            })?;
            blank.fill(Color::WHITE);
            blank
        }
    };

    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| RenderError::Svg {
        message: e.to_string(),
    })?;

    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());
    Ok(pixmap)
}

/// Writes `pixmap` as a PNG, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`RenderError::Write`] if the directory or file cannot be
/// written.
pub fn save_png(pixmap: &Pixmap, path: &Path) -> Result<(), RenderError> {
    let write_error = |message: String| RenderError::Write {
        path: path.to_path_buf(),
        message,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
    }
    pixmap
        .save_png(path)
        .map_err(|e| write_error(e.to_string()))?;

    log::info!(
        "Wrote {}x{} px map to {}",
        pixmap.width(),
        pixmap.height(),
        path.display()
    );
    Ok(())
}
