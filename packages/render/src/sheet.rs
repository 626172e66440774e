//! The complete map sheet.

use geo::{LineString, MultiPolygon};
use geology_map_models::{CanvasSpec, CategoryStyle, PrintExtent, VectorLayer};
use tiny_skia::Pixmap;

use crate::RenderError;
use crate::frame::Frame;
use crate::furniture;
use crate::raster::rasterize;

/// Everything drawn on one sheet.
#[derive(Debug, Clone, Copy)]
pub struct Sheet<'a> {
    pub canvas: CanvasSpec,
    pub extent: PrintExtent,
    /// Clipped geology, in the working CRS.
    pub geology: &'a VectorLayer,
    /// Project boundary, in the working CRS.
    pub reference_area: &'a VectorLayer,
    pub category_attribute: &'a str,
    pub styles: &'a CategoryStyle,
    pub fill_opacity: f64,
    pub scale_bar_fraction: f64,
    pub title: &'a str,
    pub attribution: &'a str,
}

/// SVG path data for a multipolygon in page pixels.
fn path_data(frame: &Frame, geometry: &MultiPolygon<f64>) -> String {
    let mut d = String::new();
    let mut ring = |line: &LineString<f64>| {
        for (i, c) in line.coords().enumerate() {
            let (x, y) = frame.to_page(*c);
            let command = if i == 0 { 'M' } else { 'L' };
            d.push_str(&format!("{command}{x:.2} {y:.2} "));
        }
        d.push_str("Z ");
    };
    for polygon in geometry {
        ring(polygon.exterior());
        for interior in polygon.interiors() {
            ring(interior);
        }
    }
    d.trim_end().to_string()
}

/// Builds the sheet's SVG document.
///
/// Geology polygons are grouped by unit in style order, drawn with their
/// unit colour at `fill_opacity` and a thin black outline. The project area
/// is an unfilled red outline on top. The background is left transparent
/// for the basemap.
#[must_use]
pub fn compose_svg(sheet: &Sheet<'_>) -> String {
    let frame = Frame::new(sheet.extent, &sheet.canvas);
    let (width, height) = (frame.width, frame.height);

    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
         viewBox=\"0 0 {width} {height}\">\n"
    ));

    svg.push_str(&format!(
        "<g id=\"geology\" fill-rule=\"evenodd\" stroke=\"#000000\" stroke-width=\"{:.2}\">\n",
        frame.pt(0.5)
    ));
    for (category, color) in sheet.styles.iter() {
        svg.push_str(&format!(
            "<g fill=\"{color}\" fill-opacity=\"{}\">\n",
            sheet.fill_opacity
        ));
        for feature in sheet
            .geology
            .features
            .iter()
            .filter(|feature| feature.category(sheet.category_attribute) == category)
        {
            svg.push_str(&format!(
                "<path d=\"{}\"/>\n",
                path_data(&frame, &feature.geometry)
            ));
        }
        svg.push_str("</g>\n");
    }
    svg.push_str("</g>\n");

    let (outline, outline_pt) = furniture::reference_area_stroke();
    svg.push_str(&format!(
        "<g id=\"project-area\" fill=\"none\" stroke=\"{outline}\" stroke-width=\"{:.2}\">\n",
        frame.pt(outline_pt)
    ));
    for feature in &sheet.reference_area.features {
        svg.push_str(&format!(
            "<path d=\"{}\"/>\n",
            path_data(&frame, &feature.geometry)
        ));
    }
    svg.push_str("</g>\n");

    svg.push_str(&furniture::scale_bar(&frame, sheet.scale_bar_fraction));
    svg.push_str(&furniture::north_arrow(&frame));
    svg.push_str(&furniture::legend(
        &frame,
        sheet.category_attribute,
        sheet.styles,
        sheet.fill_opacity,
    ));
    svg.push_str(&furniture::title(&frame, sheet.title));
    svg.push_str(&furniture::attribution(&frame, sheet.attribution));

    svg.push_str("</svg>\n");
    svg
}

/// Composes and rasterizes the sheet over `basemap` (or white).
///
/// # Errors
///
/// See [`rasterize`].
pub fn render_sheet(sheet: &Sheet<'_>, basemap: Option<Pixmap>) -> Result<Pixmap, RenderError> {
    let (width, height) = sheet.canvas.pixel_dims();
    let too_large = || RenderError::Canvas { width, height };
    let width = u32::try_from(width).map_err(|_| too_large())?;
    let height = u32::try_from(height).map_err(|_| too_large())?;

    let svg = compose_svg(sheet);
    log::debug!("Composed {} bytes of SVG for a {width}x{height} px sheet", svg.len());

    rasterize(&svg, basemap, width, height)
}
