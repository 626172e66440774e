//! Cartographic furniture: north arrow, scale bar, legend, title and
//! attribution.
//!
//! Positions are given as axes fractions with the origin at the bottom
//! left, sizes in typographic points, both converted through [`Frame`].

use geology_map_models::CategoryStyle;

use crate::frame::Frame;

pub const FONT_FAMILY: &str = "DejaVu Sans, Arial, Helvetica, sans-serif";

const REFERENCE_AREA_COLOR: &str = "#ff0000";
const REFERENCE_AREA_WIDTH_PT: f64 = 2.0;

const NORTH_ARROW_AT: (f64, f64) = (0.05, 0.95);
const NORTH_ARROW_SIZE: f64 = 0.05;
const NORTH_LABEL_PT: f64 = 9.0;

const SCALE_BAR_AT: (f64, f64) = (0.95, 0.05);
const SCALE_BAR_THICKNESS_PT: f64 = 3.0;
const SCALE_LABEL_PT: f64 = 8.0;

const LEGEND_AT: (f64, f64) = (0.02, 0.02);
const LEGEND_LABEL_PT: f64 = 9.0;
const LEGEND_TITLE_PT: f64 = 10.0;

const TITLE_Y: f64 = 0.98;
const TITLE_PT: f64 = 12.0;

const ATTRIBUTION_AT: (f64, f64) = (0.005, 0.005);
const ATTRIBUTION_PT: f64 = 8.0;

/// Rough advance width of an average glyph, as a fraction of font size.
const GLYPH_WIDTH: f64 = 0.6;

/// Escapes text for use in SVG character data and attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[allow(clippy::cast_precision_loss)]
fn text_width(text: &str, font_px: f64) -> f64 {
    text.chars().count() as f64 * GLYPH_WIDTH * font_px
}

/// An upward arrow with an `N` above it, always pointing to the top of the
/// sheet.
#[must_use]
pub fn north_arrow(frame: &Frame) -> String {
    let (x, y) = NORTH_ARROW_AT;
    let (tip_x, tip_y) = frame.axes(x, y);
    let (_, tail_y) = frame.axes(x, y - NORTH_ARROW_SIZE);
    let length = tail_y - tip_y;
    let width = NORTH_ARROW_SIZE / 2.0 * frame.width;

    // Shaft 0.2 wide, head 0.6 wide and 0.2 long, in arrow-width units.
    let head_base = 0.2_f64.mul_add(length, tip_y);
    let points = [
        (tip_x - 0.1 * width, tail_y),
        (tip_x + 0.1 * width, tail_y),
        (tip_x + 0.1 * width, head_base),
        (tip_x + 0.3 * width, head_base),
        (tip_x, tip_y),
        (tip_x - 0.3 * width, head_base),
        (tip_x - 0.1 * width, head_base),
    ];
    let points: Vec<String> = points
        .iter()
        .map(|(px, py)| format!("{px:.2},{py:.2}"))
        .collect();

    let (_, label_y) = frame.axes(x, y + 0.01);
    format!(
        "<g id=\"north-arrow\">\n\
         <polygon points=\"{}\" fill=\"#000000\" stroke=\"#000000\"/>\n\
         <text x=\"{tip_x:.2}\" y=\"{label_y:.2}\" font-family=\"{FONT_FAMILY}\" \
         font-size=\"{:.2}\" font-weight=\"bold\" text-anchor=\"middle\">N</text>\n\
         </g>\n",
        points.join(" "),
        frame.pt(NORTH_LABEL_PT),
    )
}

/// Ground length, in whole metres, of a scale bar spanning `fraction` of
/// the frame width.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn scale_bar_metres(frame: &Frame, fraction: f64) -> i64 {
    (fraction * frame.extent.width()).floor() as i64
}

/// A four-segment alternating black/white scale bar whose right end sits
/// at the anchor, labelled with its ground length.
#[must_use]
pub fn scale_bar(frame: &Frame, fraction: f64) -> String {
    let (right, y) = frame.axes(SCALE_BAR_AT.0, SCALE_BAR_AT.1);
    let length = fraction * frame.width;
    let thickness = frame.pt(SCALE_BAR_THICKNESS_PT);
    let segment = length / 4.0;

    let mut out = String::from("<g id=\"scale-bar\">\n");
    for i in 0..4_u8 {
        let x = f64::from(i + 1).mul_add(-segment, right);
        let fill = if i % 2 == 0 { "#000000" } else { "#ffffff" };
        out.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{:.2}\" width=\"{segment:.2}\" height=\"{thickness:.2}\" \
             fill=\"{fill}\" stroke=\"#000000\" stroke-width=\"{:.2}\"/>\n",
            y - thickness / 2.0,
            frame.pt(0.5),
        ));
    }

    let font = frame.pt(SCALE_LABEL_PT);
    let (_, label_top) = frame.axes(SCALE_BAR_AT.0, SCALE_BAR_AT.1 - 0.01);
    out.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{FONT_FAMILY}\" font-size=\"{font:.2}\" \
         text-anchor=\"middle\">{} m</text>\n</g>\n",
        right - length / 2.0,
        label_top + font,
        scale_bar_metres(frame, fraction),
    ));
    out
}

/// The legend box: a "Project Area" line entry followed by a swatch per
/// geology unit, in style order.
#[must_use]
pub fn legend(
    frame: &Frame,
    attribute: &str,
    styles: &CategoryStyle,
    fill_opacity: f64,
) -> String {
    let font = frame.pt(LEGEND_LABEL_PT);
    let title_font = frame.pt(LEGEND_TITLE_PT);
    let padding = 0.5 * font;
    let row = 1.6 * font;
    let title_row = 1.3 * title_font;
    let handle = 2.0 * font;
    let gap = 0.8 * font;

    let titles = ["Legend".to_string(), format!("Geology type = {attribute}")];
    let labels: Vec<&str> = std::iter::once("Project Area")
        .chain(styles.iter().map(|(name, _)| name))
        .collect();

    let label_width = labels
        .iter()
        .map(|label| text_width(label, font))
        .fold(0.0, f64::max);
    let title_width = titles
        .iter()
        .map(|title| text_width(title, title_font))
        .fold(0.0, f64::max);
    let inner_width = (handle + gap + label_width).max(title_width);
    let box_width = 2.0f64.mul_add(padding, inner_width);
    #[allow(clippy::cast_precision_loss)]
    let box_height = (labels.len() as f64).mul_add(row, 2.0f64.mul_add(padding, 2.0 * title_row));

    let (left, bottom) = frame.axes(LEGEND_AT.0, LEGEND_AT.1);
    let top = bottom - box_height;
    let corner = 0.3 * font;
    let shadow = 0.3 * font;

    let mut out = String::from("<g id=\"legend\">\n");
    out.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{box_width:.2}\" height=\"{box_height:.2}\" \
         rx=\"{corner:.2}\" fill=\"#000000\" fill-opacity=\"0.5\"/>\n",
        left + shadow,
        top + shadow,
    ));
    out.push_str(&format!(
        "<rect x=\"{left:.2}\" y=\"{top:.2}\" width=\"{box_width:.2}\" height=\"{box_height:.2}\" \
         rx=\"{corner:.2}\" fill=\"#ffffff\" stroke=\"#000000\" stroke-width=\"{:.2}\"/>\n",
        frame.pt(0.8),
    ));

    let centre = left + box_width / 2.0;
    let mut y = top + padding;
    for title in &titles {
        y += title_row;
        out.push_str(&format!(
            "<text x=\"{centre:.2}\" y=\"{:.2}\" font-family=\"{FONT_FAMILY}\" \
             font-size=\"{title_font:.2}\" text-anchor=\"middle\">{}</text>\n",
            y - 0.3 * title_font,
            escape(title),
        ));
    }

    let handle_x = left + padding;
    let label_x = handle_x + handle + gap;
    for (index, label) in labels.iter().enumerate() {
        let middle = y + row / 2.0;
        if index == 0 {
            out.push_str(&format!(
                "<line x1=\"{handle_x:.2}\" y1=\"{middle:.2}\" x2=\"{:.2}\" y2=\"{middle:.2}\" \
                 stroke=\"{REFERENCE_AREA_COLOR}\" stroke-width=\"{:.2}\"/>\n",
                handle_x + handle,
                frame.pt(REFERENCE_AREA_WIDTH_PT),
            ));
        } else if let Some(color) = styles.get(label) {
            out.push_str(&format!(
                "<rect x=\"{handle_x:.2}\" y=\"{:.2}\" width=\"{handle:.2}\" height=\"{:.2}\" \
                 fill=\"{color}\" fill-opacity=\"{fill_opacity}\" stroke=\"{color}\" \
                 stroke-opacity=\"{fill_opacity}\"/>\n",
                0.35f64.mul_add(-font, middle),
                0.7 * font,
            ));
        }
        out.push_str(&format!(
            "<text x=\"{label_x:.2}\" y=\"{:.2}\" font-family=\"{FONT_FAMILY}\" \
             font-size=\"{font:.2}\">{}</text>\n",
            0.35f64.mul_add(font, middle),
            escape(label),
        ));
        y += row;
    }

    out.push_str("</g>\n");
    out
}

/// The sheet title, centred near the top edge.
#[must_use]
pub fn title(frame: &Frame, text: &str) -> String {
    let font = frame.pt(TITLE_PT);
    let (x, top) = frame.axes(0.5, TITLE_Y);
    format!(
        "<text id=\"title\" x=\"{x:.2}\" y=\"{:.2}\" font-family=\"{FONT_FAMILY}\" \
         font-size=\"{font:.2}\" text-anchor=\"middle\">{}</text>\n",
        top + font,
        escape(text),
    )
}

/// Basemap attribution in the lower-left corner, or nothing for an
/// empty text.
#[must_use]
pub fn attribution(frame: &Frame, text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let font = frame.pt(ATTRIBUTION_PT);
    let (x, y) = frame.axes(ATTRIBUTION_AT.0, ATTRIBUTION_AT.1);
    format!(
        "<text id=\"attribution\" x=\"{x:.2}\" y=\"{y:.2}\" font-family=\"{FONT_FAMILY}\" \
         font-size=\"{font:.2}\" fill=\"#000000\" fill-opacity=\"0.8\">{}</text>\n",
        escape(text),
    )
}

/// Stroke colour and width (pt) for the project area outline.
#[must_use]
pub const fn reference_area_stroke() -> (&'static str, f64) {
    (REFERENCE_AREA_COLOR, REFERENCE_AREA_WIDTH_PT)
}
