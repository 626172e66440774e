//! Stitching tiles and warping them onto the print extent.
//!
//! Tiles live in Web Mercator; the sheet is drawn in the working CRS
//! (usually UTM). Every output pixel is mapped back to its ground
//! coordinate, projected to Web Mercator, and sampled from the mosaic by
//! nearest neighbour.

use std::sync::Arc;

use geo::{Coord, Rect, coord};
use geology_map_models::progress::ProgressCallback;
use geology_map_models::{Crs, PrintExtent};
use geology_map_projection::{ProjectionError, transform_coord, web_mercator};
use image::{Rgba, RgbaImage};
use tiny_skia::{ColorU8, Pixmap};

use crate::BasemapError;
use crate::source::TileSource;
use crate::tiles::{TILE_SIZE, TileId, TileRange, choose_zoom};

/// Samples per extent edge when bounding it in Web Mercator.
const EDGE_SAMPLES: u32 = 16;

/// What to fetch and at which output size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasemapRequest {
    pub extent: PrintExtent,
    pub crs: Crs,
    pub width_px: u32,
    pub height_px: u32,
    pub max_tiles: u32,
}

/// Decoded tiles stitched into one image.
pub struct Mosaic {
    range: TileRange,
    image: RgbaImage,
}

impl Mosaic {
    /// An opaque white mosaic covering `range`.
    #[must_use]
    pub fn new(range: TileRange) -> Self {
        let image = RgbaImage::from_pixel(
            range.columns() * TILE_SIZE,
            range.rows() * TILE_SIZE,
            Rgba([255, 255, 255, 255]),
        );
        Self { range, image }
    }

    /// Decodes an encoded tile into its slot.
    ///
    /// # Errors
    ///
    /// Returns [`BasemapError::Decode`] if the bytes are not an image.
    pub fn place(&mut self, tile: TileId, bytes: &[u8]) -> Result<(), BasemapError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| BasemapError::Decode {
                tile,
                message: e.to_string(),
            })?
            .to_rgba8();

        // High-DPI services return 512 px tiles.
        let decoded = if decoded.dimensions() == (TILE_SIZE, TILE_SIZE) {
            decoded
        } else {
            image::imageops::resize(
                &decoded,
                TILE_SIZE,
                TILE_SIZE,
                image::imageops::FilterType::Triangle,
            )
        };

        let x = i64::from((tile.x - self.range.min_x) * TILE_SIZE);
        let y = i64::from((tile.y - self.range.min_y) * TILE_SIZE);
        image::imageops::replace(&mut self.image, &decoded, x, y);
        Ok(())
    }

    /// Colour at a world-pixel position, or `None` outside the mosaic.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn sample(&self, world_px: f64, world_py: f64) -> Option<Rgba<u8>> {
        let (origin_x, origin_y) = self.range.origin_px();
        let x = (world_px - origin_x).floor();
        let y = (world_py - origin_y).floor();
        if x < 0.0 || y < 0.0 {
            return None;
        }
        self.image.get_pixel_checked(x as u32, y as u32).copied()
    }
}

/// Bounds of the extent in Web Mercator, found by projecting points along
/// its edges (a projected rectangle is not a rectangle in Web Mercator).
///
/// # Errors
///
/// Returns [`ProjectionError`] if an edge point cannot be projected.
pub fn mercator_bounds(extent: &PrintExtent, crs: Crs) -> Result<Rect<f64>, ProjectionError> {
    let mut min = coord! { x: f64::INFINITY, y: f64::INFINITY };
    let mut max = coord! { x: f64::NEG_INFINITY, y: f64::NEG_INFINITY };

    for i in 0..=EDGE_SAMPLES {
        let t = f64::from(i) / f64::from(EDGE_SAMPLES);
        let x = t.mul_add(extent.width(), extent.min_x);
        let y = t.mul_add(extent.height(), extent.min_y);
        for point in [
            coord! { x: x, y: extent.min_y },
            coord! { x: x, y: extent.max_y },
            coord! { x: extent.min_x, y: y },
            coord! { x: extent.max_x, y: y },
        ] {
            let projected = transform_coord(point, crs, Crs::WebMercator)?;
            min.x = min.x.min(projected.x);
            min.y = min.y.min(projected.y);
            max.x = max.x.max(projected.x);
            max.y = max.y.max(projected.y);
        }
    }

    Ok(Rect::new(min, max))
}

/// Resamples `mosaic` onto a `width x height` pixmap covering `extent` in
/// `crs`. Pixels that fall outside the mosaic stay white.
///
/// # Errors
///
/// Returns [`BasemapError::InvalidRequest`] for a zero-sized canvas.
#[allow(clippy::cast_precision_loss)]
pub fn warp(
    mosaic: &Mosaic,
    extent: &PrintExtent,
    crs: Crs,
    width: u32,
    height: u32,
) -> Result<Pixmap, BasemapError> {
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| BasemapError::InvalidRequest {
        message: format!("cannot allocate a {width}x{height} px basemap"),
    })?;
    pixmap.fill(tiny_skia::Color::WHITE);

    let zoom = mosaic.range.z;
    let x_step = extent.width() / f64::from(width);
    let y_step = extent.height() / f64::from(height);
    let row_len = width as usize;
    let pixels = pixmap.pixels_mut();

    for row in 0..height {
        let ground_y = (f64::from(row) + 0.5).mul_add(-y_step, extent.max_y);
        for col in 0..width {
            let ground_x = (f64::from(col) + 0.5).mul_add(x_step, extent.min_x);
            let Some(color) = sample_ground(mosaic, coord! { x: ground_x, y: ground_y }, crs, zoom)
            else {
                continue;
            };
            let Rgba([r, g, b, a]) = color;
            pixels[row as usize * row_len + col as usize] =
                ColorU8::from_rgba(r, g, b, a).premultiply();
        }
    }

    Ok(pixmap)
}

fn sample_ground(mosaic: &Mosaic, ground: Coord<f64>, crs: Crs, zoom: u8) -> Option<Rgba<u8>> {
    let mercator = transform_coord(ground, crs, Crs::WebMercator).ok()?;
    let (px, py) = web_mercator::to_world_pixel(mercator.x, mercator.y, zoom);
    mosaic.sample(px, py)
}

/// Fetches, stitches and warps the basemap for `request`.
///
/// Tiles are fetched one at a time; `progress` advances per tile.
///
/// # Errors
///
/// * [`BasemapError::InvalidRequest`] for a zero-sized canvas
/// * [`BasemapError::Projection`] if the extent cannot be located
/// * [`BasemapError::Unavailable`] / [`BasemapError::Decode`] if any tile
///   cannot be fetched or decoded
pub async fn fetch_basemap(
    source: &dyn TileSource,
    request: &BasemapRequest,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Pixmap, BasemapError> {
    if request.width_px == 0 || request.height_px == 0 {
        return Err(BasemapError::InvalidRequest {
            message: format!(
                "basemap canvas must be non-empty, got {}x{} px",
                request.width_px, request.height_px
            ),
        });
    }

    let bounds = mercator_bounds(&request.extent, request.crs)?;
    let center_lat = web_mercator::inverse(bounds.center().x, bounds.center().y).1;
    let metres_per_pixel = request.extent.width() / f64::from(request.width_px);
    let zoom = choose_zoom(
        &bounds,
        center_lat,
        metres_per_pixel,
        source.max_zoom(),
        request.max_tiles,
    );
    let range = TileRange::covering(&bounds, zoom);

    log::info!(
        "Fetching basemap: zoom {zoom}, {} tiles ({}x{})",
        range.count(),
        range.columns(),
        range.rows()
    );

    progress.set_total(range.count());
    progress.set_message(format!("basemap tiles at zoom {zoom}"));

    let mut mosaic = Mosaic::new(range);
    for tile in range.tiles() {
        let bytes = source.fetch_tile(tile).await?;
        mosaic.place(tile, &bytes)?;
        progress.inc(1);
    }

    progress.finish(format!("{} basemap tiles fetched", range.count()));

    log::info!(
        "Warping basemap to {}x{} px in {}",
        request.width_px,
        request.height_px,
        request.crs
    );
    warp(
        &mosaic,
        &request.extent,
        request.crs,
        request.width_px,
        request.height_px,
    )
}
