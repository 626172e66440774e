#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! One complete map run.
//!
//! [`run`] drives every stage in order, each one consuming the previous
//! stage's output:
//!
//! 1. read the reference area and geology layers
//! 2. normalize both into the working CRS, dropping geology features the
//!    working CRS cannot represent
//! 3. derive the print extent from the reference area
//! 4. clip and simplify the geology layer, and save it
//! 5. resolve one colour per geology unit
//! 6. check the canvas against the raster ceiling
//! 7. fetch the basemap (optional)
//! 8. compose, rasterize and write the sheet
//!
//! Any error ends the run before the PNG is written.

use std::path::PathBuf;
use std::sync::Arc;

use geology_map_basemap::{BasemapError, BasemapRequest, TileSource, fetch_basemap};
use geology_map_composition::CompositionError;
use geology_map_composition::clip::clip_and_simplify;
use geology_map_composition::extent::extent_for_layer;
use geology_map_composition::raster_guard::guard;
use geology_map_composition::style::{resolve_styles, unique_categories};
use geology_map_io::{IoError, read_layer, write_layer};
use geology_map_models::progress::ProgressCallback;
use geology_map_models::{ConfigError, MapConfig, PrintExtent};
use geology_map_projection::{ProjectionError, normalize, normalize_dropping_out_of_domain};
use geology_map_render::{RenderError, Sheet, render_sheet, save_png};
use thiserror::Error;
use tiny_skia::Pixmap;

const REFERENCE_AREA: &str = "reference area";
const GEOLOGY: &str = "geology";

/// Errors that can end a map run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error(transparent)]
    Basemap(#[from] BasemapError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl PipelineError {
    /// Whether the run stopped because no geology overlapped the sheet.
    #[must_use]
    pub const fn is_empty_clip(&self) -> bool {
        matches!(
            self,
            Self::Composition(CompositionError::EmptyClipResult { .. })
        )
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOutput {
    pub map_path: PathBuf,
    pub clipped_geology_path: PathBuf,
    pub extent: PrintExtent,
    /// Final raster size in pixels.
    pub width_px: u32,
    pub height_px: u32,
    /// Factor the page was shrunk by to fit the raster ceiling.
    pub rescaled: Option<f64>,
    /// Geology units in legend order.
    pub categories: Vec<String>,
    /// `false` if the sheet was drawn on a plain white background.
    pub basemap_used: bool,
}

/// Runs the whole pipeline for `config`.
///
/// Pass `tiles = None` to draw on white without a basemap.
///
/// # Errors
///
/// Returns the first stage error. An empty clip is reported as
/// [`CompositionError::EmptyClipResult`]; see
/// [`PipelineError::is_empty_clip`].
pub async fn run(
    config: &MapConfig,
    tiles: Option<&dyn TileSource>,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<MapOutput, PipelineError> {
    config.validate()?;
    let working_crs = config.projection.working_crs;
    let inputs = &config.inputs;

    let reference_area = read_layer(
        &inputs.reference_area_path,
        inputs.reference_crs,
        REFERENCE_AREA,
    )?;
    let geology = read_layer(&inputs.geology_path, inputs.geology_crs, GEOLOGY)?;

    let reference_area = normalize(reference_area, working_crs, REFERENCE_AREA)?;
    let geology = normalize_dropping_out_of_domain(geology, working_crs, GEOLOGY)?;

    let extent = extent_for_layer(&reference_area, &config.page)?;
    let clipped = clip_and_simplify(&geology, &extent, config.clip.simplify_tolerance)?;
    write_layer(&config.output.clipped_geology_path, &clipped)?;

    let categories = unique_categories(&clipped, &inputs.category_attribute);
    let styles = resolve_styles(&categories);
    log::info!("Resolved {} geology unit colours", styles.len());

    let outcome = guard(config.page.canvas(), config.raster.max_dimension);
    let (width, height) = outcome.canvas.pixel_dims();
    let too_large = || RenderError::Canvas { width, height };
    let width_px = u32::try_from(width).map_err(|_| too_large())?;
    let height_px = u32::try_from(height).map_err(|_| too_large())?;

    let basemap = match tiles {
        Some(source) => {
            let request = BasemapRequest {
                extent,
                crs: working_crs,
                width_px,
                height_px,
                max_tiles: config.basemap.max_tiles,
            };
            fetch_or_fallback(source, &request, config.basemap.required, progress).await?
        }
        None => {
            log::info!("No basemap provider configured, drawing on white");
            None
        }
    };
    let basemap_used = basemap.is_some();
    let attribution = match tiles {
        Some(source) if basemap_used => source.attribution(),
        _ => "",
    };

    let sheet = Sheet {
        canvas: outcome.canvas,
        extent,
        geology: &clipped,
        reference_area: &reference_area,
        category_attribute: &inputs.category_attribute,
        styles: &styles,
        fill_opacity: config.style.fill_opacity,
        scale_bar_fraction: config.furniture.scale_bar_fraction,
        title: &config.style.title,
        attribution,
    };
    let pixmap = render_sheet(&sheet, basemap)?;

    let map_path = config.output.map_path();
    save_png(&pixmap, &map_path)?;

    Ok(MapOutput {
        map_path,
        clipped_geology_path: config.output.clipped_geology_path.clone(),
        extent,
        width_px,
        height_px,
        rescaled: outcome.rescaled,
        categories,
        basemap_used,
    })
}

/// Fetches the basemap, degrading to `None` when it is optional.
async fn fetch_or_fallback(
    source: &dyn TileSource,
    request: &BasemapRequest,
    required: bool,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Option<Pixmap>, PipelineError> {
    match fetch_basemap(source, request, progress).await {
        Ok(pixmap) => Ok(Some(pixmap)),
        Err(e) if !required => {
            log::warn!("{e}; continuing without a basemap");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use async_trait::async_trait;
    use geology_map_basemap::TileId;
    use geology_map_models::progress::null_progress;
    use geology_map_models::{BasemapProvider, Crs};
    use tiny_skia::Color;

    use super::*;

    struct SolidTiles;

    #[async_trait]
    impl TileSource for SolidTiles {
        fn max_zoom(&self) -> u8 {
            19
        }

        fn attribution(&self) -> &str {
            "(C) Test tiles"
        }

        async fn fetch_tile(&self, _tile: TileId) -> Result<Vec<u8>, BasemapError> {
            let mut tile = Pixmap::new(256, 256).unwrap();
            tile.fill(Color::from_rgba8(200, 220, 180, 255));
            Ok(tile.encode_png().unwrap())
        }
    }

    struct DownTiles;

    #[async_trait]
    impl TileSource for DownTiles {
        fn max_zoom(&self) -> u8 {
            19
        }

        fn attribution(&self) -> &str {
            "(C) Test tiles"
        }

        async fn fetch_tile(&self, tile: TileId) -> Result<Vec<u8>, BasemapError> {
            Err(BasemapError::Unavailable {
                message: format!("tile {tile} timed out"),
            })
        }
    }

    fn rectangle(unit: &str, west: f64, south: f64, east: f64, north: f64) -> String {
        format!(
            r#"{{"type":"Feature","properties":{{"UNIT_NAME":"{unit}"}},"geometry":{{"type":"Polygon","coordinates":[[[{west},{south}],[{east},{south}],[{east},{north}],[{west},{north}],[{west},{south}]]]}}}}"#
        )
    }

    fn collection(features: &[String]) -> String {
        format!(
            r#"{{"type":"FeatureCollection","features":[{}]}}"#,
            features.join(",")
        )
    }

    /// Writes the input layers into a fresh directory and points a small,
    /// fast config at them.
    fn setup(name: &str, geology: &[String]) -> (PathBuf, MapConfig) {
        let dir = std::env::temp_dir().join(format!(
            "geology_map_pipeline_{name}_{}",
            std::process::id()
        ));
        if dir.exists() {
            std::fs::remove_dir_all(&dir).unwrap();
        }
        std::fs::create_dir_all(&dir).unwrap();

        let area = collection(&[rectangle("", -87.630, 41.880, -87.625, 41.884)]);
        std::fs::write(dir.join("area.geojson"), area).unwrap();
        std::fs::write(dir.join("geology.geojson"), collection(geology)).unwrap();

        let mut config = MapConfig::default();
        config.inputs.reference_area_path = dir.join("area.geojson");
        config.inputs.geology_path = dir.join("geology.geojson");
        config.page.width_in = 2.0;
        config.page.height_in = 3.0;
        config.page.dpi = 20.0;
        config.clip.simplify_tolerance = 10.0;
        config.output.directory = dir.join("out");
        config.output.clipped_geology_path = dir.join("out").join("geology_clipped.geojson");

        (dir, config)
    }

    fn overlapping_geology() -> Vec<String> {
        vec![
            rectangle("Shale", -87.70, 41.80, -87.55, 41.95),
            rectangle("Granite", -86.00, 41.00, -85.90, 41.10),
            rectangle("Dolomite", -87.628, 41.881, -87.626, 41.883),
        ]
    }

    fn cleanup(dir: &Path) {
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn full_run_writes_map_and_clipped_layer() {
        let (dir, config) = setup("full", &overlapping_geology());

        let output = run(&config, Some(&SolidTiles), &null_progress())
            .await
            .unwrap();

        assert_eq!(output.categories, vec!["Shale", "Dolomite"]);
        assert!(output.basemap_used);
        assert_eq!(output.rescaled, None);
        assert_eq!((output.width_px, output.height_px), (40, 60));

        let map = Pixmap::load_png(&output.map_path).unwrap();
        assert_eq!((map.width(), map.height()), (40, 60));

        let clipped = read_layer(&output.clipped_geology_path, None, "clipped").unwrap();
        assert_eq!(clipped.crs, Some(Crs::Utm { zone: 16, north: true }));
        assert_eq!(clipped.len(), 2);

        cleanup(&dir);
    }

    #[tokio::test]
    async fn extent_is_centred_on_the_reference_area() {
        let (dir, config) = setup("extent", &overlapping_geology());

        let output = run(&config, None, &null_progress()).await.unwrap();

        // 2 x 3 in at 1:10000 is 508 x 762 m of ground.
        assert!((output.extent.width() - 508.0).abs() < 1e-6);
        assert!((output.extent.height() - 762.0).abs() < 1e-6);
        assert!(!output.basemap_used);
        assert!(output.map_path.exists());

        cleanup(&dir);
    }

    #[tokio::test]
    async fn geology_outside_the_utm_zone_is_skipped() {
        let mut geology = overlapping_geology();
        geology.push(rectangle("Basalt", 100.0, 10.0, 100.1, 10.1));
        let (dir, config) = setup("far", &geology);

        let output = run(&config, None, &null_progress()).await.unwrap();

        assert_eq!(output.categories, vec!["Shale", "Dolomite"]);
        assert!(output.map_path.exists());

        cleanup(&dir);
    }

    #[tokio::test]
    async fn empty_clip_writes_nothing() {
        let (dir, config) = setup(
            "empty",
            &[rectangle("Granite", -86.00, 41.00, -85.90, 41.10)],
        );

        let err = run(&config, Some(&SolidTiles), &null_progress())
            .await
            .unwrap_err();

        assert!(err.is_empty_clip(), "{err}");
        assert!(!config.output.map_path().exists());
        assert!(!config.output.clipped_geology_path.exists());

        cleanup(&dir);
    }

    #[tokio::test]
    async fn optional_basemap_falls_back_to_white() {
        let (dir, mut config) = setup("fallback", &overlapping_geology());
        config.basemap.required = false;

        let output = run(&config, Some(&DownTiles), &null_progress())
            .await
            .unwrap();

        assert!(!output.basemap_used);
        let map = Pixmap::load_png(&output.map_path).unwrap();
        // Top-right corner is clear of geology fill and furniture.
        let corner = map.pixel(39, 20).unwrap();
        assert!(corner.red() > 0 && corner.green() > 0 && corner.blue() > 0);

        cleanup(&dir);
    }

    #[tokio::test]
    async fn required_basemap_failure_is_fatal() {
        let (dir, config) = setup("required", &overlapping_geology());
        assert!(config.basemap.required);

        let err = run(&config, Some(&DownTiles), &null_progress())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Basemap(_)), "{err}");
        assert!(!config.output.map_path().exists());

        cleanup(&dir);
    }

    #[tokio::test]
    async fn oversized_page_is_rescaled() {
        let (dir, mut config) = setup("rescale", &overlapping_geology());
        config.raster.max_dimension = 30;
        config.basemap.provider = BasemapProvider::None;

        let output = run(&config, None, &null_progress()).await.unwrap();

        assert!(output.rescaled.is_some());
        assert!(output.width_px <= 30 && output.height_px <= 30);
        assert_eq!(output.height_px, 30);

        cleanup(&dir);
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_reading() {
        let mut config = MapConfig::default();
        config.page.dpi = 0.0;

        let err = run(&config, None, &null_progress()).await.unwrap_err();

        assert!(matches!(err, PipelineError::Config(_)), "{err}");
    }
}
