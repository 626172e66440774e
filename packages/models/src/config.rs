//! Run configuration.
//!
//! Every path and constant the pipeline needs lives in [`MapConfig`], loaded
//! from TOML. Each section is `#[serde(default)]`, so a config file only
//! needs to mention what differs from the defaults:
//!
//! ```toml
//! [inputs]
//! reference_area_path = "data/project_area.geojson"
//! geology_path = "data/geology.geojson"
//!
//! [projection]
//! working_crs = "EPSG:32616"
//!
//! [basemap]
//! provider = "open_topo_map"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{BasemapProvider, CanvasSpec, Crs, MAX_RASTER_DIMENSION};

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`MapConfig`].
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of its permitted range.
    #[error("Invalid config: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },
}

/// Top-level configuration for one map run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    pub inputs: InputConfig,
    pub projection: ProjectionConfig,
    pub page: PageConfig,
    pub clip: ClipConfig,
    pub style: StyleConfig,
    pub furniture: FurnitureConfig,
    pub raster: RasterConfig,
    pub basemap: BasemapConfig,
    pub output: OutputConfig,
}

/// Input vector layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Project boundary polygon layer.
    pub reference_area_path: PathBuf,
    /// Geology polygon layer.
    pub geology_path: PathBuf,
    /// Property holding each geology polygon's unit name.
    pub category_attribute: String,
    /// CRS to assume for the reference area when its file names none.
    pub reference_crs: Option<Crs>,
    /// CRS to assume for the geology layer when its file names none.
    pub geology_crs: Option<Crs>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            reference_area_path: PathBuf::from("data/project_area.geojson"),
            geology_path: PathBuf::from("data/geology.geojson"),
            category_attribute: "UNIT_NAME".to_string(),
            reference_crs: None,
            geology_crs: None,
        }
    }
}

/// Working coordinate system for all distance math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectionConfig {
    pub working_crs: Crs,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            working_crs: Crs::Utm {
                zone: 16,
                north: true,
            },
        }
    }
}

/// Physical page and print scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    /// The N of a 1:N map scale.
    pub scale_denominator: f64,
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: f64,
    /// Ground units per inch of paper at 1:1 (metres per inch by default).
    pub units_per_inch: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            scale_denominator: 10_000.0,
            width_in: 24.0,
            height_in: 36.0,
            dpi: 100.0,
            units_per_inch: 0.0254,
        }
    }
}

impl PageConfig {
    /// The canvas this page renders onto.
    #[must_use]
    pub const fn canvas(&self) -> CanvasSpec {
        CanvasSpec::new(self.width_in, self.height_in, self.dpi)
    }
}

/// Clip-and-simplify settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClipConfig {
    /// Maximum boundary deviation in ground units; `0` disables
    /// simplification.
    pub simplify_tolerance: f64,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            simplify_tolerance: 100.0,
        }
    }
}

/// Sheet styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    /// Opacity of the geology fills over the basemap.
    pub fill_opacity: f64,
    pub title: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            fill_opacity: 0.7,
            title: "Geological Map of Project Area".to_string(),
        }
    }
}

/// Cartographic furniture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FurnitureConfig {
    /// Scale bar length as a fraction of the map width.
    pub scale_bar_fraction: f64,
}

impl Default for FurnitureConfig {
    fn default() -> Self {
        Self {
            scale_bar_fraction: 0.2,
        }
    }
}

/// Raster export limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RasterConfig {
    /// Per-axis pixel ceiling.
    pub max_dimension: u32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            max_dimension: MAX_RASTER_DIMENSION,
        }
    }
}

/// Basemap source and fetch policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BasemapConfig {
    pub provider: BasemapProvider,
    /// When `false`, an unreachable tile service degrades to a white
    /// background instead of aborting the run.
    pub required: bool,
    /// Retries per tile after the first attempt.
    pub max_retries: u32,
    /// First backoff delay; doubles on every retry.
    pub base_delay_ms: u64,
    /// Upper bound on tiles per map; zoom is lowered until it fits.
    pub max_tiles: u32,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Sent with every tile request (tile usage policies require one).
    pub user_agent: String,
}

impl Default for BasemapConfig {
    fn default() -> Self {
        Self {
            provider: BasemapProvider::default(),
            required: true,
            max_retries: 3,
            base_delay_ms: 500,
            max_tiles: 512,
            timeout_secs: 30,
            user_agent: concat!("geology_map/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Output locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory the PNG is written to; created if absent.
    pub directory: PathBuf,
    pub file_name: String,
    /// Where the clipped, simplified geology layer is saved.
    pub clipped_geology_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            file_name: "geological_map_project_area.png".to_string(),
            clipped_geology_path: PathBuf::from("output/geology_clipped.geojson"),
        }
    }
}

impl OutputConfig {
    /// Full path of the PNG.
    #[must_use]
    pub fn map_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

impl MapConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the TOML is malformed or a value is out of
    /// range.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is malformed, or
    /// a value is out of range.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("page.scale_denominator", self.page.scale_denominator),
            ("page.width_in", self.page.width_in),
            ("page.height_in", self.page.height_in),
            ("page.dpi", self.page.dpi),
            ("page.units_per_inch", self.page.units_per_inch),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("{name} must be positive, got {value}")));
            }
        }

        if !(self.clip.simplify_tolerance.is_finite() && self.clip.simplify_tolerance >= 0.0) {
            return Err(invalid(format!(
                "clip.simplify_tolerance must be non-negative, got {}",
                self.clip.simplify_tolerance
            )));
        }

        let fractions = [
            ("style.fill_opacity", self.style.fill_opacity),
            (
                "furniture.scale_bar_fraction",
                self.furniture.scale_bar_fraction,
            ),
        ];
        for (name, value) in fractions {
            if !(value > 0.0 && value <= 1.0) {
                return Err(invalid(format!("{name} must be in (0, 1], got {value}")));
            }
        }

        if self.projection.working_crs.is_geographic() {
            return Err(invalid(format!(
                "projection.working_crs must be projected (metres), got {}",
                self.projection.working_crs
            )));
        }

        if self.raster.max_dimension == 0 {
            return Err(invalid("raster.max_dimension must be positive".to_string()));
        }

        if self.inputs.category_attribute.trim().is_empty() {
            return Err(invalid(
                "inputs.category_attribute must not be empty".to_string(),
            ));
        }

        if self.output.file_name.trim().is_empty() {
            return Err(invalid("output.file_name must not be empty".to_string()));
        }

        Ok(())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid { message }
}
