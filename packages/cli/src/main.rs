#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Renders one print-scale geology map sheet.
//!
//! Settings come from a TOML config file (defaults when omitted); the flags
//! below override the most commonly changed ones. Log output goes through
//! [`geology_map_cli_utils::init_logger`] so it never fights the tile
//! download bar for the terminal.
//!
//! Exits with status 2 when no geology overlaps the sheet.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use geology_map_basemap::{HttpTileSource, TileSource};
use geology_map_cli_utils::IndicatifProgress;
use geology_map_models::{BasemapProvider, MapConfig};

/// Exit status when the geology layer does not overlap the sheet.
const EXIT_EMPTY_CLIP: u8 = 2;

#[derive(Parser)]
#[command(name = "geology_map", about = "Render a print-scale geological map sheet")]
struct Cli {
    /// TOML run configuration
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Project area polygon layer (`GeoJSON`)
    #[arg(long)]
    reference_area: Option<PathBuf>,

    /// Geology polygon layer (`GeoJSON`)
    #[arg(long)]
    geology: Option<PathBuf>,

    /// Directory the map PNG is written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Basemap provider (`open_street_map_mapnik`, `open_topo_map`,
    /// `esri_world_imagery`, `none`)
    #[arg(long)]
    basemap: Option<BasemapProvider>,

    /// Render on white if the basemap cannot be fetched
    #[arg(long)]
    basemap_optional: bool,
}

impl Cli {
    fn load_config(&self) -> Result<MapConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                MapConfig::load(path)?
            }
            None => MapConfig::default(),
        };

        if let Some(path) = &self.reference_area {
            config.inputs.reference_area_path.clone_from(path);
        }
        if let Some(path) = &self.geology {
            config.inputs.geology_path.clone_from(path);
        }
        if let Some(dir) = &self.output_dir {
            config.output.clipped_geology_path = dir.join(
                config
                    .output
                    .clipped_geology_path
                    .file_name()
                    .unwrap_or_else(|| OsStr::new("geology_clipped.geojson")),
            );
            config.output.directory.clone_from(dir);
        }
        if let Some(provider) = self.basemap {
            config.basemap.provider = provider;
        }
        if self.basemap_optional {
            config.basemap.required = false;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let multi = geology_map_cli_utils::init_logger();
    let cli = Cli::parse();
    let config = cli.load_config()?;

    let tiles = match config.basemap.provider {
        BasemapProvider::None => None,
        _ => Some(HttpTileSource::new(&config.basemap)?),
    };
    let progress = IndicatifProgress::tiles_bar(&multi, "Fetching basemap tiles");

    let result = geology_map_pipeline::run(
        &config,
        tiles.as_ref().map(|t| t as &dyn TileSource),
        &progress,
    )
    .await;

    match result {
        Ok(output) => {
            if let Some(factor) = output.rescaled {
                log::warn!("Page was shrunk by a factor of {factor:.4} to fit the raster limit");
            }
            log::info!(
                "{} geology units: {}",
                output.categories.len(),
                output.categories.join(", ")
            );
            println!(
                "Map written to {} ({}x{} px)",
                output.map_path.display(),
                output.width_px,
                output.height_px
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_empty_clip() => {
            log::warn!("{e}; no map written");
            Ok(ExitCode::from(EXIT_EMPTY_CLIP))
        }
        Err(e) => {
            log::error!("{e}");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "geology_map",
            "--geology",
            "in/geo.geojson",
            "--output-dir",
            "maps",
            "--basemap",
            "open_topo_map",
            "--basemap-optional",
        ]);
        let config = cli.load_config().unwrap();

        assert_eq!(config.inputs.geology_path, Path::new("in/geo.geojson"));
        assert_eq!(
            config.output.map_path(),
            Path::new("maps/geological_map_project_area.png")
        );
        assert_eq!(
            config.output.clipped_geology_path,
            Path::new("maps/geology_clipped.geojson")
        );
        assert_eq!(config.basemap.provider, BasemapProvider::OpenTopoMap);
        assert!(!config.basemap.required);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        assert!(Cli::try_parse_from(["geology_map", "--basemap", "bing"]).is_err());
    }
}
