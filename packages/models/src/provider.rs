//! Basemap tile providers.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// An XYZ raster tile service usable as the map background.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BasemapProvider {
    /// Standard OpenStreetMap Mapnik style.
    #[default]
    OpenStreetMapMapnik,
    /// OpenTopoMap topographic style.
    OpenTopoMap,
    /// Esri World Imagery (satellite).
    EsriWorldImagery,
    /// No basemap; the sheet is drawn on white.
    None,
}

impl BasemapProvider {
    /// URL template with `{z}`, `{x}` and `{y}` placeholders.
    #[must_use]
    pub const fn url_template(self) -> Option<&'static str> {
        match self {
            Self::OpenStreetMapMapnik => Some("https://tile.openstreetmap.org/{z}/{x}/{y}.png"),
            Self::OpenTopoMap => Some("https://tile.opentopomap.org/{z}/{x}/{y}.png"),
            Self::EsriWorldImagery => Some(
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
            ),
            Self::None => None,
        }
    }

    /// Deepest zoom level the service publishes.
    #[must_use]
    pub const fn max_zoom(self) -> u8 {
        match self {
            Self::OpenStreetMapMapnik => 19,
            Self::OpenTopoMap => 17,
            Self::EsriWorldImagery => 18,
            Self::None => 0,
        }
    }

    /// Attribution text that must accompany the imagery.
    #[must_use]
    pub const fn attribution(self) -> &'static str {
        match self {
            Self::OpenStreetMapMapnik => "(C) OpenStreetMap contributors",
            Self::OpenTopoMap => {
                "Map data: (C) OpenStreetMap contributors, SRTM | Map style: (C) OpenTopoMap (CC-BY-SA)"
            }
            Self::EsriWorldImagery => {
                "Tiles (C) Esri - Source: Esri, Maxar, Earthstar Geographics, and the GIS User Community"
            }
            Self::None => "",
        }
    }

    /// Expands the URL template for one tile.
    #[must_use]
    pub fn tile_url(self, z: u8, x: u32, y: u32) -> Option<String> {
        self.url_template().map(|template| {
            template
                .replace("{z}", &z.to_string())
                .replace("{x}", &x.to_string())
                .replace("{y}", &y.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator as _;

    use super::*;

    #[test]
    fn parses_snake_case_identifiers() {
        assert_eq!(
            "open_street_map_mapnik".parse::<BasemapProvider>().unwrap(),
            BasemapProvider::OpenStreetMapMapnik
        );
        assert_eq!(
            "none".parse::<BasemapProvider>().unwrap(),
            BasemapProvider::None
        );
        assert!("google".parse::<BasemapProvider>().is_err());
    }

    #[test]
    fn expands_tile_urls() {
        assert_eq!(
            BasemapProvider::OpenStreetMapMapnik.tile_url(3, 1, 2).as_deref(),
            Some("https://tile.openstreetmap.org/3/1/2.png")
        );
        assert_eq!(
            BasemapProvider::EsriWorldImagery.tile_url(3, 1, 2).as_deref(),
            Some(
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/3/2/1"
            )
        );
        assert!(BasemapProvider::None.tile_url(3, 1, 2).is_none());
    }

    #[test]
    fn every_tiled_provider_has_attribution() {
        for provider in BasemapProvider::iter() {
            if provider.url_template().is_some() {
                assert!(!provider.attribution().is_empty(), "{provider} lacks attribution");
                assert!(provider.max_zoom() > 0, "{provider} lacks max zoom");
            }
        }
    }
}
