//! Coordinate reference system identifiers.
//!
//! Only the systems the pipeline can actually reproject between are
//! representable: WGS 84 geographic coordinates, spherical Web Mercator
//! (the tile grid of every XYZ basemap), and the 120 WGS 84 UTM zones.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// EPSG code for WGS 84 geographic coordinates.
pub const EPSG_WGS84: u32 = 4326;

/// EPSG code for spherical Web Mercator.
pub const EPSG_WEB_MERCATOR: u32 = 3857;

/// Legacy unofficial code for Web Mercator, still emitted by older tools.
const EPSG_GOOGLE_MERCATOR: u32 = 900_913;

const EPSG_UTM_NORTH_BASE: u32 = 32_600;
const EPSG_UTM_SOUTH_BASE: u32 = 32_700;

/// Errors produced when parsing a CRS identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseCrsError {
    /// The identifier is not in a recognised `EPSG:n` / URN form.
    #[error("Malformed CRS identifier: {0:?}")]
    Malformed(String),

    /// The identifier is well formed but names a system we cannot
    /// reproject.
    #[error("Unsupported CRS: EPSG:{0}")]
    Unsupported(u32),
}

/// A supported coordinate reference system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crs {
    /// WGS 84 longitude/latitude in degrees (EPSG:4326, x = longitude).
    Wgs84,
    /// Spherical Web Mercator in metres (EPSG:3857).
    WebMercator,
    /// WGS 84 / UTM in metres (EPSG:326zz north, EPSG:327zz south).
    Utm {
        /// Zone number, 1 through 60.
        zone: u8,
        /// `true` for the northern hemisphere variant.
        north: bool,
    },
}

impl Crs {
    /// Resolves an EPSG code.
    ///
    /// # Errors
    ///
    /// Returns [`ParseCrsError::Unsupported`] for codes outside the
    /// supported set.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_epsg(code: u32) -> Result<Self, ParseCrsError> {
        match code {
            EPSG_WGS84 => Ok(Self::Wgs84),
            EPSG_WEB_MERCATOR | EPSG_GOOGLE_MERCATOR => Ok(Self::WebMercator),
            32_601..=32_660 => Ok(Self::Utm {
                zone: (code - EPSG_UTM_NORTH_BASE) as u8,
                north: true,
            }),
            32_701..=32_760 => Ok(Self::Utm {
                zone: (code - EPSG_UTM_SOUTH_BASE) as u8,
                north: false,
            }),
            other => Err(ParseCrsError::Unsupported(other)),
        }
    }

    /// Returns the EPSG code of this system.
    #[must_use]
    pub fn epsg(self) -> u32 {
        match self {
            Self::Wgs84 => EPSG_WGS84,
            Self::WebMercator => EPSG_WEB_MERCATOR,
            Self::Utm { zone, north: true } => EPSG_UTM_NORTH_BASE + u32::from(zone),
            Self::Utm { zone, north: false } => EPSG_UTM_SOUTH_BASE + u32::from(zone),
        }
    }

    /// Whether coordinates are angular (degrees) rather than ground units.
    #[must_use]
    pub const fn is_geographic(self) -> bool {
        matches!(self, Self::Wgs84)
    }

    /// OGC URN form, as written into the legacy `GeoJSON` `crs` member.
    #[must_use]
    pub fn urn(self) -> String {
        format!("urn:ogc:def:crs:EPSG::{}", self.epsg())
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

impl FromStr for Crs {
    type Err = ParseCrsError;

    /// Accepts `EPSG:32616`, `epsg:4326`, `urn:ogc:def:crs:EPSG::3857`,
    /// `urn:ogc:def:crs:OGC:1.3:CRS84`, and bare codes like `32616`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let upper = trimmed.to_ascii_uppercase();
        let malformed = || ParseCrsError::Malformed(trimmed.to_string());

        if upper.ends_with("CRS84") {
            return Ok(Self::Wgs84);
        }
        if upper.contains(':') && !upper.contains("EPSG") {
            return Err(malformed());
        }

        let code = upper
            .rsplit(':')
            .find(|part| !part.is_empty())
            .ok_or_else(malformed)?;
        let code: u32 = code.parse().map_err(|_| malformed())?;

        Self::from_epsg(code)
    }
}

impl Serialize for Crs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Crs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
