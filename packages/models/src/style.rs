//! Category colours.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque 8-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a colour from a `0xRRGGBB` literal.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: (hex >> 16) as u8,
            g: (hex >> 8) as u8,
            b: hex as u8,
        }
    }

    /// `#rrggbb` form, as used in SVG.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Ordered one-to-one mapping from category to colour.
///
/// Order is the first-encounter order of the categories and drives legend
/// ordering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryStyle {
    entries: Vec<(String, Rgb)>,
}

impl CategoryStyle {
    /// Appends a category. Returns `false` (and changes nothing) if the
    /// category is already styled.
    pub fn insert(&mut self, category: String, color: Rgb) -> bool {
        if self.get(&category).is_some() {
            return false;
        }
        self.entries.push((category, color));
        true
    }

    #[must_use]
    pub fn get(&self, category: &str) -> Option<Rgb> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, color)| *color)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Rgb)> {
        self.entries.iter().map(|(name, color)| (name.as_str(), *color))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
