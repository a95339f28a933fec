//! Coordinate reference descriptors and planar extents shared by all crates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate Reference System identified by EPSG code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    pub epsg: u32,
    pub name: String,
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl Crs {
    pub fn new(epsg: u32, name: impl Into<String>) -> Self {
        Self { epsg, name: name.into() }
    }

    /// WGS 84 (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::new(4326, "WGS 84")
    }

    /// Authority string understood by PROJ, e.g. `EPSG:32633`
    pub fn authority(&self) -> String {
        format!("EPSG:{}", self.epsg)
    }
}

/// Hemisphere half of a UTM zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere {
    North,
    South,
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hemisphere::North => write!(f, "north"),
            Hemisphere::South => write!(f, "south"),
        }
    }
}

/// A UTM zone: zone number in `1..=60` plus hemisphere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UtmZone {
    pub zone: u8,
    pub hemisphere: Hemisphere,
}

impl UtmZone {
    pub fn new(zone: u8, hemisphere: Hemisphere) -> Self {
        Self { zone, hemisphere }
    }

    pub fn is_north(&self) -> bool {
        self.hemisphere == Hemisphere::North
    }

    /// Longitude of the zone's central meridian in degrees
    pub fn central_meridian(&self) -> f64 {
        -183.0 + 6.0 * f64::from(self.zone)
    }

    /// WGS 84 / UTM EPSG code (326zz north, 327zz south)
    pub fn epsg(&self) -> u32 {
        let base = if self.is_north() { 32600 } else { 32700 };
        base + u32::from(self.zone)
    }

    pub fn crs(&self) -> Crs {
        Crs::new(self.epsg(), format!("WGS 84 / UTM zone {}", self))
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = if self.is_north() { 'N' } else { 'S' };
        write!(f, "{}{}", self.zone, letter)
    }
}

/// Axis-aligned extent in projected units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// `[min_x, min_y, max_x, max_y]`, the GeoJSON bbox ordering
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}
