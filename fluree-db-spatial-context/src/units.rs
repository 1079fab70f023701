//! Distance units and their reference-sphere radii.

use crate::error::{Result, SpatialError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean earth radius in kilometers.
pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0087714;

/// Kilometer to statute mile conversion factor.
pub const KM_TO_MILES: f64 = 0.621371192;

/// Mean earth radius in statute miles.
pub const EARTH_MEAN_RADIUS_MI: f64 = EARTH_MEAN_RADIUS_KM * KM_TO_MILES;

/// Unit in which a spatial context expresses distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DistanceUnits {
    #[default]
    Kilometers,
    Miles,
    /// Distances measured as angles on the unit sphere.
    Radians,
    /// Flat coordinate space; no reference sphere.
    Cartesian,
}

impl DistanceUnits {
    /// All known units, in lookup order.
    pub const ALL: [DistanceUnits; 4] = [
        DistanceUnits::Kilometers,
        DistanceUnits::Miles,
        DistanceUnits::Radians,
        DistanceUnits::Cartesian,
    ];

    /// Look up a unit by name or abbreviation (case-insensitive).
    pub fn find(name: &str) -> Result<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|u| u.aliases().iter().any(|a| a.eq_ignore_ascii_case(name)))
            .ok_or_else(|| SpatialError::config(format!("unknown distance units: {}", name)))
    }

    /// Short name used when displaying the unit.
    pub fn abbreviation(&self) -> &'static str {
        self.aliases()[0]
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            DistanceUnits::Kilometers => &["km", "kilometers", "kilometres"],
            DistanceUnits::Miles => &["mi", "miles"],
            DistanceUnits::Radians => &["radians"],
            DistanceUnits::Cartesian => &["u", "cartesian"],
        }
    }

    /// Radius of the reference sphere in this unit, `None` for flat space.
    pub fn earth_radius(&self) -> Option<f64> {
        match self {
            DistanceUnits::Kilometers => Some(EARTH_MEAN_RADIUS_KM),
            DistanceUnits::Miles => Some(EARTH_MEAN_RADIUS_MI),
            DistanceUnits::Radians => Some(1.0),
            DistanceUnits::Cartesian => None,
        }
    }

    /// Radius handed to sphere calculators: the earth radius, or the unit
    /// sphere for flat space (distances then come out in radians).
    pub fn sphere_radius(&self) -> f64 {
        self.earth_radius().unwrap_or(1.0)
    }

    /// True when coordinates are longitude/latitude degrees on a sphere.
    pub fn is_geo(&self) -> bool {
        self.earth_radius().is_some()
    }
}

impl fmt::Display for DistanceUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}
