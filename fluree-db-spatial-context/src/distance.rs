//! Distance calculators and the name → calculator registry.
//!
//! Sphere-based calculators interpret point coordinates as longitude (x) and
//! latitude (y) in degrees and return distances in the units of the radius
//! they were built with. Cartesian calculators work on raw coordinates.

use crate::error::{Result, SpatialError};
use crate::units::DistanceUnits;
use geo_types::Point;
use serde::{Deserialize, Serialize};

/// Strategy for computing the distance between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DistanceCalculator {
    /// Great-circle distance via the haversine formula.
    Haversine { radius: f64 },
    /// Great-circle distance via the spherical law of cosines.
    LawOfCosines { radius: f64 },
    /// Great-circle distance via the Vincenty formula on a sphere.
    VincentySphere { radius: f64 },
    /// Euclidean distance; `squared` skips the final square root.
    Cartesian { squared: bool },
}

/// Calculator names accepted by [`resolve`], in canonical spelling.
pub const CALCULATOR_NAMES: [&str; 5] = [
    "haversine",
    "lawOfCosines",
    "vincentySphere",
    "cartesian",
    "cartesian^2",
];

/// Resolve a calculator by name (case-insensitive) for the given units.
///
/// `None` yields `Ok(None)`: the context picks a default when a distance is
/// first computed. Sphere calculators take their radius from
/// [`DistanceUnits::sphere_radius`], so every name resolves for every unit.
pub fn resolve(name: Option<&str>, units: DistanceUnits) -> Result<Option<DistanceCalculator>> {
    let Some(name) = name else {
        return Ok(None);
    };

    let radius = units.sphere_radius();

    let calc = if name.eq_ignore_ascii_case("haversine") {
        DistanceCalculator::Haversine {
            radius,
        }
    } else if name.eq_ignore_ascii_case("lawOfCosines") {
        DistanceCalculator::LawOfCosines {
            radius,
        }
    } else if name.eq_ignore_ascii_case("vincentySphere") {
        DistanceCalculator::VincentySphere {
            radius,
        }
    } else if name.eq_ignore_ascii_case("cartesian") {
        DistanceCalculator::Cartesian { squared: false }
    } else if name.eq_ignore_ascii_case("cartesian^2") {
        DistanceCalculator::Cartesian { squared: true }
    } else {
        return Err(SpatialError::config(format!(
            "unknown distance calculator: {}",
            name
        )));
    };

    Ok(Some(calc))
}

impl DistanceCalculator {
    /// Default calculator for a context that did not configure one.
    pub fn default_for(units: DistanceUnits) -> Self {
        match units.earth_radius() {
            Some(radius) => DistanceCalculator::Haversine { radius },
            None => DistanceCalculator::Cartesian { squared: false },
        }
    }

    /// Radius of the reference sphere, `None` for Cartesian variants.
    pub fn earth_radius(&self) -> Option<f64> {
        match *self {
            DistanceCalculator::Haversine { radius }
            | DistanceCalculator::LawOfCosines { radius }
            | DistanceCalculator::VincentySphere { radius } => Some(radius),
            DistanceCalculator::Cartesian { .. } => None,
        }
    }

    /// True for the squared-distance Cartesian variant.
    pub fn is_squared(&self) -> bool {
        matches!(self, DistanceCalculator::Cartesian { squared: true })
    }

    /// Distance between two points.
    pub fn distance(&self, from: Point<f64>, to: Point<f64>) -> f64 {
        match *self {
            DistanceCalculator::Haversine { radius } => radius * haversine_rad(from, to),
            DistanceCalculator::LawOfCosines { radius } => radius * law_of_cosines_rad(from, to),
            DistanceCalculator::VincentySphere { radius } => radius * vincenty_rad(from, to),
            DistanceCalculator::Cartesian { squared } => {
                let dx = from.x() - to.x();
                let dy = from.y() - to.y();
                let d2 = dx * dx + dy * dy;
                if squared {
                    d2
                } else {
                    d2.sqrt()
                }
            }
        }
    }
}

/// Central angle between two lon/lat points, haversine formula.
fn haversine_rad(from: Point<f64>, to: Point<f64>) -> f64 {
    let lat1 = from.y().to_radians();
    let lat2 = to.y().to_radians();
    let delta_lat = (to.y() - from.y()).to_radians();
    let delta_lng = (to.x() - from.x()).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

fn law_of_cosines_rad(from: Point<f64>, to: Point<f64>) -> f64 {
    let lat1 = from.y().to_radians();
    let lat2 = to.y().to_radians();
    let delta_lng = (to.x() - from.x()).to_radians();

    let cos_c = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * delta_lng.cos();
    // rounding can push identical points slightly past 1
    cos_c.clamp(-1.0, 1.0).acos()
}

fn vincenty_rad(from: Point<f64>, to: Point<f64>) -> f64 {
    let lat1 = from.y().to_radians();
    let lat2 = to.y().to_radians();
    let delta_lng = (to.x() - from.x()).to_radians();

    let (sin_lat1, cos_lat1) = lat1.sin_cos();
    let (sin_lat2, cos_lat2) = lat2.sin_cos();
    let (sin_dl, cos_dl) = delta_lng.sin_cos();

    let a = cos_lat2 * sin_dl;
    let b = cos_lat1 * sin_lat2 - sin_lat1 * cos_lat2 * cos_dl;
    let c = sin_lat1 * sin_lat2 + cos_lat1 * cos_lat2 * cos_dl;
    (a * a + b * b).sqrt().atan2(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{EARTH_MEAN_RADIUS_KM, EARTH_MEAN_RADIUS_MI};

    fn paris() -> Point<f64> {
        Point::new(2.3522, 48.8566)
    }

    fn london() -> Point<f64> {
        Point::new(-0.1278, 51.5074)
    }

    #[test]
    fn test_resolve_all_names_case_insensitive() {
        for units in DistanceUnits::ALL {
            for name in CALCULATOR_NAMES {
                for spelled in [name.to_string(), name.to_uppercase(), name.to_lowercase()] {
                    let calc = resolve(Some(spelled.as_str()), units).unwrap().unwrap();
                    match calc.earth_radius() {
                        Some(r) => assert_eq!(r, units.sphere_radius()),
                        None => assert!(name.starts_with("cartesian")),
                    }
                }
            }
        }
    }

    #[test]
    fn test_resolve_none_is_unresolved() {
        assert_eq!(resolve(None, DistanceUnits::Miles).unwrap(), None);
    }

    #[test]
    fn test_resolve_unknown_name() {
        let err = resolve(Some("manhattan"), DistanceUnits::Kilometers).unwrap_err();
        assert!(matches!(err, SpatialError::Config(_)));
    }

    #[test]
    fn test_sphere_calculator_on_cartesian_units() {
        let calc = resolve(Some("haversine"), DistanceUnits::Cartesian)
            .unwrap()
            .unwrap();
        assert_eq!(calc, DistanceCalculator::Haversine { radius: 1.0 });
        // unit sphere: a quarter of the equator is pi/2
        let d = calc.distance(Point::new(0.0, 0.0), Point::new(90.0, 0.0));
        assert!((d - std::f64::consts::FRAC_PI_2).abs() < 1e-12);

        assert!(resolve(Some("cartesian"), DistanceUnits::Cartesian)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_sphere_formulas_agree() {
        let radius = EARTH_MEAN_RADIUS_KM;
        let h = DistanceCalculator::Haversine { radius }.distance(paris(), london());
        let l = DistanceCalculator::LawOfCosines { radius }.distance(paris(), london());
        let v = DistanceCalculator::VincentySphere { radius }.distance(paris(), london());

        assert!((h - 343.5).abs() < 5.0, "Expected ~343 km, got {}", h);
        assert!((h - l).abs() < 1e-6, "haversine {} vs law of cosines {}", h, l);
        assert!((h - v).abs() < 1e-6, "haversine {} vs vincenty {}", h, v);
    }

    #[test]
    fn test_miles_radius_scales_distance() {
        let km = DistanceCalculator::Haversine {
            radius: EARTH_MEAN_RADIUS_KM,
        }
        .distance(paris(), london());
        let mi = DistanceCalculator::Haversine {
            radius: EARTH_MEAN_RADIUS_MI,
        }
        .distance(paris(), london());
        assert!((mi - km * crate::units::KM_TO_MILES).abs() < 1e-9);
    }

    #[test]
    fn test_cartesian_squared_is_square() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(4.0, 6.0);
        let plain = resolve(Some("cartesian"), DistanceUnits::Kilometers)
            .unwrap()
            .unwrap();
        let squared = resolve(Some("CARTESIAN^2"), DistanceUnits::Kilometers)
            .unwrap()
            .unwrap();

        assert_eq!(plain.distance(a, b), 5.0);
        assert_eq!(squared.distance(a, b), 25.0);
        assert!(squared.is_squared());
        assert!(!plain.is_squared());
    }

    #[test]
    fn test_zero_distance() {
        let calc = DistanceCalculator::Haversine { radius: 1.0 };
        assert_eq!(calc.distance(paris(), paris()), 0.0);
        let calc = DistanceCalculator::LawOfCosines { radius: 1.0 };
        assert!(calc.distance(paris(), paris()) < 1e-6);
    }

    #[test]
    fn test_default_for_units() {
        assert_eq!(
            DistanceCalculator::default_for(DistanceUnits::Miles),
            DistanceCalculator::Haversine {
                radius: EARTH_MEAN_RADIUS_MI
            }
        );
        assert_eq!(
            DistanceCalculator::default_for(DistanceUnits::Cartesian),
            DistanceCalculator::Cartesian { squared: false }
        );
    }
}
