//! Immutable spatial context.
//!
//! A [`SpatialContext`] bundles the distance units, the (optional) distance
//! calculator and the (optional) world bounds. It is created once by a
//! [`SpatialContextFactory`](crate::factory::SpatialContextFactory) and then
//! shared read-only; it never retains the shapes it parses or converts.
//!
//! # Two-phase construction
//!
//! World bounds are configured as a shape literal, and parsing a literal
//! needs a context. Construction therefore goes through a provisional
//! context built by [`SpatialContext::bootstrap`] (units + calculator, no
//! bounds), which parses the bounds and is then dropped; the final context
//! is built with [`SpatialContext::new`].

use crate::distance::DistanceCalculator;
use crate::error::{Result, SpatialError};
use crate::shape::{parse_shape, Circle, Rectangle, Shape};
use crate::units::DistanceUnits;
use geo_types::{Coord, Geometry, LineString, Point, Polygon};

/// Number of segments used to approximate a circle as a polygon.
pub const CIRCLE_SEGMENTS: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct SpatialContext {
    units: DistanceUnits,
    calculator: Option<DistanceCalculator>,
    world_bounds: Option<Rectangle>,
}

impl SpatialContext {
    /// Create a context.
    ///
    /// World bounds must be a well-formed rectangle (non-negative width and
    /// height, finite extents).
    pub fn new(
        units: DistanceUnits,
        calculator: Option<DistanceCalculator>,
        world_bounds: Option<Rectangle>,
    ) -> Result<Self> {
        if let Some(b) = &world_bounds {
            // re-validate: fields are public
            Rectangle::new(b.min_x, b.max_x, b.min_y, b.max_y)
                .map_err(|e| SpatialError::config(format!("invalid world bounds: {}", e)))?;
        }
        Ok(Self {
            units,
            calculator,
            world_bounds,
        })
    }

    /// Provisional context without world bounds, used to parse the bounds
    /// literal during factory resolution.
    pub fn bootstrap(units: DistanceUnits, calculator: Option<DistanceCalculator>) -> Self {
        Self {
            units,
            calculator,
            world_bounds: None,
        }
    }

    pub fn units(&self) -> DistanceUnits {
        self.units
    }

    /// The calculator exactly as configured; `None` if none was resolved.
    pub fn calculator(&self) -> Option<DistanceCalculator> {
        self.calculator
    }

    /// The calculator to use for distance computations: the configured one,
    /// else haversine for geodetic units and plain cartesian otherwise.
    pub fn distance_calculator(&self) -> DistanceCalculator {
        self.calculator
            .unwrap_or_else(|| DistanceCalculator::default_for(self.units))
    }

    pub fn world_bounds(&self) -> Option<&Rectangle> {
        self.world_bounds.as_ref()
    }

    /// True when coordinates are longitude/latitude degrees.
    pub fn is_geo(&self) -> bool {
        self.units.is_geo()
    }

    /// Distance between two points in this context's units.
    pub fn distance(&self, from: Point<f64>, to: Point<f64>) -> f64 {
        self.distance_calculator().distance(from, to)
    }

    /// Parse a shape literal.
    ///
    /// Fails with [`SpatialError::ShapeParse`] on malformed input or when the
    /// shape extends past the world bounds.
    pub fn read_shape(&self, literal: &str) -> Result<Shape> {
        let shape = parse_shape(literal)?;
        if let Some(bounds) = &self.world_bounds {
            if let Some(env) = self.envelope(&shape) {
                if !bounds.contains(&env) {
                    return Err(SpatialError::shape_parse(format!(
                        "shape outside world bounds: {}",
                        literal.trim()
                    )));
                }
            }
        }
        Ok(shape)
    }

    /// Bounding rectangle of a shape in coordinate units.
    pub fn envelope(&self, shape: &Shape) -> Option<Rectangle> {
        match shape {
            Shape::Point(p) => Some(Rectangle {
                min_x: p.x(),
                max_x: p.x(),
                min_y: p.y(),
                max_y: p.y(),
            }),
            Shape::Rectangle(r) => Some(*r),
            Shape::Circle(c) => {
                let r = self.radius_in_coordinates(c);
                Some(Rectangle {
                    min_x: c.center.x() - r,
                    max_x: c.center.x() + r,
                    min_y: c.center.y() - r,
                    max_y: c.center.y() + r,
                })
            }
            Shape::Geometry(g) => Rectangle::from_geometry(g),
        }
    }

    /// Convert a shape to a geometry suitable for encoding and relation tests.
    pub fn geometry_from(&self, shape: &Shape) -> Result<Geometry<f64>> {
        match shape {
            Shape::Point(p) => Ok(Geometry::Point(*p)),
            Shape::Rectangle(r) => Ok(Geometry::Polygon(r.to_polygon())),
            Shape::Circle(c) => self.circle_polygon(c).map(Geometry::Polygon),
            Shape::Geometry(g) => Ok(g.clone()),
        }
    }

    /// Circle radius converted from distance units to coordinate units.
    fn radius_in_coordinates(&self, circle: &Circle) -> f64 {
        match self.units.earth_radius() {
            Some(earth) => (circle.radius / earth).to_degrees(),
            None => circle.radius,
        }
    }

    fn circle_polygon(&self, circle: &Circle) -> Result<Polygon<f64>> {
        let r = self.radius_in_coordinates(circle);
        if !r.is_finite() {
            return Err(SpatialError::InvalidGeometry(format!(
                "circle radius {} not representable",
                circle.radius
            )));
        }
        let (cx, cy) = (circle.center.x(), circle.center.y());
        let step = std::f64::consts::TAU / CIRCLE_SEGMENTS as f64;
        let ring: Vec<Coord<f64>> = (0..CIRCLE_SEGMENTS)
            .map(|i| {
                let (sin, cos) = (i as f64 * step).sin_cos();
                Coord {
                    x: cx + r * cos,
                    y: cy + r * sin,
                }
            })
            .collect();
        // Polygon::new closes the ring
        Ok(Polygon::new(LineString::from(ring), vec![]))
    }
}
