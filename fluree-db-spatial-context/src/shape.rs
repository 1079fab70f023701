//! Shapes and the shape-literal parser.
//!
//! Accepted literals:
//!
//! ```text
//! x y                              point
//! minX minY maxX maxY              rectangle
//! ENVELOPE(minX, maxX, maxY, minY) rectangle
//! Circle(x y d=radius)             circle (comma after x optional)
//! POLYGON((...)) etc.              any WKT; POINT becomes a point shape
//! ```
//!
//! Parsing is context-free; [`SpatialContext::read_shape`] adds the
//! world-bounds check.
//!
//! [`SpatialContext::read_shape`]: crate::context::SpatialContext::read_shape

use crate::error::{Result, SpatialError};
use geo_types::{coord, Geometry, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Axis-aligned rectangle in context coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Rectangle {
    /// Create a rectangle, rejecting inverted or non-finite extents.
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Result<Self> {
        let finite = [min_x, max_x, min_y, max_y].iter().all(|v| v.is_finite());
        if !finite || min_x > max_x || min_y > max_y {
            return Err(SpatialError::shape_parse(format!(
                "invalid rectangle: x=[{}, {}] y=[{}, {}]",
                min_x, max_x, min_y, max_y
            )));
        }
        Ok(Self {
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }

    /// Bounding rectangle of a geometry, `None` for empty geometries.
    pub fn from_geometry(geom: &Geometry<f64>) -> Option<Self> {
        use geo::BoundingRect;
        let rect = geom.bounding_rect()?;
        Some(Self {
            min_x: rect.min().x,
            max_x: rect.max().x,
            min_y: rect.min().y,
            max_y: rect.max().y,
        })
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if this rectangle intersects another (edges count).
    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Check if this rectangle fully contains another.
    pub fn contains(&self, other: &Rectangle) -> bool {
        self.min_x <= other.min_x
            && self.max_x >= other.max_x
            && self.min_y <= other.min_y
            && self.max_y >= other.max_y
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Rect::new(
            coord! { x: self.min_x, y: self.min_y },
            coord! { x: self.max_x, y: self.max_y },
        )
        .to_polygon()
    }
}

/// Circle around a center point. The radius is in the owning context's
/// distance units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point<f64>,
    pub radius: f64,
}

/// A shape as understood by a spatial context.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point(Point<f64>),
    Rectangle(Rectangle),
    Circle(Circle),
    /// Arbitrary geometry read from WKT.
    Geometry(Geometry<f64>),
}

impl Shape {
    pub fn as_rectangle(&self) -> Option<&Rectangle> {
        match self {
            Shape::Rectangle(r) => Some(r),
            _ => None,
        }
    }

    /// Short type name, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Point(_) => "point",
            Shape::Rectangle(_) => "rectangle",
            Shape::Circle(_) => "circle",
            Shape::Geometry(_) => "geometry",
        }
    }
}

/// Parse a shape literal without any context checks.
pub fn parse_shape(literal: &str) -> Result<Shape> {
    let s = literal.trim();
    if s.is_empty() {
        return Err(SpatialError::shape_parse("empty shape literal"));
    }

    if let Some(body) = strip_call(s, "ENVELOPE") {
        let v = parse_numbers(body, literal)?;
        if v.len() != 4 {
            return Err(SpatialError::shape_parse(format!(
                "ENVELOPE expects 4 numbers: {}",
                literal
            )));
        }
        return Rectangle::new(v[0], v[1], v[3], v[2]).map(Shape::Rectangle);
    }

    if let Some(body) = strip_call(s, "CIRCLE") {
        return parse_circle(body, literal);
    }

    if s.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return match parse_wkt(s)? {
            Geometry::Point(p) => Ok(Shape::Point(p)),
            other => Ok(Shape::Geometry(other)),
        };
    }

    let v = parse_numbers(s, literal)?;
    match v.as_slice() {
        [x, y] => finite_point(*x, *y, literal).map(Shape::Point),
        [min_x, min_y, max_x, max_y] => {
            Rectangle::new(*min_x, *max_x, *min_y, *max_y).map(Shape::Rectangle)
        }
        _ => Err(SpatialError::shape_parse(format!(
            "expected 2 or 4 numbers: {}",
            literal
        ))),
    }
}

/// Parse WKT string to geo-types Geometry.
pub fn parse_wkt(wkt: &str) -> Result<Geometry<f64>> {
    wkt::Wkt::from_str(wkt)
        .map_err(|e| SpatialError::shape_parse(format!("{:?}", e)))
        .and_then(|w| {
            w.try_into()
                .map_err(|e: wkt::conversion::Error| SpatialError::shape_parse(format!("{:?}", e)))
        })
}

/// `NAME( body )` → `body`, name matched case-insensitively.
fn strip_call<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    let head = s.get(..name.len())?;
    if !head.eq_ignore_ascii_case(name) {
        return None;
    }
    let rest = s[name.len()..].trim_start();
    rest.strip_prefix('(')?.strip_suffix(')')
}

fn parse_circle(body: &str, literal: &str) -> Result<Shape> {
    let (center, radius) = body
        .split_once("d=")
        .ok_or_else(|| SpatialError::shape_parse(format!("circle missing d=: {}", literal)))?;

    let c = parse_numbers(center, literal)?;
    let [x, y] = c.as_slice() else {
        return Err(SpatialError::shape_parse(format!(
            "circle center expects 2 numbers: {}",
            literal
        )));
    };
    let radius: f64 = radius
        .trim()
        .parse()
        .map_err(|_| SpatialError::shape_parse(format!("bad circle radius: {}", literal)))?;
    if !radius.is_finite() || radius < 0.0 {
        return Err(SpatialError::shape_parse(format!(
            "circle radius must be a non-negative number: {}",
            literal
        )));
    }

    Ok(Shape::Circle(Circle {
        center: finite_point(*x, *y, literal)?,
        radius,
    }))
}

fn finite_point(x: f64, y: f64, literal: &str) -> Result<Point<f64>> {
    if !x.is_finite() || !y.is_finite() {
        return Err(SpatialError::shape_parse(format!(
            "non-finite coordinate in {:?}",
            literal
        )));
    }
    Ok(Point::new(x, y))
}

/// Whitespace/comma separated numbers.
fn parse_numbers(s: &str, literal: &str) -> Result<Vec<f64>> {
    s.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<f64>().map_err(|_| {
                SpatialError::shape_parse(format!("bad number {:?} in {:?}", t, literal))
            })
        })
        .collect()
}
