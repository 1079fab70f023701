//! Spatial predicates.
//!
//! A [`GeometryTest`] pairs a [`SpatialOperation`] with the query geometry and
//! evaluates `candidate OP query` against stored geometries.

use crate::context::SpatialContext;
use crate::error::{Result, SpatialError};
use crate::shape::{Rectangle, Shape};
use geo::{Contains, Intersects, Within};
use geo_types::Geometry;
use std::fmt;
use std::str::FromStr;

/// Supported spatial predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpatialOperation {
    Intersects,
    IsWithin,
    Contains,
    IsDisjointTo,
    IsEqualTo,
    BBoxIntersects,
    BBoxWithin,
}

impl SpatialOperation {
    pub const ALL: [SpatialOperation; 7] = [
        SpatialOperation::Intersects,
        SpatialOperation::IsWithin,
        SpatialOperation::Contains,
        SpatialOperation::IsDisjointTo,
        SpatialOperation::IsEqualTo,
        SpatialOperation::BBoxIntersects,
        SpatialOperation::BBoxWithin,
    ];

    /// Canonical name.
    pub fn name(&self) -> &'static str {
        self.aliases()[0]
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            SpatialOperation::Intersects => &["Intersects"],
            SpatialOperation::IsWithin => &["IsWithin", "Within"],
            SpatialOperation::Contains => &["Contains"],
            SpatialOperation::IsDisjointTo => &["IsDisjointTo", "Disjoint"],
            SpatialOperation::IsEqualTo => &["IsEqualTo", "Equals"],
            SpatialOperation::BBoxIntersects => &["BBoxIntersects"],
            SpatialOperation::BBoxWithin => &["BBoxWithin"],
        }
    }
}

impl FromStr for SpatialOperation {
    type Err = SpatialError;

    /// Case-insensitive lookup; unknown names are configuration errors.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.aliases().iter().any(|a| a.eq_ignore_ascii_case(s)))
            .ok_or_else(|| SpatialError::config(format!("unsupported spatial operation: {}", s)))
    }
}

impl fmt::Display for SpatialOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operation plus query shape.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialArgs {
    pub operation: SpatialOperation,
    pub shape: Shape,
}

impl SpatialArgs {
    pub fn new(operation: SpatialOperation, shape: Shape) -> Self {
        Self { operation, shape }
    }

    /// Parse `Operation(shape literal)`, reading the shape with `ctx`.
    pub fn parse(ctx: &SpatialContext, s: &str) -> Result<Self> {
        let s = s.trim();
        let (op, rest) = s
            .split_once('(')
            .ok_or_else(|| SpatialError::shape_parse(format!("expected Operation(shape): {}", s)))?;
        let body = rest
            .strip_suffix(')')
            .ok_or_else(|| SpatialError::shape_parse(format!("missing closing paren: {}", s)))?;

        let operation = op.parse()?;
        let shape = ctx.read_shape(body)?;
        Ok(Self { operation, shape })
    }
}

/// Relation test against a fixed query geometry.
#[derive(Debug, Clone)]
pub struct GeometryTest {
    operation: SpatialOperation,
    query: Geometry<f64>,
    query_bbox: Option<Rectangle>,
}

impl GeometryTest {
    pub fn new(operation: SpatialOperation, query: Geometry<f64>) -> Self {
        let query_bbox = Rectangle::from_geometry(&query);
        Self {
            operation,
            query,
            query_bbox,
        }
    }

    pub fn operation(&self) -> SpatialOperation {
        self.operation
    }

    pub fn query(&self) -> &Geometry<f64> {
        &self.query
    }

    /// Evaluate `candidate OP query`.
    pub fn matches(&self, candidate: &Geometry<f64>) -> bool {
        let q = &self.query;
        match self.operation {
            SpatialOperation::Intersects => candidate.intersects(q),
            SpatialOperation::IsDisjointTo => !candidate.intersects(q),
            SpatialOperation::IsWithin => candidate.is_within(q),
            SpatialOperation::Contains => candidate.contains(q),
            SpatialOperation::IsEqualTo => candidate.is_within(q) && q.is_within(candidate),
            SpatialOperation::BBoxIntersects => self.bbox_test(candidate, |c, q| c.intersects(q)),
            SpatialOperation::BBoxWithin => self.bbox_test(candidate, |c, q| q.contains(c)),
        }
    }

    fn bbox_test(
        &self,
        candidate: &Geometry<f64>,
        test: impl Fn(&Rectangle, &Rectangle) -> bool,
    ) -> bool {
        match (Rectangle::from_geometry(candidate), &self.query_bbox) {
            (Some(c), Some(q)) => test(&c, q),
            _ => false,
        }
    }
}
