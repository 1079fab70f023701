//! Geometry engine seam.
//!
//! The encoder only needs three things from a geometry library: a binary
//! serialization, a topology-preserving simplification at a numeric
//! tolerance, and a bounding box. [`GeometryEngine`] names that contract;
//! [`WkbGeometryEngine`] implements it with the `geo` crate and WKB.

use crate::error::Result;
use crate::shape::Rectangle;
use crate::codec::{read_wkb, write_wkb};
use geo::SimplifyVwPreserve;
use geo_types::{Geometry, GeometryCollection};

/// Geometry operations the encoder and filters rely on.
pub trait GeometryEngine {
    /// Serialize a geometry.
    fn encode(&self, geom: &Geometry<f64>) -> Result<Vec<u8>>;

    /// Deserialize bytes produced by [`encode`](GeometryEngine::encode).
    fn decode(&self, bytes: &[u8]) -> Result<Geometry<f64>>;

    /// Topology-preserving simplification. A tolerance of zero (or less)
    /// returns the geometry unchanged.
    fn simplify(&self, geom: &Geometry<f64>, tolerance: f64) -> Geometry<f64>;

    /// Bounding box, `None` for empty geometries.
    fn envelope(&self, geom: &Geometry<f64>) -> Option<Rectangle> {
        Rectangle::from_geometry(geom)
    }
}

/// WKB encoding with Visvalingam-Whyatt topology-preserving simplification.
///
/// VW thresholds on triangle area, so a distance tolerance `t` is applied as
/// an area threshold of `t²`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WkbGeometryEngine;

impl GeometryEngine for WkbGeometryEngine {
    fn encode(&self, geom: &Geometry<f64>) -> Result<Vec<u8>> {
        write_wkb(geom)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Geometry<f64>> {
        read_wkb(bytes)
    }

    fn simplify(&self, geom: &Geometry<f64>, tolerance: f64) -> Geometry<f64> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return geom.clone();
        }
        simplify_preserving(geom, &(tolerance * tolerance))
    }
}

fn simplify_preserving(geom: &Geometry<f64>, area: &f64) -> Geometry<f64> {
    match geom {
        Geometry::LineString(ls) => Geometry::LineString(ls.simplify_vw_preserve(area)),
        Geometry::MultiLineString(mls) => {
            Geometry::MultiLineString(mls.simplify_vw_preserve(area))
        }
        Geometry::Polygon(poly) => Geometry::Polygon(poly.simplify_vw_preserve(area)),
        Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(mp.simplify_vw_preserve(area)),
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection(
            gc.0.iter().map(|g| simplify_preserving(g, area)).collect(),
        )),
        // nothing to drop
        Geometry::Point(_)
        | Geometry::MultiPoint(_)
        | Geometry::Line(_)
        | Geometry::Rect(_)
        | Geometry::Triangle(_) => geom.clone(),
    }
}
