//! Well-known binary (WKB) encoding for 2D geometries.
//!
//! Writing and reading go through the `wkb` crate. Geometries are written
//! little-endian; either byte order is read back.
//!
//! `Line`, `Rect` and `Triangle` have no WKB type of their own and are
//! written as LineString / Polygon.

use crate::error::{Result, SpatialError};
use geo_traits::to_geo::ToGeoGeometry;
use geo_types::{Geometry, GeometryCollection, LineString};
use std::borrow::Cow;
use wkb::writer::{write_geometry, WriteOptions};
use wkb::Endianness;

/// Serialize a geometry to little-endian WKB.
pub fn write_wkb(geom: &Geometry<f64>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let options = WriteOptions {
        endianness: Endianness::LittleEndian,
    };
    write_geometry(&mut buf, standard_types(geom).as_ref(), &options)
        .map_err(|e| SpatialError::format(format!("failed to write WKB: {}", e)))?;
    Ok(buf)
}

/// Deserialize a WKB geometry.
pub fn read_wkb(bytes: &[u8]) -> Result<Geometry<f64>> {
    let wkb = wkb::reader::read_wkb(bytes)
        .map_err(|e| SpatialError::format(format!("invalid WKB: {}", e)))?;
    wkb.try_to_geometry()
        .ok_or_else(|| SpatialError::format("empty point not supported"))
}

/// Rewrite geo-types-only variants as OGC simple-feature types.
fn standard_types(geom: &Geometry<f64>) -> Cow<'_, Geometry<f64>> {
    match geom {
        Geometry::Line(line) => Cow::Owned(Geometry::LineString(LineString::from(vec![
            line.start, line.end,
        ]))),
        Geometry::Rect(rect) => Cow::Owned(Geometry::Polygon(rect.to_polygon())),
        Geometry::Triangle(tri) => Cow::Owned(Geometry::Polygon(tri.to_polygon())),
        Geometry::GeometryCollection(gc) => Cow::Owned(Geometry::GeometryCollection(
            GeometryCollection::from(
                gc.0.iter()
                    .map(|g| standard_types(g).into_owned())
                    .collect::<Vec<_>>(),
            ),
        )),
        _ => Cow::Borrowed(geom),
    }
}
