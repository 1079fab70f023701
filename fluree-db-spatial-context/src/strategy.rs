//! Geometry field strategy: stores raw WKB per field and answers spatial
//! filters by decoding it.
//!
//! # Write path
//!
//! ```text
//! Shape ──(context)──► Geometry ──(GeometryEncoder)──► EncodedField
//! ```
//!
//! # Read path
//!
//! ```text
//! SpatialArgs ──► GeometryTest ──► GeometryFilter ──► ConstantScoreQuery
//! ```
//!
//! Spatial proximity is not turned into a score: queries are constant-score
//! and [`GeoStrategy::make_value_source`] always fails.

use crate::config::GeoStrategyConfig;
use crate::context::SpatialContext;
use crate::encoder::{EncodeStats, GeometryEncoder};
use crate::engine::{GeometryEngine, WkbGeometryEngine};
use crate::error::{Result, SpatialError};
use crate::operation::{GeometryTest, SpatialArgs};
use crate::shape::Shape;
use geo_types::Geometry;
use std::sync::Arc;

/// Encoded geometry bound to a field, handed to the index as a
/// variable-length binary value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedField {
    pub name: Arc<str>,
    pub bytes: Vec<u8>,
}

/// Per-document scoring function derived from a field.
pub trait ValueSource: std::fmt::Debug {
    fn value(&self, field: &EncodedField) -> Result<f64>;
}

/// Strategy for indexing and querying a geometry field.
#[derive(Debug, Clone)]
pub struct GeoStrategy<E = WkbGeometryEngine> {
    ctx: Arc<SpatialContext>,
    encoder: Arc<GeometryEncoder<E>>,
}

impl GeoStrategy<WkbGeometryEngine> {
    /// Strategy with the default 32000 byte budget.
    pub fn new(ctx: Arc<SpatialContext>) -> Self {
        Self::with_config(ctx, &GeoStrategyConfig::default())
    }

    pub fn with_config(ctx: Arc<SpatialContext>, config: &GeoStrategyConfig) -> Self {
        Self::with_encoder(ctx, GeometryEncoder::from_config(config))
    }
}

impl<E: GeometryEngine> GeoStrategy<E> {
    pub fn with_encoder(ctx: Arc<SpatialContext>, encoder: GeometryEncoder<E>) -> Self {
        Self {
            ctx,
            encoder: Arc::new(encoder),
        }
    }

    pub fn context(&self) -> &SpatialContext {
        &self.ctx
    }

    pub fn max_encoded_len(&self) -> i64 {
        self.encoder.max_len()
    }

    /// Encode `shape` for `field_name`, simplifying to fit the budget.
    pub fn create_field(&self, field_name: &str, shape: &Shape) -> Result<EncodedField> {
        self.create_field_with_stats(field_name, shape)
            .map(|(field, _)| field)
    }

    pub fn create_field_with_stats(
        &self,
        field_name: &str,
        shape: &Shape,
    ) -> Result<(EncodedField, EncodeStats)> {
        let geom = self.ctx.geometry_from(shape)?;
        let (bytes, stats) = self.encoder.encode_with_stats(&geom)?;
        if stats.rounds > 0 {
            tracing::debug!(
                field = field_name,
                initial_len = stats.initial_len,
                final_len = stats.final_len,
                rounds = stats.rounds,
                "Stored simplified geometry"
            );
        }
        Ok((
            EncodedField {
                name: Arc::from(field_name),
                bytes,
            },
            stats,
        ))
    }

    /// Boolean filter for `args` over `field_name`.
    pub fn make_filter(&self, args: &SpatialArgs, field_name: &str) -> Result<GeometryFilter<E>> {
        let geom = self.ctx.geometry_from(&args.shape)?;
        Ok(GeometryFilter {
            field: Arc::from(field_name),
            test: GeometryTest::new(args.operation, geom),
            encoder: Arc::clone(&self.encoder),
        })
    }

    /// Constant-score query wrapping [`make_filter`](Self::make_filter).
    pub fn make_query(
        &self,
        args: &SpatialArgs,
        field_name: &str,
    ) -> Result<ConstantScoreQuery<E>> {
        Ok(ConstantScoreQuery::new(self.make_filter(args, field_name)?))
    }

    /// Not supported: no score is derived from spatial proximity.
    pub fn make_value_source(
        &self,
        args: &SpatialArgs,
        field_name: &str,
    ) -> Result<Box<dyn ValueSource>> {
        Err(SpatialError::unsupported(format!(
            "value source for {}({}) on field {}",
            args.operation,
            args.shape.kind(),
            field_name
        )))
    }
}

/// Predicate over stored geometry fields.
#[derive(Debug, Clone)]
pub struct GeometryFilter<E = WkbGeometryEngine> {
    field: Arc<str>,
    test: GeometryTest,
    encoder: Arc<GeometryEncoder<E>>,
}

impl<E: GeometryEngine> GeometryFilter<E> {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn test(&self) -> &GeometryTest {
        &self.test
    }

    /// Evaluate against a stored field. Fields of another name never match.
    pub fn matches(&self, field: &EncodedField) -> Result<bool> {
        if field.name != self.field {
            return Ok(false);
        }
        let geom = self.encoder.engine().decode(&field.bytes)?;
        Ok(self.test.matches(&geom))
    }

    pub fn matches_geometry(&self, geom: &Geometry<f64>) -> bool {
        self.test.matches(geom)
    }
}

/// Non-ranking query: every match scores the same boost.
#[derive(Debug, Clone)]
pub struct ConstantScoreQuery<E = WkbGeometryEngine> {
    filter: GeometryFilter<E>,
    boost: f32,
}

impl<E: GeometryEngine> ConstantScoreQuery<E> {
    pub fn new(filter: GeometryFilter<E>) -> Self {
        Self { filter, boost: 1.0 }
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    pub fn filter(&self) -> &GeometryFilter<E> {
        &self.filter
    }

    /// `Some(boost)` on match, `None` otherwise.
    pub fn score(&self, field: &EncodedField) -> Result<Option<f32>> {
        Ok(self.filter.matches(field)?.then_some(self.boost))
    }
}
