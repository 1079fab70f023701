//! Size-bounded geometry encoding.
//!
//! A geometry whose encoding reaches the byte budget is simplified with a
//! progressively coarser tolerance until the encoding fits:
//!
//! ```text
//! tolerance = min(bbox_width, bbox_height) / divisor
//! divisor   = 1000, then × 0.70 each round
//! ```
//!
//! Each round simplifies the original geometry. The loop stops when the
//! encoding is shorter than the budget, when a round yields exactly the same
//! length as the previous one, or after `max_rounds` rounds. The last two
//! fail with [`SpatialError::EncodingTooLarge`].
//!
//! Exact length equality is the only progress test, so slow but nonzero
//! shrinkage keeps the loop going until the round ceiling.

use crate::config::GeoStrategyConfig;
use crate::context::SpatialContext;
use crate::engine::{GeometryEngine, WkbGeometryEngine};
use crate::error::{Result, SpatialError};
use crate::shape::Shape;
use geo_types::Geometry;

/// Divisor used for the first simplification round.
pub const INITIAL_DIVISOR: f64 = 1000.0;

/// Factor applied to the divisor after each round without success.
pub const DIVISOR_FACTOR: f64 = 0.70;

/// Statistics from one encode call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodeStats {
    /// Simplification rounds performed (0 if the geometry fit as-is).
    pub rounds: u32,

    /// Length of the unsimplified encoding.
    pub initial_len: usize,

    /// Length of the returned encoding.
    pub final_len: usize,

    /// Tolerance of the last round, if any ran.
    pub last_tolerance: Option<f64>,
}

/// Encodes geometries within a byte budget.
#[derive(Debug, Clone)]
pub struct GeometryEncoder<E = WkbGeometryEngine> {
    engine: E,
    max_len: i64,
    max_rounds: u32,
}

impl GeometryEncoder<WkbGeometryEngine> {
    /// WKB encoder with the given budget (`<= 0` = unlimited).
    pub fn new(max_len: i64) -> Self {
        Self::with_engine(WkbGeometryEngine, max_len)
    }

    pub fn from_config(config: &GeoStrategyConfig) -> Self {
        Self::new(config.max_encoded_len).with_max_rounds(config.max_simplify_rounds)
    }
}

impl<E: GeometryEngine> GeometryEncoder<E> {
    pub fn with_engine(engine: E, max_len: i64) -> Self {
        Self {
            engine,
            max_len,
            max_rounds: GeoStrategyConfig::DEFAULT_MAX_SIMPLIFY_ROUNDS,
        }
    }

    /// Set the simplification round ceiling.
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn max_len(&self) -> i64 {
        self.max_len
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Encode `geom`, simplifying as needed to stay under the budget.
    pub fn encode(&self, geom: &Geometry<f64>) -> Result<Vec<u8>> {
        self.encode_with_stats(geom).map(|(bytes, _)| bytes)
    }

    /// Encode `geom` and report what the shrink loop did.
    pub fn encode_with_stats(&self, geom: &Geometry<f64>) -> Result<(Vec<u8>, EncodeStats)> {
        let max = self.max_len;
        let mut bytes = self.engine.encode(geom)?;
        let mut stats = EncodeStats {
            initial_len: bytes.len(),
            final_len: bytes.len(),
            ..Default::default()
        };

        if max <= 0 || fits(bytes.len(), max) {
            tracing::trace!(len = bytes.len(), max, "Geometry within budget");
            return Ok((bytes, stats));
        }

        let mins = self
            .engine
            .envelope(geom)
            .map(|env| env.width().min(env.height()))
            .unwrap_or(0.0);
        let mut last = bytes.len();
        let mut divisor = INITIAL_DIVISOR;

        for round in 1..=self.max_rounds {
            let tolerance = mins / divisor;
            tracing::debug!(
                round,
                len = bytes.len(),
                max,
                tolerance,
                "Simplifying long geometry"
            );

            let simple = self.engine.simplify(geom, tolerance);
            bytes = self.engine.encode(&simple)?;
            stats.rounds = round;
            stats.final_len = bytes.len();
            stats.last_tolerance = Some(tolerance);

            if fits(bytes.len(), max) {
                return Ok((bytes, stats));
            }
            if bytes.len() == last {
                tracing::warn!(len = last, max, round, "Geometry simplification made no progress");
                return Err(SpatialError::EncodingTooLarge { len: last, max });
            }
            last = bytes.len();
            divisor *= DIVISOR_FACTOR;
        }

        tracing::warn!(
            len = last,
            max,
            rounds = self.max_rounds,
            "Geometry simplification hit round limit"
        );
        Err(SpatialError::EncodingTooLarge { len: last, max })
    }
}

fn fits(len: usize, max: i64) -> bool {
    i64::try_from(len).map_or(false, |len| len < max)
}

/// Convert `shape` through `ctx` and encode it within `max_len` bytes
/// (`<= 0` = unlimited).
pub fn encode(ctx: &SpatialContext, shape: &Shape, max_len: i64) -> Result<Vec<u8>> {
    let geom = ctx.geometry_from(shape)?;
    GeometryEncoder::new(max_len).encode(&geom)
}
