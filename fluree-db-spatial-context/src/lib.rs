//! Spatial context configuration and size-bounded geometry encoding for Fluree DB.
//!
//! This crate turns a flat string-to-string configuration map into an
//! immutable [`SpatialContext`] and stores arbitrary geometries as raw WKB
//! field values. It supports:
//!
//! - **Pluggable context factories** selected by name from a registry
//! - **Staged resolution** of units, distance calculator and world bounds
//! - **Byte-bounded encoding** that simplifies geometries until they fit
//! - **Boolean spatial filters** evaluated by decoding stored geometries
//!
//! # Architecture
//!
//! ```text
//! ContextArgs ──► FactoryRegistry ──► SpatialContextFactory
//!                                            │
//!                     init_units ─► init_calculator ─► init_world_bounds
//!                                            │
//!                                            ▼
//!                                     SpatialContext
//!                                            │
//!                                            ▼
//!   Shape ──► GeoStrategy::create_field ──► GeometryEncoder ──► EncodedField
//!                                            │
//!   SpatialArgs ──► GeoStrategy::make_filter ──► GeometryFilter (decode + test)
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration keys, [`ContextArgs`] and [`GeoStrategyConfig`]
//! - [`units`]: Distance units
//! - [`distance`]: Distance calculators and name resolution
//! - [`shape`]: Shape types and literal parsing
//! - [`context`]: The immutable spatial context
//! - [`factory`]: Context factories and the factory registry
//! - [`codec`]: Well-Known Binary reader/writer
//! - [`engine`]: Geometry engine seam (encode, decode, simplify)
//! - [`encoder`]: Size-bounded encoding loop
//! - [`operation`]: Spatial predicates
//! - [`strategy`]: Field creation, filters and queries
//! - [`error`]: Error types

pub mod codec;
pub mod config;
pub mod context;
pub mod distance;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod factory;
pub mod operation;
pub mod shape;
pub mod strategy;
pub mod units;

// Re-export key types
pub use config::{factory_override_from_env, ContextArgs, GeoStrategyConfig};
pub use context::SpatialContext;
pub use distance::DistanceCalculator;
pub use encoder::{encode, EncodeStats, GeometryEncoder};
pub use engine::{GeometryEngine, WkbGeometryEngine};
pub use error::{Result, SpatialError};
pub use factory::{
    make_spatial_context, CartesianContextFactory, DefaultContextFactory, FactoryRegistry,
    SpatialContextFactory,
};
pub use operation::{GeometryTest, SpatialArgs, SpatialOperation};
pub use shape::{parse_shape, parse_wkt, Circle, Rectangle, Shape};
pub use strategy::{ConstantScoreQuery, EncodedField, GeoStrategy, GeometryFilter, ValueSource};
pub use units::DistanceUnits;
