//! Error types for spatial context resolution and geometry encoding.

use thiserror::Error;

/// Spatial context and encoding errors.
#[derive(Error, Debug)]
pub enum SpatialError {
    /// Unresolvable unit, calculator, factory, or operation name, or a
    /// non-rectangle world bounds value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed shape literal (during bootstrap or normal parsing).
    #[error("Shape parse error: {0}")]
    ShapeParse(String),

    /// Geometry could not be simplified below the byte budget.
    #[error("Can not simplify geometry smaller than max: len={len} max={max}")]
    EncodingTooLarge { len: usize, max: i64 },

    /// Capability intentionally not provided.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Shape that has no geometry representation.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Malformed WKB bytes.
    #[error("WKB format error: {0}")]
    Format(String),
}

impl SpatialError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        SpatialError::Config(msg.into())
    }

    /// Create a shape parse error
    pub fn shape_parse(msg: impl Into<String>) -> Self {
        SpatialError::ShapeParse(msg.into())
    }

    /// Create an unsupported operation error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        SpatialError::Unsupported(msg.into())
    }

    /// Create a WKB format error
    pub fn format(msg: impl Into<String>) -> Self {
        SpatialError::Format(msg.into())
    }
}

/// Result type for spatial operations.
pub type Result<T> = std::result::Result<T, SpatialError>;
