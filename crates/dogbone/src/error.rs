//! Error types for dogbone placement.

use dogbone_kernel::KernelError;
use thiserror::Error;

/// Errors that can occur while resolving or placing a dogbone.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DogboneError {
    /// The corner topology is not what a dogbone needs (wrong number of
    /// bounding edges, edge not touching the face, boundary edge).
    #[error("topology error: {0}")]
    Topology(String),

    /// A geometric requirement failed: non-planar or non-parallel faces,
    /// degenerate corner bisector.
    #[error("geometry precondition failed: {0}")]
    GeometryPrecondition(String),

    /// Settings are out of range. Raised before any geometry work.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A stale face/edge handle could not be found again by its
    /// reference point.
    #[error("invalid handle: {0}")]
    InvalidHandle(String),

    /// The modeling kernel rejected a feature.
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),
}

impl DogboneError {
    /// Whether this error only affects the edge being processed, so the
    /// batch can skip it and continue.
    pub fn is_per_edge(&self) -> bool {
        !matches!(self, DogboneError::Configuration(_))
    }
}

/// Result type for dogbone operations.
pub type Result<T> = std::result::Result<T, DogboneError>;
