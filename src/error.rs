//! Error types for mesh simplification.

use thiserror::Error;

/// Errors that can occur when feeding a mesh into the simplifier.
///
/// The collapse loop itself never fails: singular quadrics and rejected collapses are handled in place.
#[derive(Debug, Error)]
pub enum SimplifyError {
    /// Index buffer does not describe whole triangles.
    #[error("index count {0} is not a multiple of 3")]
    IndexCountNotTriangles(usize),

    /// A triangle references a vertex that doesn't exist.
    #[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },

    /// An attribute stream doesn't have one element per vertex.
    #[error("{stream} stream has {len} elements, expected {expected}")]
    StreamLengthMismatch {
        stream: &'static str,
        len: usize,
        expected: usize,
    },

    /// Aggressiveness must be a finite number.
    #[error("invalid aggressiveness: {0}")]
    InvalidAggressiveness(f64),

    /// Vertex link distance must be finite and non-negative.
    #[error("invalid vertex link distance: {0}")]
    InvalidLinkDistance(f64),

    /// The simplifier panicked; only produced by [simplify_mesh_or_original](crate::simplify_mesh_or_original).
    #[error("simplification panicked: {0}")]
    Panicked(String),
}

/// Result type for simplification operations.
pub type SimplifyResult<T> = std::result::Result<T, SimplifyError>;
