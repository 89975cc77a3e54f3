/// Error types shared across the geometry pipeline
use thiserror::Error;

/// Degenerate-input conditions raised by the math and clipping layers.
///
/// None of these abort a frame. Callers pick a fallback (keep the previous
/// matrix, skip the triangle, keep the unnormalized vector) or propagate.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    #[error("cannot normalize a zero-length vector")]
    ZeroLength,
    #[error("matrix is singular and has no inverse")]
    SingularMatrix,
    #[error("camera basis is degenerate (eye equals target or up is parallel to the view direction)")]
    DegenerateBasis,
    #[error("clip polygon exceeded its vertex capacity")]
    ClipOverflow,
}

/// Errors raised while building or loading a mesh
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("unexpected end of data: {0}")]
    Truncated(String),
    #[error("mesh has no vertices")]
    Empty,
    #[error("face {face} references vertex {index}, but the mesh has {count} vertices")]
    IndexOutOfRange {
        face: usize,
        index: usize,
        count: usize,
    },
    #[error("face {face} has {len} vertices, at least 3 are required")]
    DegeneratePolygon { face: usize, len: usize },
    #[error("unsupported mesh format: {0}")]
    UnsupportedFormat(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("serialization error: {0}")]
    Serialize(String),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}
