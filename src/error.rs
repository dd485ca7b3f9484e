//! The crate-wide error type.

use std::path::PathBuf;

use thiserror::Error;

use crate::abs::ShapeId;

#[derive(Error, Debug)]
pub enum ShapeError {
    #[error("Shape must have at least one vertex")]
    InvalidVertexCount,

    #[error("Unsupported dimension {0}, expected 2 or 3")]
    InvalidDimension(u32),

    #[error("{what} upload expected {expected} values, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Element index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("Pixel data expected {expected} bytes, got {actual}")]
    PixelLengthMismatch { expected: usize, actual: usize },

    #[error("Texture width and height must be non-zero")]
    InvalidTextureSize,

    #[error("Render called before any element upload")]
    MissingElements,

    #[error("Shape {0} is not in the registry")]
    UnknownShape(ShapeId),

    #[error("Shape registry used from a thread other than its owner")]
    WrongThread,

    #[error("GL object allocation failed: {0}")]
    Allocation(String),

    #[error("IO error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ShapeError>;
