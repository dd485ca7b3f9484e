//! GPU resource ownership for simple drawable shapes over OpenGL.
//!
//! Each [`abs::Shape`] owns its vertex, color, UV and index buffers, a texture and a shader
//! program, and releases them when dropped. [`abs::ShapeRegistry`] keeps the live shapes of
//! one context.

pub mod abs;
pub mod config;
pub mod error;
pub mod logging;

pub use config::ShapeConfig;
pub use error::{Result, ShapeError};
