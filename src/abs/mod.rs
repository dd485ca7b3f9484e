//! This module contains the GPU-side building blocks: the [`Gl`] seam over the OpenGL
//! context, buffers, shaders and textures, and the [`Shape`]s and [`ShapeRegistry`] built on
//! top of them. [`App`] opens a window with a context to draw into.

pub mod app;
pub mod buffer;
pub mod gl;
pub mod registry;
pub mod shader;
pub mod shape;
pub mod texture;

#[cfg(test)]
pub(crate) mod recording;

pub use app::*;
pub use buffer::*;
pub use gl::*;
pub use registry::*;
pub use shader::*;
pub use shape::*;
pub use texture::*;
