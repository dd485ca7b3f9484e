//! GPU buffer and vertex array objects.

use std::sync::Arc;

use super::Gl;
use crate::error::{Result, ShapeError};

/// A buffer object bound to a single target for its whole life.
pub struct Buffer<G: Gl> {
    gl: Arc<G>,
    id: G::Buffer,
    target: u32,
    byte_len: usize,
}

impl<G: Gl> Buffer<G> {
    /// Creates an empty buffer for `target` (`ARRAY_BUFFER` or `ELEMENT_ARRAY_BUFFER`).
    pub fn new(gl: &Arc<G>, target: u32) -> Result<Self> {
        let id = unsafe { gl.create_buffer() }.map_err(ShapeError::Allocation)?;
        Ok(Self {
            gl: Arc::clone(gl),
            id,
            target,
            byte_len: 0,
        })
    }

    /// Replaces the buffer contents, resizing to fit.
    pub fn upload_f32(&mut self, data: &[f32]) {
        self.upload_bytes(&f32_bytes(data));
    }

    /// Replaces the buffer contents with indices. For an element buffer, bind the owning
    /// vertex array first.
    pub fn upload_u32(&mut self, data: &[u32]) {
        self.upload_bytes(&u32_bytes(data));
    }

    fn upload_bytes(&mut self, bytes: &[u8]) {
        unsafe {
            self.gl.bind_buffer(self.target, Some(self.id));
            self.gl
                .buffer_data_u8_slice(self.target, bytes, glow::DYNAMIC_DRAW);
        }
        self.byte_len = bytes.len();
    }

    /// Binds the buffer to its target.
    pub fn bind(&self) {
        unsafe {
            self.gl.bind_buffer(self.target, Some(self.id));
        }
    }

    pub fn id(&self) -> G::Buffer {
        self.id
    }

    /// Size of the last upload in bytes, zero before any upload.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }
}

impl<G: Gl> Drop for Buffer<G> {
    fn drop(&mut self) {
        unsafe {
            self.gl.bind_buffer(self.target, None);
            self.gl.delete_buffer(self.id);
        }
    }
}

/// Vertex array object holding the attribute state of one shape.
pub struct VertexArray<G: Gl> {
    gl: Arc<G>,
    id: G::VertexArray,
}

impl<G: Gl> VertexArray<G> {
    pub fn new(gl: &Arc<G>) -> Result<Self> {
        let id = unsafe { gl.create_vertex_array() }.map_err(ShapeError::Allocation)?;
        Ok(Self {
            gl: Arc::clone(gl),
            id,
        })
    }

    pub fn bind(&self) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.id));
        }
    }

    pub fn unbind(&self) {
        unsafe {
            self.gl.bind_vertex_array(None);
        }
    }

    pub fn id(&self) -> G::VertexArray {
        self.id
    }
}

impl<G: Gl> Drop for VertexArray<G> {
    fn drop(&mut self) {
        unsafe {
            self.gl.bind_vertex_array(None);
            self.gl.delete_vertex_array(self.id);
        }
    }
}

// Native-endian, matching what the driver reads back from client memory.
fn f32_bytes(data: &[f32]) -> Vec<u8> {
    data.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

fn u32_bytes(data: &[u32]) -> Vec<u8> {
    data.iter().flat_map(|v| v.to_ne_bytes()).collect()
}
