//! Structs and functions for handling textures.
//!
//! The module provides the [`Texture`] struct which is a CPU representation of a GPU texture.
//! Every texture uses clamp-to-edge wrapping and nearest filtering, and regenerates its
//! mipmaps after each upload.

use std::sync::Arc;

use image::{DynamicImage, GenericImageView};

use super::Gl;
use crate::error::{Result, ShapeError};

const WHITE_PIXEL: [u8; 4] = [255, 255, 255, 255];

/// Represents a texture stored on the GPU side.
pub struct Texture<G: Gl> {
    pub(super) gl: Arc<G>,
    pub(super) id: G::Texture,
    pub(super) width: u32,
    pub(super) height: u32,
}

impl<G: Gl> Texture<G> {
    /// Creates the 1x1 opaque white texture shapes start with.
    pub fn white(gl: &Arc<G>) -> Result<Self> {
        Self::from_rgba(gl, 1, 1, &WHITE_PIXEL)
    }

    /// Creates a new texture from the given [`image::DynamicImage`].
    pub fn from_image(gl: &Arc<G>, image: &DynamicImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::from_rgba(gl, width, height, &image.to_rgba8().into_raw())
    }

    /// Creates a new texture from raw RGBA8 data, four bytes per pixel.
    pub fn from_rgba(gl: &Arc<G>, width: u32, height: u32, data: &[u8]) -> Result<Self> {
        check_pixels(width, height, data)?;
        let id = unsafe { gl.create_texture() }.map_err(ShapeError::Allocation)?;
        let mut texture = Self {
            gl: Arc::clone(gl),
            id,
            width: 0,
            height: 0,
        };
        texture.specify(width, height, data);
        Ok(texture)
    }

    /// Re-specifies the storage of this texture with new pixels.
    ///
    /// The old storage is released by the driver; the handle stays the same.
    pub fn upload(&mut self, width: u32, height: u32, data: &[u8]) -> Result<()> {
        check_pixels(width, height, data)?;
        self.specify(width, height, data);
        Ok(())
    }

    fn specify(&mut self, width: u32, height: u32, data: &[u8]) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(self.id));
            self.gl
                .tex_image_2d_rgba8(glow::TEXTURE_2D, width as i32, height as i32, data);
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::NEAREST as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::NEAREST as i32,
            );
            self.gl.generate_mipmap(glow::TEXTURE_2D);
        }
        self.width = width;
        self.height = height;
    }

    /// Returns the width of the texture.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the texture.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn id(&self) -> G::Texture {
        self.id
    }

    /// Binds the texture to the specified texture unit.
    pub fn bind(&self, unit: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(self.id));
        }
    }
}

impl<G: Gl> Drop for Texture<G> {
    fn drop(&mut self) {
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, None);
            self.gl.delete_texture(self.id);
        }
    }
}

fn check_pixels(width: u32, height: u32, data: &[u8]) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ShapeError::InvalidTextureSize);
    }
    let expected = width as usize * height as usize * 4;
    if data.len() != expected {
        return Err(ShapeError::PixelLengthMismatch {
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}
