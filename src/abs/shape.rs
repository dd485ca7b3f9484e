//! Drawable shapes.
//!
//! A [`Shape`] owns every GPU object needed to draw one indexed triangle list: position,
//! color, UV and index buffers, a vertex array, a texture and a linked shader program.
//! Dropping the shape releases all of them.
//!
//! The shader pair is expected to expose the attribute and uniform names listed in
//! [`ShapeConfig`]. Attributes the linked program does not expose are skipped when
//! drawing.

use std::sync::Arc;

use image::DynamicImage;

use super::{Buffer, Gl, ShaderProgram, Texture, VertexArray};
use crate::config::ShapeConfig;
use crate::error::{Result, ShapeError};

/// Number of position components per vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Two,
    Three,
}

impl Dimension {
    /// Floats per vertex in a position upload.
    pub fn components(self) -> usize {
        match self {
            Dimension::Two => 2,
            Dimension::Three => 3,
        }
    }
}

impl TryFrom<u32> for Dimension {
    type Error = ShapeError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            2 => Ok(Dimension::Two),
            3 => Ok(Dimension::Three),
            other => Err(ShapeError::InvalidDimension(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct AttribLocations {
    position: Option<u32>,
    color: Option<u32>,
    uv: Option<u32>,
}

/// GL names of everything a shape owns.
pub struct ShapeHandles<G: Gl> {
    pub vertex_buffer: G::Buffer,
    pub color_buffer: G::Buffer,
    pub element_buffer: G::Buffer,
    pub uv_buffer: G::Buffer,
    pub vertex_array: G::VertexArray,
    pub texture: G::Texture,
    pub vertex_shader: G::Shader,
    pub fragment_shader: G::Shader,
    pub program: G::Program,
}

/// One indexed triangle list and the GPU objects it draws with.
///
/// The vertex count and dimension are fixed at construction. Uploads replace the previous
/// contents of the matching buffer.
pub struct Shape<G: Gl> {
    gl: Arc<G>,
    vertex_count: usize,
    dimension: Dimension,
    element_count: usize,
    has_color: bool,
    has_texture: bool,
    has_elements: bool,
    fallback_color: [f32; 4],
    fallback_uv: [f32; 2],
    locations: AttribLocations,
    // Fields drop in declaration order.
    texture: Texture<G>,
    elements: Buffer<G>,
    vertices: Buffer<G>,
    colors: Buffer<G>,
    uvs: Buffer<G>,
    vao: VertexArray<G>,
    program: ShaderProgram<G>,
}

impl<G: Gl> Shape<G> {
    /// Builds a shape of `vertex_count` vertices.
    ///
    /// Loads and links the configured shader pair, allocates empty buffers and a 1x1 white
    /// texture. A shader that fails to compile or link is logged and the shape is still
    /// returned; drawing it then produces whatever the driver does with a broken program.
    pub fn new(
        gl: &Arc<G>,
        vertex_count: usize,
        dimension: Dimension,
        config: &ShapeConfig,
    ) -> Result<Self> {
        if vertex_count == 0 {
            return Err(ShapeError::InvalidVertexCount);
        }

        let program =
            ShaderProgram::from_files(gl, &config.vertex_shader, &config.fragment_shader)?;
        let names = &config.attributes;
        let locations = AttribLocations {
            position: program.attrib_location(&names.position),
            color: program.attrib_location(&names.color),
            uv: program.attrib_location(&names.uv),
        };
        for (name, location) in [
            (&names.position, locations.position),
            (&names.color, locations.color),
            (&names.uv, locations.uv),
        ] {
            if location.is_none() {
                log::debug!("Attribute {name} not active in shape program, it will be skipped");
            }
        }

        let vao = VertexArray::new(gl)?;
        let vertices = Buffer::new(gl, glow::ARRAY_BUFFER)?;
        let colors = Buffer::new(gl, glow::ARRAY_BUFFER)?;
        let elements = Buffer::new(gl, glow::ELEMENT_ARRAY_BUFFER)?;
        let uvs = Buffer::new(gl, glow::ARRAY_BUFFER)?;

        let texture = Texture::white(gl)?;
        program.set_uniform(&config.texture_uniform, 0);

        log::info!(
            "Created shape with {vertex_count} vertices in {}D",
            dimension.components()
        );

        Ok(Self {
            gl: Arc::clone(gl),
            vertex_count,
            dimension,
            element_count: 0,
            has_color: false,
            has_texture: false,
            has_elements: false,
            fallback_color: config.fallback_color,
            fallback_uv: config.fallback_uv,
            locations,
            texture,
            elements,
            vertices,
            colors,
            uvs,
            vao,
            program,
        })
    }

    /// Replaces vertex positions. Expects `dimension * vertex_count` floats.
    pub fn set_vertices(&mut self, positions: &[f32]) -> Result<()> {
        self.check_len("position", positions.len(), self.dimension.components())?;
        self.vertices.upload_f32(positions);
        log::debug!("Uploaded {} position floats", positions.len());
        Ok(())
    }

    /// Replaces per-vertex RGBA colors. Once set, the shape always draws with them.
    pub fn set_colors(&mut self, colors: &[f32]) -> Result<()> {
        self.check_len("color", colors.len(), 4)?;
        self.colors.upload_f32(colors);
        self.has_color = true;
        Ok(())
    }

    /// Replaces the index list drawn by [`Shape::render`].
    pub fn set_elements(&mut self, indices: &[u32]) -> Result<()> {
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= self.vertex_count) {
            return Err(ShapeError::IndexOutOfRange {
                index,
                vertex_count: self.vertex_count,
            });
        }
        // The element binding is vertex array state.
        self.vao.bind();
        self.elements.upload_u32(indices);
        self.vao.unbind();
        self.element_count = indices.len();
        self.has_elements = true;
        log::debug!("Uploaded {} element indices", indices.len());
        Ok(())
    }

    /// Replaces texture coordinates and the texture image.
    ///
    /// `uvs` holds two floats per vertex and `pixels` holds `width * height` RGBA8 pixels.
    /// The texture keeps its handle; its previous storage is released.
    pub fn apply_texture(&mut self, uvs: &[f32], pixels: &[u8], width: u32, height: u32) -> Result<()> {
        self.check_len("uv", uvs.len(), 2)?;
        self.texture.upload(width, height, pixels)?;
        self.uvs.upload_f32(uvs);
        self.has_texture = true;
        log::debug!("Applied {width}x{height} texture");
        Ok(())
    }

    /// Same as [`Shape::apply_texture`] with the pixels taken from `image`.
    pub fn apply_image(&mut self, uvs: &[f32], image: &DynamicImage) -> Result<()> {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        self.apply_texture(uvs, rgba.as_raw(), width, height)
    }

    /// Draws the shape as an indexed triangle list.
    ///
    /// Leaves the shape's program current.
    pub fn render(&self) -> Result<()> {
        if !self.has_elements {
            return Err(ShapeError::MissingElements);
        }

        let mut enabled: Vec<u32> = Vec::with_capacity(3);
        self.vao.bind();
        unsafe {
            if let Some(loc) = self.locations.position {
                self.vertices.bind();
                self.gl.vertex_attrib_pointer_f32(
                    loc,
                    self.dimension.components() as i32,
                    glow::FLOAT,
                    false,
                    0,
                    0,
                );
                self.gl.enable_vertex_attrib_array(loc);
                enabled.push(loc);
            }

            if let Some(loc) = self.locations.color {
                if self.has_color {
                    self.colors.bind();
                    self.gl
                        .vertex_attrib_pointer_f32(loc, 4, glow::FLOAT, false, 0, 0);
                    self.gl.enable_vertex_attrib_array(loc);
                    enabled.push(loc);
                } else {
                    let [r, g, b, a] = self.fallback_color;
                    self.gl.vertex_attrib_4_f32(loc, r, g, b, a);
                }
            }

            if let Some(loc) = self.locations.uv {
                if self.has_texture {
                    self.uvs.bind();
                    self.gl
                        .vertex_attrib_pointer_f32(loc, 2, glow::FLOAT, false, 0, 0);
                    self.gl.enable_vertex_attrib_array(loc);
                    enabled.push(loc);
                } else {
                    let [u, v] = self.fallback_uv;
                    self.gl.vertex_attrib_2_f32(loc, u, v);
                }
            }

            self.elements.bind();
            self.texture.bind(0);
            self.program.use_program();
            self.gl.draw_elements(
                glow::TRIANGLES,
                self.element_count as i32,
                glow::UNSIGNED_INT,
                0,
            );

            for loc in enabled.into_iter().rev() {
                self.gl.disable_vertex_attrib_array(loc);
            }
        }
        self.vao.unbind();
        Ok(())
    }

    fn check_len(&self, what: &'static str, actual: usize, per_vertex: usize) -> Result<()> {
        let expected = per_vertex * self.vertex_count;
        if actual != expected {
            return Err(ShapeError::LengthMismatch {
                what,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Vertices the shape was built for.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Length of the most recent [`Shape::set_elements`] upload.
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Whether [`Shape::set_colors`] has been called.
    pub fn has_color(&self) -> bool {
        self.has_color
    }

    /// Whether a texture was applied. The default white texture does not count.
    pub fn has_texture(&self) -> bool {
        self.has_texture
    }

    pub fn has_elements(&self) -> bool {
        self.has_elements
    }

    /// False when the shader pair failed to compile or link.
    pub fn is_program_linked(&self) -> bool {
        self.program.is_linked()
    }

    /// The texture sampled on unit 0, white until one is applied.
    pub fn texture(&self) -> &Texture<G> {
        &self.texture
    }

    /// GL names of the objects this shape owns.
    pub fn handles(&self) -> ShapeHandles<G> {
        ShapeHandles {
            vertex_buffer: self.vertices.id(),
            color_buffer: self.colors.id(),
            element_buffer: self.elements.id(),
            uv_buffer: self.uvs.id(),
            vertex_array: self.vao.id(),
            texture: self.texture.id(),
            vertex_shader: self.program.vertex_shader().id(),
            fragment_shader: self.program.fragment_shader().id(),
            program: self.program.id(),
        }
    }
}

impl<G: Gl> Drop for Shape<G> {
    fn drop(&mut self) {
        // Unbinding the element buffer below must only touch this shape's vertex array.
        self.vao.bind();
        log::debug!("Releasing shape with {} vertices", self.vertex_count);
    }
}
