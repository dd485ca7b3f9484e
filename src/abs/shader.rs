//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing OpenGL shaders.
//! Compile and link failures do not abort: they are reported through [`report_status`] and the
//! object is kept, so a shape built on a broken shader pair still exists and can be released.
//! This module also provides the [`Uniform`] trait for setting uniform variables in shader
//! programs.

use std::path::Path;
use std::sync::Arc;

use super::Gl;
use crate::error::{Result, ShapeError};

/// Pipeline stage of a [`Shader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    /// The `glCreateShader` type for this stage.
    pub fn gl_enum(self) -> u32 {
        match self {
            ShaderKind::Vertex => glow::VERTEX_SHADER,
            ShaderKind::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

/// Reads shader source text from disk.
pub fn load_source(path: &Path) -> Result<String> {
    log::info!("Loading shader from {}", path.display());
    std::fs::read_to_string(path).map_err(|source| ShapeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Logs a labeled error when `ok` is false and the driver left a message.
///
/// Returns `ok` unchanged.
pub fn report_status(step: &str, ok: bool, info_log: impl FnOnce() -> String) -> bool {
    if !ok {
        let info = info_log();
        let info = info.trim();
        if info.is_empty() {
            log::error!("{step}: failed without an info log");
        } else {
            log::error!("{step}: {info}");
        }
    }
    ok
}

/// Represents an individual OpenGL shader.
pub struct Shader<G: Gl> {
    gl: Arc<G>,
    id: G::Shader,
    kind: ShaderKind,
    compiled: bool,
}

impl<G: Gl> Shader<G> {
    /// Compiles a shader from `source`. `label` names it in diagnostics.
    pub fn compile(gl: &Arc<G>, kind: ShaderKind, source: &str, label: &str) -> Result<Self> {
        unsafe {
            let shader = gl
                .create_shader(kind.gl_enum())
                .map_err(ShapeError::Allocation)?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            let compiled = report_status(label, gl.get_shader_compile_status(shader), || {
                gl.get_shader_info_log(shader)
            });

            Ok(Self {
                gl: Arc::clone(gl),
                id: shader,
                kind,
                compiled,
            })
        }
    }

    /// Loads `path` and compiles it. An unreadable file is logged and compiled as empty
    /// source, which the driver then rejects.
    pub fn from_file(gl: &Arc<G>, kind: ShaderKind, path: &Path) -> Result<Self> {
        let source = load_source(path).unwrap_or_else(|e| {
            log::error!("{e}");
            String::new()
        });
        Self::compile(gl, kind, &source, &path.display().to_string())
    }

    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    pub fn id(&self) -> G::Shader {
        self.id
    }
}

impl<G: Gl> Drop for Shader<G> {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_shader(self.id);
        }
    }
}

/// Represents a uniform variable in a shader program.
pub trait Uniform {
    /// Sets the value of the uniform variable in the given shader program.
    fn set_uniform<G: Gl>(&self, gl: &G, program: G::Program, name: &str);
}

impl Uniform for i32 {
    fn set_uniform<G: Gl>(&self, gl: &G, program: G::Program, name: &str) {
        unsafe {
            if let Some(loc) = gl.get_uniform_location(program, name) {
                gl.uniform_1_i32(Some(&loc), *self);
            }
        }
    }
}

/// A linked vertex + fragment program that owns both of its shaders.
///
/// The shaders stay attached until the program is dropped, at which point they are detached
/// before the program and then the shaders are deleted.
pub struct ShaderProgram<G: Gl> {
    gl: Arc<G>,
    id: G::Program,
    linked: bool,
    vertex: Shader<G>,
    fragment: Shader<G>,
}

impl<G: Gl> ShaderProgram<G> {
    /// Links a new shader program from the given shaders.
    pub fn link(gl: &Arc<G>, vertex: Shader<G>, fragment: Shader<G>) -> Result<Self> {
        unsafe {
            let program = gl.create_program().map_err(ShapeError::Allocation)?;
            gl.attach_shader(program, vertex.id);
            gl.attach_shader(program, fragment.id);
            gl.link_program(program);

            let linked = report_status("Shader program", gl.get_program_link_status(program), || {
                gl.get_program_info_log(program)
            });

            Ok(Self {
                gl: Arc::clone(gl),
                id: program,
                linked,
                vertex,
                fragment,
            })
        }
    }

    /// Loads, compiles and links a vertex + fragment pair from disk.
    pub fn from_files(gl: &Arc<G>, vertex: &Path, fragment: &Path) -> Result<Self> {
        let vertex = Shader::from_file(gl, ShaderKind::Vertex, vertex)?;
        let fragment = Shader::from_file(gl, ShaderKind::Fragment, fragment)?;
        Self::link(gl, vertex, fragment)
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        unsafe {
            self.gl.use_program(Some(self.id));
        }
    }

    /// Sets a uniform variable in the shader program. The program is made current first.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) {
        self.use_program();
        value.set_uniform(&*self.gl, self.id, name);
    }

    pub fn attrib_location(&self, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(self.id, name) }
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn id(&self) -> G::Program {
        self.id
    }

    pub fn vertex_shader(&self) -> &Shader<G> {
        &self.vertex
    }

    pub fn fragment_shader(&self) -> &Shader<G> {
        &self.fragment
    }
}

impl<G: Gl> Drop for ShaderProgram<G> {
    fn drop(&mut self) {
        unsafe {
            self.gl.detach_shader(self.id, self.vertex.id);
            self.gl.detach_shader(self.id, self.fragment.id);
            self.gl.delete_program(self.id);
        }
    }
}
