//! Shape configuration.
//!
//! [`ShapeConfig`] names the shader pair a shape loads and the attribute and
//! uniform names the shape binds. The defaults match the shaders shipped in
//! `src/shaders/`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShapeError};

/// Names of the vertex inputs the shape feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeNames {
    pub position: String,
    pub color: String,
    pub uv: String,
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            position: "in_pos".to_string(),
            color: "in_col".to_string(),
            uv: "in_UV".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub attributes: AttributeNames,
    pub texture_uniform: String,
    /// Constant color used when no per-vertex colors were uploaded.
    pub fallback_color: [f32; 4],
    /// Constant UV used when no texture coordinates were uploaded.
    pub fallback_uv: [f32; 2],
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            vertex_shader: PathBuf::from("src/shaders/shader_vertex_tex.glsl"),
            fragment_shader: PathBuf::from("src/shaders/shader_fragment_tex.glsl"),
            attributes: AttributeNames::default(),
            texture_uniform: "tex".to_string(),
            fallback_color: [1.0, 1.0, 1.0, 0.5],
            fallback_uv: [0.0, 0.0],
        }
    }
}

impl ShapeConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Reads a JSON config file. Missing fields take their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ShapeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}
