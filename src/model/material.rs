//! Surface materials

use log::warn;
use serde::{Deserialize, Serialize};

use super::texture::Texture;
use crate::color;
use crate::math::fixed::{self, FP_ONE};

/// Diffuse/specular surface description. Intensities and shininess are
/// fixed point; the shininess exponent is evaluated as a whole number of
/// powers.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub diffuse_color: i32,
    pub diffuse_intensity: i32,
    pub specular_intensity: i32,
    pub shininess: i32,
    pub texture: Option<Texture>,
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            diffuse_color: color::WHITE,
            diffuse_intensity: FP_ONE,
            specular_intensity: FP_ONE / 2,
            shininess: fixed::from_int(8),
            texture: None,
        }
    }

    pub fn with_color(mut self, color: i32) -> Self {
        self.diffuse_color = color;
        self
    }

    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default")
    }
}

/// Float-unit material description for scene files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialDesc {
    pub name: String,
    pub diffuse_color: [u8; 3],
    #[serde(default = "default_intensity")]
    pub diffuse_intensity: f32,
    #[serde(default)]
    pub specular_intensity: f32,
    #[serde(default = "default_shininess")]
    pub shininess: f32,
    #[serde(default)]
    pub texture_path: Option<String>,
}

fn default_intensity() -> f32 {
    1.0
}

fn default_shininess() -> f32 {
    8.0
}

impl MaterialDesc {
    /// Build the runtime material, loading the texture if a path is given.
    /// A texture that fails to load leaves the material untextured.
    pub fn to_material(&self) -> Material {
        let texture = self.texture_path.as_ref().and_then(|path| {
            match Texture::from_file(path) {
                Ok(texture) => Some(texture),
                Err(error) => {
                    warn!("material {}: {}", self.name, error);
                    None
                }
            }
        });
        Material {
            name: self.name.clone(),
            diffuse_color: color::pack(
                self.diffuse_color[0] as i32,
                self.diffuse_color[1] as i32,
                self.diffuse_color[2] as i32,
            ),
            diffuse_intensity: fixed::to_fixed(self.diffuse_intensity),
            specular_intensity: fixed::to_fixed(self.specular_intensity),
            shininess: fixed::to_fixed(self.shininess),
            texture,
        }
    }
}
