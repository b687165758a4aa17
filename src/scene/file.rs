//! Scene loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable scene files.
//! Descriptions carry float units and are converted to fixed point when the
//! runtime scene is built.

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use super::Scene;
use crate::math::fixed;
use crate::model::{
    Camera, LightDesc, Model, ModelDesc, ProjectionType, TransformDesc,
};

/// Error type for scene loading
#[derive(Debug)]
pub enum SceneError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for SceneError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneError::ParseError(e)
    }
}

impl From<ron::Error> for SceneError {
    fn from(e: ron::Error) -> Self {
        SceneError::SerializeError(e)
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::IoError(e) => write!(f, "IO error: {}", e),
            SceneError::ParseError(e) => write!(f, "Parse error: {}", e),
            SceneError::SerializeError(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraDesc {
    pub transform: TransformDesc,
    #[serde(default = "default_projection")]
    pub projection: ProjectionType,
    #[serde(default = "default_focal_length")]
    pub focal_length: f32,
}

fn default_projection() -> ProjectionType {
    ProjectionType::Perspective
}

fn default_focal_length() -> f32 {
    1.0
}

impl CameraDesc {
    pub fn to_camera(&self) -> Camera {
        let mut camera = Camera::new(self.projection);
        camera.transform = self.transform.to_transform();
        camera.frustum.focal_length = fixed::to_fixed(self.focal_length);
        camera
    }
}

/// A whole scene in file form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDesc {
    pub camera: CameraDesc,
    #[serde(default)]
    pub lights: Vec<LightDesc>,
    #[serde(default)]
    pub models: Vec<ModelDesc>,
}

impl SceneDesc {
    /// Build the runtime scene, converting float units to fixed point and
    /// loading any referenced textures
    pub fn to_scene(&self) -> Scene {
        let mut scene = Scene::new(self.camera.to_camera());
        for light in &self.lights {
            scene.add_light(light.to_light());
        }
        for model in &self.models {
            let materials = model.materials.iter().map(|m| m.to_material()).collect();
            let mut built = Model::new(&model.name, model.mesh.to_mesh(), materials);
            built.transform = model.transform.to_transform();
            scene.add_model(built);
        }
        scene
    }
}

/// Load a scene from a RON file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, SceneError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let desc: SceneDesc = ron::from_str(&contents)?;
    let scene = desc.to_scene();
    info!(
        "loaded scene {} ({} models, {} lights)",
        path.display(),
        scene.models.len(),
        scene.lights.len()
    );
    Ok(scene)
}

/// Load a scene from a RON string (for embedded scenes or testing)
pub fn load_scene_from_str(s: &str) -> Result<Scene, SceneError> {
    let desc: SceneDesc = ron::from_str(s)?;
    Ok(desc.to_scene())
}

/// Save a scene description to a RON file
pub fn save_scene<P: AsRef<Path>>(desc: &SceneDesc, path: P) -> Result<(), SceneError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(5)
        .indentor("  ".to_string());
    let contents = ron::ser::to_string_pretty(desc, config)?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"(
        camera: (
            transform: (location: (0.0, 0.0, 5.0), rotation: (0.0, 0.0, 0.0)),
        ),
        lights: [
            (
                name: "sun",
                light_type: Directional,
                transform: (location: (0.0, 0.0, 10.0), rotation: (0.0, 0.0, 0.0)),
                has_shadow: true,
            ),
        ],
        models: [
            (
                name: "tri",
                transform: (location: (0.0, 0.0, 0.0), rotation: (0.0, 0.0, 0.0)),
                mesh: (
                    positions: [(-1.0, -1.0, 0.0), (1.0, -1.0, 0.0), (0.0, 1.0, 0.0)],
                    normals: [(0.0, 0.0, 1.0), (0.0, 0.0, 1.0), (0.0, 0.0, 1.0)],
                    faces: [(indices: (0, 1, 2))],
                ),
                materials: [(name: "gray", diffuse_color: (128, 128, 128))],
            ),
        ],
    )"#;

    #[test]
    fn test_load_scene_from_str() {
        let scene = load_scene_from_str(SCENE).expect("scene should parse");
        assert_eq!(scene.models.len(), 1);
        assert_eq!(scene.lights.len(), 1);
        assert_eq!(scene.models[0].mesh.vertices.len(), 3);
        assert_eq!(scene.models[0].materials.len(), 1);
        assert!(scene.lights[0].has_shadow);
    }

    #[test]
    fn test_bad_scene_is_an_error() {
        assert!(load_scene_from_str("(nonsense").is_err());
    }
}
