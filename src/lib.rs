//! Flint Engine: fixed-point software 3D renderer
//!
//! A CPU-only rendering pipeline that runs entirely on 32-bit fixed-point
//! integer arithmetic:
//! - Scanline triangle rasterization (flat-top/flat-bottom splitting)
//! - Vertex / geometry / fragment shader stages
//! - Multi-pass shadow mapping (directional, spot and cube-face point lights)
//! - Phong-style lighting with attenuation and spot cones
//! - RON scene files, PNG texture loading

pub mod math;
pub mod color;
pub mod model;
pub mod raster;
pub mod shade;
pub mod scene;

pub use math::{FixedMat4, FixedVec3, FP_BIT, FP_ONE};
pub use model::{
    Camera, Face, FrameBuffer, Frustum, Light, LightType, Material, Mesh, Model, ProjectionType,
    Texture, Transform, Vertex,
};
pub use raster::{AffineRasterizer, FaceCull, FlatRasterizer, Fragment, MAX_VARYINGS};
pub use scene::{
    load_scene, load_scene_from_str, save_scene, LitShader, Renderer, Scene, SceneDesc,
    SceneError,
};
pub use shade::{
    FlatSpecularShader, PhongSpecularShader, Shader, ShaderBuffer, ShadowMappingShader,
    FULL_LIGHT, LIGHT_RANGE,
};

/// Default render target dimensions
pub const WIDTH: usize = 320;
pub const HEIGHT: usize = 240;
