//! Scene container and frame driver
//!
//! The renderer is an explicit value owning the frame buffer, the shared
//! shader buffer and the shader set; callers pass it a scene to render.
//! One frame runs in strict order: world transforms, shader-buffer setup,
//! depth-only shadow passes, then the lit pass. The whole pipeline is
//! single-threaded; nothing here may be called reentrantly.

mod file;

pub use file::{load_scene, load_scene_from_str, save_scene, SceneDesc, SceneError};

use log::debug;

use crate::model::{Camera, FrameBuffer, Light, Mesh, Model};
use crate::shade::{
    FlatSpecularShader, PhongSpecularShader, Shader, ShaderBuffer, ShadowMappingShader,
};

#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub camera: Camera,
    pub lights: Vec<Light>,
    pub models: Vec<Model>,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            lights: Vec::new(),
            models: Vec::new(),
        }
    }

    pub fn add_model(&mut self, model: Model) {
        self.models.push(model);
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }
}

/// The closed set of lit shaders, dispatched explicitly
#[derive(Debug, Clone)]
pub enum LitShader {
    Flat(FlatSpecularShader),
    Phong(PhongSpecularShader),
}

pub struct Renderer {
    pub frame_buffer: FrameBuffer,
    pub shader_buffer: ShaderBuffer,
    pub shadow_shader: ShadowMappingShader,
    pub lit_shader: LitShader,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            frame_buffer: FrameBuffer::new(width, height),
            shader_buffer: ShaderBuffer::new(),
            shadow_shader: ShadowMappingShader::new(),
            lit_shader: LitShader::Phong(PhongSpecularShader::new()),
        }
    }

    /// Render one frame into the color/depth buffers
    pub fn render(&mut self, scene: &mut Scene) {
        for model in &mut scene.models {
            apply_world_transform(model);
        }
        self.frame_buffer.clear();
        self.shader_buffer.setup(
            &scene.camera,
            &mut scene.lights,
            self.frame_buffer.width(),
            self.frame_buffer.height(),
        );
        debug!("rendering {} models", scene.models.len());

        for model in &mut scene.models {
            run_pass(
                &mut self.shadow_shader,
                model,
                &mut self.shader_buffer,
                &scene.lights,
                &mut self.frame_buffer,
            );
        }
        for model in &mut scene.models {
            match &mut self.lit_shader {
                LitShader::Flat(shader) => run_pass(
                    shader,
                    model,
                    &mut self.shader_buffer,
                    &scene.lights,
                    &mut self.frame_buffer,
                ),
                LitShader::Phong(shader) => run_pass(
                    shader,
                    model,
                    &mut self.shader_buffer,
                    &scene.lights,
                    &mut self.frame_buffer,
                ),
            }
        }
    }
}

/// Bring a model's vertices and face normals into world space
fn apply_world_transform(model: &mut Model) {
    let world_matrix = model.transform.world_matrix();
    let normal_matrix = model.transform.normal_matrix();
    for vertex in &mut model.mesh.vertices {
        vertex.world_location = world_matrix.multiply_point(vertex.local_location);
        vertex.world_normal = normal_matrix.multiply_direction(vertex.local_normal);
        vertex.location = vertex.world_location;
    }
    for face in &mut model.mesh.faces {
        face.world_normal = normal_matrix.multiply_direction(face.local_normal);
    }
}

/// Run one shader over one model: vertex stage per vertex, geometry stage
/// per face
fn run_pass<S: Shader>(
    shader: &mut S,
    model: &mut Model,
    buffer: &mut ShaderBuffer,
    lights: &[Light],
    frame_buffer: &mut FrameBuffer,
) {
    let Mesh {
        ref mut vertices,
        ref faces,
    } = model.mesh;
    for vertex in vertices.iter_mut() {
        shader.vertex(vertex, buffer);
    }
    for face in faces.iter() {
        shader.geometry(face, vertices, &model.materials, buffer, lights, frame_buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::fixed::from_int;
    use crate::math::FixedVec3;
    use crate::model::{Face, LightType, Material, Mesh, ProjectionType, Vertex};

    fn triangle_model(z: f32, color: i32) -> Model {
        let normal = FixedVec3::new(0, 0, crate::math::FP_ONE);
        let positions = [(-1.0, -1.0, z), (1.0, -1.0, z), (0.0, 1.0, z)];
        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, &(x, y, z))| Vertex::new(i, FixedVec3::from_floats(x, y, z), normal, 0))
            .collect();
        let faces = vec![Face::new(0, 1, 2, 0).with_normal(normal)];
        let material = Material::new("flat").with_color(color);
        Model::new("tri", Mesh::new(vertices, faces), vec![material])
    }

    fn camera_at(z: f32) -> Camera {
        let mut camera = Camera::new(ProjectionType::Perspective);
        camera
            .transform
            .set_location(FixedVec3::from_floats(0.0, 0.0, z));
        camera
    }

    #[test]
    fn test_lit_pass_covers_pixels() {
        let mut scene = Scene::new(camera_at(5.0));
        scene.add_model(triangle_model(0.0, crate::color::pack(200, 0, 0)));
        let mut light = Light::new("sun");
        light.set_light_type(LightType::Directional);
        light
            .transform
            .set_location(FixedVec3::from_floats(0.0, 0.0, 8.0));
        light.has_shadow = false;
        scene.add_light(light);

        let mut renderer = Renderer::new(160, 120);
        renderer.render(&mut scene);
        let covered = renderer
            .frame_buffer
            .depth_buffer
            .pixels()
            .iter()
            .filter(|&&d| d != i32::MAX)
            .count();
        assert!(covered > 0);
    }

    #[test]
    fn test_nearer_triangle_wins_depth_test() {
        let near_color = crate::color::pack(250, 10, 10);
        let far_color = crate::color::pack(10, 240, 10);
        let mut scene = Scene::new(camera_at(5.0));
        // draw the nearer triangle first so the farther one must lose the
        // depth test rather than the paint order
        scene.add_model(triangle_model(1.0, near_color));
        scene.add_model(triangle_model(-2.0, far_color));
        let mut light = Light::new("sun");
        light.set_light_type(LightType::Directional);
        light
            .transform
            .set_location(FixedVec3::from_floats(0.0, 0.0, 8.0));
        light.has_shadow = false;
        scene.add_light(light);

        let mut renderer = Renderer::new(160, 120);
        renderer.render(&mut scene);

        // the screen center is covered by both triangles; green must lose
        let center = renderer.frame_buffer.color_buffer.get_pixel(80, 60);
        assert!(crate::color::red(center) > crate::color::green(center));
    }

    #[test]
    fn test_flat_shader_writes_vertex_light_color() {
        let mut scene = Scene::new(camera_at(5.0));
        scene.add_model(triangle_model(0.0, crate::color::pack(200, 0, 0)));
        let mut light = Light::new("sun");
        light.set_light_type(LightType::Directional);
        light
            .transform
            .set_location(FixedVec3::from_floats(0.0, 0.0, 8.0));
        light.has_shadow = false;
        scene.add_light(light);

        let mut renderer = Renderer::new(160, 120);
        renderer.lit_shader = LitShader::Flat(FlatSpecularShader::new());
        renderer.render(&mut scene);
        assert_ne!(scene.models[0].mesh.vertices[0].light_color, 0);
    }

    #[test]
    fn test_rotating_model_changes_world_locations() {
        let mut model = triangle_model(0.0, crate::color::pack(255, 255, 255));
        apply_world_transform(&mut model);
        let before = model.mesh.vertices[0].world_location;
        model
            .transform
            .set_rotation(FixedVec3::new(0, from_int(90), 0));
        apply_world_transform(&mut model);
        let after = model.mesh.vertices[0].world_location;
        assert_ne!(before, after);
    }
}
