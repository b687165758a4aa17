//! Per-face lit pass
//!
//! The whole lighting model is evaluated once per triangle at its centroid
//! with the face normal, then every covered pixel reuses the result. Much
//! cheaper than the per-fragment pass; shadow maps are not sampled.

use super::{attenuation_divisor, light_factor, Shader, ShaderBuffer, LIGHT_RANGE};
use crate::color;
use crate::math::fixed::{self, FP_ONE};
use crate::math::{screenport, FixedVec3};
use crate::model::{Face, FrameBuffer, Light, LightType, Material, Vertex};
use crate::raster::{AffineRasterizer, FaceCull, Fragment};

const UV_X: usize = 0;
const UV_Y: usize = 1;

#[derive(Debug, Clone, Default)]
pub struct FlatSpecularShader {
    light_color: i32,
    light_factor: i32,
    model_color: i32,
    textured: bool,
}

impl FlatSpecularShader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Shader for FlatSpecularShader {
    fn vertex(&mut self, vertex: &mut Vertex, buffer: &ShaderBuffer) {
        vertex.reset();
        let mut location = buffer.view_matrix.multiply_point(vertex.location);
        location = buffer.projection_matrix.multiply_point(location);
        vertex.location = screenport(location, &buffer.camera_frustum);
    }

    fn geometry(
        &mut self,
        face: &Face,
        vertices: &mut [Vertex],
        materials: &[Material],
        buffer: &mut ShaderBuffer,
        lights: &[Light],
        frame_buffer: &mut FrameBuffer,
    ) {
        let material = &materials[face.material];
        let indices = face.vertices;
        let world = indices.map(|index| vertices[index].world_location);
        let centroid = FixedVec3::new(
            (world[0].x + world[1].x + world[2].x) / 3,
            (world[0].y + world[1].y + world[2].y) / 3,
            (world[0].z + world[1].z + world[2].z) / 3,
        );
        let normal = face.world_normal.normalize();
        let view_direction = (buffer.camera_location - centroid).normalize();

        self.light_color = color::WHITE;
        self.light_factor = 0;
        for light in lights {
            if buffer.camera_location.distance(light.transform.location()) > LIGHT_RANGE {
                continue;
            }
            let mut current_factor = 0;
            match light.light_type() {
                LightType::Directional => {
                    let light_direction = light.direction().invert();
                    current_factor =
                        light_factor(normal, light_direction, view_direction, material);
                }
                LightType::Point => {
                    let to_light = light.transform.location() - centroid;
                    let attenuation = attenuation_divisor(light, to_light.magnitude());
                    let light_direction = to_light.normalize();
                    current_factor =
                        light_factor(normal, light_direction, view_direction, material);
                    current_factor =
                        (((current_factor as i64) << 8) / attenuation as i64) as i32;
                }
                LightType::Spot => {
                    let forward = light.direction().invert();
                    let to_light = light.transform.location() - centroid;
                    let attenuation = attenuation_divisor(light, to_light.magnitude());
                    let to_light = to_light.normalize();
                    let theta = to_light.dot(forward);
                    if theta > light.spot_size_cos() {
                        let intensity = fixed::clamp(
                            -fixed::divide(light.spot_size_cos() - theta, light.spot_softness()),
                            1,
                            FP_ONE,
                        );
                        current_factor = light_factor(normal, to_light, view_direction, material);
                        current_factor = fixed::multiply(current_factor, intensity);
                        current_factor =
                            (((current_factor as i64) << 8) / attenuation as i64) as i32;
                    }
                }
            }
            current_factor = fixed::multiply(current_factor, light.intensity);
            self.light_color = color::lerp(self.light_color, light.color, current_factor);
            self.light_factor += current_factor;
        }

        self.model_color = color::lerp(color::BLACK, material.diffuse_color, self.light_factor);
        self.model_color = color::multiply_color(self.model_color, self.light_color);
        for &index in &indices {
            vertices[index].light_color = self.light_color;
        }

        let mut rasterizer = AffineRasterizer::new();
        rasterizer.set_face_cull(FaceCull::Back);
        rasterizer.set_fragment_shade(self.light_color, face.material);
        self.textured = material.texture.is_some();
        if let Some(texture) = &material.texture {
            rasterizer.set_varying_count(2);
            let width = texture.width() as i32 - 1;
            let height = texture.height() as i32 - 1;
            rasterizer.set_varying(
                UV_X,
                [
                    fixed::multiply(face.uvs[0][0], width),
                    fixed::multiply(face.uvs[1][0], width),
                    fixed::multiply(face.uvs[2][0], width),
                ],
            );
            rasterizer.set_varying(
                UV_Y,
                [
                    fixed::multiply(face.uvs[0][1], height),
                    fixed::multiply(face.uvs[1][1], height),
                    fixed::multiply(face.uvs[2][1], height),
                ],
            );
        }

        let locations = indices.map(|index| vertices[index].location);
        let frustum = buffer.camera_frustum;
        rasterizer.draw(locations, &frustum, |fragment| {
            self.fragment(fragment, materials, buffer, lights, frame_buffer);
        });
    }

    fn fragment(
        &mut self,
        fragment: &Fragment,
        materials: &[Material],
        _buffer: &mut ShaderBuffer,
        _lights: &[Light],
        frame_buffer: &mut FrameBuffer,
    ) {
        let color = if self.textured {
            let material = &materials[fragment.material];
            match &material.texture {
                Some(texture) => {
                    let texel =
                        texture.get_pixel(fragment.varyings[UV_X], fragment.varyings[UV_Y]);
                    if color::alpha(texel) == 0 {
                        return;
                    }
                    let lit = color::lerp(color::BLACK, texel, self.light_factor);
                    color::multiply_color(lit, self.light_color)
                }
                None => self.model_color,
            }
        } else {
            self.model_color
        };
        frame_buffer.set_pixel(fragment.x, fragment.y, fragment.z, color);
    }
}
