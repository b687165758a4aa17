//! Per-fragment Phong lit pass
//!
//! The vertex stage projects each vertex into camera screen space and into
//! every active shadow light's space, stashing the light-space positions by
//! vertex index. The geometry stage feeds world positions, normals, view
//! directions, texture coordinates and light-space positions through the
//! affine rasterizer's varying channels; the fragment stage evaluates the
//! full lighting model per pixel and performs the depth-tested write.

use super::{attenuation_divisor, light_factor, Shader, ShaderBuffer, LIGHT_RANGE};
use crate::color;
use crate::math::fixed::{self, FP_ONE};
use crate::math::{screenport, FixedVec3};
use crate::model::{Face, FrameBuffer, Light, LightType, Material, Texture, Vertex};
use crate::raster::{AffineRasterizer, FaceCull, Fragment};

// varying channel layout
const UV_X: usize = 0;
const UV_Y: usize = 1;
const LOCATION: usize = 2;
const NORMAL: usize = 5;
const VIEW: usize = 8;
const DIRECTIONAL: usize = 11;
const SPOT: usize = 14;
const VARYING_COUNT: usize = 17;

/// Spot shadow sampling is skipped below this factor, where the cone
/// contributes nothing visible
const SPOT_SHADOW_THRESHOLD: i32 = 10;

#[derive(Debug, Clone, Default)]
pub struct PhongSpecularShader {
    // per-vertex light-space positions, indexed by vertex index
    directional_locations: Vec<FixedVec3>,
    spot_locations: Vec<FixedVec3>,
}

impl PhongSpecularShader {
    pub fn new() -> Self {
        Self::default()
    }

    fn in_shadow(location: FixedVec3, shadow_map: &Texture) -> bool {
        let x = fixed::clamp(location.x, 0, shadow_map.width() as i32 - 1);
        let y = fixed::clamp(location.y, 0, shadow_map.height() as i32 - 1);
        shadow_map.get_pixel(x, y) < location.z
    }

    fn varying_vector(fragment: &Fragment, channel: usize) -> FixedVec3 {
        FixedVec3::new(
            fragment.varyings[channel],
            fragment.varyings[channel + 1],
            fragment.varyings[channel + 2],
        )
    }
}

fn set_vector_varying(rasterizer: &mut AffineRasterizer, base: usize, values: [FixedVec3; 3]) {
    rasterizer.set_varying(base, [values[0].x, values[1].x, values[2].x]);
    rasterizer.set_varying(base + 1, [values[0].y, values[1].y, values[2].y]);
    rasterizer.set_varying(base + 2, [values[0].z, values[1].z, values[2].z]);
}

impl Shader for PhongSpecularShader {
    fn vertex(&mut self, vertex: &mut Vertex, buffer: &ShaderBuffer) {
        vertex.reset();
        vertex.world_normal = vertex.world_normal.normalize();

        if self.directional_locations.len() <= vertex.index {
            self.directional_locations
                .resize(vertex.index + 1, FixedVec3::ZERO);
            self.spot_locations.resize(vertex.index + 1, FixedVec3::ZERO);
        }
        if buffer.directional_index.is_some() {
            let projected = buffer
                .directional_matrix
                .multiply_point(vertex.world_location);
            self.directional_locations[vertex.index] =
                screenport(projected, &buffer.directional_frustum);
        }
        if buffer.spot_index.is_some() {
            let projected = buffer.spot_matrix.multiply_point(vertex.world_location);
            self.spot_locations[vertex.index] = screenport(projected, &buffer.spot_frustum);
        }

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
        let mut rasterizer = AffineRasterizer::new();
        rasterizer.set_face_cull(FaceCull::Back);
        rasterizer.set_varying_count(VARYING_COUNT);
        rasterizer.set_fragment_shade(color::WHITE, face.material);

        // texture coordinates scaled into texel space for interpolation
        if let Some(texture) = &material.texture {
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

        let indices = face.vertices;
        let locations = indices.map(|index| vertices[index].location);
        let world = indices.map(|index| vertices[index].world_location);
        let normals = indices.map(|index| vertices[index].world_normal);
        let views = world.map(|w| (buffer.camera_location - w).normalize());
        let directional = indices.map(|index| self.directional_locations[index]);
        let spot = indices.map(|index| self.spot_locations[index]);
        set_vector_varying(&mut rasterizer, LOCATION, world);
        set_vector_varying(&mut rasterizer, NORMAL, normals);
        set_vector_varying(&mut rasterizer, VIEW, views);
        set_vector_varying(&mut rasterizer, DIRECTIONAL, directional);
        set_vector_varying(&mut rasterizer, SPOT, spot);

        let frustum = buffer.camera_frustum;
        rasterizer.draw(locations, &frustum, |fragment| {
            self.fragment(fragment, materials, buffer, lights, frame_buffer);
        });
    }

    fn fragment(
        &mut self,
        fragment: &Fragment,
        materials: &[Material],
        buffer: &mut ShaderBuffer,
        lights: &[Light],
        frame_buffer: &mut FrameBuffer,
    ) {
        let material = &materials[fragment.material];
        let world_location = Self::varying_vector(fragment, LOCATION);
        let normal = Self::varying_vector(fragment, NORMAL);
        let view_direction = Self::varying_vector(fragment, VIEW);
        let directional_location = Self::varying_vector(fragment, DIRECTIONAL);
        let spot_location = Self::varying_vector(fragment, SPOT);

        let mut light_color = color::WHITE;
        let mut total_factor = 0;

        for (index, light) in lights.iter().enumerate() {
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
                    let to_light = light.transform.location() - world_location;
                    let attenuation = attenuation_divisor(light, to_light.magnitude());
                    let light_direction = to_light.normalize();
                    current_factor =
                        light_factor(normal, light_direction, view_direction, material);
                    current_factor =
                        (((current_factor as i64) << 8) / attenuation as i64) as i32;
                }
                LightType::Spot => {
                    let forward = light.direction().invert();
                    let to_light = light.transform.location() - world_location;
                    let attenuation = attenuation_divisor(light, to_light.magnitude());
                    let to_light = to_light.normalize();
                    let theta = to_light.dot(forward);
                    let phi = light.spot_size_cos();
                    if theta > phi {
                        let intensity = fixed::clamp(
                            -fixed::divide(phi - theta, light.spot_softness()),
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

            let mut in_shadow = false;
            if buffer.directional_index == Some(index) {
                in_shadow = Self::in_shadow(directional_location, &buffer.directional_shadow_map);
            } else if buffer.spot_index == Some(index) && current_factor > SPOT_SHADOW_THRESHOLD {
                in_shadow = Self::in_shadow(spot_location, &buffer.spot_shadow_map);
            }
            if in_shadow {
                light_color = color::lerp(light_color, light.shadow_color, 128);
            } else {
                light_color = color::lerp(light_color, light.color, current_factor);
                total_factor += current_factor;
            }
        }

        let mut model_color = if let Some(texture) = &material.texture {
            let texel = texture.get_pixel(fragment.varyings[UV_X], fragment.varyings[UV_Y]);
            // discard fully transparent texels
            if color::alpha(texel) == 0 {
                return;
            }
            texel
        } else {
            material.diffuse_color
        };
        model_color = color::lerp(color::BLACK, model_color, total_factor);
        model_color = color::multiply_color(model_color, light_color);
        frame_buffer.set_pixel(fragment.x, fragment.y, fragment.z, model_color);
    }
}
