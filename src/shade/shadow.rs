//! Depth-only shadow-mapping pass
//!
//! Runs before the lit pass. For every active shadow-casting light type it
//! projects each triangle into that light's clip/screen space and writes
//! min-wins depths, offset by the light's bias, into the type's shadow map.
//! Point lights render six times, once per cube face.

use super::{Shader, ShaderBuffer};
use crate::math::{screenport, FixedMat4};
use crate::model::{Face, FrameBuffer, Frustum, Light, Material, Vertex};
use crate::raster::{FaceCull, FlatRasterizer, Fragment};

#[derive(Debug, Clone, Copy)]
enum ShadowTarget {
    Directional,
    Spot,
    Point(usize),
}

/// Properties select which light types this shader renders shadows for
#[derive(Debug, Clone)]
pub struct ShadowMappingShader {
    pub directional_shadows: bool,
    pub spot_shadows: bool,
    pub point_shadows: bool,
    target: ShadowTarget,
    bias: i32,
}

impl ShadowMappingShader {
    pub fn new() -> Self {
        Self {
            directional_shadows: true,
            spot_shadows: true,
            point_shadows: true,
            target: ShadowTarget::Directional,
            bias: 0,
        }
    }

    fn draw_depth(
        &mut self,
        face: &Face,
        vertices: &[Vertex],
        matrix: FixedMat4,
        frustum: Frustum,
        frustum_cull: bool,
        buffer: &mut ShaderBuffer,
    ) {
        let locations = face.vertices.map(|index| {
            let world = vertices[index].world_location;
            screenport(matrix.multiply_point(world), &frustum)
        });
        let mut rasterizer = FlatRasterizer::new();
        rasterizer.set_frustum_cull(frustum_cull);
        rasterizer.set_face_cull(FaceCull::Front);
        rasterizer.draw(locations, &frustum, |fragment| {
            self.depth_write(fragment, buffer);
        });
    }

    fn depth_write(&self, fragment: &Fragment, buffer: &mut ShaderBuffer) {
        let map = match self.target {
            ShadowTarget::Directional => &mut buffer.directional_shadow_map,
            ShadowTarget::Spot => &mut buffer.spot_shadow_map,
            ShadowTarget::Point(face) => &mut buffer.point_shadow_maps[face],
        };
        let z = fragment.z + self.bias;
        if map.get_pixel(fragment.x, fragment.y) > z {
            map.set_pixel(fragment.x, fragment.y, z);
        }
    }
}

impl Default for ShadowMappingShader {
    fn default() -> Self {
        Self::new()
    }
}

impl Shader for ShadowMappingShader {
    fn vertex(&mut self, _vertex: &mut Vertex, _buffer: &ShaderBuffer) {}

    fn geometry(
        &mut self,
        face: &Face,
        vertices: &mut [Vertex],
        _materials: &[Material],
        buffer: &mut ShaderBuffer,
        lights: &[Light],
        _frame_buffer: &mut FrameBuffer,
    ) {
        if self.directional_shadows {
            if let Some(index) = buffer.directional_index {
                self.bias = lights[index].shadow_bias();
                self.target = ShadowTarget::Directional;
                let matrix = buffer.directional_matrix;
                let frustum = buffer.directional_frustum;
                self.draw_depth(face, vertices, matrix, frustum, false, buffer);
            }
        }
        if self.spot_shadows {
            if let Some(index) = buffer.spot_index {
                self.bias = lights[index].shadow_bias();
                self.target = ShadowTarget::Spot;
                let matrix = buffer.spot_matrix;
                let frustum = buffer.spot_frustum;
                self.draw_depth(face, vertices, matrix, frustum, true, buffer);
            }
        }
        if self.point_shadows {
            if let Some(index) = buffer.point_index {
                self.bias = lights[index].shadow_bias();
                let frustum = buffer.point_frustum;
                for cube_face in 0..buffer.point_matrices.len() {
                    self.target = ShadowTarget::Point(cube_face);
                    let matrix = buffer.point_matrices[cube_face];
                    self.draw_depth(face, vertices, matrix, frustum, true, buffer);
                }
            }
        }
    }

    fn fragment(
        &mut self,
        fragment: &Fragment,
        _materials: &[Material],
        buffer: &mut ShaderBuffer,
        _lights: &[Light],
        _frame_buffer: &mut FrameBuffer,
    ) {
        self.depth_write(fragment, buffer);
    }
}
