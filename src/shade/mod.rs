//! Shader pipeline: staged vertex/geometry/fragment programs
//!
//! The driver invokes the stages in a fixed order per model per frame:
//! `vertex` once per mesh vertex, `geometry` once per triangle, and
//! `fragment` only ever through a rasterizer from inside `geometry`.
//! All shared per-frame state travels in an explicit [`ShaderBuffer`]
//! value; there is no global render context. Stages reuse scratch state
//! inside the shader values and must not be called reentrantly.

mod buffer;
mod flat_specular;
mod phong_specular;
mod shadow;

pub use buffer::ShaderBuffer;
pub use flat_specular::FlatSpecularShader;
pub use phong_specular::PhongSpecularShader;
pub use shadow::ShadowMappingShader;

use crate::math::fixed::{self, FP_BIT, FP_ONE};
use crate::math::FixedVec3;
use crate::model::{Face, FrameBuffer, Light, Material, Vertex};
use crate::raster::Fragment;

/// Lights farther than this from the camera are ignored entirely. The
/// check uses the light's position even for directional lights; that is
/// long-standing behavior other code depends on, so it stays.
pub const LIGHT_RANGE: i32 = FP_ONE * 1000;

/// A light factor of this value lerps a surface all the way to fully lit
pub const FULL_LIGHT: i32 = 256;

pub trait Shader {
    /// Transform one vertex; called once per mesh vertex, before geometry
    fn vertex(&mut self, vertex: &mut Vertex, buffer: &ShaderBuffer);

    /// Set up and rasterize one triangle; called once per face
    fn geometry(
        &mut self,
        face: &Face,
        vertices: &mut [Vertex],
        materials: &[Material],
        buffer: &mut ShaderBuffer,
        lights: &[Light],
        frame_buffer: &mut FrameBuffer,
    );

    /// Shade one covered pixel; invoked exclusively by a rasterizer
    fn fragment(
        &mut self,
        fragment: &Fragment,
        materials: &[Material],
        buffer: &mut ShaderBuffer,
        lights: &[Light],
        frame_buffer: &mut FrameBuffer,
    );
}

/// Phong diffuse + specular factor for one light, on the 0..=256 scale
/// where [`FULL_LIGHT`] saturates the unlit-to-lit lerp
pub(crate) fn light_factor(
    normal: FixedVec3,
    light_direction: FixedVec3,
    view_direction: FixedVec3,
    material: &Material,
) -> i32 {
    let diffuse = normal.dot(light_direction).max(0);
    let diffuse = fixed::multiply(diffuse, material.diffuse_intensity);
    let reflected = light_direction.invert().reflect(normal);
    let specular = view_direction.dot(reflected).max(0);
    let specular = fixed::pow(specular, material.shininess >> FP_BIT);
    let specular = fixed::multiply(specular, material.specular_intensity);
    (((diffuse + specular) as i64) << 8 >> FP_BIT) as i32
}

/// Distance attenuation `constant + linear*d + quadratic*d²` as a divisor
/// on the 256 scale, never below one
pub(crate) fn attenuation_divisor(light: &Light, distance: i32) -> i32 {
    let mut attenuation = light.constant_attenuation;
    attenuation += fixed::multiply(distance, light.linear_attenuation);
    attenuation += fixed::multiply(
        fixed::multiply(distance, distance),
        light.quadratic_attenuation,
    );
    (((attenuation as i64) << 8) >> FP_BIT) as i32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::fixed::from_int;

    #[test]
    fn test_head_on_diffuse_saturates() {
        // unit intensity, dot(N,L) = 1, no specular: the factor reaches
        // exactly the full-light lerp value
        let mut material = Material::new("m");
        material.specular_intensity = 0;
        let normal = FixedVec3::new(0, 0, FP_ONE);
        let light = FixedVec3::new(0, 0, FP_ONE);
        let view = FixedVec3::new(0, 0, FP_ONE);
        assert_eq!(light_factor(normal, light, view, &material), FULL_LIGHT);
    }

    #[test]
    fn test_grazing_light_contributes_nothing() {
        let mut material = Material::new("m");
        material.specular_intensity = 0;
        let normal = FixedVec3::new(0, 0, FP_ONE);
        let light = FixedVec3::new(FP_ONE, 0, 0);
        let view = FixedVec3::new(0, 0, FP_ONE);
        assert_eq!(light_factor(normal, light, view, &material), 0);
    }

    #[test]
    fn test_specular_peaks_along_reflection() {
        let mut material = Material::new("m");
        material.diffuse_intensity = 0;
        material.specular_intensity = FP_ONE;
        material.shininess = from_int(4);
        let normal = FixedVec3::new(0, 0, FP_ONE);
        let light = FixedVec3::new(0, 0, FP_ONE);
        // view straight along the reflection of -L about N
        let aligned = light_factor(normal, light, FixedVec3::new(0, 0, FP_ONE), &material);
        let offset = light_factor(
            normal,
            light,
            FixedVec3::from_floats(0.6, 0.0, 0.8),
            &material,
        );
        assert!(aligned > offset);
    }

    #[test]
    fn test_attenuation_divisor_monotonic() {
        let light = Light::new("p");
        let mut previous = 0;
        for step in 0..20 {
            let divisor = attenuation_divisor(&light, from_int(step * 5));
            assert!(divisor >= previous);
            assert!(divisor >= 1);
            previous = divisor;
        }
    }
}
