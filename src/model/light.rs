//! Light sources
//!
//! The forward direction is derived from the transform's rotation and
//! cached together with the rotation it was computed for; callers refresh
//! it once per frame (the renderer does this before any pass) and read the
//! cached value everywhere else.

use serde::{Deserialize, Serialize};

use super::transform::{Transform, TransformDesc};
use crate::color;
use crate::math::fixed::{self, FP_ONE};
use crate::math::FixedVec3;

/// Depth units added at shadow-map write time to counter acne; 328 depth
/// units equal one world unit at the standard light far plane
pub const DIRECTIONAL_BIAS: i32 = 164;
pub const SPOT_BIAS: i32 = 82;
pub const POINT_BIAS: i32 = 115;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightType {
    Directional,
    Point,
    Spot,
}

#[derive(Debug, Clone)]
pub struct Light {
    pub name: String,
    pub transform: Transform,
    light_type: LightType,
    pub intensity: i32,
    pub color: i32,
    pub ambient_color: i32,
    pub shadow_color: i32,
    direction: FixedVec3,
    direction_rotation: FixedVec3,
    spot_size: i32,
    spot_size_cos: i32,
    inner_spot_size: i32,
    inner_spot_size_cos: i32,
    spot_softness: i32,
    pub constant_attenuation: i32,
    pub linear_attenuation: i32,
    pub quadratic_attenuation: i32,
    shadow_bias: i32,
    pub has_shadow: bool,
    pub is_main: bool,
}

impl Light {
    pub fn new(name: &str) -> Self {
        let mut light = Self {
            name: name.to_string(),
            transform: Transform::new(),
            light_type: LightType::Directional,
            intensity: FP_ONE,
            color: color::WHITE,
            ambient_color: color::pack(30, 30, 30),
            shadow_color: color::pack(30, 30, 30),
            direction: FixedVec3::FORWARD,
            direction_rotation: FixedVec3::ZERO,
            spot_size: 0,
            spot_size_cos: 0,
            inner_spot_size: 0,
            inner_spot_size_cos: 0,
            spot_softness: 1,
            constant_attenuation: fixed::to_fixed(1.0),
            linear_attenuation: fixed::to_fixed(0.09),
            quadratic_attenuation: fixed::to_fixed(0.032),
            shadow_bias: DIRECTIONAL_BIAS,
            has_shadow: true,
            is_main: false,
        };
        light.set_spot_size(fixed::from_int(45));
        light.set_inner_spot_size(fixed::from_int(35));
        light
    }

    pub fn light_type(&self) -> LightType {
        self.light_type
    }

    /// Change the light type; a shadow bias still at a type default follows
    /// the new type
    pub fn set_light_type(&mut self, light_type: LightType) {
        self.light_type = light_type;
        if self.has_default_bias() {
            self.shadow_bias = match light_type {
                LightType::Directional => DIRECTIONAL_BIAS,
                LightType::Spot => SPOT_BIAS,
                LightType::Point => POINT_BIAS,
            };
        }
    }

    fn has_default_bias(&self) -> bool {
        self.shadow_bias == DIRECTIONAL_BIAS
            || self.shadow_bias == SPOT_BIAS
            || self.shadow_bias == POINT_BIAS
    }

    pub fn shadow_bias(&self) -> i32 {
        self.shadow_bias
    }

    pub fn set_shadow_bias(&mut self, bias: i32) {
        self.shadow_bias = bias;
    }

    /// Cached forward direction; only valid after [`Light::refresh_direction`]
    /// has run for the current rotation
    pub fn direction(&self) -> FixedVec3 {
        self.direction
    }

    /// Recompute the cached direction if the rotation changed since it was
    /// last derived
    pub fn refresh_direction(&mut self) {
        let rotation = self.transform.rotation();
        if rotation != self.direction_rotation {
            self.direction_rotation = rotation;
            self.direction = self.transform.forward();
        }
    }

    /// Full outer cone angle, fixed-point degrees
    pub fn spot_size(&self) -> i32 {
        self.spot_size
    }

    pub fn set_spot_size(&mut self, degrees: i32) {
        self.spot_size = degrees;
        // half angle, so the size spans the whole cone
        self.spot_size_cos = fixed::cos(degrees >> 1);
        self.recalculate_softness();
    }

    pub fn spot_size_cos(&self) -> i32 {
        self.spot_size_cos
    }

    pub fn inner_spot_size(&self) -> i32 {
        self.inner_spot_size
    }

    pub fn set_inner_spot_size(&mut self, degrees: i32) {
        self.inner_spot_size = degrees;
        self.inner_spot_size_cos = fixed::cos(degrees >> 1);
        self.recalculate_softness();
    }

    pub fn inner_spot_size_cos(&self) -> i32 {
        self.inner_spot_size_cos
    }

    /// Cosine span of the soft cone edge, never zero
    pub fn spot_softness(&self) -> i32 {
        self.spot_softness
    }

    fn recalculate_softness(&mut self) {
        self.spot_softness = (self.inner_spot_size_cos - self.spot_size_cos) + 1;
    }
}

/// Float-unit light description for scene files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightDesc {
    pub name: String,
    pub light_type: LightType,
    pub transform: TransformDesc,
    #[serde(default = "default_one")]
    pub intensity: f32,
    #[serde(default = "default_white")]
    pub color: [u8; 3],
    #[serde(default)]
    pub has_shadow: bool,
    #[serde(default)]
    pub is_main: bool,
}

fn default_one() -> f32 {
    1.0
}

fn default_white() -> [u8; 3] {
    [255, 255, 255]
}

impl LightDesc {
    pub fn to_light(&self) -> Light {
        let mut light = Light::new(&self.name);
        light.set_light_type(self.light_type);
        light.transform = self.transform.to_transform();
        light.intensity = fixed::to_fixed(self.intensity);
        light.color = color::pack(
            self.color[0] as i32,
            self.color[1] as i32,
            self.color[2] as i32,
        );
        light.has_shadow = self.has_shadow;
        light.is_main = self.is_main;
        light.refresh_direction();
        light
    }
}
