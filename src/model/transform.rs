//! Location/rotation/scale with cached matrices
//!
//! The world, normal and view matrices are recomputed on every setter call,
//! never on read, so reads stay borrow-free in the hot path. Callers that
//! mutate components directly must go through the setters.

use crate::math::fixed;
use crate::math::{FixedMat4, FixedVec3};

#[derive(Debug, Clone)]
pub struct Transform {
    location: FixedVec3,
    rotation: FixedVec3,
    scale: FixedVec3,
    world_matrix: FixedMat4,
    normal_matrix: FixedMat4,
    view_matrix: FixedMat4,
}

impl Transform {
    pub fn new() -> Self {
        let mut transform = Self {
            location: FixedVec3::ZERO,
            rotation: FixedVec3::ZERO,
            scale: FixedVec3::ONE,
            world_matrix: FixedMat4::IDENTITY,
            normal_matrix: FixedMat4::IDENTITY,
            view_matrix: FixedMat4::IDENTITY,
        };
        transform.recalculate();
        transform
    }

    pub fn with_location(location: FixedVec3) -> Self {
        let mut transform = Self::new();
        transform.set_location(location);
        transform
    }

    pub fn location(&self) -> FixedVec3 {
        self.location
    }

    pub fn rotation(&self) -> FixedVec3 {
        self.rotation
    }

    pub fn scale(&self) -> FixedVec3 {
        self.scale
    }

    pub fn set_location(&mut self, location: FixedVec3) {
        self.location = location;
        self.recalculate();
    }

    pub fn set_rotation(&mut self, rotation: FixedVec3) {
        self.rotation = rotation;
        self.recalculate();
    }

    pub fn set_scale(&mut self, scale: FixedVec3) {
        self.scale = scale;
        self.recalculate();
    }

    pub fn translate(&mut self, delta: FixedVec3) {
        self.set_location(self.location + delta);
    }

    /// Rotate by fixed-point degree deltas around each axis
    pub fn rotate(&mut self, delta: FixedVec3) {
        self.set_rotation(self.rotation + delta);
    }

    /// Local-to-world matrix: scale, rotate X then Y then Z, translate
    pub fn world_matrix(&self) -> FixedMat4 {
        self.world_matrix
    }

    /// World matrix without translation, for transforming normals
    pub fn normal_matrix(&self) -> FixedMat4 {
        self.normal_matrix
    }

    /// World-to-local matrix, ignoring scale: the camera/light view matrix
    pub fn view_matrix(&self) -> FixedMat4 {
        self.view_matrix
    }

    fn recalculate(&mut self) {
        let scale = FixedMat4::scale(self.scale);
        let rotate_x = FixedMat4::rotation_x(self.rotation.x);
        let rotate_y = FixedMat4::rotation_y(self.rotation.y);
        let rotate_z = FixedMat4::rotation_z(self.rotation.z);
        let translate = FixedMat4::translation(self.location);

        let rotation = FixedMat4::multiply(&rotate_z, &FixedMat4::multiply(&rotate_y, &rotate_x));
        self.normal_matrix = FixedMat4::multiply(&rotation, &scale);
        self.world_matrix = FixedMat4::multiply(&translate, &self.normal_matrix);

        let inverse_translate = FixedMat4::translation(self.location.invert());
        let inverse_rotation = FixedMat4::multiply(
            &FixedMat4::rotation_x(-self.rotation.x),
            &FixedMat4::multiply(
                &FixedMat4::rotation_y(-self.rotation.y),
                &FixedMat4::rotation_z(-self.rotation.z),
            ),
        );
        self.view_matrix = FixedMat4::multiply(&inverse_rotation, &inverse_translate);
    }

    /// The direction this transform faces, derived from its rotation
    pub fn forward(&self) -> FixedVec3 {
        FixedVec3::FORWARD
            .rotate_x(self.rotation.x)
            .rotate_y(self.rotation.y)
            .rotate_z(self.rotation.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of a transform in float units for scene files
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TransformDesc {
    pub location: [f32; 3],
    pub rotation: [f32; 3],
    #[serde(default = "one_scale")]
    pub scale: [f32; 3],
}

fn one_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl TransformDesc {
    pub fn to_transform(&self) -> Transform {
        let mut transform = Transform::new();
        transform.set_location(FixedVec3::from_floats(
            self.location[0],
            self.location[1],
            self.location[2],
        ));
        transform.set_rotation(FixedVec3::from_floats(
            self.rotation[0],
            self.rotation[1],
            self.rotation[2],
        ));
        transform.set_scale(FixedVec3::from_floats(
            self.scale[0],
            self.scale[1],
            self.scale[2],
        ));
        transform
    }

    pub fn from_transform(transform: &Transform) -> Self {
        let location = transform.location();
        let rotation = transform.rotation();
        let scale = transform.scale();
        Self {
            location: [
                fixed::to_float(location.x),
                fixed::to_float(location.y),
                fixed::to_float(location.z),
            ],
            rotation: [
                fixed::to_float(rotation.x),
                fixed::to_float(rotation.y),
                fixed::to_float(rotation.z),
            ],
            scale: [
                fixed::to_float(scale.x),
                fixed::to_float(scale.y),
                fixed::to_float(scale.z),
            ],
        }
    }
}
