//! Camera, projection type and view frustum

use serde::{Deserialize, Serialize};

use super::transform::Transform;
use crate::math::fixed::{self, FP_ONE};
use crate::math::FixedMat4;

/// Projection carried by a camera or shadow-casting light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionType {
    Orthographic,
    Perspective,
}

/// View frustum: the left/right/top/bottom extents are fractions of the
/// render target (fixed point, `FP_ONE` = full extent); `port_to` turns
/// them into the pixel rectangle the rasterizer culls against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frustum {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
    pub near: i32,
    pub far: i32,
    pub focal_length: i32,
    pub render_target_left: i32,
    pub render_target_right: i32,
    pub render_target_top: i32,
    pub render_target_bottom: i32,
}

impl Frustum {
    pub fn new(near: i32, far: i32) -> Self {
        Self {
            left: 0,
            right: FP_ONE,
            top: 0,
            bottom: FP_ONE,
            near,
            far,
            focal_length: FP_ONE,
            render_target_left: 0,
            render_target_right: 0,
            render_target_top: 0,
            render_target_bottom: 0,
        }
    }

    /// Recompute the pixel rectangle for a render target of the given size
    pub fn port_to(&mut self, width: usize, height: usize) {
        self.render_target_left = fixed::multiply(self.left, width as i32);
        self.render_target_right = fixed::multiply(self.right, width as i32);
        self.render_target_top = fixed::multiply(self.top, height as i32);
        self.render_target_bottom = fixed::multiply(self.bottom, height as i32);
    }

    pub fn render_target_width(&self) -> i32 {
        self.render_target_right - self.render_target_left
    }

    pub fn render_target_height(&self) -> i32 {
        self.render_target_bottom - self.render_target_top
    }
}

impl Default for Frustum {
    fn default() -> Self {
        // near 0.1, far 1000 world units
        Self::new(FP_ONE / 10, FP_ONE * 1000)
    }
}

/// Camera: a transform plus projection parameters
#[derive(Debug, Clone)]
pub struct Camera {
    pub transform: Transform,
    pub projection: ProjectionType,
    pub frustum: Frustum,
}

impl Camera {
    pub fn new(projection: ProjectionType) -> Self {
        Self {
            transform: Transform::new(),
            projection,
            frustum: Frustum::default(),
        }
    }

    /// World-to-camera matrix derived from the camera transform
    pub fn view_matrix(&self) -> FixedMat4 {
        self.transform.view_matrix()
    }

    /// Projection matrix for the current frustum; `port_to` must have been
    /// called with the render target size first
    pub fn projection_matrix(&self) -> FixedMat4 {
        match self.projection {
            ProjectionType::Orthographic => FixedMat4::orthographic(&self.frustum),
            ProjectionType::Perspective => FixedMat4::perspective(&self.frustum),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(ProjectionType::Perspective)
    }
}
