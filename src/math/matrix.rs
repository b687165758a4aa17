//! Fixed-point 4x4 matrices
//!
//! Row-major layout with row vectors: points transform as `v' = v * M`,
//! translation lives in row 3. Composed transforms therefore read left to
//! right: `multiply(b, a)` applies `a` first, then `b` — the same argument
//! order the projection * view compositions use.

use super::fixed::{self, FP_ONE};
use super::vector::FixedVec3;
use crate::model::Frustum;

/// 4x4 matrix of fixed-point scalars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMat4 {
    pub m: [[i32; 4]; 4],
}

impl FixedMat4 {
    pub const IDENTITY: FixedMat4 = FixedMat4 {
        m: [
            [FP_ONE, 0, 0, 0],
            [0, FP_ONE, 0, 0],
            [0, 0, FP_ONE, 0],
            [0, 0, 0, FP_ONE],
        ],
    };

    /// Compose two transforms: the result applies `second` first, then `first`
    pub fn multiply(first: &FixedMat4, second: &FixedMat4) -> FixedMat4 {
        let mut result = [[0i32; 4]; 4];
        for row in 0..4 {
            for column in 0..4 {
                let mut sum = 0i64;
                for k in 0..4 {
                    sum += second.m[row][k] as i64 * first.m[k][column] as i64;
                }
                result[row][column] = (sum >> fixed::FP_BIT) as i32;
            }
        }
        FixedMat4 { m: result }
    }

    /// Transform a point, treating it as `(x, y, z, 1)` and dividing through
    /// by the resulting w. Affine matrices leave w at one, so the divide is
    /// the identity there; projection matrices produce the perspective
    /// divide. A zero w is substituted with one.
    pub fn multiply_point(&self, point: FixedVec3) -> FixedVec3 {
        let px = point.x as i64;
        let py = point.y as i64;
        let pz = point.z as i64;
        let mut out = [0i64; 4];
        for (column, value) in out.iter_mut().enumerate() {
            *value = (px * self.m[0][column] as i64
                + py * self.m[1][column] as i64
                + pz * self.m[2][column] as i64
                + ((self.m[3][column] as i64) << fixed::FP_BIT))
                >> fixed::FP_BIT;
        }
        let mut w = saturate(out[3]);
        if w == 0 {
            w = 1;
        }
        if w == FP_ONE {
            FixedVec3::new(saturate(out[0]), saturate(out[1]), saturate(out[2]))
        } else {
            FixedVec3 {
                x: fixed::divide(saturate(out[0]), w),
                y: fixed::divide(saturate(out[1]), w),
                z: fixed::divide(saturate(out[2]), w),
            }
        }
    }

    /// Transform a direction: rotation and scale only, no translation, no w
    pub fn multiply_direction(&self, direction: FixedVec3) -> FixedVec3 {
        let dx = direction.x as i64;
        let dy = direction.y as i64;
        let dz = direction.z as i64;
        let mut out = [0i32; 3];
        for (column, value) in out.iter_mut().enumerate() {
            *value = ((dx * self.m[0][column] as i64
                + dy * self.m[1][column] as i64
                + dz * self.m[2][column] as i64)
                >> fixed::FP_BIT) as i32;
        }
        FixedVec3::new(out[0], out[1], out[2])
    }

    pub fn translation(vector: FixedVec3) -> FixedMat4 {
        let mut matrix = FixedMat4::IDENTITY;
        matrix.m[3][0] = vector.x;
        matrix.m[3][1] = vector.y;
        matrix.m[3][2] = vector.z;
        matrix
    }

    pub fn scale(vector: FixedVec3) -> FixedMat4 {
        let mut matrix = FixedMat4::IDENTITY;
        matrix.m[0][0] = vector.x;
        matrix.m[1][1] = vector.y;
        matrix.m[2][2] = vector.z;
        matrix
    }

    pub fn rotation_x(angle: i32) -> FixedMat4 {
        let cos = fixed::cos(angle);
        let sin = fixed::sin(angle);
        let mut matrix = FixedMat4::IDENTITY;
        matrix.m[1][1] = cos;
        matrix.m[1][2] = sin;
        matrix.m[2][1] = -sin;
        matrix.m[2][2] = cos;
        matrix
    }

    pub fn rotation_y(angle: i32) -> FixedMat4 {
        let cos = fixed::cos(angle);
        let sin = fixed::sin(angle);
        let mut matrix = FixedMat4::IDENTITY;
        matrix.m[0][0] = cos;
        matrix.m[0][2] = -sin;
        matrix.m[2][0] = sin;
        matrix.m[2][2] = cos;
        matrix
    }

    pub fn rotation_z(angle: i32) -> FixedMat4 {
        let cos = fixed::cos(angle);
        let sin = fixed::sin(angle);
        let mut matrix = FixedMat4::IDENTITY;
        matrix.m[0][0] = cos;
        matrix.m[0][1] = -sin;
        matrix.m[1][0] = sin;
        matrix.m[1][1] = cos;
        matrix
    }

    /// Orthographic projection against a pixel-ported frustum
    pub fn orthographic(frustum: &Frustum) -> FixedMat4 {
        let scale_factor = fixed::multiply(
            frustum.focal_length,
            frustum.render_target_bottom - frustum.render_target_top + 1,
        );
        let mut matrix = FixedMat4::IDENTITY;
        matrix.m[0][0] = scale_factor >> 5;
        matrix.m[1][1] = -scale_factor >> 5;
        matrix.m[2][2] = -fixed::divide(FP_ONE, frustum.far);
        matrix.m[3][2] = -fixed::divide(frustum.near, frustum.far);
        matrix.m[3][3] = FP_ONE;
        matrix
    }

    /// Perspective projection against a pixel-ported frustum
    pub fn perspective(frustum: &Frustum) -> FixedMat4 {
        let far_near = frustum.far - frustum.near;
        let scale_factor = fixed::multiply(
            frustum.focal_length,
            frustum.render_target_bottom - frustum.render_target_top + 1,
        );
        let mut matrix = FixedMat4::IDENTITY;
        matrix.m[0][0] = scale_factor;
        matrix.m[1][1] = -scale_factor;
        matrix.m[2][2] = -fixed::divide(frustum.far, far_near);
        matrix.m[3][2] = -fixed::divide(fixed::multiply(frustum.near, frustum.far), far_near);
        matrix.m[2][3] = -FP_ONE;
        matrix.m[3][3] = 0;
        matrix
    }
}

fn saturate(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Map a projected point into pixel coordinates by recentering on the
/// render target ("screenport" transform)
pub fn screenport(point: FixedVec3, frustum: &Frustum) -> FixedVec3 {
    let half_width = frustum.render_target_left
        + ((frustum.render_target_right - frustum.render_target_left) >> 1);
    let half_height = frustum.render_target_top
        + ((frustum.render_target_bottom - frustum.render_target_top) >> 1);
    FixedVec3 {
        x: point.x + half_width,
        y: point.y + half_height,
        z: point.z,
    }
}
