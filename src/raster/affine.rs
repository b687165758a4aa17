//! Affine rasterizer: depth plus screen-space linear varying channels
//!
//! Interpolation is affine, not perspective correct: each channel is
//! stepped linearly in screen space exactly like z. Shaders register the
//! per-vertex channel values (texture coordinates scaled to texel space,
//! world positions, normals, light-space positions) before each draw.

use super::{cull, FaceCull, Fragment, MAX_VARYINGS};
use crate::math::fixed::{self, FP_BIT};
use crate::math::FixedVec3;
use crate::model::Frustum;

#[derive(Debug, Clone)]
pub struct AffineRasterizer {
    frustum_cull: bool,
    face_cull: FaceCull,
    varying_count: usize,
    varyings: [[i32; 3]; MAX_VARYINGS],
    fragment: Fragment,
}

impl AffineRasterizer {
    pub fn new() -> Self {
        Self {
            frustum_cull: true,
            face_cull: FaceCull::Back,
            varying_count: 0,
            varyings: [[0; 3]; MAX_VARYINGS],
            fragment: Fragment::default(),
        }
    }

    pub fn set_frustum_cull(&mut self, frustum_cull: bool) {
        self.frustum_cull = frustum_cull;
    }

    pub fn set_face_cull(&mut self, face_cull: FaceCull) {
        self.face_cull = face_cull;
    }

    pub fn set_fragment_shade(&mut self, light_color: i32, material: usize) {
        self.fragment.light_color = light_color;
        self.fragment.material = material;
    }

    /// Number of channels interpolated per pixel; channels at and above the
    /// count reach the fragment as zero
    pub fn set_varying_count(&mut self, count: usize) {
        self.varying_count = count.min(MAX_VARYINGS);
    }

    /// Per-vertex values of one channel, in triangle vertex order
    pub fn set_varying(&mut self, channel: usize, values: [i32; 3]) {
        self.varyings[channel] = values;
    }

    /// Rasterize one triangle; `emit` runs once per covered pixel with
    /// `fragment.varyings[..count]` interpolated
    pub fn draw<F: FnMut(&Fragment)>(
        &mut self,
        locations: [FixedVec3; 3],
        frustum: &Frustum,
        mut emit: F,
    ) {
        let [mut l0, mut l1, mut l2] = locations;
        if cull(l0, l1, l2, frustum, self.frustum_cull, self.face_cull) {
            return;
        }
        // sort vertices and their varyings together by ascending y
        let count = self.varying_count;
        let mut varyings = self.varyings;
        if l0.y > l1.y {
            std::mem::swap(&mut l0, &mut l1);
            for channel in varyings.iter_mut().take(count) {
                channel.swap(0, 1);
            }
        }
        if l1.y > l2.y {
            std::mem::swap(&mut l1, &mut l2);
            for channel in varyings.iter_mut().take(count) {
                channel.swap(1, 2);
            }
        }
        if l0.y > l1.y {
            std::mem::swap(&mut l0, &mut l1);
            for channel in varyings.iter_mut().take(count) {
                channel.swap(0, 1);
            }
        }
        if l1.y == l2.y {
            self.draw_bottom_triangle([l0, l1, l2], &varyings, frustum, &mut emit);
        } else if l0.y == l1.y {
            self.draw_top_triangle([l0, l1, l2], &varyings, frustum, &mut emit);
        } else {
            // split at the middle vertex's scanline along the long edge
            let dy = fixed::divide(l1.y - l0.y, l2.y - l0.y);
            let split = FixedVec3 {
                x: l0.x + fixed::multiply(dy, l2.x - l0.x),
                y: l1.y,
                z: l0.z + fixed::multiply(dy, l2.z - l0.z),
            };
            let mut bottom = varyings;
            let mut top = varyings;
            for channel in 0..count {
                let value = varyings[channel][0]
                    + fixed::multiply(dy, varyings[channel][2] - varyings[channel][0]);
                bottom[channel][2] = value;
                top[channel] = [varyings[channel][1], value, varyings[channel][2]];
            }
            self.draw_bottom_triangle([l0, l1, split], &bottom, frustum, &mut emit);
            self.draw_top_triangle([l1, split, l2], &top, frustum, &mut emit);
        }
    }

    fn draw_bottom_triangle<F: FnMut(&Fragment)>(
        &mut self,
        [l0, l1, l2]: [FixedVec3; 3],
        varyings: &[[i32; 3]; MAX_VARYINGS],
        frustum: &Frustum,
        emit: &mut F,
    ) {
        let count = self.varying_count;
        let x_shifted = (l0.x as i64) << FP_BIT;
        let mut y2y1 = l1.y - l0.y;
        if y2y1 == 0 {
            y2y1 = 1;
        }
        let y3y1 = y2y1;
        let dx1 = fixed::divide(l1.x - l0.x, y2y1) as i64;
        let dx2 = fixed::divide(l2.x - l0.x, y3y1) as i64;
        let dz1 = slope(l1.z - l0.z, y2y1);
        let dz2 = slope(l2.z - l0.z, y3y1);
        let mut dv1 = [0i64; MAX_VARYINGS];
        let mut dv2 = [0i64; MAX_VARYINGS];
        for channel in 0..count {
            dv1[channel] = slope(varyings[channel][1] - varyings[channel][0], y2y1);
            dv2[channel] = slope(varyings[channel][2] - varyings[channel][0], y3y1);
        }
        let mut x1 = x_shifted;
        let mut x2 = x_shifted;
        let mut z = (l0.z as i64) << FP_BIT;
        let mut values = [0i64; MAX_VARYINGS];
        for channel in 0..count {
            values[channel] = (varyings[channel][0] as i64) << FP_BIT;
        }
        let (left, right) = if dx1 < dx2 { (dx1, dx2) } else { (dx2, dx1) };
        let mut dxdx = right - left;
        if dxdx == 0 {
            dxdx = 1;
        }
        let (edge_dz, far_dz) = if dx1 < dx2 { (dz1, dz2) } else { (dz2, dz1) };
        let dz = divide_wide(far_dz - edge_dz, dxdx);
        let mut steps = [0i64; MAX_VARYINGS];
        let mut edge_dv = [0i64; MAX_VARYINGS];
        for channel in 0..count {
            let (edge, far) = if dx1 < dx2 {
                (dv1[channel], dv2[channel])
            } else {
                (dv2[channel], dv1[channel])
            };
            steps[channel] = divide_wide(far - edge, dxdx);
            edge_dv[channel] = edge;
        }
        for y in l0.y..=l1.y {
            self.draw_scanline(x1, x2, y, z, dz, &values, &steps, frustum, emit);
            x1 += left;
            x2 += right;
            z += edge_dz;
            for channel in 0..count {
                values[channel] += edge_dv[channel];
            }
        }
    }

    fn draw_top_triangle<F: FnMut(&Fragment)>(
        &mut self,
        [l0, l1, l2]: [FixedVec3; 3],
        varyings: &[[i32; 3]; MAX_VARYINGS],
        frustum: &Frustum,
        emit: &mut F,
    ) {
        let count = self.varying_count;
        let x_shifted = (l2.x as i64) << FP_BIT;
        let mut y3y1 = l2.y - l0.y;
        let mut y3y2 = l2.y - l1.y;
        if y3y1 == 0 {
            y3y1 = 1;
        }
        if y3y2 == 0 {
            y3y2 = 1;
        }
        let dx1 = fixed::divide(l2.x - l0.x, y3y1) as i64;
        let dx2 = fixed::divide(l2.x - l1.x, y3y2) as i64;
        let dz1 = slope(l2.z - l0.z, y3y1);
        let dz2 = slope(l2.z - l1.z, y3y2);
        let mut dv1 = [0i64; MAX_VARYINGS];
        let mut dv2 = [0i64; MAX_VARYINGS];
        for channel in 0..count {
            dv1[channel] = slope(varyings[channel][2] - varyings[channel][0], y3y1);
            dv2[channel] = slope(varyings[channel][2] - varyings[channel][1], y3y2);
        }
        let (left, right) = if dx1 > dx2 { (dx1, dx2) } else { (dx2, dx1) };
        let mut dxdx = left - right;
        if dxdx == 0 {
            dxdx = 1;
        }
        let (edge_dz, far_dz) = if dx1 > dx2 { (dz1, dz2) } else { (dz2, dz1) };
        let dz = divide_wide(edge_dz - far_dz, dxdx);
        let mut steps = [0i64; MAX_VARYINGS];
        let mut edge_dv = [0i64; MAX_VARYINGS];
        for channel in 0..count {
            let (edge, far) = if dx1 > dx2 {
                (dv1[channel], dv2[channel])
            } else {
                (dv2[channel], dv1[channel])
            };
            steps[channel] = divide_wide(edge - far, dxdx);
            edge_dv[channel] = edge;
        }
        // start one row below the flat edge, stepping down toward the apex
        let rows = (l2.y - l0.y - 1).max(0) as i64;
        let mut x1 = x_shifted - left * rows;
        let mut x2 = x_shifted - right * rows;
        let mut z = ((l2.z as i64) << FP_BIT) - edge_dz * rows;
        let mut values = [0i64; MAX_VARYINGS];
        for channel in 0..count {
            values[channel] =
                ((varyings[channel][2] as i64) << FP_BIT) - edge_dv[channel] * rows;
        }
        for y in (l0.y + 1)..=l2.y {
            self.draw_scanline(x1, x2, y, z, dz, &values, &steps, frustum, emit);
            x1 += left;
            x2 += right;
            z += edge_dz;
            for channel in 0..count {
                values[channel] += edge_dv[channel];
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_scanline<F: FnMut(&Fragment)>(
        &mut self,
        x1: i64,
        x2: i64,
        y: i32,
        z: i64,
        dz: i64,
        values: &[i64; MAX_VARYINGS],
        steps: &[i64; MAX_VARYINGS],
        frustum: &Frustum,
        emit: &mut F,
    ) {
        if y < frustum.render_target_top || y >= frustum.render_target_bottom {
            return;
        }
        let count = self.varying_count;
        let x1 = (x1 >> FP_BIT) as i32;
        let x2 = (x2 >> FP_BIT) as i32;
        let mut z = z;
        let mut values = *values;
        for x in x1..=x2 {
            if x >= frustum.render_target_left && x < frustum.render_target_right {
                self.fragment.x = x;
                self.fragment.y = y;
                self.fragment.z = (z >> FP_BIT) as i32;
                for channel in 0..count {
                    self.fragment.varyings[channel] = (values[channel] >> FP_BIT) as i32;
                }
                emit(&self.fragment);
            }
            z += dz;
            for channel in 0..count {
                values[channel] += steps[channel];
            }
        }
    }
}

impl Default for AffineRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-scanline slope of an attribute over a pixel span
fn slope(delta: i32, span: i32) -> i64 {
    ((delta as i64) << FP_BIT) / span as i64
}

/// Per-pixel step from two per-scanline slopes
fn divide_wide(a: i64, b: i64) -> i64 {
    (a << FP_BIT) / b
}
