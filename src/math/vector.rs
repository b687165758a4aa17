//! Fixed-point 3D vectors

use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::fixed::{self, FP_ONE};

/// 3D vector of fixed-point scalars
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedVec3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl FixedVec3 {
    pub const ZERO: FixedVec3 = FixedVec3 { x: 0, y: 0, z: 0 };
    pub const ONE: FixedVec3 = FixedVec3 { x: FP_ONE, y: FP_ONE, z: FP_ONE };
    pub const UP: FixedVec3 = FixedVec3 { x: 0, y: FP_ONE, z: 0 };
    /// The camera and lights look down -Z at zero rotation
    pub const FORWARD: FixedVec3 = FixedVec3 { x: 0, y: 0, z: -FP_ONE };

    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Build a vector from float components, converting to fixed point
    pub fn from_floats(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: fixed::to_fixed(x),
            y: fixed::to_fixed(y),
            z: fixed::to_fixed(z),
        }
    }

    pub fn dot(self, other: FixedVec3) -> i32 {
        let sum = self.x as i64 * other.x as i64
            + self.y as i64 * other.y as i64
            + self.z as i64 * other.z as i64;
        (sum >> fixed::FP_BIT) as i32
    }

    pub fn cross(self, other: FixedVec3) -> FixedVec3 {
        FixedVec3 {
            x: fixed::multiply(self.y, other.z) - fixed::multiply(self.z, other.y),
            y: fixed::multiply(self.z, other.x) - fixed::multiply(self.x, other.z),
            z: fixed::multiply(self.x, other.y) - fixed::multiply(self.y, other.x),
        }
    }

    /// Vector length, computed through a 64-bit intermediate
    pub fn magnitude(self) -> i32 {
        let sum = self.x as i64 * self.x as i64
            + self.y as i64 * self.y as i64
            + self.z as i64 * self.z as i64;
        fixed::isqrt(sum) as i32
    }

    pub fn distance(self, other: FixedVec3) -> i32 {
        (self - other).magnitude()
    }

    /// Normalize to unit length; a zero-magnitude vector stays zero
    pub fn normalize(self) -> FixedVec3 {
        let magnitude = self.magnitude();
        if magnitude == 0 {
            return FixedVec3::ZERO;
        }
        FixedVec3 {
            x: fixed::divide(self.x, magnitude),
            y: fixed::divide(self.y, magnitude),
            z: fixed::divide(self.z, magnitude),
        }
    }

    pub fn scale(self, factor: i32) -> FixedVec3 {
        FixedVec3 {
            x: fixed::multiply(self.x, factor),
            y: fixed::multiply(self.y, factor),
            z: fixed::multiply(self.z, factor),
        }
    }

    pub fn invert(self) -> FixedVec3 {
        -self
    }

    /// Reflect across a normal: `v - 2*dot(v,n)*n`
    pub fn reflect(self, normal: FixedVec3) -> FixedVec3 {
        let dot = 2 * self.dot(normal);
        self - normal.scale(dot)
    }

    /// Rotate around the X axis by a fixed-point angle in degrees
    pub fn rotate_x(self, angle: i32) -> FixedVec3 {
        let sin = fixed::sin(angle);
        let cos = fixed::cos(angle);
        FixedVec3 {
            x: self.x,
            y: fixed::multiply(self.y, cos) - fixed::multiply(self.z, sin),
            z: fixed::multiply(self.z, cos) + fixed::multiply(self.y, sin),
        }
    }

    /// Rotate around the Y axis by a fixed-point angle in degrees
    pub fn rotate_y(self, angle: i32) -> FixedVec3 {
        let sin = fixed::sin(angle);
        let cos = fixed::cos(angle);
        FixedVec3 {
            x: fixed::multiply(self.x, cos) + fixed::multiply(self.z, sin),
            y: self.y,
            z: fixed::multiply(self.z, cos) - fixed::multiply(self.x, sin),
        }
    }

    /// Rotate around the Z axis by a fixed-point angle in degrees
    pub fn rotate_z(self, angle: i32) -> FixedVec3 {
        let sin = fixed::sin(angle);
        let cos = fixed::cos(angle);
        FixedVec3 {
            x: fixed::multiply(self.x, cos) + fixed::multiply(self.y, sin),
            y: fixed::multiply(self.y, cos) - fixed::multiply(self.x, sin),
            z: self.z,
        }
    }
}

impl Add for FixedVec3 {
    type Output = FixedVec3;
    fn add(self, other: FixedVec3) -> FixedVec3 {
        FixedVec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for FixedVec3 {
    type Output = FixedVec3;
    fn sub(self, other: FixedVec3) -> FixedVec3 {
        FixedVec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for FixedVec3 {
    type Output = FixedVec3;
    fn neg(self) -> FixedVec3 {
        FixedVec3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::fixed::from_int;

    #[test]
    fn test_dot() {
        let a = FixedVec3::from_floats(1.0, 2.0, 3.0);
        let b = FixedVec3::from_floats(4.0, 5.0, 6.0);
        assert_eq!(a.dot(b), from_int(32));
    }

    #[test]
    fn test_cross() {
        let x = FixedVec3::new(FP_ONE, 0, 0);
        let y = FixedVec3::new(0, FP_ONE, 0);
        assert_eq!(x.cross(y), FixedVec3::new(0, 0, FP_ONE));
    }

    #[test]
    fn test_magnitude() {
        let v = FixedVec3::from_floats(3.0, 4.0, 0.0);
        assert_eq!(v.magnitude(), from_int(5));
    }

    #[test]
    fn test_normalize_zero_stays_zero() {
        assert_eq!(FixedVec3::ZERO.normalize(), FixedVec3::ZERO);
    }

    #[test]
    fn test_normalize_unit_length() {
        let v = FixedVec3::from_floats(10.0, 0.0, 0.0).normalize();
        assert_eq!(v, FixedVec3::new(FP_ONE, 0, 0));
        let diag = FixedVec3::from_floats(1.0, 1.0, 1.0).normalize();
        let len = diag.magnitude();
        assert!((len - FP_ONE).abs() < 64);
    }

    #[test]
    fn test_reflect() {
        // straight-down vector reflected off an upward-facing plane
        let v = FixedVec3::new(0, -FP_ONE, 0);
        let reflected = v.reflect(FixedVec3::UP);
        assert_eq!(reflected, FixedVec3::new(0, FP_ONE, 0));
    }

    #[test]
    fn test_rotate() {
        let v = FixedVec3::new(FP_ONE, 0, 0);
        let rotated = v.rotate_z(from_int(90));
        assert!(rotated.x.abs() < 8);
        assert_eq!(rotated.y, -FP_ONE);
        let back = v.rotate_y(from_int(360));
        assert!((back.x - FP_ONE).abs() < 8 && back.z.abs() < 8);
    }
}
