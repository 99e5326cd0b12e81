// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Unit quaternions for 3D rotations.

use serde::{Deserialize, Serialize};
use std::ops::{Mul, Neg};

use super::{Mat4, Vec3, Vec4, EPSILON};

/// A quaternion `x*i + y*j + z*k + w` representing a rotation.
#[derive(
    Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable, Serialize, Deserialize,
)]
#[repr(C)]
pub struct Quaternion {
    /// The i component.
    pub x: f32,
    /// The j component.
    pub y: f32,
    /// The k component.
    pub z: f32,
    /// The scalar component.
    pub w: f32,
}

impl Quaternion {
    /// The identity rotation.
    pub const IDENTITY: Quaternion = Quaternion::new(0.0, 0.0, 0.0, 1.0);

    /// Creates a quaternion from raw components. The result is not normalized.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Creates a rotation of `angle` radians around `axis`.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        if axis.length_squared() < EPSILON * EPSILON {
            return Self::IDENTITY;
        }
        let a = axis.normalize();
        let (s, c) = (angle * 0.5).sin_cos();
        Self::new(a.x * s, a.y * s, a.z * s, c)
    }

    /// Creates a quaternion from the upper 3x3 part of a pure rotation matrix.
    pub fn from_rotation_matrix(m: &Mat4) -> Self {
        let (m00, m10, m20) = (m.cols[0].x, m.cols[0].y, m.cols[0].z);
        let (m01, m11, m21) = (m.cols[1].x, m.cols[1].y, m.cols[1].z);
        let (m02, m12, m22) = (m.cols[2].x, m.cols[2].y, m.cols[2].z);

        let trace = m00 + m11 + m22;
        let q = if trace > 0.0 {
            let s = 2.0 * (trace + 1.0).sqrt();
            Self::new((m21 - m12) / s, (m02 - m20) / s, (m10 - m01) / s, 0.25 * s)
        } else if m00 > m11 && m00 > m22 {
            let s = 2.0 * (1.0 + m00 - m11 - m22).sqrt();
            Self::new(0.25 * s, (m01 + m10) / s, (m02 + m20) / s, (m21 - m12) / s)
        } else if m11 > m22 {
            let s = 2.0 * (1.0 + m11 - m00 - m22).sqrt();
            Self::new((m01 + m10) / s, 0.25 * s, (m12 + m21) / s, (m02 - m20) / s)
        } else {
            let s = 2.0 * (1.0 + m22 - m00 - m11).sqrt();
            Self::new((m02 + m20) / s, (m12 + m21) / s, 0.25 * s, (m10 - m01) / s)
        };
        q.normalize()
    }

    /// Creates a rotation from Euler angles in radians, applied as X then Y then Z.
    pub fn from_euler(pitch: f32, yaw: f32, roll: f32) -> Self {
        let qx = Self::from_axis_angle(Vec3::X, pitch);
        let qy = Self::from_axis_angle(Vec3::Y, yaw);
        let qz = Self::from_axis_angle(Vec3::Z, roll);
        qz * qy * qx
    }

    /// Returns the squared magnitude.
    #[inline]
    pub fn magnitude_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    /// Returns a unit-length copy. A degenerate quaternion becomes the identity.
    #[inline]
    pub fn normalize(&self) -> Self {
        let mag_sq = self.magnitude_squared();
        if mag_sq > EPSILON * EPSILON {
            let inv = 1.0 / mag_sq.sqrt();
            Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
        } else {
            Self::IDENTITY
        }
    }

    /// Returns the conjugate, which is the inverse rotation for unit quaternions.
    #[inline]
    pub fn conjugate(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Four-dimensional dot product.
    #[inline]
    pub fn dot(&self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Rotates a vector.
    #[inline]
    pub fn rotate_vec3(&self, v: Vec3) -> Vec3 {
        let u = Vec3::new(self.x, self.y, self.z);
        let t = u.cross(v) * 2.0;
        v + t * self.w + u.cross(t)
    }

    /// Spherical interpolation along the shortest arc.
    pub fn slerp(start: Self, end: Self, t: f32) -> Self {
        let mut cos_theta = start.dot(end);
        let mut end = end;
        if cos_theta < 0.0 {
            end = -end;
            cos_theta = -cos_theta;
        }
        if cos_theta > 1.0 - EPSILON {
            let lerped = Self::new(
                start.x + (end.x - start.x) * t,
                start.y + (end.y - start.y) * t,
                start.z + (end.z - start.z) * t,
                start.w + (end.w - start.w) * t,
            );
            return lerped.normalize();
        }
        let theta = cos_theta.acos();
        let sin_theta = theta.sin();
        let a = ((1.0 - t) * theta).sin() / sin_theta;
        let b = (t * theta).sin() / sin_theta;
        Self::new(
            start.x * a + end.x * b,
            start.y * a + end.y * b,
            start.z * a + end.z * b,
            start.w * a + end.w * b,
        )
    }

    /// Returns the components packed as `(x, y, z, w)`.
    #[inline]
    pub fn to_vec4(&self) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, self.w)
    }
}

impl Default for Quaternion {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Quaternion> for Quaternion {
    type Output = Self;
    /// Hamilton product. `a * b` applies `b` first.
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

impl Mul<Vec3> for Quaternion {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: Vec3) -> Vec3 {
        self.rotate_vec3(rhs)
    }
}

impl Neg for Quaternion {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::FRAC_PI_2;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rotate_vec3_quarter_turn() {
        let q = Quaternion::from_axis_angle(Vec3::Z, FRAC_PI_2);
        let v = q * Vec3::X;
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(v.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_matrix_roundtrip_up_to_sign() {
        let q = Quaternion::from_axis_angle(Vec3::new(0.3, -1.0, 0.5), 2.4);
        let back = Quaternion::from_rotation_matrix(&Mat4::from_quat(q));
        assert_abs_diff_eq!(q.dot(back).abs(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_slerp_endpoints() {
        let a = Quaternion::IDENTITY;
        let b = Quaternion::from_axis_angle(Vec3::Y, 1.0);
        assert_abs_diff_eq!(Quaternion::slerp(a, b, 0.0).dot(a), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(Quaternion::slerp(a, b, 1.0).dot(b), 1.0, epsilon = 1e-5);
    }
}
