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

//! Column-major 4x4 matrix.

use serde::{Deserialize, Serialize};
use std::ops::{Mul, MulAssign};

use super::{Quaternion, Vec3, Vec4, EPSILON};

/// A 4x4 column-major matrix, used for 3D affine transformations and projections.
///
/// The memory layout matches what `glUniformMatrix4fv` expects with
/// `transpose = false`, so [`Mat4::to_cols_array`] can be uploaded directly.
#[derive(
    Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable, Serialize, Deserialize,
)]
#[repr(C)]
pub struct Mat4 {
    /// The columns of the matrix. `cols[0]` is the first column, and so on.
    pub cols: [Vec4; 4],
}

impl Mat4 {
    /// The 4x4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };

    /// Creates a new matrix from four column vectors.
    #[inline]
    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    /// Returns a row of the matrix as a `Vec4`.
    #[inline]
    pub fn get_row(&self, index: usize) -> Vec4 {
        Vec4::new(
            self.cols[0].get(index),
            self.cols[1].get(index),
            self.cols[2].get(index),
            self.cols[3].get(index),
        )
    }

    /// Creates a translation matrix.
    #[inline]
    pub fn from_translation(v: Vec3) -> Self {
        Self::from_cols(Vec4::X, Vec4::Y, Vec4::Z, v.extend(1.0))
    }

    /// Creates a non-uniform scale matrix.
    #[inline]
    pub fn from_scale(s: Vec3) -> Self {
        Self::from_cols(
            Vec4::new(s.x, 0.0, 0.0, 0.0),
            Vec4::new(0.0, s.y, 0.0, 0.0),
            Vec4::new(0.0, 0.0, s.z, 0.0),
            Vec4::W,
        )
    }

    /// Creates a rotation of `angle` radians around `axis`.
    ///
    /// The axis does not need to be normalized. A zero axis yields the identity.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        if axis.length_squared() < EPSILON * EPSILON {
            return Self::IDENTITY;
        }
        let a = axis.normalize();
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;

        Self::from_cols(
            Vec4::new(
                a.x * a.x * t + c,
                a.y * a.x * t + a.z * s,
                a.z * a.x * t - a.y * s,
                0.0,
            ),
            Vec4::new(
                a.x * a.y * t - a.z * s,
                a.y * a.y * t + c,
                a.z * a.y * t + a.x * s,
                0.0,
            ),
            Vec4::new(
                a.x * a.z * t + a.y * s,
                a.y * a.z * t - a.x * s,
                a.z * a.z * t + c,
                0.0,
            ),
            Vec4::W,
        )
    }

    /// Creates a rotation matrix from a unit quaternion.
    pub fn from_quat(q: Quaternion) -> Self {
        let (x, y, z, w) = (q.x, q.y, q.z, q.w);
        let (x2, y2, z2) = (x + x, y + y, z + z);
        let (xx, xy, xz) = (x * x2, x * y2, x * z2);
        let (yy, yz, zz) = (y * y2, y * z2, z * z2);
        let (wx, wy, wz) = (w * x2, w * y2, w * z2);

        Self::from_cols(
            Vec4::new(1.0 - (yy + zz), xy + wz, xz - wy, 0.0),
            Vec4::new(xy - wz, 1.0 - (xx + zz), yz + wx, 0.0),
            Vec4::new(xz + wy, yz - wx, 1.0 - (xx + yy), 0.0),
            Vec4::W,
        )
    }

    /// Composes translation, rotation and scale as `T * R * S`.
    #[inline]
    pub fn from_scale_rotation_translation(scale: Vec3, rotation: Quaternion, t: Vec3) -> Self {
        Self::from_translation(t) * Self::from_quat(rotation) * Self::from_scale(scale)
    }

    /// Creates a right-handed perspective projection with an OpenGL `[-1, 1]` depth range.
    ///
    /// # Arguments
    ///
    /// * `fov_y`: Vertical field of view in radians.
    /// * `aspect`: Width divided by height of the viewport.
    /// * `near`, `far`: Clip plane distances, `0 < near < far`.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y * 0.5).tan();
        let nf = 1.0 / (near - far);

        Self::from_cols(
            Vec4::new(f / aspect, 0.0, 0.0, 0.0),
            Vec4::new(0.0, f, 0.0, 0.0),
            Vec4::new(0.0, 0.0, (far + near) * nf, -1.0),
            Vec4::new(0.0, 0.0, 2.0 * far * near * nf, 0.0),
        )
    }

    /// Creates a right-handed orthographic projection with an OpenGL `[-1, 1]` depth range.
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let rl = right - left;
        let tb = top - bottom;
        let fne = far - near;

        Self::from_cols(
            Vec4::new(2.0 / rl, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 / tb, 0.0, 0.0),
            Vec4::new(0.0, 0.0, -2.0 / fne, 0.0),
            Vec4::new(
                -(right + left) / rl,
                -(top + bottom) / tb,
                -(far + near) / fne,
                1.0,
            ),
        )
    }

    /// Creates a right-handed view matrix looking from `eye` towards `target`.
    ///
    /// When `up` is parallel to the view direction another reference axis is
    /// picked so the basis never degenerates. When `eye == target` the
    /// translation-only view is returned.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = target - eye;
        if forward.length_squared() < EPSILON * EPSILON {
            return Self::from_translation(-eye);
        }
        let f = forward.normalize();
        let mut s = f.cross(up);
        if s.length_squared() < EPSILON * EPSILON {
            let alt = if f.y.abs() > 0.9 { Vec3::Z } else { Vec3::Y };
            s = f.cross(alt);
        }
        let s = s.normalize();
        let u = s.cross(f);

        Self::from_cols(
            Vec4::new(s.x, u.x, -f.x, 0.0),
            Vec4::new(s.y, u.y, -f.y, 0.0),
            Vec4::new(s.z, u.z, -f.z, 0.0),
            Vec4::new(-eye.dot(s), -eye.dot(u), eye.dot(f), 1.0),
        )
    }

    /// Returns the transpose of the matrix.
    #[inline]
    pub fn transpose(&self) -> Self {
        Self::from_cols(
            self.get_row(0),
            self.get_row(1),
            self.get_row(2),
            self.get_row(3),
        )
    }

    /// Computes the inverse of the matrix.
    ///
    /// Returns `None` if the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        let m = self.to_cols_array();
        let mut inv = [0.0f32; 16];

        inv[0] = m[5] * m[10] * m[15] - m[5] * m[11] * m[14] - m[9] * m[6] * m[15]
            + m[9] * m[7] * m[14]
            + m[13] * m[6] * m[11]
            - m[13] * m[7] * m[10];
        inv[4] = -m[4] * m[10] * m[15] + m[4] * m[11] * m[14] + m[8] * m[6] * m[15]
            - m[8] * m[7] * m[14]
            - m[12] * m[6] * m[11]
            + m[12] * m[7] * m[10];
        inv[8] = m[4] * m[9] * m[15] - m[4] * m[11] * m[13] - m[8] * m[5] * m[15]
            + m[8] * m[7] * m[13]
            + m[12] * m[5] * m[11]
            - m[12] * m[7] * m[9];
        inv[12] = -m[4] * m[9] * m[14] + m[4] * m[10] * m[13] + m[8] * m[5] * m[14]
            - m[8] * m[6] * m[13]
            - m[12] * m[5] * m[10]
            + m[12] * m[6] * m[9];
        inv[1] = -m[1] * m[10] * m[15] + m[1] * m[11] * m[14] + m[9] * m[2] * m[15]
            - m[9] * m[3] * m[14]
            - m[13] * m[2] * m[11]
            + m[13] * m[3] * m[10];
        inv[5] = m[0] * m[10] * m[15] - m[0] * m[11] * m[14] - m[8] * m[2] * m[15]
            + m[8] * m[3] * m[14]
            + m[12] * m[2] * m[11]
            - m[12] * m[3] * m[10];
        inv[9] = -m[0] * m[9] * m[15] + m[0] * m[11] * m[13] + m[8] * m[1] * m[15]
            - m[8] * m[3] * m[13]
            - m[12] * m[1] * m[11]
            + m[12] * m[3] * m[9];
        inv[13] = m[0] * m[9] * m[14] - m[0] * m[10] * m[13] - m[8] * m[1] * m[14]
            + m[8] * m[2] * m[13]
            + m[12] * m[1] * m[10]
            - m[12] * m[2] * m[9];
        inv[2] = m[1] * m[6] * m[15] - m[1] * m[7] * m[14] - m[5] * m[2] * m[15]
            + m[5] * m[3] * m[14]
            + m[13] * m[2] * m[7]
            - m[13] * m[3] * m[6];
        inv[6] = -m[0] * m[6] * m[15] + m[0] * m[7] * m[14] + m[4] * m[2] * m[15]
            - m[4] * m[3] * m[14]
            - m[12] * m[2] * m[7]
            + m[12] * m[3] * m[6];
        inv[10] = m[0] * m[5] * m[15] - m[0] * m[7] * m[13] - m[4] * m[1] * m[15]
            + m[4] * m[3] * m[13]
            + m[12] * m[1] * m[7]
            - m[12] * m[3] * m[5];
        inv[14] = -m[0] * m[5] * m[14] + m[0] * m[6] * m[13] + m[4] * m[1] * m[14]
            - m[4] * m[2] * m[13]
            - m[12] * m[1] * m[6]
            + m[12] * m[2] * m[5];
        inv[3] = -m[1] * m[6] * m[11] + m[1] * m[7] * m[10] + m[5] * m[2] * m[11]
            - m[5] * m[3] * m[10]
            - m[9] * m[2] * m[7]
            + m[9] * m[3] * m[6];
        inv[7] = m[0] * m[6] * m[11] - m[0] * m[7] * m[10] - m[4] * m[2] * m[11]
            + m[4] * m[3] * m[10]
            + m[8] * m[2] * m[7]
            - m[8] * m[3] * m[6];
        inv[11] = -m[0] * m[5] * m[11] + m[0] * m[7] * m[9] + m[4] * m[1] * m[11]
            - m[4] * m[3] * m[9]
            - m[8] * m[1] * m[7]
            + m[8] * m[3] * m[5];
        inv[15] = m[0] * m[5] * m[10] - m[0] * m[6] * m[9] - m[4] * m[1] * m[10]
            + m[4] * m[2] * m[9]
            + m[8] * m[1] * m[6]
            - m[8] * m[2] * m[5];

        let det = m[0] * inv[0] + m[1] * inv[4] + m[2] * inv[8] + m[3] * inv[12];
        if det.abs() < f32::EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        Some(Self::from_cols_array(&inv.map(|v| v * inv_det)))
    }

    /// Returns the matrix used to transform normals: `transpose(inverse(self))`.
    ///
    /// Falls back to the identity for singular matrices.
    #[inline]
    pub fn normal_matrix(&self) -> Self {
        self.inverse()
            .map(|inv| inv.transpose())
            .unwrap_or(Self::IDENTITY)
    }

    /// Returns the translation part of an affine matrix.
    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.cols[3].truncate()
    }

    /// Transforms a point (`w = 1`), ignoring the projective component.
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        (*self * p.extend(1.0)).truncate()
    }

    /// Transforms a direction (`w = 0`).
    #[inline]
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        (*self * v.extend(0.0)).truncate()
    }

    /// Flattens the matrix to 16 floats in column-major order.
    #[inline]
    pub fn to_cols_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        for (c, col) in self.cols.iter().enumerate() {
            out[c * 4..c * 4 + 4].copy_from_slice(&col.to_array());
        }
        out
    }

    /// Builds a matrix from 16 floats in column-major order.
    #[inline]
    pub fn from_cols_array(m: &[f32; 16]) -> Self {
        Self::from_cols(
            Vec4::new(m[0], m[1], m[2], m[3]),
            Vec4::new(m[4], m[5], m[6], m[7]),
            Vec4::new(m[8], m[9], m[10], m[11]),
            Vec4::new(m[12], m[13], m[14], m[15]),
        )
    }
}

impl Default for Mat4 {
    /// Returns the 4x4 identity matrix.
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Self;
    /// Multiplies two matrices. `a * b` applies `b` first.
    #[inline]
    fn mul(self, rhs: Mat4) -> Self {
        Self::from_cols(
            self * rhs.cols[0],
            self * rhs.cols[1],
            self * rhs.cols[2],
            self * rhs.cols[3],
        )
    }
}

impl MulAssign<Mat4> for Mat4 {
    #[inline]
    fn mul_assign(&mut self, rhs: Mat4) {
        *self = *self * rhs;
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    #[inline]
    fn mul(self, rhs: Vec4) -> Vec4 {
        self.cols[0] * rhs.x + self.cols[1] * rhs.y + self.cols[2] * rhs.z + self.cols[3] * rhs.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::FRAC_PI_2;
    use approx::assert_abs_diff_eq;

    fn assert_vec3_eq(a: Vec3, b: Vec3) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-5);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-5);
        assert_abs_diff_eq!(a.z, b.z, epsilon = 1e-5);
    }

    #[test]
    fn test_translation_applies_to_points_only() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_vec3_eq(m.transform_point(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0));
        assert_vec3_eq(m.transform_vector(Vec3::X), Vec3::X);
    }

    #[test]
    fn test_axis_angle_rotation() {
        let m = Mat4::from_axis_angle(Vec3::Y, FRAC_PI_2);
        assert_vec3_eq(m.transform_vector(Vec3::X), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_quat_and_axis_angle_agree() {
        let q = Quaternion::from_axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.7);
        let a = Mat4::from_quat(q);
        let b = Mat4::from_axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.7);
        for i in 0..4 {
            assert_vec3_eq(a.cols[i].truncate(), b.cols[i].truncate());
        }
    }

    #[test]
    fn test_inverse_roundtrip() {
        let m = Mat4::from_translation(Vec3::new(4.0, -2.0, 1.0))
            * Mat4::from_axis_angle(Vec3::Z, 0.3)
            * Mat4::from_scale(Vec3::new(2.0, 3.0, 4.0));
        let inv = m.inverse().expect("matrix is invertible");
        let p = Vec3::new(0.5, 0.25, -3.0);
        assert_vec3_eq(inv.transform_point(m.transform_point(p)), p);
    }

    #[test]
    fn test_singular_matrix_has_no_inverse() {
        assert!(Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)).inverse().is_none());
    }

    #[test]
    fn test_look_at_maps_target_onto_negative_z() {
        let view = Mat4::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        assert_vec3_eq(view.transform_point(Vec3::ZERO), Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn test_look_at_straight_down_stays_finite() {
        let view = Mat4::look_at(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO, Vec3::Y);
        assert!(view.to_cols_array().iter().all(|v| v.is_finite()));
        assert_vec3_eq(view.transform_point(Vec3::ZERO), Vec3::new(0.0, 0.0, -10.0));
    }

    #[test]
    fn test_perspective_maps_near_and_far_planes() {
        let p = Mat4::perspective(FRAC_PI_2, 1.0, 1.0, 10.0);
        let near = p * Vec4::new(0.0, 0.0, -1.0, 1.0);
        let far = p * Vec4::new(0.0, 0.0, -10.0, 1.0);
        assert_abs_diff_eq!(near.z / near.w, -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(far.z / far.w, 1.0, epsilon = 1e-5);
    }
}
