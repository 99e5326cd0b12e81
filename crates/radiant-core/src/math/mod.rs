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

//! Math primitives used by the renderer.
//!
//! Vectors, a column-major [`Mat4`], quaternions, axis-aligned boxes, 8-bit
//! colors, and the geometric helpers the render orchestrator relies on:
//! frustum extraction and tests, billboard bases, and cube-face selection.
//!
//! Matrices follow the OpenGL conventions: right-handed view space and a
//! clip-space depth range of `[-1, 1]`. Angles are in **radians** unless a
//! function name says otherwise.

// --- Fundamental Constants ---

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

pub use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

/// The factor to convert degrees to radians (PI / 180.0).
pub const DEG_TO_RAD: f32 = PI / 180.0;
/// The factor to convert radians to degrees (180.0 / PI).
pub const RAD_TO_DEG: f32 = 180.0 / PI;

// --- Declare Sub-Modules ---

pub mod billboard;
pub mod color;
pub mod cube;
pub mod frustum;
pub mod geometry;
pub mod matrix;
pub mod quaternion;
pub mod vector;

// --- Re-export Principal Types ---

pub use self::billboard::{billboard_rotation, BillboardMode};
pub use self::color::Color;
pub use self::cube::{cube_face_index, CubeFaceView, CUBE_FACE_VIEWS};
pub use self::frustum::{Frustum, Plane};
pub use self::geometry::Aabb;
pub use self::matrix::Mat4;
pub use self::quaternion::Quaternion;
pub use self::vector::{Vec2, Vec3, Vec4};

// --- Utility Functions ---

/// Converts an angle from degrees to radians.
///
/// # Examples
///
/// ```
/// use radiant_core::math::{degrees_to_radians, PI};
/// assert_eq!(degrees_to_radians(180.0), PI);
/// ```
#[inline]
pub fn degrees_to_radians(degrees: f32) -> f32 {
    degrees * DEG_TO_RAD
}

/// Converts an angle from radians to degrees.
#[inline]
pub fn radians_to_degrees(radians: f32) -> f32 {
    radians * RAD_TO_DEG
}

/// Clamps a value to a specified minimum and maximum range.
#[inline]
pub fn clamp<T: PartialOrd>(value: T, min_val: T, max_val: T) -> T {
    if value < min_val {
        min_val
    } else if value > max_val {
        max_val
    } else {
        value
    }
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Performs an approximate equality comparison using the module's default [`EPSILON`].
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_degree_radian_conversion() {
        assert_relative_eq!(degrees_to_radians(90.0), FRAC_PI_2);
        assert_relative_eq!(radians_to_degrees(PI), 180.0);
    }

    #[test]
    fn test_clamp_and_lerp() {
        assert_eq!(clamp(300, 0, 255), 255);
        assert_eq!(clamp(-4, 0, 255), 0);
        assert_relative_eq!(lerp(2.0, 4.0, 0.25), 2.5);
    }
}
