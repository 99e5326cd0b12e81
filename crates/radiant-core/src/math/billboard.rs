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

//! Camera-facing rotations for sprites, particles and billboarded models.

use serde::{Deserialize, Serialize};

use super::{Mat4, Vec3, Vec4, EPSILON};

/// How a drawable orients itself towards the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BillboardMode {
    /// No camera alignment.
    #[default]
    Disabled,
    /// All three axes face the camera.
    Enabled,
    /// Rotates around the world Y axis only.
    YAxis,
}

/// Computes the rotation that makes an object at `position` face `view_position`.
///
/// The returned matrix has the basis `(right, up, to_camera)` as its first
/// three columns and no translation. [`BillboardMode::Disabled`] returns the
/// identity, as does a degenerate configuration (camera on the object, or
/// straight above it in Y-axis mode).
pub fn billboard_rotation(mode: BillboardMode, position: Vec3, view_position: Vec3) -> Mat4 {
    match mode {
        BillboardMode::Disabled => Mat4::IDENTITY,
        BillboardMode::Enabled => {
            let to_camera = view_position - position;
            if to_camera.length_squared() < EPSILON * EPSILON {
                return Mat4::IDENTITY;
            }
            let to_camera = to_camera.normalize();
            let mut right = Vec3::Y.cross(to_camera);
            if right.length_squared() < EPSILON * EPSILON {
                // Looking straight up or down: any horizontal right axis works.
                right = Vec3::X;
            }
            let right = right.normalize();
            let up = to_camera.cross(right);
            basis(right, up, to_camera)
        }
        BillboardMode::YAxis => {
            let mut to_camera = view_position - position;
            to_camera.y = 0.0;
            if to_camera.length_squared() < EPSILON * EPSILON {
                return Mat4::IDENTITY;
            }
            let to_camera = to_camera.normalize();
            let right = Vec3::Y.cross(to_camera).normalize();
            basis(right, Vec3::Y, to_camera)
        }
    }
}

fn basis(right: Vec3, up: Vec3, forward: Vec3) -> Mat4 {
    Mat4::from_cols(
        right.extend(0.0),
        up.extend(0.0),
        forward.extend(0.0),
        Vec4::W,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_full_billboard_points_local_z_to_camera() {
        let cam = Vec3::new(3.0, 4.0, 5.0);
        let m = billboard_rotation(BillboardMode::Enabled, Vec3::ZERO, cam);
        let z = m.transform_vector(Vec3::Z);
        let expected = cam.normalize();
        assert_abs_diff_eq!(z.x, expected.x, epsilon = 1e-5);
        assert_abs_diff_eq!(z.y, expected.y, epsilon = 1e-5);
        assert_abs_diff_eq!(z.z, expected.z, epsilon = 1e-5);
    }

    #[test]
    fn test_y_axis_billboard_keeps_world_up() {
        let m = billboard_rotation(BillboardMode::YAxis, Vec3::ZERO, Vec3::new(0.0, 50.0, 5.0));
        assert_eq!(m.transform_vector(Vec3::Y), Vec3::Y);
        let z = m.transform_vector(Vec3::Z);
        assert_abs_diff_eq!(z.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(z.z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_disabled_and_degenerate_are_identity() {
        assert_eq!(
            billboard_rotation(BillboardMode::Disabled, Vec3::ZERO, Vec3::X),
            Mat4::IDENTITY
        );
        assert_eq!(
            billboard_rotation(BillboardMode::YAxis, Vec3::ZERO, Vec3::new(0.0, 3.0, 0.0)),
            Mat4::IDENTITY
        );
    }
}
