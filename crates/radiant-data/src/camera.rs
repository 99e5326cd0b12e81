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

//! A look-at camera producing view and projection matrices.

use serde::{Deserialize, Serialize};

use radiant_core::math::{degrees_to_radians, Frustum, Mat4, Vec3};

/// Projection model of a [`Camera`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Projection {
    /// Perspective projection; `fov_y` is the vertical field of view in degrees.
    #[default]
    Perspective,
    /// Orthographic projection; `fov_y` is the height of the view volume.
    Orthographic,
}

/// A camera described by an eye position, a target and an up vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Eye position.
    pub position: Vec3,
    /// Point looked at.
    pub target: Vec3,
    /// Up reference.
    pub up: Vec3,
    /// Vertical field of view in degrees (perspective) or view height (orthographic).
    pub fov_y: f32,
    /// Projection model.
    pub projection: Projection,
}

impl Camera {
    /// Near clip distance used by the renderer.
    pub const NEAR: f32 = 0.01;
    /// Far clip distance used by the renderer.
    pub const FAR: f32 = 1000.0;

    /// Creates a perspective camera.
    pub fn perspective(position: Vec3, target: Vec3, up: Vec3, fov_y: f32) -> Self {
        Self {
            position,
            target,
            up,
            fov_y,
            projection: Projection::Perspective,
        }
    }

    /// The view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    /// The projection matrix for a viewport of the given aspect ratio.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        match self.projection {
            Projection::Perspective => {
                Mat4::perspective(degrees_to_radians(self.fov_y), aspect, Self::NEAR, Self::FAR)
            }
            Projection::Orthographic => {
                let top = self.fov_y * 0.5;
                let right = top * aspect;
                Mat4::orthographic(-right, right, -top, top, Self::NEAR, Self::FAR)
            }
        }
    }

    /// The frustum of `projection * view`.
    pub fn frustum(&self, aspect: f32) -> Frustum {
        Frustum::from_view_projection(&(self.projection_matrix(aspect) * self.view_matrix()))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y, 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_frustum_contains_target() {
        let cam = Camera::perspective(Vec3::new(0.0, 0.0, -10.0), Vec3::ZERO, Vec3::Y, 60.0);
        let f = cam.frustum(1.0);
        assert!(f.contains_point(Vec3::ZERO));
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, -20.0)));
    }

    #[test]
    fn test_orthographic_frustum_has_parallel_sides() {
        let mut cam = Camera::default();
        cam.projection = Projection::Orthographic;
        cam.fov_y = 4.0;
        let f = cam.frustum(1.0);
        assert!(f.contains_point(Vec3::new(1.9, 0.0, -50.0)));
        assert!(!f.contains_point(Vec3::new(2.1, 0.0, -50.0)));
    }
}
