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

//! View frustum extraction and containment tests.

use super::{Aabb, Mat4, Vec3, Vec4};

/// A plane `a*x + b*y + c*z + d = 0`, stored as `(a, b, c, d)`.
///
/// Points with a positive signed distance lie on the inner side.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Plane(pub Vec4);

impl Plane {
    /// Normalizes the plane so that `(a, b, c)` has unit length.
    ///
    /// A degenerate plane becomes the zero plane, which accepts every point.
    pub fn normalized(self) -> Self {
        let mag = self.0.truncate().length();
        if mag > 1e-6 {
            Self(self.0 * (1.0 / mag))
        } else {
            Self(Vec4::ZERO)
        }
    }

    /// Signed distance from `p` to the plane.
    #[inline]
    pub fn distance(&self, p: Vec3) -> f32 {
        self.0.x * p.x + self.0.y * p.y + self.0.z * p.z + self.0.w
    }
}

/// Indices of the six frustum planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum FrustumPlane {
    /// Left clip plane.
    Left = 0,
    /// Right clip plane.
    Right = 1,
    /// Bottom clip plane.
    Bottom = 2,
    /// Top clip plane.
    Top = 3,
    /// Near clip plane.
    Near = 4,
    /// Far clip plane.
    Far = 5,
}

/// Six inward-facing planes bounding a camera or light volume.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frustum {
    /// The planes, indexed by [`FrustumPlane`].
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the planes of a combined `projection * view` matrix.
    pub fn from_view_projection(view_proj: &Mat4) -> Self {
        let r0 = view_proj.get_row(0);
        let r1 = view_proj.get_row(1);
        let r2 = view_proj.get_row(2);
        let r3 = view_proj.get_row(3);

        let planes = [
            Plane(r3 + r0),
            Plane(r3 - r0),
            Plane(r3 + r1),
            Plane(r3 - r1),
            Plane(r3 + r2),
            Plane(r3 - r2),
        ]
        .map(Plane::normalized);

        Self { planes }
    }

    /// Returns the plane at `which`.
    #[inline]
    pub fn plane(&self, which: FrustumPlane) -> &Plane {
        &self.planes[which as usize]
    }

    /// True when `p` lies on the inner side of every plane.
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.planes.iter().all(|plane| plane.distance(p) >= 0.0)
    }

    /// True unless the sphere lies completely behind one of the planes.
    pub fn contains_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance(center) >= -radius)
    }

    /// Conservative box test.
    ///
    /// Accepts as soon as one corner is inside. Otherwise rejects only if a
    /// single plane has every corner behind it, so boxes that straddle the
    /// volume without containing a corner are kept.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let corners = aabb.corners();

        if corners.iter().any(|c| self.contains_point(*c)) {
            return true;
        }

        self.planes
            .iter()
            .all(|plane| corners.iter().any(|c| plane.distance(*c) >= 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::degrees_to_radians;

    fn camera_frustum() -> Frustum {
        let proj = Mat4::perspective(degrees_to_radians(60.0), 1.0, 0.1, 100.0);
        let view = Mat4::look_at(Vec3::new(0.0, 0.0, -10.0), Vec3::ZERO, Vec3::Y);
        Frustum::from_view_projection(&(proj * view))
    }

    #[test]
    fn test_planes_are_normalized() {
        for plane in camera_frustum().planes {
            let n = plane.0.truncate().length();
            assert!((n - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_point_containment() {
        let f = camera_frustum();
        assert!(f.contains_point(Vec3::ZERO));
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, -20.0)));
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, 200.0)));
    }

    #[test]
    fn test_sphere_touching_from_outside() {
        let f = camera_frustum();
        assert!(!f.contains_sphere(Vec3::new(0.0, 0.0, -11.0), 0.5));
        assert!(f.contains_sphere(Vec3::new(0.0, 0.0, -10.5), 1.0));
    }

    #[test]
    fn test_aabb_far_outside_is_rejected() {
        let f = camera_frustum();
        let aabb = Aabb::from_min_max(Vec3::splat(100.0), Vec3::splat(101.0));
        assert!(!f.intersects_aabb(&aabb));
    }

    #[test]
    fn test_aabb_crossing_frustum_without_inner_corner_is_kept() {
        let f = camera_frustum();
        // A long thin slab crossing the view, every corner off-screen.
        let aabb = Aabb::from_min_max(Vec3::new(-500.0, -0.1, -0.1), Vec3::new(500.0, 0.1, 0.1));
        assert!(aabb.corners().iter().all(|c| !f.contains_point(*c)));
        assert!(f.intersects_aabb(&aabb));
    }

    #[test]
    fn test_zero_plane_accepts_everything() {
        let f = Frustum::default();
        assert!(f.contains_point(Vec3::splat(1.0e6)));
    }
}
