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

//! Axis-aligned bounding boxes.

use serde::{Deserialize, Serialize};

use super::{Mat4, Vec3};

/// An Axis-Aligned Bounding Box (AABB).
///
/// Defined by its minimum and maximum corners. Used for culling against the
/// camera frustum and the per-light shadow frusta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// The minimum corner of the box.
    pub min: Vec3,
    /// The maximum corner of the box.
    pub max: Vec3,
}

impl Aabb {
    /// The unit cube centered on the origin, `[-0.5, 0.5]` on every axis.
    pub const UNIT_CUBE: Self = Self {
        min: Vec3::new(-0.5, -0.5, -0.5),
        max: Vec3::new(0.5, 0.5, 0.5),
    };

    /// Creates a box from two corners, sorting each component.
    #[inline]
    pub fn from_min_max(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Computes the smallest box enclosing every point.
    ///
    /// Returns `None` when `points` is empty.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Self {
            min: *first,
            max: *first,
        };
        for p in rest {
            aabb.min = aabb.min.min(*p);
            aabb.max = aabb.max.max(*p);
        }
        Some(aabb)
    }

    /// The center of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// The size of the box along each axis.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns the eight corners of the box.
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Transforms the eight corners and returns the box enclosing them.
    pub fn transform(&self, matrix: &Mat4) -> Self {
        let corners = self.corners().map(|c| matrix.transform_point(c));
        let mut out = Self {
            min: corners[0],
            max: corners[0],
        };
        for c in &corners[1..] {
            out.min = out.min.min(*c);
            out.max = out.max.max(*c);
        }
        out
    }

    /// Returns the union of two boxes.
    #[inline]
    pub fn merge(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grows the box by `margin` on every side.
    #[inline]
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::UNIT_CUBE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_encloses_all() {
        let aabb = Aabb::from_points(&[
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(-2.0, 3.0, 1.0),
            Vec3::new(0.0, 0.0, -5.0),
        ])
        .unwrap();
        assert_eq!(aabb.min, Vec3::new(-2.0, -1.0, -5.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 3.0, 1.0));
        assert!(Aabb::from_points(&[]).is_none());
    }

    #[test]
    fn test_transform_by_translation_and_scale() {
        let m = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)) * Mat4::from_scale(Vec3::splat(2.0));
        let out = Aabb::UNIT_CUBE.transform(&m);
        assert_eq!(out.min, Vec3::new(9.0, -1.0, -1.0));
        assert_eq!(out.max, Vec3::new(11.0, 1.0, 1.0));
    }
}
