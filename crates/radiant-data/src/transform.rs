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

//! Hierarchical transforms.
//!
//! A [`Transform`] stores translation, rotation and scale plus an optional
//! shared parent. The global matrix walks the parent chain; cycles are
//! detected and reported instead of recursing forever.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use radiant_core::math::{Mat4, Quaternion, Vec3, EPSILON};

/// A shared, mutable transform usable as a parent.
pub type TransformRef = Rc<RefCell<Transform>>;

/// Errors returned when resolving a transform hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformError {
    /// The parent chain loops back onto itself.
    Cycle,
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::Cycle => write!(f, "Transform parent chain contains a cycle"),
        }
    }
}

impl std::error::Error for TransformError {}

/// Translation, rotation and scale with an optional parent.
#[derive(Debug, Clone)]
pub struct Transform {
    /// Translation relative to the parent.
    pub position: Vec3,
    /// Rotation relative to the parent.
    pub rotation: Quaternion,
    /// Scale relative to the parent.
    pub scale: Vec3,
    /// The parent transform, if any.
    pub parent: Option<TransformRef>,
}

impl Transform {
    /// The identity transform, optionally attached to `parent`.
    pub fn identity(parent: Option<TransformRef>) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quaternion::IDENTITY,
            scale: Vec3::ONE,
            parent,
        }
    }

    /// Decomposes an affine matrix without shear into a parentless transform.
    ///
    /// Scale is the length of each basis column; the rotation is read from the
    /// basis once the scale is divided out.
    pub fn from_matrix(m: &Mat4) -> Self {
        let position = m.translation();
        let x = m.cols[0].truncate();
        let y = m.cols[1].truncate();
        let z = m.cols[2].truncate();
        let scale = Vec3::new(x.length(), y.length(), z.length());

        let unscale = |v: Vec3, s: f32| if s > EPSILON { v / s } else { v };
        let rot = Mat4::from_cols(
            unscale(x, scale.x).extend(0.0),
            unscale(y, scale.y).extend(0.0),
            unscale(z, scale.z).extend(0.0),
            Mat4::IDENTITY.cols[3],
        );

        Self {
            position,
            rotation: Quaternion::from_rotation_matrix(&rot),
            scale,
            parent: None,
        }
    }

    /// Wraps the transform for use as a parent.
    pub fn into_shared(self) -> TransformRef {
        Rc::new(RefCell::new(self))
    }

    /// The local matrix `T * R * S`.
    pub fn to_local(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// The global matrix `parent.global * local`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Cycle`] if the parent chain revisits a transform.
    pub fn to_global(&self) -> Result<Mat4, TransformError> {
        let mut global = self.to_local();
        let mut visited: Vec<*const Transform> = vec![self as *const Transform];
        let mut next = self.parent.clone();

        while let Some(parent) = next {
            let ptr = parent.as_ptr() as *const Transform;
            if visited.contains(&ptr) {
                return Err(TransformError::Cycle);
            }
            visited.push(ptr);

            let p = parent.borrow();
            global = p.to_local() * global;
            next = p.parent.clone();
        }

        Ok(global)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_vec3_eq(a: Vec3, b: Vec3) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-4);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-4);
        assert_abs_diff_eq!(a.z, b.z, epsilon = 1e-4);
    }

    #[test]
    fn test_from_matrix_recovers_local() {
        let t = Transform {
            position: Vec3::new(1.0, -2.0, 3.5),
            rotation: Quaternion::from_axis_angle(Vec3::new(0.2, 1.0, -0.4), 1.3),
            scale: Vec3::new(2.0, 0.5, 3.0),
            parent: None,
        };
        let back = Transform::from_matrix(&t.to_local());
        assert_vec3_eq(back.position, t.position);
        assert_vec3_eq(back.scale, t.scale);
        assert_abs_diff_eq!(back.rotation.dot(t.rotation).abs(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_global_composes_parents() {
        let root = Transform {
            position: Vec3::new(10.0, 0.0, 0.0),
            ..Transform::identity(None)
        }
        .into_shared();
        let child = Transform {
            position: Vec3::new(0.0, 1.0, 0.0),
            scale: Vec3::splat(2.0),
            ..Transform::identity(Some(root.clone()))
        };
        let global = child.to_global().unwrap();
        assert_vec3_eq(global.transform_point(Vec3::X), Vec3::new(12.0, 1.0, 0.0));
    }

    #[test]
    fn test_cycle_is_reported() {
        let a = Transform::identity(None).into_shared();
        let b = Transform::identity(Some(a.clone())).into_shared();
        a.borrow_mut().parent = Some(b.clone());
        assert_eq!(b.borrow().to_global(), Err(TransformError::Cycle));
        // Break the cycle so the Rc pair is freed.
        a.borrow_mut().parent = None;
    }
}
