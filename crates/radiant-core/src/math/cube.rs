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

//! Cubemap face conventions shared by omni shadows and skybox generation.

use super::{Mat4, Vec3};

/// Viewing direction and up vector used to render one cubemap face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeFaceView {
    /// Direction the face camera looks at.
    pub direction: Vec3,
    /// Up vector of the face camera.
    pub up: Vec3,
}

impl CubeFaceView {
    /// View matrix of this face for a camera placed at `origin`.
    #[inline]
    pub fn view_matrix(&self, origin: Vec3) -> Mat4 {
        Mat4::look_at(origin, origin + self.direction, self.up)
    }
}

/// The six faces in OpenGL order: +X, -X, +Y, -Y, +Z, -Z.
pub const CUBE_FACE_VIEWS: [CubeFaceView; 6] = [
    CubeFaceView {
        direction: Vec3::new(1.0, 0.0, 0.0),
        up: Vec3::new(0.0, -1.0, 0.0),
    },
    CubeFaceView {
        direction: Vec3::new(-1.0, 0.0, 0.0),
        up: Vec3::new(0.0, -1.0, 0.0),
    },
    CubeFaceView {
        direction: Vec3::new(0.0, 1.0, 0.0),
        up: Vec3::new(0.0, 0.0, 1.0),
    },
    CubeFaceView {
        direction: Vec3::new(0.0, -1.0, 0.0),
        up: Vec3::new(0.0, 0.0, -1.0),
    },
    CubeFaceView {
        direction: Vec3::new(0.0, 0.0, 1.0),
        up: Vec3::new(0.0, -1.0, 0.0),
    },
    CubeFaceView {
        direction: Vec3::new(0.0, 0.0, -1.0),
        up: Vec3::new(0.0, -1.0, 0.0),
    },
];

/// Returns the cubemap face (0..6, OpenGL order) a direction points into.
///
/// The face is chosen by the dominant axis; ties favour X over Y over Z.
pub fn cube_face_index(direction: Vec3) -> usize {
    let (ax, ay, az) = (direction.x.abs(), direction.y.abs(), direction.z.abs());
    if ax >= ay && ax >= az {
        if direction.x >= 0.0 {
            0
        } else {
            1
        }
    } else if ay >= az {
        if direction.y >= 0.0 {
            2
        } else {
            3
        }
    } else if direction.z >= 0.0 {
        4
    } else {
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_index_matches_face_direction() {
        for (i, face) in CUBE_FACE_VIEWS.iter().enumerate() {
            assert_eq!(cube_face_index(face.direction), i);
            assert_eq!(cube_face_index(face.direction * 3.0 + face.up * 0.5), i);
        }
    }

    #[test]
    fn test_face_views_look_along_direction() {
        for face in CUBE_FACE_VIEWS {
            let view = face.view_matrix(Vec3::ZERO);
            let p = view.transform_point(face.direction);
            assert!((p.z + 1.0).abs() < 1e-5);
        }
    }
}
