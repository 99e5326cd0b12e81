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

//! CPU-side vertex data handed to the device for upload.

use crate::math::{Aabb, Color, Vec2, Vec3, Vec4};
use crate::renderer::error::ResourceError;

/// Vertex attribute streams of a mesh.
///
/// Every non-empty stream must have one entry per vertex. `indices` may be
/// empty, in which case vertices are drawn as a triangle list in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions (location 0).
    pub positions: Vec<Vec3>,
    /// Texture coordinates (location 1).
    pub texcoords: Vec<Vec2>,
    /// Normals (location 2).
    pub normals: Vec<Vec3>,
    /// Vertex colors (location 3).
    pub colors: Vec<Color>,
    /// Tangents with handedness in `w` (location 4).
    pub tangents: Vec<Vec4>,
    /// Triangle indices.
    pub indices: Vec<u32>,
}

/// A vertex stream that can be re-uploaded after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshAttribute {
    /// Vertex positions.
    Position,
    /// Normals.
    Normal,
    /// Tangents.
    Tangent,
    /// Vertex colors.
    Color,
}

impl MeshData {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles drawn.
    pub fn triangle_count(&self) -> usize {
        if self.indices.is_empty() {
            self.positions.len() / 3
        } else {
            self.indices.len() / 3
        }
    }

    /// Bounding box of the positions, `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(&self.positions)
    }

    /// Checks the stream lengths and index range.
    pub fn validate(&self) -> Result<(), ResourceError> {
        let n = self.positions.len();
        if n == 0 {
            return Err(ResourceError::InvalidMesh("mesh has no vertices".into()));
        }
        let check = |len: usize, what: &str| {
            if len != 0 && len != n {
                Err(ResourceError::InvalidMesh(format!(
                    "{what} stream has {len} entries for {n} vertices"
                )))
            } else {
                Ok(())
            }
        };
        check(self.texcoords.len(), "texcoord")?;
        check(self.normals.len(), "normal")?;
        check(self.colors.len(), "color")?;
        check(self.tangents.len(), "tangent")?;
        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= n) {
            return Err(ResourceError::InvalidMesh(format!(
                "index {bad} out of range for {n} vertices"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshData {
        MeshData {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            indices: vec![0, 1, 2],
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_triangle() {
        let mesh = triangle();
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_mismatched_stream_is_rejected() {
        let mut mesh = triangle();
        mesh.normals = vec![Vec3::Z];
        assert!(matches!(mesh.validate(), Err(ResourceError::InvalidMesh(_))));
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let mut mesh = triangle();
        mesh.indices.push(7);
        assert!(mesh.validate().is_err());
    }
}
