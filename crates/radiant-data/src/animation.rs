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

//! Skeletal animation with CPU skinning.
//!
//! Poses are stored in model space. Skinning a vertex blends up to four
//! bone matrices `frame_pose * inverse(bind_pose)` applied to the vertex in
//! its bind position.

use radiant_core::math::{Mat4, Quaternion, Vec3};

use crate::mesh::Mesh;

/// Maximum number of bone influences per vertex.
pub const MAX_BONE_INFLUENCES: usize = 4;

/// A bone of a skeleton.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneInfo {
    /// The bone name, as exported.
    pub name: String,
    /// Index of the parent bone.
    pub parent: Option<usize>,
}

/// The model-space placement of one bone.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BonePose {
    /// Translation.
    pub translation: Vec3,
    /// Rotation.
    pub rotation: Quaternion,
    /// Scale.
    pub scale: Vec3,
}

impl BonePose {
    /// The pose as a `T * R * S` matrix.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Per-vertex bone influences and the bind-pose vertex data they apply to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skin {
    /// Bone indices per vertex.
    pub bone_ids: Vec<[u16; MAX_BONE_INFLUENCES]>,
    /// Bone weights per vertex; each set sums to 1.
    pub bone_weights: Vec<[f32; MAX_BONE_INFLUENCES]>,
    /// Vertex positions in bind pose.
    pub bind_positions: Vec<Vec3>,
    /// Vertex normals in bind pose.
    pub bind_normals: Vec<Vec3>,
}

/// A named animation clip.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAnimation {
    /// The clip name.
    pub name: String,
    /// The skeleton the clip animates.
    pub bones: Vec<BoneInfo>,
    /// One model-space pose per bone for every frame.
    pub frame_poses: Vec<Vec<BonePose>>,
}

impl ModelAnimation {
    /// Number of frames in the clip.
    pub fn frame_count(&self) -> usize {
        self.frame_poses.len()
    }

    /// Bone matrices for `frame`, wrapped modulo the frame count.
    ///
    /// Returns an empty list for a clip without frames.
    pub fn bone_matrices(&self, bind_pose: &[BonePose], frame: usize) -> Vec<Mat4> {
        if self.frame_poses.is_empty() {
            return Vec::new();
        }
        let poses = &self.frame_poses[frame % self.frame_poses.len()];
        poses
            .iter()
            .zip(bind_pose)
            .map(|(pose, bind)| {
                let inv_bind = bind.to_matrix().inverse().unwrap_or(Mat4::IDENTITY);
                pose.to_matrix() * inv_bind
            })
            .collect()
    }

    /// Skins `mesh` at `frame`, rewriting its positions and normals.
    ///
    /// Meshes without a [`Skin`] are left untouched. Returns `true` when the
    /// mesh was modified and needs re-uploading.
    pub fn apply(&self, mesh: &mut Mesh, bind_pose: &[BonePose], frame: usize) -> bool {
        let Some(skin) = mesh.skin.as_ref() else {
            return false;
        };
        let matrices = self.bone_matrices(bind_pose, frame);
        if matrices.is_empty() {
            return false;
        }

        let has_normals =
            !skin.bind_normals.is_empty() && mesh.data.normals.len() == skin.bind_normals.len();

        for (v, (ids, weights)) in skin.bone_ids.iter().zip(&skin.bone_weights).enumerate() {
            let Some(&bind_pos) = skin.bind_positions.get(v) else {
                break;
            };
            let bind_nrm = skin.bind_normals.get(v).copied().filter(|_| has_normals);
            let mut pos = Vec3::ZERO;
            let mut nrm = Vec3::ZERO;
            let mut total = 0.0;

            for (&id, &w) in ids.iter().zip(weights) {
                if w <= 0.0 {
                    continue;
                }
                let Some(m) = matrices.get(id as usize) else {
                    continue;
                };
                pos += m.transform_point(bind_pos) * w;
                if let Some(n) = bind_nrm {
                    nrm += m.transform_vector(n) * w;
                }
                total += w;
            }

            if total > 0.0 {
                if let Some(p) = mesh.data.positions.get_mut(v) {
                    *p = pos / total;
                }
                if let (Some(_), Some(n)) = (bind_nrm, mesh.data.normals.get_mut(v)) {
                    *n = nrm.normalize();
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radiant_core::renderer::MeshData;

    fn skinned_segment() -> (Mesh, Vec<BonePose>) {
        let positions = vec![Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0)];
        let mut mesh = Mesh::new(MeshData {
            positions: positions.clone(),
            normals: vec![Vec3::X; 2],
            ..Default::default()
        });
        mesh.skin = Some(Skin {
            bone_ids: vec![[0, 0, 0, 0], [1, 0, 0, 0]],
            bone_weights: vec![[1.0, 0.0, 0.0, 0.0], [1.0, 0.0, 0.0, 0.0]],
            bind_positions: positions,
            bind_normals: vec![Vec3::X; 2],
        });
        let bind = vec![
            BonePose {
                scale: Vec3::ONE,
                ..Default::default()
            },
            BonePose {
                translation: Vec3::new(0.0, 1.0, 0.0),
                scale: Vec3::ONE,
                ..Default::default()
            },
        ];
        (mesh, bind)
    }

    #[test]
    fn test_skinning_moves_vertices_with_bones() {
        let (mut mesh, bind) = skinned_segment();
        let mut moved = bind.clone();
        moved[1].translation = Vec3::new(2.0, 1.0, 0.0);
        let anim = ModelAnimation {
            name: "slide".into(),
            bones: vec![
                BoneInfo {
                    name: "root".into(),
                    parent: None,
                },
                BoneInfo {
                    name: "tip".into(),
                    parent: Some(0),
                },
            ],
            frame_poses: vec![bind.clone(), moved],
        };

        assert!(anim.apply(&mut mesh, &bind, 1));
        assert_eq!(mesh.data.positions[0], Vec3::ZERO);
        assert_eq!(mesh.data.positions[1], Vec3::new(2.0, 1.0, 0.0));

        // Frame 2 wraps to frame 0, the bind pose.
        assert!(anim.apply(&mut mesh, &bind, 2));
        assert_eq!(mesh.data.positions[1], Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_unskinned_mesh_is_untouched() {
        let mut mesh = Mesh::new(MeshData {
            positions: vec![Vec3::X],
            ..Default::default()
        });
        let anim = ModelAnimation {
            name: "idle".into(),
            bones: Vec::new(),
            frame_poses: vec![Vec::new()],
        };
        assert!(!anim.apply(&mut mesh, &[], 0));
    }

    #[test]
    fn test_skinning_without_normals_moves_positions_only() {
        let (mut mesh, bind) = skinned_segment();
        mesh.data.normals.clear();
        if let Some(skin) = mesh.skin.as_mut() {
            skin.bind_normals.clear();
        }
        let mut moved = bind.clone();
        moved[1].translation = Vec3::new(0.0, 3.0, 0.0);
        let anim = ModelAnimation {
            name: "stretch".into(),
            bones: vec![
                BoneInfo {
                    name: "root".into(),
                    parent: None,
                },
                BoneInfo {
                    name: "tip".into(),
                    parent: Some(0),
                },
            ],
            frame_poses: vec![moved],
        };

        assert!(anim.apply(&mut mesh, &bind, 0));
        assert_eq!(mesh.data.positions[1], Vec3::new(0.0, 3.0, 0.0));
        assert!(mesh.data.normals.is_empty());
    }
}
