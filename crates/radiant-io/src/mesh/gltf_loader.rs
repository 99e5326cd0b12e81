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

//! glTF 2.0 import: meshes, materials, skins and animation clips.
//!
//! Static meshes are baked into model space with their node transforms.
//! Skinned meshes stay in mesh space and keep their bind-pose vertices in a
//! [`Skin`]; the skeleton is the first skin of the document.

use std::path::Path;

use ahash::AHashMap;
use gltf::{
    animation::{util::ReadOutputs, Interpolation},
    buffer::Data,
    Document,
};
use radiant_core::{
    math::{Color, Mat4, Quaternion, Vec2, Vec3, Vec4},
    renderer::{MaterialConfig, MeshData},
};
use radiant_data::{
    animation::MAX_BONE_INFLUENCES, BoneInfo, BonePose, Material, Mesh, Model, ModelAnimation, Skin,
    Surface, Transform,
};

use crate::AssetError;

/// Sampling rate of imported animation clips, in frames per second.
pub const ANIMATION_FPS: f32 = 60.0;

/// Loads a `.gltf` or `.glb` file as a model.
pub fn load_gltf(path: impl AsRef<Path>, config: MaterialConfig) -> Result<Model, AssetError> {
    let path = path.as_ref();
    let (document, buffers, _) = gltf::import(path)?;
    build_model(&document, &buffers, config).ok_or_else(|| AssetError::Empty(path.to_path_buf()))
}

/// Parses a self-contained glTF document held in memory.
pub fn decode_gltf(bytes: &[u8], config: MaterialConfig) -> Result<Model, AssetError> {
    let (document, buffers, _) = gltf::import_slice(bytes)?;
    build_model(&document, &buffers, config).ok_or_else(|| AssetError::Empty("<memory>".into()))
}

/// Loads every animation clip of a `.gltf` or `.glb` file.
///
/// Clips are sampled at [`ANIMATION_FPS`] into model-space bone poses of the
/// first skin. Files without a skin have no usable clip.
pub fn load_gltf_animations(path: impl AsRef<Path>) -> Result<Vec<ModelAnimation>, AssetError> {
    let (document, buffers, _) = gltf::import(path.as_ref())?;
    Ok(build_animations(&document, &buffers))
}

/// Node hierarchy with rest-pose local transforms.
struct Hierarchy {
    parents: AHashMap<usize, usize>,
    locals: Vec<BonePose>,
}

impl Hierarchy {
    fn new(document: &Document) -> Self {
        let mut parents = AHashMap::new();
        let mut locals = Vec::with_capacity(document.nodes().count());
        for node in document.nodes() {
            for child in node.children() {
                parents.insert(child.index(), node.index());
            }
            let (t, r, s) = node.transform().decomposed();
            locals.push(BonePose {
                translation: Vec3::new(t[0], t[1], t[2]),
                rotation: Quaternion::new(r[0], r[1], r[2], r[3]),
                scale: Vec3::new(s[0], s[1], s[2]),
            });
        }
        Self { parents, locals }
    }

    /// Model-space matrix of `node` given the local poses `locals`.
    fn global(&self, node: usize, locals: &[BonePose]) -> Mat4 {
        let mut matrix = locals[node].to_matrix();
        let mut current = node;
        while let Some(&parent) = self.parents.get(&current) {
            matrix = locals[parent].to_matrix() * matrix;
            current = parent;
        }
        matrix
    }
}

fn pose_from_matrix(m: &Mat4) -> BonePose {
    let t = Transform::from_matrix(m);
    BonePose {
        translation: t.position,
        rotation: t.rotation,
        scale: t.scale,
    }
}

/// The skeleton of the first skin: joint node indices, bones and bind pose.
fn skeleton(document: &Document, buffers: &[Data], hierarchy: &Hierarchy) -> (Vec<usize>, Vec<BoneInfo>, Vec<BonePose>) {
    let Some(skin) = document.skins().next() else {
        return (Vec::new(), Vec::new(), Vec::new());
    };
    let joints: Vec<usize> = skin.joints().map(|n| n.index()).collect();
    let joint_slot: AHashMap<usize, usize> = joints.iter().enumerate().map(|(i, &n)| (n, i)).collect();

    let bones = skin
        .joints()
        .map(|node| {
            let mut parent = hierarchy.parents.get(&node.index()).copied();
            while let Some(p) = parent {
                if joint_slot.contains_key(&p) {
                    break;
                }
                parent = hierarchy.parents.get(&p).copied();
            }
            BoneInfo {
                name: node.name().map_or_else(|| format!("bone_{}", node.index()), str::to_owned),
                parent: parent.and_then(|p| joint_slot.get(&p).copied()),
            }
        })
        .collect();

    let reader = skin.reader(|b| Some(&buffers[b.index()]));
    let bind_pose = match reader.read_inverse_bind_matrices() {
        Some(ibms) => ibms
            .map(|m| {
                let inverse = Mat4::from_cols_array(&flatten(m));
                pose_from_matrix(&inverse.inverse().unwrap_or(Mat4::IDENTITY))
            })
            .collect(),
        None => joints
            .iter()
            .map(|&j| pose_from_matrix(&hierarchy.global(j, &hierarchy.locals)))
            .collect(),
    };
    (joints, bones, bind_pose)
}

fn flatten(m: [[f32; 4]; 4]) -> [f32; 16] {
    let mut out = [0.0; 16];
    for (c, col) in m.iter().enumerate() {
        out[c * 4..c * 4 + 4].copy_from_slice(col);
    }
    out
}

fn build_model(document: &Document, buffers: &[Data], config: MaterialConfig) -> Option<Model> {
    let hierarchy = Hierarchy::new(document);
    let (_, bones, bind_pose) = skeleton(document, buffers, &hierarchy);
    let mut surfaces = Vec::new();

    for node in document.nodes() {
        let Some(gltf_mesh) = node.mesh() else {
            continue;
        };
        let skinned = node.skin().is_some() && !bones.is_empty();
        let world = hierarchy.global(node.index(), &hierarchy.locals);

        for primitive in gltf_mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "Skipping primitive {} of mesh {}: mode {:?} is not a triangle list",
                    primitive.index(),
                    gltf_mesh.index(),
                    primitive.mode()
                );
                continue;
            }
            let reader = primitive.reader(|b| Some(&buffers[b.index()]));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let mut data = MeshData {
                positions: positions.map(Vec3::from).collect(),
                normals: reader
                    .read_normals()
                    .map(|n| n.map(Vec3::from).collect())
                    .unwrap_or_default(),
                texcoords: reader
                    .read_tex_coords(0)
                    .map(|t| t.into_f32().map(|[u, v]| Vec2::new(u, v)).collect())
                    .unwrap_or_default(),
                colors: reader
                    .read_colors(0)
                    .map(|c| c.into_rgba_u8().map(|[r, g, b, a]| Color::new(r, g, b, a)).collect())
                    .unwrap_or_default(),
                tangents: reader
                    .read_tangents()
                    .map(|t| t.map(|[x, y, z, w]| Vec4::new(x, y, z, w)).collect())
                    .unwrap_or_default(),
                indices: reader
                    .read_indices()
                    .map(|i| i.into_u32().collect())
                    .unwrap_or_default(),
            };

            let mut mesh = if skinned {
                let bone_ids: Vec<[u16; MAX_BONE_INFLUENCES]> = reader
                    .read_joints(0)
                    .map(|j| j.into_u16().collect())
                    .unwrap_or_default();
                let bone_weights: Vec<[f32; MAX_BONE_INFLUENCES]> = reader
                    .read_weights(0)
                    .map(|w| w.into_f32().collect())
                    .unwrap_or_default();
                let skin = (bone_ids.len() == data.positions.len()).then(|| Skin {
                    bone_ids,
                    bone_weights,
                    bind_positions: data.positions.clone(),
                    bind_normals: data.normals.clone(),
                });
                let mut mesh = Mesh::new(data);
                mesh.skin = skin;
                mesh
            } else {
                if world != Mat4::IDENTITY {
                    bake(&mut data, &world);
                }
                Mesh::new(data)
            };
            if mesh.data.tangents.is_empty() && !mesh.data.texcoords.is_empty() {
                mesh.generate_tangents();
            }

            surfaces.push(Surface::new(mesh, material(&primitive.material(), config)));
        }
    }

    if surfaces.is_empty() {
        return None;
    }
    log::debug!("Imported glTF with {} surfaces and {} bones", surfaces.len(), bones.len());
    let mut model = Model::from_surfaces(surfaces, bones, bind_pose);
    model.add_animations(build_animations(document, buffers));
    Some(model)
}

fn bake(data: &mut MeshData, world: &Mat4) {
    let normal = world.normal_matrix();
    for p in &mut data.positions {
        *p = world.transform_point(*p);
    }
    for n in &mut data.normals {
        *n = normal.transform_vector(*n).normalize();
    }
    for t in &mut data.tangents {
        let v = world.transform_vector(t.truncate()).normalize();
        *t = v.extend(t.w);
    }
}

fn material(source: &gltf::Material<'_>, config: MaterialConfig) -> Material {
    let mut material = Material::new(config);
    let pbr = source.pbr_metallic_roughness();
    let [r, g, b, a] = pbr.base_color_factor();
    material.albedo.color = Color::from_vec4(Vec4::new(r, g, b, a));
    material.metalness.value = pbr.metallic_factor();
    material.roughness.value = pbr.roughness_factor();
    let [er, eg, eb] = source.emissive_factor();
    material.emission.color = Color::from_vec4(Vec4::new(er, eg, eb, 1.0));
    if let Some(occlusion) = source.occlusion_texture() {
        material.ao.value = occlusion.strength();
    }
    material
}

/// Keyframes of one animated property.
struct Track<T> {
    times: Vec<f32>,
    values: Vec<T>,
    step: bool,
}

impl<T: Copy> Track<T> {
    fn sample(&self, time: f32, lerp: impl Fn(T, T, f32) -> T) -> Option<T> {
        let first = *self.values.first()?;
        let i = self.times.partition_point(|&t| t <= time);
        if i == 0 {
            return Some(first);
        }
        if i >= self.times.len() {
            return self.values.last().copied();
        }
        let (t0, t1) = (self.times[i - 1], self.times[i]);
        let (v0, v1) = (self.values[i - 1], self.values[i]);
        if self.step || t1 <= t0 {
            return Some(v0);
        }
        Some(lerp(v0, v1, (time - t0) / (t1 - t0)))
    }
}

/// Keeps the values of a sampler; cubic splines store an
/// `(in-tangent, value, out-tangent)` triplet per key.
fn key_values<T>(values: Vec<T>, cubic: bool) -> Vec<T> {
    if cubic {
        values.into_iter().skip(1).step_by(3).collect()
    } else {
        values
    }
}

#[derive(Default)]
struct NodeTracks {
    translation: Option<Track<Vec3>>,
    rotation: Option<Track<Quaternion>>,
    scale: Option<Track<Vec3>>,
}

fn build_animations(document: &Document, buffers: &[Data]) -> Vec<ModelAnimation> {
    let hierarchy = Hierarchy::new(document);
    let (joints, bones, _) = skeleton(document, buffers, &hierarchy);
    if joints.is_empty() {
        let count = document.animations().count();
        if count > 0 {
            log::warn!("Ignoring {} animations without a skin", count);
        }
        return Vec::new();
    }

    document
        .animations()
        .map(|anim| {
            let mut tracks: AHashMap<usize, NodeTracks> = AHashMap::new();
            let mut duration = 0.0f32;

            for channel in anim.channels() {
                let reader = channel.reader(|b| Some(&buffers[b.index()]));
                let Some(times) = reader.read_inputs().map(|t| t.collect::<Vec<f32>>()) else {
                    continue;
                };
                let interpolation = channel.sampler().interpolation();
                let step = interpolation == Interpolation::Step;
                let cubic = interpolation == Interpolation::CubicSpline;
                duration = duration.max(times.last().copied().unwrap_or(0.0));
                let entry = tracks.entry(channel.target().node().index()).or_default();

                match reader.read_outputs() {
                    Some(ReadOutputs::Translations(v)) => {
                        entry.translation = Some(Track {
                            times,
                            values: key_values(v.map(Vec3::from).collect(), cubic),
                            step,
                        })
                    }
                    Some(ReadOutputs::Rotations(r)) => {
                        entry.rotation = Some(Track {
                            times,
                            values: key_values(
                                r.into_f32()
                                    .map(|[x, y, z, w]| Quaternion::new(x, y, z, w))
                                    .collect(),
                                cubic,
                            ),
                            step,
                        })
                    }
                    Some(ReadOutputs::Scales(v)) => {
                        entry.scale = Some(Track {
                            times,
                            values: key_values(v.map(Vec3::from).collect(), cubic),
                            step,
                        })
                    }
                    _ => {}
                }
            }

            let frame_count = (duration * ANIMATION_FPS).ceil() as usize + 1;
            let frame_poses = (0..frame_count)
                .map(|frame| {
                    let time = frame as f32 / ANIMATION_FPS;
                    let mut locals = hierarchy.locals.clone();
                    for (&node, track) in &tracks {
                        let local = &mut locals[node];
                        if let Some(t) = track.translation.as_ref().and_then(|t| t.sample(time, Vec3::lerp)) {
                            local.translation = t;
                        }
                        if let Some(r) = track.rotation.as_ref().and_then(|r| r.sample(time, Quaternion::slerp)) {
                            local.rotation = r.normalize();
                        }
                        if let Some(s) = track.scale.as_ref().and_then(|s| s.sample(time, Vec3::lerp)) {
                            local.scale = s;
                        }
                    }
                    joints
                        .iter()
                        .map(|&j| pose_from_matrix(&hierarchy.global(j, &locals)))
                        .collect()
                })
                .collect();

            let name = anim.name().map_or_else(|| format!("animation_{}", anim.index()), str::to_owned);
            log::debug!("Imported animation '{}' with {} frames", name, frame_count);
            ModelAnimation {
                name,
                bones: bones.clone(),
                frame_poses,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_track_interpolates_and_clamps() {
        let track = Track {
            times: vec![0.0, 1.0],
            values: vec![Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)],
            step: false,
        };
        assert_relative_eq!(track.sample(0.5, Vec3::lerp).unwrap().x, 1.0);
        assert_relative_eq!(track.sample(-1.0, Vec3::lerp).unwrap().x, 0.0);
        assert_relative_eq!(track.sample(5.0, Vec3::lerp).unwrap().x, 2.0);
    }

    #[test]
    fn test_step_track_holds_previous_key() {
        let track = Track {
            times: vec![0.0, 1.0],
            values: vec![1.0f32, 3.0],
            step: true,
        };
        assert_eq!(track.sample(0.99, |a, b, t| a + (b - a) * t), Some(1.0));
        assert_eq!(track.sample(1.0, |a, b, t| a + (b - a) * t), Some(3.0));
    }

    #[test]
    fn test_flatten_is_column_major() {
        let m = flatten([[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0], [0.0; 4], [0.0; 4]]);
        assert_eq!(&m[..8], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }
}
