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

//! Draw calls collected during submission and the keyed batches holding them.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use radiant_core::math::{Color, Mat4, Vec3};
use radiant_core::renderer::{DepthSortOrder, MaterialConfig, MeshId};
use radiant_data::Material;

use super::light::{LightId, MAX_LIGHTS_PER_CALL};

/// One particle resolved to a world matrix and a tint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleInstance {
    /// World matrix of the particle.
    pub transform: Mat4,
    /// Tint multiplied with the material albedo.
    pub color: Color,
}

/// What a call draws.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawSource {
    /// An uploaded surface mesh.
    Mesh {
        /// The mesh.
        mesh: MeshId,
        /// Triangles per draw.
        triangles: usize,
    },
    /// A sprite frame, drawn with the renderer's shared unit quad.
    Sprite,
    /// Every live particle of a system, each drawn with the system mesh.
    Particles {
        /// The system mesh.
        mesh: MeshId,
        /// Triangles per particle.
        triangles: usize,
        /// Live particles at submission time.
        instances: Vec<ParticleInstance>,
    },
}

impl DrawSource {
    /// Number of device draws this source issues.
    pub fn draw_count(&self) -> usize {
        match self {
            DrawSource::Particles { instances, .. } => instances.len(),
            _ => 1,
        }
    }

    /// Calls `draw` once per device draw with the mesh, its triangle count,
    /// the world matrix and the particle tint.
    ///
    /// `quad` is the mesh and triangle count sprites are drawn with.
    pub fn for_each_draw(
        &self,
        transform: Mat4,
        quad: (MeshId, usize),
        mut draw: impl FnMut(MeshId, usize, Mat4, Option<Color>),
    ) {
        match self {
            DrawSource::Mesh { mesh, triangles } => draw(*mesh, *triangles, transform, None),
            DrawSource::Sprite => draw(quad.0, quad.1, transform, None),
            DrawSource::Particles {
                mesh,
                triangles,
                instances,
            } => {
                for particle in instances {
                    draw(*mesh, *triangles, particle.transform, Some(particle.color));
                }
            }
        }
    }
}

/// Fixed-capacity list of the lights affecting a scene call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightSet {
    ids: [Option<LightId>; MAX_LIGHTS_PER_CALL],
    len: usize,
}

impl LightSet {
    /// Adds a light. Returns `false` when the set is full.
    pub fn push(&mut self, id: LightId) -> bool {
        if self.len == MAX_LIGHTS_PER_CALL {
            return false;
        }
        self.ids[self.len] = Some(id);
        self.len += 1;
        true
    }

    /// True when no more light fits.
    pub fn is_full(&self) -> bool {
        self.len == MAX_LIGHTS_PER_CALL
    }

    /// Number of lights.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no light is set.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The lights in selection order.
    pub fn iter(&self) -> impl Iterator<Item = LightId> + '_ {
        self.ids[..self.len].iter().flatten().copied()
    }

    /// True if `id` is in the set.
    pub fn contains(&self, id: LightId) -> bool {
        self.iter().any(|l| l == id)
    }
}

/// A draw of the HDR scene pass.
///
/// The material is copied so the same surface can be drawn several times in
/// one frame with different parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneCall {
    /// What is drawn.
    pub source: DrawSource,
    /// Material copy.
    pub material: Material,
    /// World matrix; identity for particles, whose matrices are per instance.
    pub transform: Mat4,
    /// Lights shading this call.
    pub lights: LightSet,
}

impl SceneCall {
    /// World position used by depth sorting, `None` for particle systems.
    pub fn sort_position(&self) -> Option<Vec3> {
        match self.source {
            DrawSource::Particles { .. } => None,
            _ => Some(self.transform.translation()),
        }
    }
}

/// A draw of a shadow pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowCall {
    /// What is drawn.
    pub source: DrawSource,
    /// World matrix; identity for particles.
    pub transform: Mat4,
}

/// An ordered multimap from batch keys to calls.
///
/// Keys iterate in order, so a frame is traversed deterministically. Calls
/// of a batch keep their insertion order.
#[derive(Debug, Clone)]
pub struct BatchMap<K: Ord, C> {
    batches: BTreeMap<K, Vec<C>>,
}

impl<K: Ord, C> Default for BatchMap<K, C> {
    fn default() -> Self {
        Self {
            batches: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy, C> BatchMap<K, C> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// The calls of `key`, if any were ever pushed.
    pub fn get_batch(&self, key: &K) -> Option<&[C]> {
        self.batches.get(key).map(Vec::as_slice)
    }

    /// Appends a call to the batch of `key`.
    pub fn push(&mut self, key: K, call: C) {
        self.batches.entry(key).or_default().push(call);
    }

    /// Empties every batch. Keys and allocations are kept for the next frame.
    pub fn clear_all(&mut self) {
        self.batches.values_mut().for_each(Vec::clear);
    }

    /// Empties the batch of `key`.
    pub fn clear_batch(&mut self, key: &K) {
        if let Some(batch) = self.batches.get_mut(key) {
            batch.clear();
        }
    }

    /// Forgets `key` entirely.
    pub fn remove(&mut self, key: &K) {
        self.batches.remove(key);
    }

    /// Non-empty batches in key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &[C])> {
        self.batches
            .iter()
            .filter(|(_, calls)| !calls.is_empty())
            .map(|(k, calls)| (*k, calls.as_slice()))
    }

    /// Mutable access to every batch in key order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (K, &mut Vec<C>)> {
        self.batches.iter_mut().map(|(k, calls)| (*k, calls))
    }

    /// Number of non-empty batches.
    pub fn batch_count(&self) -> usize {
        self.batches.values().filter(|b| !b.is_empty()).count()
    }

    /// Total number of calls.
    pub fn call_count(&self) -> usize {
        self.batches.values().map(Vec::len).sum()
    }

    /// True when no call is queued.
    pub fn is_empty(&self) -> bool {
        self.batches.values().all(Vec::is_empty)
    }
}

/// Scene calls keyed by material configuration.
pub type SceneBatches = BatchMap<MaterialConfig, SceneCall>;

/// Shadow calls keyed by light.
pub type ShadowBatches = BatchMap<LightId, ShadowCall>;

impl SceneBatches {
    /// Sorts every batch by distance to `eye`.
    ///
    /// Calls without a position (particle systems) always go last. The sort
    /// is stable, so equal distances keep submission order.
    pub fn sort_by_depth(&mut self, eye: Vec3, order: DepthSortOrder) {
        if order == DepthSortOrder::Disabled {
            return;
        }
        let key = |call: &SceneCall| call.sort_position().map(|p| p.distance_squared(eye));
        for (_, calls) in self.iter_mut() {
            calls.sort_by(|a, b| match (key(a), key(b)) {
                (Some(da), Some(db)) => {
                    let near_first = da.partial_cmp(&db).unwrap_or(Ordering::Equal);
                    match order {
                        DepthSortOrder::FarToNear => near_first.reverse(),
                        _ => near_first,
                    }
                }
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_at(x: f32) -> SceneCall {
        SceneCall {
            source: DrawSource::Mesh {
                mesh: MeshId(1),
                triangles: 2,
            },
            material: Material::default(),
            transform: Mat4::from_translation(Vec3::new(x, 0.0, 0.0)),
            lights: LightSet::default(),
        }
    }

    fn particles() -> SceneCall {
        SceneCall {
            source: DrawSource::Particles {
                mesh: MeshId(2),
                triangles: 2,
                instances: Vec::new(),
            },
            ..call_at(0.0)
        }
    }

    #[test]
    fn test_particles_draw_once_per_instance() {
        let instance = |x: f32| ParticleInstance {
            transform: Mat4::from_translation(Vec3::new(x, 0.0, 0.0)),
            color: Color::WHITE,
        };
        let source = DrawSource::Particles {
            mesh: MeshId(7),
            triangles: 2,
            instances: vec![instance(1.0), instance(2.0), instance(3.0)],
        };
        let mut xs = Vec::new();
        source.for_each_draw(Mat4::IDENTITY, (MeshId(1), 2), |mesh, _, world, tint| {
            assert_eq!(mesh, MeshId(7));
            assert!(tint.is_some());
            xs.push(world.translation().x);
        });
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
        assert_eq!(source.draw_count(), 3);

        let mut meshes = Vec::new();
        DrawSource::Sprite.for_each_draw(Mat4::IDENTITY, (MeshId(1), 2), |mesh, _, _, _| {
            meshes.push(mesh)
        });
        assert_eq!(meshes, vec![MeshId(1)]);
    }

    #[test]
    fn test_light_set_caps_at_eight() {
        let mut set = LightSet::default();
        for i in 0..10 {
            set.push(LightId(i + 1));
        }
        assert_eq!(set.len(), MAX_LIGHTS_PER_CALL);
        assert!(set.is_full());
        assert!(set.contains(LightId(8)));
        assert!(!set.contains(LightId(9)));
    }

    #[test]
    fn test_batches_iterate_in_key_order_and_clear() {
        let mut map: BatchMap<u32, &str> = BatchMap::new();
        map.push(3, "c");
        map.push(1, "a");
        map.push(1, "b");
        let keys: Vec<u32> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![1, 3]);
        assert_eq!(map.get_batch(&1), Some(&["a", "b"][..]));
        assert_eq!(map.call_count(), 3);

        map.clear_all();
        assert!(map.is_empty());
        assert_eq!(map.batch_count(), 0);
        assert_eq!(map.iter().count(), 0);
    }

    #[test]
    fn test_depth_sort_puts_particles_last() {
        let mut batches = SceneBatches::new();
        let config = MaterialConfig::default();
        batches.push(config, particles());
        batches.push(config, call_at(1.0));
        batches.push(config, call_at(5.0));
        batches.push(config, call_at(3.0));

        batches.sort_by_depth(Vec3::ZERO, DepthSortOrder::FarToNear);
        let xs: Vec<Option<f32>> = batches
            .get_batch(&config)
            .unwrap_or_default()
            .iter()
            .map(|c| c.sort_position().map(|p| p.x))
            .collect();
        assert_eq!(xs, vec![Some(5.0), Some(3.0), Some(1.0), None]);

        batches.sort_by_depth(Vec3::ZERO, DepthSortOrder::NearToFar);
        let xs: Vec<Option<f32>> = batches
            .get_batch(&config)
            .unwrap_or_default()
            .iter()
            .map(|c| c.sort_position().map(|p| p.x))
            .collect();
        assert_eq!(xs, vec![Some(1.0), Some(3.0), Some(5.0), None]);
    }
}
