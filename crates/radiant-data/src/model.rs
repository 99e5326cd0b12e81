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

//! Models: lists of surfaces sharing a transform, bounds and draw policies.

use std::collections::BTreeMap;

use radiant_core::math::{Aabb, BillboardMode, Color};
use radiant_core::renderer::{Layers, MaterialConfig, ShadowCastMode, TextureId};

use crate::animation::{BoneInfo, BonePose, ModelAnimation};
use crate::material::Material;
use crate::mesh::Mesh;
use crate::transform::Transform;

/// A mesh paired with the material it is drawn with.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    /// The geometry.
    pub mesh: Mesh,
    /// The material.
    pub material: Material,
}

impl Surface {
    /// Pairs a mesh with a material.
    pub fn new(mesh: Mesh, material: Material) -> Self {
        Self { mesh, material }
    }
}

/// A drawable model.
#[derive(Debug)]
pub struct Model {
    /// Surfaces, drawn in order.
    pub surfaces: Vec<Surface>,
    /// Local transform.
    pub transform: Transform,
    /// Model-space bounds.
    pub aabb: Aabb,
    /// Shadow casting policy.
    pub shadow: ShadowCastMode,
    /// Billboard mode.
    pub billboard: BillboardMode,
    /// Render layers.
    pub layers: Layers,
    /// Skeleton, empty for static models.
    pub bones: Vec<BoneInfo>,
    /// Model-space bind pose, one entry per bone.
    pub bind_pose: Vec<BonePose>,
    animations: BTreeMap<String, ModelAnimation>,
}

impl Model {
    /// Builds a model from surfaces and an optional skeleton.
    ///
    /// The model casts shadows, is not billboarded and lives on layer 1. Its
    /// bounds are computed from the vertices.
    pub fn from_surfaces(surfaces: Vec<Surface>, bones: Vec<BoneInfo>, bind_pose: Vec<BonePose>) -> Self {
        let mut model = Self {
            surfaces,
            transform: Transform::identity(None),
            aabb: Aabb::UNIT_CUBE,
            shadow: ShadowCastMode::On,
            billboard: BillboardMode::Disabled,
            layers: Layers::LAYER_1,
            bones,
            bind_pose,
            animations: BTreeMap::new(),
        };
        model.update_bounding_box(0.0);
        model
    }

    /// A single-surface model drawing `mesh` with a material built from `config`.
    pub fn from_mesh(mesh: Mesh, config: MaterialConfig) -> Self {
        Self::from_surfaces(vec![Surface::new(mesh, Material::new(config))], Vec::new(), Vec::new())
    }

    /// Number of surfaces.
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// The surface at `index`.
    pub fn surface(&self, index: usize) -> Option<&Surface> {
        self.surfaces.get(index)
    }

    /// The surface at `index`, mutably.
    pub fn surface_mut(&mut self, index: usize) -> Option<&mut Surface> {
        self.surfaces.get_mut(index)
    }

    /// The mesh of surface `index`.
    pub fn mesh(&self, index: usize) -> Option<&Mesh> {
        self.surface(index).map(|s| &s.mesh)
    }

    /// The material of surface `index`.
    pub fn material(&self, index: usize) -> Option<&Material> {
        self.surface(index).map(|s| &s.material)
    }

    /// Replaces the material of surface `index`.
    pub fn set_material(&mut self, index: usize, material: Material) -> bool {
        self.with_material(index, |m| *m = material)
    }

    /// The material configuration of surface `index`.
    pub fn material_config(&self, index: usize) -> Option<MaterialConfig> {
        self.material(index).map(|m| m.config)
    }

    /// Replaces the material configuration of surface `index`.
    pub fn set_material_config(&mut self, index: usize, config: MaterialConfig) -> bool {
        self.with_material(index, |m| m.config = config)
    }

    /// Sets the albedo map and tint. A `None` texture keeps the current one.
    pub fn set_map_albedo(&mut self, index: usize, texture: Option<TextureId>, color: Color) -> bool {
        self.with_material(index, |m| {
            m.albedo.set_texture(texture);
            m.albedo.color = color;
        })
    }

    /// Sets the metalness map and factor. A `None` texture keeps the current one.
    pub fn set_map_metalness(&mut self, index: usize, texture: Option<TextureId>, factor: f32) -> bool {
        self.with_material(index, |m| {
            m.metalness.set_texture(texture);
            m.metalness.value = factor;
        })
    }

    /// Sets the roughness map and factor. A `None` texture keeps the current one.
    pub fn set_map_roughness(&mut self, index: usize, texture: Option<TextureId>, factor: f32) -> bool {
        self.with_material(index, |m| {
            m.roughness.set_texture(texture);
            m.roughness.value = factor;
        })
    }

    /// Sets the emission map, energy and color. A `None` texture keeps the current one.
    pub fn set_map_emission(
        &mut self,
        index: usize,
        texture: Option<TextureId>,
        energy: f32,
        color: Color,
    ) -> bool {
        self.with_material(index, |m| {
            m.emission.set_texture(texture);
            m.emission.value = energy;
            m.emission.color = color;
        })
    }

    /// Sets the normal map. A `None` texture keeps the current one.
    pub fn set_map_normal(&mut self, index: usize, texture: Option<TextureId>) -> bool {
        self.with_material(index, |m| m.normal.set_texture(texture))
    }

    /// Sets the occlusion map and the fraction of direct light it affects.
    /// A `None` texture keeps the current one.
    pub fn set_map_ao(&mut self, index: usize, texture: Option<TextureId>, light_affect: f32) -> bool {
        self.with_material(index, |m| {
            m.ao.set_texture(texture);
            m.ao.value = light_affect;
        })
    }

    fn with_material(&mut self, index: usize, f: impl FnOnce(&mut Material)) -> bool {
        match self.surfaces.get_mut(index) {
            Some(surface) => {
                f(&mut surface.material);
                true
            }
            None => {
                log::warn!("Surface index {} out of range ({} surfaces)", index, self.surfaces.len());
                false
            }
        }
    }

    /// Registers animations, replacing clips with the same name.
    pub fn add_animations(&mut self, animations: impl IntoIterator<Item = ModelAnimation>) {
        for anim in animations {
            self.animations.insert(anim.name.clone(), anim);
        }
    }

    /// Number of registered animations.
    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    /// Names of the registered animations, in sorted order.
    pub fn animation_names(&self) -> impl Iterator<Item = &str> {
        self.animations.keys().map(String::as_str)
    }

    /// The animation called `name`.
    pub fn animation(&self, name: &str) -> Option<&ModelAnimation> {
        self.animations.get(name)
    }

    /// Poses every skinned surface at `frame` of animation `name`.
    ///
    /// Returns the indices of the surfaces whose vertices changed and must be
    /// re-uploaded, or `None` if no animation has that name.
    pub fn update_animation(&mut self, name: &str, frame: usize) -> Option<Vec<usize>> {
        let anim = self.animations.get(name)?;
        let mut changed = Vec::new();
        for (i, surface) in self.surfaces.iter_mut().enumerate() {
            if anim.apply(&mut surface.mesh, &self.bind_pose, frame) {
                changed.push(i);
            }
        }
        Some(changed)
    }

    /// Recomputes the model-space bounds from every surface, grown by `margin`.
    ///
    /// Models without vertices keep their current bounds.
    pub fn update_bounding_box(&mut self, margin: f32) {
        let merged = self
            .surfaces
            .iter()
            .filter_map(|s| s.mesh.bounding_box())
            .reduce(|a, b| a.merge(&b));
        if let Some(aabb) = merged {
            self.aabb = if margin != 0.0 { aabb.expanded(margin) } else { aabb };
        }
    }

    /// Generates tangents for every surface.
    pub fn generate_tangents(&mut self) {
        for surface in &mut self.surfaces {
            surface.mesh.generate_tangents();
        }
    }
}
