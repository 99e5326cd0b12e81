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

//! Surface materials.
//!
//! A material is a set of texture slots with their scalar or color factors,
//! a UV transform and the [`MaterialConfig`] selecting shading model and
//! pipeline state. Texture handles are **borrowed**: replacing one does not
//! release the previous texture.

use radiant_core::math::{Color, Vec2};
use radiant_core::renderer::{MaterialConfig, TextureId};

/// One texture slot of a material.
///
/// `texture == None` samples the renderer's placeholder for that slot
/// (white for albedo, metalness, roughness and occlusion; black for emission
/// and normal maps).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaterialMap {
    /// The borrowed texture, if any.
    pub texture: Option<TextureId>,
    /// Color factor, used by the albedo and emission slots.
    pub color: Color,
    /// Scalar factor: metalness, roughness, emission energy or AO light affect.
    pub value: f32,
}

impl MaterialMap {
    const fn with(color: Color, value: f32) -> Self {
        Self {
            texture: None,
            color,
            value,
        }
    }

    /// Replaces the texture, keeping the previous one when `texture` is `None`.
    pub fn set_texture(&mut self, texture: Option<TextureId>) {
        if let Some(t) = texture {
            self.texture = Some(t);
        }
    }
}

/// A complete surface material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Base color map and tint.
    pub albedo: MaterialMap,
    /// Metalness map and factor.
    pub metalness: MaterialMap,
    /// Roughness map and factor.
    pub roughness: MaterialMap,
    /// Emission map, color and energy.
    pub emission: MaterialMap,
    /// Tangent-space normal map.
    pub normal: MaterialMap,
    /// Ambient occlusion map and the fraction of direct light it affects.
    pub ao: MaterialMap,
    /// Texture coordinate offset.
    pub uv_offset: Vec2,
    /// Texture coordinate scale.
    pub uv_scale: Vec2,
    /// Shading model and pipeline state.
    pub config: MaterialConfig,
}

impl Material {
    /// Creates a material with default maps and the given configuration.
    pub fn new(config: MaterialConfig) -> Self {
        Self {
            albedo: MaterialMap::with(Color::WHITE, 0.0),
            metalness: MaterialMap::with(Color::WHITE, 0.0),
            roughness: MaterialMap::with(Color::WHITE, 1.0),
            emission: MaterialMap::with(Color::BLACK, 1.0),
            normal: MaterialMap::with(Color::WHITE, 0.0),
            ao: MaterialMap::with(Color::WHITE, 0.0),
            uv_offset: Vec2::ZERO,
            uv_scale: Vec2::ONE,
            config,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(MaterialConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_factors() {
        let m = Material::default();
        assert_eq!(m.albedo.color, Color::WHITE);
        assert_eq!(m.metalness.value, 0.0);
        assert_eq!(m.roughness.value, 1.0);
        assert_eq!(m.emission.color, Color::BLACK);
        assert_eq!(m.emission.value, 1.0);
        assert_eq!(m.uv_scale, Vec2::ONE);
    }

    #[test]
    fn test_set_texture_none_keeps_previous() {
        let mut map = MaterialMap::default();
        map.set_texture(Some(TextureId(4)));
        map.set_texture(None);
        assert_eq!(map.texture, Some(TextureId(4)));
    }
}
