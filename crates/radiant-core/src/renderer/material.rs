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

//! Material configuration: shading model, pipeline state and feature flags.
//!
//! A [`MaterialConfig`] is both the key of the scene batches and the
//! description of the shader permutation a material needs. The shading
//! subset of it, [`ShaderKey`], keys the shader cache.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::api::{BlendMode, CullMode};

/// Diffuse lighting model.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum DiffuseMode {
    /// No lighting; albedo only.
    Unshaded,
    /// Burley (2012) diffuse.
    #[default]
    Burley,
    /// Disney diffuse with retro-reflection.
    Disney,
    /// Lambertian diffuse.
    Lambert,
    /// Phong-style diffuse.
    Phong,
    /// Quantized cel shading.
    Toon,
}

impl DiffuseMode {
    /// All modes, in packing order.
    pub const ALL: [DiffuseMode; 6] = [
        DiffuseMode::Unshaded,
        DiffuseMode::Burley,
        DiffuseMode::Disney,
        DiffuseMode::Lambert,
        DiffuseMode::Phong,
        DiffuseMode::Toon,
    ];

    /// The preprocessor symbol selecting this model in the material shader.
    pub fn define(&self) -> &'static str {
        match self {
            DiffuseMode::Unshaded => "DIFFUSE_UNSHADED",
            DiffuseMode::Burley => "DIFFUSE_BURLEY",
            DiffuseMode::Disney => "DIFFUSE_DISNEY",
            DiffuseMode::Lambert => "DIFFUSE_LAMBERT",
            DiffuseMode::Phong => "DIFFUSE_PHONG",
            DiffuseMode::Toon => "DIFFUSE_TOON",
        }
    }
}

/// Specular lighting model.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum SpecularMode {
    /// No specular term.
    Disabled,
    /// Schlick-GGX microfacet specular.
    #[default]
    SchlickGgx,
    /// Disney specular.
    Disney,
    /// Blinn-Phong specular.
    BlinnPhong,
    /// Quantized cel specular.
    Toon,
}

impl SpecularMode {
    /// All modes, in packing order.
    pub const ALL: [SpecularMode; 5] = [
        SpecularMode::Disabled,
        SpecularMode::SchlickGgx,
        SpecularMode::Disney,
        SpecularMode::BlinnPhong,
        SpecularMode::Toon,
    ];

    /// The preprocessor symbol, `None` when specular is disabled.
    pub fn define(&self) -> Option<&'static str> {
        match self {
            SpecularMode::Disabled => None,
            SpecularMode::SchlickGgx => Some("SPECULAR_SCHLICK_GGX"),
            SpecularMode::Disney => Some("SPECULAR_DISNEY"),
            SpecularMode::BlinnPhong => Some("SPECULAR_BLINN_PHONG"),
            SpecularMode::Toon => Some("SPECULAR_TOON"),
        }
    }
}

radiant_bitflags! {
    /// Optional shading features of a material.
    pub struct MaterialFlags: u32 {
        /// Multiply albedo by the vertex color stream.
        const VERTEX_COLOR = 1 << 0;
        /// Sample shadow maps of the lights affecting the draw.
        const RECEIVE_SHADOW = 1 << 1;
        /// Sample the emission map.
        const MAP_EMISSION = 1 << 2;
        /// Perturb normals with the normal map.
        const MAP_NORMAL = 1 << 3;
        /// Sample the ambient occlusion map.
        const MAP_AO = 1 << 4;
        /// Use the skybox irradiance and prefilter maps for ambient light.
        const SKY_IBL = 1 << 5;
    }
}

impl MaterialFlags {
    /// Every defined flag.
    pub const ALL: Self = Self::from_bits(0b11_1111);

    /// Pairs of flag and preprocessor symbol, in bit order.
    pub const DEFINES: [(MaterialFlags, &'static str); 6] = [
        (MaterialFlags::VERTEX_COLOR, "VERTEX_COLOR"),
        (MaterialFlags::RECEIVE_SHADOW, "RECEIVE_SHADOW"),
        (MaterialFlags::MAP_EMISSION, "MAP_EMISSION"),
        (MaterialFlags::MAP_NORMAL, "MAP_NORMAL"),
        (MaterialFlags::MAP_AO, "MAP_AO"),
        (MaterialFlags::SKY_IBL, "SKY_IBL"),
    ];
}

/// The shading-relevant part of a [`MaterialConfig`].
///
/// Two configurations with the same key share one compiled shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShaderKey {
    /// Diffuse model.
    pub diffuse: DiffuseMode,
    /// Specular model. Always [`SpecularMode::Disabled`] for unshaded keys.
    pub specular: SpecularMode,
    /// Feature flags.
    pub flags: MaterialFlags,
}

impl ShaderKey {
    /// Packs the key into `[flags:6][specular:3][diffuse:3]`.
    pub fn pack(&self) -> u32 {
        (self.diffuse as u32) | ((self.specular as u32) << 3) | (self.flags.bits() << 6)
    }
}

impl PartialOrd for ShaderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ShaderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pack().cmp(&other.pack())
    }
}

/// A complete material configuration.
///
/// Ordering and equality follow the packed representation, so iterating a
/// map keyed by configs groups identical pipeline state together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialConfig {
    /// Diffuse model.
    pub diffuse: DiffuseMode,
    /// Specular model.
    pub specular: SpecularMode,
    /// Blend state.
    pub blend: BlendMode,
    /// Cull state.
    pub cull: CullMode,
    /// Feature flags.
    pub flags: MaterialFlags,
}

const DIFFUSE_BITS: u32 = 3;
const SPECULAR_BITS: u32 = 3;
const BLEND_BITS: u32 = 3;
const CULL_BITS: u32 = 2;

impl MaterialConfig {
    /// Creates a configuration.
    pub fn new(
        diffuse: DiffuseMode,
        specular: SpecularMode,
        blend: BlendMode,
        cull: CullMode,
        flags: MaterialFlags,
    ) -> Self {
        Self {
            diffuse,
            specular,
            blend,
            cull,
            flags,
        }
    }

    /// Packs the configuration into `[flags:6][cull:2][blend:3][specular:3][diffuse:3]`.
    pub fn pack(&self) -> u32 {
        let mut bits = self.diffuse as u32;
        let mut shift = DIFFUSE_BITS;
        bits |= (self.specular as u32) << shift;
        shift += SPECULAR_BITS;
        bits |= (self.blend as u32) << shift;
        shift += BLEND_BITS;
        bits |= (self.cull as u32) << shift;
        shift += CULL_BITS;
        bits | (self.flags.bits() << shift)
    }

    /// Decodes a packed configuration.
    ///
    /// Returns `None` if any field is out of range.
    pub fn from_packed(bits: u32) -> Option<Self> {
        let field = |shift: u32, width: u32| ((bits >> shift) & ((1 << width) - 1)) as usize;
        let diffuse = *DiffuseMode::ALL.get(field(0, DIFFUSE_BITS))?;
        let specular = *SpecularMode::ALL.get(field(3, SPECULAR_BITS))?;
        let blend = [
            BlendMode::Disabled,
            BlendMode::Alpha,
            BlendMode::Additive,
            BlendMode::Multiplied,
            BlendMode::AddColors,
            BlendMode::SubtractColors,
            BlendMode::AlphaPremultiply,
        ]
        .get(field(6, BLEND_BITS))
        .copied()?;
        let cull = [CullMode::Disabled, CullMode::Front, CullMode::Back]
            .get(field(9, CULL_BITS))
            .copied()?;
        let flag_bits = bits >> 11;
        if flag_bits & !MaterialFlags::ALL.bits() != 0 {
            return None;
        }
        Some(Self::new(
            diffuse,
            specular,
            blend,
            cull,
            MaterialFlags::from_bits(flag_bits),
        ))
    }

    /// The shader-cache key of this configuration.
    pub fn shader_key(&self) -> ShaderKey {
        let specular = if self.diffuse == DiffuseMode::Unshaded {
            SpecularMode::Disabled
        } else {
            self.specular
        };
        ShaderKey {
            diffuse: self.diffuse,
            specular,
            flags: self.flags,
        }
    }
}

impl Default for MaterialConfig {
    /// Burley diffuse, Schlick-GGX specular, alpha blending, back-face
    /// culling, receiving shadows and sky IBL.
    fn default() -> Self {
        Self::new(
            DiffuseMode::Burley,
            SpecularMode::SchlickGgx,
            BlendMode::Alpha,
            CullMode::Back,
            MaterialFlags::RECEIVE_SHADOW | MaterialFlags::SKY_IBL,
        )
    }
}

impl PartialOrd for MaterialConfig {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MaterialConfig {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pack().cmp(&other.pack())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_roundtrip_over_all_modes() {
        for diffuse in DiffuseMode::ALL {
            for specular in SpecularMode::ALL {
                let cfg = MaterialConfig::new(
                    diffuse,
                    specular,
                    BlendMode::Additive,
                    CullMode::Front,
                    MaterialFlags::MAP_AO | MaterialFlags::VERTEX_COLOR,
                );
                assert_eq!(MaterialConfig::from_packed(cfg.pack()), Some(cfg));
            }
        }
    }

    #[test]
    fn test_invalid_packed_fields_are_rejected() {
        // Diffuse index 7 does not exist.
        assert!(MaterialConfig::from_packed(0b111).is_none());
        // Unknown flag bit.
        assert!(MaterialConfig::from_packed(1 << 20).is_none());
    }

    #[test]
    fn test_blend_and_cull_do_not_change_shader_key() {
        let a = MaterialConfig::default();
        let mut b = a;
        b.blend = BlendMode::Disabled;
        b.cull = CullMode::Disabled;
        assert_ne!(a, b);
        assert_eq!(a.shader_key(), b.shader_key());
    }

    #[test]
    fn test_unshaded_key_ignores_specular() {
        let mut cfg = MaterialConfig::default();
        cfg.diffuse = DiffuseMode::Unshaded;
        assert_eq!(cfg.shader_key().specular, SpecularMode::Disabled);
    }

    #[test]
    fn test_ordering_follows_packed_bits() {
        let a = MaterialConfig::default();
        let mut b = a;
        b.flags.insert(MaterialFlags::MAP_AO);
        assert!(a < b);
    }
}
