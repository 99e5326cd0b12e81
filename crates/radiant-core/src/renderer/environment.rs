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

//! The look of a frame: bloom, fog, tonemapping, color grading and world colors.
//!
//! These records are plain data. The render agent owns the live
//! [`Environment`] and the post-processing lanes read it every frame.

use serde::{Deserialize, Serialize};

use crate::math::Color;

/// Handle to a skybox owned by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SkyboxId(pub u32);

/// How the blurred bright pass is composited over the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BloomMode {
    /// No bloom; the blur passes are skipped.
    #[default]
    Disabled,
    /// The blur is added to the scene color.
    Additive,
    /// The blur is blended with a soft-light operator.
    SoftLight,
}

impl BloomMode {
    /// The value of `uBloomMode` in the post-processing shader.
    pub fn shader_id(&self) -> i32 {
        *self as i32
    }
}

/// Distance fog model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FogMode {
    /// No fog.
    #[default]
    Disabled,
    /// Fog grows linearly between `start` and `end`.
    Linear,
    /// `1 - exp(-(density * d)^2)`.
    Exp2,
    /// `1 - exp(-density * d)`.
    Exp,
}

impl FogMode {
    /// The value of `uFogMode` in the post-processing shader.
    pub fn shader_id(&self) -> i32 {
        *self as i32
    }
}

/// HDR to LDR mapping operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TonemapMode {
    /// Exposure scaling only.
    #[default]
    Linear,
    /// Extended Reinhard with a white point.
    Reinhard,
    /// Uncharted 2 filmic curve.
    Filmic,
    /// ACES fitted curve.
    Aces,
}

impl TonemapMode {
    /// The value of `uTonemapper` in the post-processing shader.
    pub fn shader_id(&self) -> i32 {
        *self as i32
    }
}

/// Bloom parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bloom {
    /// Compositing mode.
    pub mode: BloomMode,
    /// Strength of the composited blur.
    pub intensity: f32,
    /// Luminance above which a fragment feeds the bright pass.
    pub hdr_threshold: f32,
    /// Number of separable blur passes (each pass is one direction).
    pub iterations: u32,
}

impl Default for Bloom {
    fn default() -> Self {
        Self {
            mode: BloomMode::Disabled,
            intensity: 1.0,
            hdr_threshold: 1.0,
            iterations: 10,
        }
    }
}

/// Fog parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fog {
    /// Fog model.
    pub mode: FogMode,
    /// Fog color.
    pub color: Color,
    /// Distance where linear fog starts.
    pub start: f32,
    /// Distance where linear fog is opaque.
    pub end: f32,
    /// Density of the exponential models.
    pub density: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            mode: FogMode::Disabled,
            color: Color::GRAY,
            start: 10.0,
            end: 30.0,
            density: 0.1,
        }
    }
}

/// Tonemapping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tonemap {
    /// Operator.
    pub mode: TonemapMode,
    /// Exposure multiplier applied before the operator.
    pub exposure: f32,
    /// White point of the operators that use one.
    pub white: f32,
}

impl Default for Tonemap {
    fn default() -> Self {
        Self {
            mode: TonemapMode::Linear,
            exposure: 1.0,
            white: 1.0,
        }
    }
}

/// Final color grading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adjustments {
    /// Brightness multiplier.
    pub brightness: f32,
    /// Contrast around mid-gray.
    pub contrast: f32,
    /// Saturation; `0` is grayscale.
    pub saturation: f32,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
        }
    }
}

/// Background and ambient lighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct World {
    /// The skybox drawn behind the scene and used for IBL.
    ///
    /// Skyboxes are runtime objects and are never serialized.
    #[serde(skip)]
    pub skybox: Option<SkyboxId>,
    /// Clear color when no skybox is set.
    pub background: Color,
    /// Ambient light color when no skybox is set.
    pub ambient: Color,
}

impl Default for World {
    fn default() -> Self {
        Self {
            skybox: None,
            background: Color::DARK_GRAY,
            ambient: Color::DARK_GRAY,
        }
    }
}

/// All environment settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// Bloom.
    pub bloom: Bloom,
    /// Fog.
    pub fog: Fog,
    /// Tonemapping.
    pub tonemap: Tonemap,
    /// Color grading.
    pub adjustments: Adjustments,
    /// Background and ambient.
    pub world: World,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let env = Environment::default();
        assert_eq!(env.bloom.mode, BloomMode::Disabled);
        assert_eq!(env.bloom.iterations, 10);
        assert_eq!(env.fog.color, Color::GRAY);
        assert_eq!(env.fog.end, 30.0);
        assert_eq!(env.tonemap.mode, TonemapMode::Linear);
        assert_eq!(env.adjustments.saturation, 1.0);
        assert_eq!(env.world.skybox, None);
        assert_eq!(env.world.ambient, Color::DARK_GRAY);
    }

    #[test]
    fn test_shader_ids_follow_declaration_order() {
        assert_eq!(BloomMode::SoftLight.shader_id(), 2);
        assert_eq!(FogMode::Exp.shader_id(), 3);
        assert_eq!(TonemapMode::Aces.shader_id(), 3);
    }
}
