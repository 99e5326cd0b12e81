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

//! Environment accessors on the [`Engine`].

use radiant_core::math::Color;
use radiant_core::renderer::{BloomMode, Environment, FogMode, SkyboxId, TonemapMode};

use crate::{Engine, EngineError, EngineResult};

/// Generates a getter and a setter for one field of the environment.
macro_rules! environment_accessors {
    ($( $(#[$doc:meta])* $get:ident, $set:ident: $group:ident.$field:ident: $ty:ty; )*) => {
        impl Engine {
            $(
                $(#[$doc])*
                pub fn $get(&self) -> $ty {
                    self.agent.environment().$group.$field
                }

                $(#[$doc])*
                pub fn $set(&mut self, value: $ty) {
                    self.agent.environment_mut().$group.$field = value;
                }
            )*
        }
    };
}

environment_accessors! {
    /// Bloom compositing mode.
    bloom_mode, set_bloom_mode: bloom.mode: BloomMode;
    /// Bloom strength.
    bloom_intensity, set_bloom_intensity: bloom.intensity: f32;
    /// Luminance above which fragments bloom.
    bloom_hdr_threshold, set_bloom_hdr_threshold: bloom.hdr_threshold: f32;
    /// Number of blur passes.
    bloom_iterations, set_bloom_iterations: bloom.iterations: u32;
    /// Fog model.
    fog_mode, set_fog_mode: fog.mode: FogMode;
    /// Fog color.
    fog_color, set_fog_color: fog.color: Color;
    /// Start distance of linear fog.
    fog_start, set_fog_start: fog.start: f32;
    /// End distance of linear fog.
    fog_end, set_fog_end: fog.end: f32;
    /// Density of exponential fog.
    fog_density, set_fog_density: fog.density: f32;
    /// Tonemapping operator.
    tonemap_mode, set_tonemap_mode: tonemap.mode: TonemapMode;
    /// Exposure applied before tonemapping.
    tonemap_exposure, set_tonemap_exposure: tonemap.exposure: f32;
    /// White point of the tonemapping operator.
    tonemap_white, set_tonemap_white: tonemap.white: f32;
    /// Brightness multiplier.
    brightness, set_brightness: adjustments.brightness: f32;
    /// Contrast around mid-gray.
    contrast, set_contrast: adjustments.contrast: f32;
    /// Saturation, `0` for grayscale.
    saturation, set_saturation: adjustments.saturation: f32;
    /// Clear color when no skybox is set.
    world_background, set_world_background: world.background: Color;
    /// Ambient color when no skybox is set.
    world_ambient, set_world_ambient: world.ambient: Color;
}

impl Engine {
    /// The whole environment.
    pub fn environment(&self) -> &Environment {
        self.agent.environment()
    }

    /// Replaces every environment setting except the world skybox, which
    /// keeps pointing at the current one.
    pub fn set_environment(&mut self, environment: Environment) {
        let current = self.agent.environment_mut();
        let skybox = current.world.skybox;
        *current = environment;
        current.world.skybox = skybox;
    }

    /// The skybox drawn behind the scene and used for image-based lighting.
    pub fn world_skybox(&self) -> Option<SkyboxId> {
        self.agent.environment().world.skybox
    }

    /// Sets the world skybox, `None` for a plain background.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownSkybox`] when `skybox` names no loaded skybox.
    pub fn set_world_skybox(&mut self, skybox: Option<SkyboxId>) -> EngineResult<()> {
        if let Some(id) = skybox {
            if self.skybox(id).is_none() {
                log::warn!("Cannot use skybox {:?} as world skybox: not loaded", id);
                return Err(EngineError::UnknownSkybox(id));
            }
        }
        self.agent.environment_mut().world.skybox = skybox;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use approx::assert_relative_eq;
    use radiant_infra::HeadlessDevice;

    use super::*;

    fn engine() -> Engine {
        Engine::init(Rc::new(HeadlessDevice::new(16, 16))).unwrap()
    }

    #[test]
    fn test_accessors_write_through() {
        let mut engine = engine();
        engine.set_bloom_mode(BloomMode::SoftLight);
        engine.set_bloom_iterations(6);
        engine.set_fog_mode(FogMode::Exp2);
        engine.set_fog_density(0.3);
        engine.set_tonemap_mode(TonemapMode::Filmic);
        engine.set_saturation(0.0);
        engine.set_world_ambient(Color::WHITE);

        let env = engine.environment();
        assert_eq!(env.bloom.mode, BloomMode::SoftLight);
        assert_eq!(env.bloom.iterations, 6);
        assert_eq!(env.fog.mode, FogMode::Exp2);
        assert_relative_eq!(env.fog.density, 0.3);
        assert_eq!(engine.tonemap_mode(), TonemapMode::Filmic);
        assert_relative_eq!(engine.saturation(), 0.0);
        assert_eq!(engine.world_ambient(), Color::WHITE);
        assert_relative_eq!(engine.contrast(), 1.0);
    }

    #[test]
    fn test_unknown_world_skybox_is_rejected() {
        let mut engine = engine();
        let err = engine.set_world_skybox(Some(SkyboxId(3))).unwrap_err();
        assert!(matches!(err, EngineError::UnknownSkybox(SkyboxId(3))));
        assert_eq!(engine.world_skybox(), None);
        engine.set_world_skybox(None).unwrap();
    }

    #[test]
    fn test_replacing_the_environment_keeps_the_skybox_slot() {
        let mut engine = engine();
        let mut env = Environment::default();
        env.fog.mode = FogMode::Linear;
        env.world.skybox = Some(SkyboxId(9));
        engine.set_environment(env);
        assert_eq!(engine.fog_mode(), FogMode::Linear);
        assert_eq!(engine.world_skybox(), None);
    }
}
