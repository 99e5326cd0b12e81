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

//! Engine configuration, loadable from RON.

use std::path::Path;

use radiant_core::renderer::{
    DepthSortOrder, Environment, Layers, MaterialConfig, RenderFlags, RenderSettings,
};
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Everything chosen when the engine starts.
///
/// Missing fields take their default value, so a file only needs to name
/// what it changes:
///
/// ```rust,ignore
/// (
///     internal_resolution: Some((640, 360)),
///     flags: 3,
///     environment: (bloom: (mode: Additive, iterations: 4)),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Internal rendering resolution. `None` follows the screen.
    pub internal_resolution: Option<(u32, u32)>,
    /// Initialization flags.
    pub flags: RenderFlags,
    /// Depth sorting of scene batches.
    pub depth_sort: DepthSortOrder,
    /// Seconds between two shadow map refreshes, `0` for every frame.
    pub shadow_update_interval: f32,
    /// Layers rendered.
    pub active_layers: Layers,
    /// Configuration of materials created without one.
    pub default_material_config: MaterialConfig,
    /// Poll the device for errors after every pass.
    pub check_gl_errors: bool,
    /// Initial look of the frame.
    pub environment: Environment,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let settings = RenderSettings::default();
        Self {
            internal_resolution: settings.internal_resolution,
            flags: settings.flags,
            depth_sort: settings.depth_sort,
            shadow_update_interval: settings.shadow_update_interval,
            active_layers: settings.active_layers,
            default_material_config: MaterialConfig::default(),
            check_gl_errors: cfg!(debug_assertions),
            environment: Environment::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from RON text.
    pub fn from_ron(text: &str) -> Result<Self, EngineError> {
        Ok(ron::from_str(text)?)
    }

    /// Reads a RON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron(&text)?;
        log::info!("Loaded engine configuration from '{}'", path.display());
        Ok(config)
    }

    /// Serializes the configuration as pretty RON.
    pub fn to_ron(&self) -> Result<String, EngineError> {
        let pretty = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// The render settings part of the configuration.
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            internal_resolution: self.internal_resolution,
            flags: self.flags,
            depth_sort: self.depth_sort,
            shadow_update_interval: self.shadow_update_interval,
            active_layers: self.active_layers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use radiant_core::renderer::{BloomMode, TonemapMode};

    #[test]
    fn test_empty_config_is_default() {
        let config = EngineConfig::from_ron("()").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.active_layers, Layers::LAYER_1);
        assert_eq!(config.render_settings(), RenderSettings::default());
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let text = "(
            internal_resolution: Some((320, 180)),
            shadow_update_interval: 0.25,
            depth_sort: FarToNear,
            environment: (
                bloom: (mode: Additive, iterations: 4),
                tonemap: (mode: Aces),
            ),
        )";
        let config = EngineConfig::from_ron(text).unwrap();
        assert_eq!(config.internal_resolution, Some((320, 180)));
        assert_relative_eq!(config.shadow_update_interval, 0.25);
        assert_eq!(config.depth_sort, DepthSortOrder::FarToNear);
        assert_eq!(config.environment.bloom.mode, BloomMode::Additive);
        assert_eq!(config.environment.bloom.iterations, 4);
        assert_relative_eq!(config.environment.bloom.intensity, 1.0);
        assert_eq!(config.environment.tonemap.mode, TonemapMode::Aces);
        assert_eq!(config.flags, RenderFlags::empty());
    }

    #[test]
    fn test_written_config_reads_back() {
        let mut config = EngineConfig {
            flags: RenderFlags::ASPECT_KEEP,
            active_layers: Layers::LAYER_1,
            ..EngineConfig::default()
        };
        config.active_layers.insert(Layers::LAYER_3);
        config.check_gl_errors = true;
        let text = config.to_ron().unwrap();
        assert_eq!(EngineConfig::from_ron(&text).unwrap(), config);
    }

    #[test]
    fn test_bad_config_is_reported() {
        let err = EngineConfig::from_ron("(depth_sort: Sideways)").unwrap_err();
        assert!(matches!(err, EngineError::ConfigParse(_)));
        let err = EngineConfig::load("/definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, EngineError::ConfigIo { .. }));
    }
}
